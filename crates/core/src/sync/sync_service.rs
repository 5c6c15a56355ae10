//! Sync orchestration: windows, batch classification, write application,
//! and post-insert matching.

use chrono::{Days, Local, Utc};
use log::{debug, error, info};
use std::collections::HashMap;
use std::sync::Arc;

use super::classify::{classify_incoming, pending_equivalent, Classification};
use super::sync_model::{
    AccountSyncResult, PendingSyncResult, ProviderTransaction, SyncSummary,
};
use super::sync_traits::{AggregatorClientTrait, SyncServiceTrait};
use crate::accounts::{Account, AccountRepositoryTrait, NewAccount};
use crate::constants::{
    INITIAL_SYNC_MAX_DAYS, INITIAL_SYNC_MIN_DAYS, REFRESH_COOLDOWN_SECS, SYNC_WINDOW_DAYS,
};
use crate::errors::{DatabaseError, Error, Result};
use crate::rules::RuleServiceTrait;
use crate::scheduled::ScheduledServiceTrait;
use crate::transactions::{
    AmendmentUpdate, NewTransaction, PendingPromotion, Transaction, TransactionRepositoryTrait,
    TransactionStatus,
};

/// Service driving reconciliation between the aggregator and local storage.
pub struct SyncService {
    client: Arc<dyn AggregatorClientTrait>,
    account_repository: Arc<dyn AccountRepositoryTrait>,
    transaction_repository: Arc<dyn TransactionRepositoryTrait>,
    scheduled_service: Arc<dyn ScheduledServiceTrait>,
    rule_service: Arc<dyn RuleServiceTrait>,
}

impl SyncService {
    pub fn new(
        client: Arc<dyn AggregatorClientTrait>,
        account_repository: Arc<dyn AccountRepositoryTrait>,
        transaction_repository: Arc<dyn TransactionRepositoryTrait>,
        scheduled_service: Arc<dyn ScheduledServiceTrait>,
        rule_service: Arc<dyn RuleServiceTrait>,
    ) -> Self {
        Self {
            client,
            account_repository,
            transaction_repository,
            scheduled_service,
            rule_service,
        }
    }

    fn get_owned(&self, user_id: &str, account_id: &str) -> Result<Account> {
        let account = match self.account_repository.get_by_id(account_id) {
            Ok(account) => account,
            Err(Error::Database(DatabaseError::NotFound(_))) => {
                return Err(Error::NotFound(format!("Account {}", account_id)))
            }
            Err(e) => return Err(e),
        };
        if account.user_id != user_id {
            return Err(Error::NotFound(format!("Account {}", account_id)));
        }
        Ok(account)
    }

    /// History depth for this sync: bounded caller choice on the first
    /// sync, fixed trailing window afterwards.
    fn window_days(account: &Account, initial_days: Option<u32>) -> u64 {
        if account.has_synced() {
            SYNC_WINDOW_DAYS as u64
        } else {
            initial_days
                .unwrap_or(INITIAL_SYNC_MAX_DAYS)
                .clamp(INITIAL_SYNC_MIN_DAYS, INITIAL_SYNC_MAX_DAYS) as u64
        }
    }

    async fn sync_account_inner(
        &self,
        account: &Account,
        initial_days: Option<u32>,
    ) -> Result<AccountSyncResult> {
        let since = Local::now().date_naive() - Days::new(Self::window_days(account, initial_days));
        let incoming = self
            .client
            .list_transactions(&account.external_id, since)
            .await?;
        debug!(
            "Account {}: {} settled records since {}",
            account.id,
            incoming.len(),
            since
        );

        // Batch-load the stored snapshot once.
        let external_ids: Vec<String> = incoming.iter().map(|t| t.external_id.clone()).collect();
        let stored: HashMap<String, Transaction> = self
            .transaction_repository
            .find_by_external_ids(&account.id, &external_ids)?
            .into_iter()
            .filter_map(|t| t.external_id.clone().map(|ext| (ext, t)))
            .collect();
        let mut pendings = self
            .transaction_repository
            .list_pending_for_account(&account.id)?;

        // Classify the whole batch before applying anything; each claimed
        // pending is withdrawn so two settlements cannot promote one row.
        let mut plan: Vec<(ProviderTransaction, Classification)> =
            Vec::with_capacity(incoming.len());
        for record in incoming {
            let classification = classify_incoming(&record, &stored, &pendings);
            if let Classification::PromotePending { ref pending_id } = classification {
                pendings.retain(|p| &p.id != pending_id);
            }
            plan.push((record, classification));
        }

        let mut result = AccountSyncResult {
            account_id: account.id.clone(),
            ..Default::default()
        };
        let mut to_create: Vec<NewTransaction> = Vec::new();
        for (record, classification) in plan {
            match classification {
                Classification::CreateConfirmed => {
                    to_create.push(NewTransaction {
                        id: None,
                        user_id: account.user_id.clone(),
                        account_id: Some(account.id.clone()),
                        external_id: Some(record.external_id),
                        date: record.date,
                        merchant: record.merchant,
                        description: record.description,
                        amount: record.amount,
                        status: TransactionStatus::Confirmed,
                        is_manual: false,
                    });
                }
                Classification::PromotePending { pending_id } => {
                    self.transaction_repository
                        .promote_pending(PendingPromotion {
                            pending_id,
                            external_id: record.external_id,
                            date: record.date,
                            merchant: record.merchant,
                            description: record.description,
                            amount: record.amount,
                        })
                        .await?;
                    result.promoted += 1;
                }
                Classification::Amend { transaction_id } => {
                    self.transaction_repository
                        .apply_amendment(AmendmentUpdate {
                            transaction_id,
                            merchant: record.merchant,
                            description: record.description,
                            amount: record.amount,
                        })
                        .await?;
                    result.amended += 1;
                }
                Classification::Unchanged => result.unchanged += 1,
            }
        }

        let created = self.transaction_repository.create_many(to_create).await?;
        result.created = created.len();

        // New transactions get one shot at a schedule, rules only when no
        // schedule claimed them. Promoted and amended rows keep whatever
        // they already had.
        for transaction in &created {
            let matched = self
                .scheduled_service
                .auto_match_transaction(transaction)
                .await?;
            if matched.is_none() {
                self.rule_service.categorize_transaction(transaction).await?;
            }
        }

        self.account_repository
            .mark_synced(account.id.clone())
            .await?;
        info!(
            "Synced account {}: {} created, {} promoted, {} amended, {} unchanged",
            account.id, result.created, result.promoted, result.amended, result.unchanged
        );
        Ok(result)
    }

    async fn sync_resolved_account(
        &self,
        account: &Account,
        initial_days: Option<u32>,
    ) -> AccountSyncResult {
        match self.sync_account_inner(account, initial_days).await {
            Ok(result) => result,
            Err(e) => {
                error!("Sync failed for account {}: {}", account.id, e);
                let message = e.to_string();
                if let Err(record_err) = self
                    .account_repository
                    .record_error(account.id.clone(), message.clone())
                    .await
                {
                    error!(
                        "Could not record sync error for account {}: {}",
                        account.id, record_err
                    );
                }
                AccountSyncResult::failed(account.id.clone(), message)
            }
        }
    }
}

#[async_trait::async_trait]
impl SyncServiceTrait for SyncService {
    async fn link_accounts(&self, user_id: &str) -> Result<Vec<Account>> {
        let provider_accounts = self.client.list_accounts().await?;
        let mut accounts = Vec::with_capacity(provider_accounts.len());
        for provider_account in provider_accounts {
            let new_account = NewAccount {
                id: None,
                user_id: user_id.to_string(),
                external_id: provider_account.external_id,
                name: provider_account.name,
                institution: provider_account.institution,
                currency: provider_account.currency,
                current_balance: provider_account.current_balance,
                available_balance: provider_account.available_balance,
            };
            new_account.validate()?;
            accounts.push(
                self.account_repository
                    .upsert_by_external_id(new_account)
                    .await?,
            );
        }
        info!("Linked {} accounts for user {}", accounts.len(), user_id);
        Ok(accounts)
    }

    async fn sync_account(
        &self,
        user_id: &str,
        account_id: &str,
        initial_days: Option<u32>,
    ) -> Result<AccountSyncResult> {
        let account = self.get_owned(user_id, account_id)?;
        Ok(self.sync_resolved_account(&account, initial_days).await)
    }

    async fn sync_all(&self, user_id: &str, initial_days: Option<u32>) -> Result<SyncSummary> {
        let accounts = self.account_repository.list_for_user(user_id)?;
        let mut summary = SyncSummary::default();
        for account in &accounts {
            summary
                .results
                .push(self.sync_resolved_account(account, initial_days).await);
        }
        Ok(summary)
    }

    async fn sync_pending(&self, user_id: &str, account_id: &str) -> Result<PendingSyncResult> {
        let account = self.get_owned(user_id, account_id)?;
        let provider_pendings = self
            .client
            .list_pending_transactions(&account.external_id)
            .await?;
        let stored_pendings = self
            .transaction_repository
            .list_pending_for_account(&account.id)?;

        // A stored pending the provider no longer reports has settled (and
        // will arrive as a settled record) or was voided by the bank.
        let stale: Vec<String> = stored_pendings
            .iter()
            .filter(|stored| !provider_pendings.iter().any(|p| pending_equivalent(stored, p)))
            .map(|stored| stored.id.clone())
            .collect();
        let removed = if stale.is_empty() {
            0
        } else {
            self.transaction_repository.delete_many(stale).await?
        };

        let to_insert: Vec<NewTransaction> = provider_pendings
            .into_iter()
            .filter(|incoming| {
                !stored_pendings
                    .iter()
                    .any(|stored| pending_equivalent(stored, incoming))
            })
            .map(|incoming| NewTransaction {
                id: None,
                user_id: account.user_id.clone(),
                account_id: Some(account.id.clone()),
                external_id: None,
                date: incoming.date,
                merchant: incoming.merchant,
                description: incoming.description,
                amount: incoming.amount,
                status: TransactionStatus::Pending,
                is_manual: false,
            })
            .collect();
        let inserted = self
            .transaction_repository
            .create_many(to_insert)
            .await?
            .len();

        Ok(PendingSyncResult {
            account_id: account.id,
            inserted,
            removed,
        })
    }

    async fn refresh_account(&self, user_id: &str, account_id: &str) -> Result<()> {
        let account = self.get_owned(user_id, account_id)?;
        if let Some(last_refreshed_at) = account.last_refreshed_at {
            let elapsed = (Utc::now().naive_utc() - last_refreshed_at).num_seconds();
            if elapsed < REFRESH_COOLDOWN_SECS {
                return Err(Error::RateLimited {
                    retry_after_secs: REFRESH_COOLDOWN_SECS - elapsed,
                });
            }
        }
        self.client.trigger_refresh(&account.external_id).await?;
        self.account_repository.mark_refreshed(account.id).await?;
        Ok(())
    }
}
