//! Tests for the sync orchestration service, mock-repository style.

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use chrono::{Days, Local, NaiveDate, NaiveDateTime, Utc};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use crate::accounts::{Account, AccountRepositoryTrait, AccountSnapshot, NewAccount};
    use crate::errors::{DatabaseError, Error, Result};
    use crate::rules::{CategorizationRule, NewCategorizationRule, RuleServiceTrait};
    use crate::scheduled::{
        NewScheduledTransaction, ScheduledServiceTrait, ScheduledTransaction,
        ScheduledTransactionUpdate,
    };
    use crate::sync::{
        AggregatorClientTrait, ProviderAccount, ProviderPendingTransaction, ProviderTransaction,
        SyncService, SyncServiceTrait,
    };
    use crate::transactions::{
        AmendmentUpdate, NewTransaction, PendingPromotion, Transaction,
        TransactionRepositoryTrait, TransactionStatus,
    };

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn timestamp() -> NaiveDateTime {
        date(2025, 1, 1).and_hms_opt(0, 0, 0).unwrap()
    }

    fn account(id: &str, first_synced: bool) -> Account {
        Account {
            id: id.to_string(),
            user_id: "user-1".to_string(),
            external_id: format!("ext-{}", id),
            name: "Everyday".to_string(),
            institution: "Test Bank".to_string(),
            currency: "AUD".to_string(),
            current_balance: dec!(1000),
            available_balance: None,
            first_synced_at: first_synced.then(timestamp),
            last_synced_at: first_synced.then(timestamp),
            last_refreshed_at: None,
            last_error: None,
            created_at: timestamp(),
            updated_at: timestamp(),
        }
    }

    fn settled(external_id: &str, description: &str, amount: Decimal) -> ProviderTransaction {
        ProviderTransaction {
            external_id: external_id.to_string(),
            date: Local::now().date_naive(),
            merchant: Some("Grocer".to_string()),
            description: description.to_string(),
            amount,
        }
    }

    // --- Mock aggregator client ---

    #[derive(Default)]
    struct MockClient {
        accounts: Mutex<Vec<ProviderAccount>>,
        transactions: Mutex<Vec<ProviderTransaction>>,
        pendings: Mutex<Vec<ProviderPendingTransaction>>,
        failing_accounts: Mutex<Vec<String>>,
        refreshed: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl AggregatorClientTrait for MockClient {
        async fn list_accounts(&self) -> Result<Vec<ProviderAccount>> {
            Ok(self.accounts.lock().unwrap().clone())
        }

        async fn list_transactions(
            &self,
            external_account_id: &str,
            _since: NaiveDate,
        ) -> Result<Vec<ProviderTransaction>> {
            if self
                .failing_accounts
                .lock()
                .unwrap()
                .contains(&external_account_id.to_string())
            {
                return Err(Error::Upstream("provider timeout".to_string()));
            }
            Ok(self.transactions.lock().unwrap().clone())
        }

        async fn list_pending_transactions(
            &self,
            _external_account_id: &str,
        ) -> Result<Vec<ProviderPendingTransaction>> {
            Ok(self.pendings.lock().unwrap().clone())
        }

        async fn trigger_refresh(&self, external_account_id: &str) -> Result<()> {
            self.refreshed
                .lock()
                .unwrap()
                .push(external_account_id.to_string());
            Ok(())
        }
    }

    // --- Mock account repository ---

    #[derive(Default)]
    struct MockAccountRepository {
        accounts: Mutex<Vec<Account>>,
        synced: Mutex<Vec<String>>,
        refreshed: Mutex<Vec<String>>,
        errors: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl AccountRepositoryTrait for MockAccountRepository {
        async fn upsert_by_external_id(&self, new_account: NewAccount) -> Result<Account> {
            let mut accounts = self.accounts.lock().unwrap();
            if let Some(existing) = accounts
                .iter_mut()
                .find(|a| a.external_id == new_account.external_id)
            {
                existing.current_balance = new_account.current_balance;
                return Ok(existing.clone());
            }
            let created = Account {
                id: format!("acc-{}", accounts.len() + 1),
                user_id: new_account.user_id,
                external_id: new_account.external_id,
                name: new_account.name,
                institution: new_account.institution,
                currency: new_account.currency,
                current_balance: new_account.current_balance,
                available_balance: new_account.available_balance,
                first_synced_at: None,
                last_synced_at: None,
                last_refreshed_at: None,
                last_error: None,
                created_at: timestamp(),
                updated_at: timestamp(),
            };
            accounts.push(created.clone());
            Ok(created)
        }

        async fn update_snapshot(&self, _snapshot: AccountSnapshot) -> Result<Account> {
            unimplemented!()
        }

        async fn mark_synced(&self, account_id: String) -> Result<()> {
            self.synced.lock().unwrap().push(account_id);
            Ok(())
        }

        async fn mark_refreshed(&self, account_id: String) -> Result<()> {
            self.refreshed.lock().unwrap().push(account_id);
            Ok(())
        }

        async fn record_error(&self, account_id: String, error: String) -> Result<()> {
            self.errors.lock().unwrap().push((account_id, error));
            Ok(())
        }

        async fn delete(&self, _account_id: String) -> Result<usize> {
            unimplemented!()
        }

        fn get_by_id(&self, account_id: &str) -> Result<Account> {
            self.accounts
                .lock()
                .unwrap()
                .iter()
                .find(|a| a.id == account_id)
                .cloned()
                .ok_or_else(|| Error::Database(DatabaseError::NotFound(account_id.to_string())))
        }

        fn list_for_user(&self, user_id: &str) -> Result<Vec<Account>> {
            Ok(self
                .accounts
                .lock()
                .unwrap()
                .iter()
                .filter(|a| a.user_id == user_id)
                .cloned()
                .collect())
        }
    }

    // --- Mock transaction repository ---

    #[derive(Default)]
    struct MockTransactionRepository {
        transactions: Mutex<Vec<Transaction>>,
        promoted: Mutex<Vec<PendingPromotion>>,
        amended: Mutex<Vec<AmendmentUpdate>>,
        next_id: AtomicUsize,
    }

    #[async_trait]
    impl TransactionRepositoryTrait for MockTransactionRepository {
        async fn create(&self, _new_transaction: NewTransaction) -> Result<Transaction> {
            unimplemented!()
        }

        async fn create_many(
            &self,
            new_transactions: Vec<NewTransaction>,
        ) -> Result<Vec<Transaction>> {
            let mut created = Vec::with_capacity(new_transactions.len());
            for new_transaction in new_transactions {
                let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
                let transaction = Transaction {
                    id: format!("tx-{}", id),
                    user_id: new_transaction.user_id,
                    account_id: new_transaction.account_id,
                    external_id: new_transaction.external_id,
                    date: new_transaction.date,
                    merchant: new_transaction.merchant,
                    description: new_transaction.description,
                    amount: new_transaction.amount,
                    status: new_transaction.status,
                    is_manual: new_transaction.is_manual,
                    is_amended: false,
                    scheduled_transaction_id: None,
                    created_at: timestamp(),
                    updated_at: timestamp(),
                };
                self.transactions.lock().unwrap().push(transaction.clone());
                created.push(transaction);
            }
            Ok(created)
        }

        async fn promote_pending(&self, promotion: PendingPromotion) -> Result<Transaction> {
            let mut transactions = self.transactions.lock().unwrap();
            let row = transactions
                .iter_mut()
                .find(|t| t.id == promotion.pending_id)
                .ok_or_else(|| {
                    Error::Database(DatabaseError::NotFound(promotion.pending_id.clone()))
                })?;
            row.external_id = Some(promotion.external_id.clone());
            row.amount = promotion.amount;
            row.status = TransactionStatus::Confirmed;
            let promoted = row.clone();
            self.promoted.lock().unwrap().push(promotion);
            Ok(promoted)
        }

        async fn apply_amendment(&self, amendment: AmendmentUpdate) -> Result<Transaction> {
            let mut transactions = self.transactions.lock().unwrap();
            let row = transactions
                .iter_mut()
                .find(|t| t.id == amendment.transaction_id)
                .ok_or_else(|| {
                    Error::Database(DatabaseError::NotFound(amendment.transaction_id.clone()))
                })?;
            row.amount = amendment.amount;
            row.is_amended = true;
            let amended = row.clone();
            self.amended.lock().unwrap().push(amendment);
            Ok(amended)
        }

        async fn delete(&self, _transaction_id: String) -> Result<usize> {
            unimplemented!()
        }

        async fn delete_many(&self, transaction_ids: Vec<String>) -> Result<usize> {
            let mut transactions = self.transactions.lock().unwrap();
            let before = transactions.len();
            transactions.retain(|t| !transaction_ids.contains(&t.id));
            Ok(before - transactions.len())
        }

        fn get_by_id(&self, _transaction_id: &str) -> Result<Transaction> {
            unimplemented!()
        }

        fn find_by_external_ids(
            &self,
            account_id: &str,
            external_ids: &[String],
        ) -> Result<Vec<Transaction>> {
            Ok(self
                .transactions
                .lock()
                .unwrap()
                .iter()
                .filter(|t| {
                    t.account_id.as_deref() == Some(account_id)
                        && t.external_id
                            .as_ref()
                            .is_some_and(|ext| external_ids.contains(ext))
                })
                .cloned()
                .collect())
        }

        fn list_pending_for_account(&self, account_id: &str) -> Result<Vec<Transaction>> {
            Ok(self
                .transactions
                .lock()
                .unwrap()
                .iter()
                .filter(|t| {
                    t.account_id.as_deref() == Some(account_id)
                        && t.status == TransactionStatus::Pending
                })
                .cloned()
                .collect())
        }

        fn list_for_account(
            &self,
            _account_id: &str,
            _from: Option<NaiveDate>,
            _to: Option<NaiveDate>,
        ) -> Result<Vec<Transaction>> {
            unimplemented!()
        }

        fn list_for_user(&self, _user_id: &str) -> Result<Vec<Transaction>> {
            unimplemented!()
        }
    }

    // --- Mock downstream services ---

    #[derive(Default)]
    struct MockScheduledService {
        match_everything: bool,
        attempted: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ScheduledServiceTrait for MockScheduledService {
        async fn create_scheduled(
            &self,
            _user_id: &str,
            _new_scheduled: NewScheduledTransaction,
        ) -> Result<ScheduledTransaction> {
            unimplemented!()
        }
        async fn update_scheduled(
            &self,
            _user_id: &str,
            _update: ScheduledTransactionUpdate,
        ) -> Result<ScheduledTransaction> {
            unimplemented!()
        }
        async fn set_enabled(
            &self,
            _user_id: &str,
            _scheduled_id: &str,
            _enabled: bool,
        ) -> Result<()> {
            unimplemented!()
        }
        async fn delete_scheduled(&self, _user_id: &str, _scheduled_id: &str) -> Result<()> {
            unimplemented!()
        }
        fn get_scheduled(&self, _user_id: &str, _scheduled_id: &str) -> Result<ScheduledTransaction> {
            unimplemented!()
        }
        fn list_scheduled(&self, _user_id: &str) -> Result<Vec<ScheduledTransaction>> {
            unimplemented!()
        }
        async fn auto_match_transaction(&self, transaction: &Transaction) -> Result<Option<String>> {
            self.attempted.lock().unwrap().push(transaction.id.clone());
            Ok(self.match_everything.then(|| "sched-1".to_string()))
        }
    }

    #[derive(Default)]
    struct MockRuleService {
        attempted: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl RuleServiceTrait for MockRuleService {
        async fn upsert_rule(
            &self,
            _user_id: &str,
            _new_rule: NewCategorizationRule,
        ) -> Result<CategorizationRule> {
            unimplemented!()
        }
        async fn delete_rule(&self, _user_id: &str, _rule_id: &str) -> Result<()> {
            unimplemented!()
        }
        fn list_rules(&self, _user_id: &str) -> Result<Vec<CategorizationRule>> {
            unimplemented!()
        }
        async fn categorize_transaction(&self, transaction: &Transaction) -> Result<Option<String>> {
            self.attempted.lock().unwrap().push(transaction.id.clone());
            Ok(None)
        }
    }

    struct Fixture {
        client: Arc<MockClient>,
        accounts: Arc<MockAccountRepository>,
        transactions: Arc<MockTransactionRepository>,
        scheduled: Arc<MockScheduledService>,
        rules: Arc<MockRuleService>,
        service: SyncService,
    }

    fn fixture_with(scheduled: MockScheduledService) -> Fixture {
        let client = Arc::new(MockClient::default());
        let accounts = Arc::new(MockAccountRepository::default());
        let transactions = Arc::new(MockTransactionRepository::default());
        let scheduled = Arc::new(scheduled);
        let rules = Arc::new(MockRuleService::default());
        let service = SyncService::new(
            client.clone(),
            accounts.clone(),
            transactions.clone(),
            scheduled.clone(),
            rules.clone(),
        );
        Fixture {
            client,
            accounts,
            transactions,
            scheduled,
            rules,
            service,
        }
    }

    fn fixture() -> Fixture {
        fixture_with(MockScheduledService::default())
    }

    #[tokio::test]
    async fn test_first_sync_creates_confirmed_rows_and_marks_synced() {
        let f = fixture();
        f.accounts
            .accounts
            .lock()
            .unwrap()
            .push(account("acc-1", false));
        f.client.transactions.lock().unwrap().extend([
            settled("ext-1", "GROCER CARD", dec!(-50)),
            settled("ext-2", "PAYROLL", dec!(2000)),
        ]);

        let result = f
            .service
            .sync_account("user-1", "acc-1", Some(14))
            .await
            .unwrap();

        assert_eq!(result.created, 2);
        assert_eq!(result.promoted, 0);
        assert_eq!(result.amended, 0);
        assert!(result.error.is_none());
        assert_eq!(f.accounts.synced.lock().unwrap().as_slice(), ["acc-1"]);
        let stored = f.transactions.transactions.lock().unwrap();
        assert!(stored.iter().all(|t| t.status == TransactionStatus::Confirmed));
        assert!(stored.iter().all(|t| !t.is_manual));
    }

    #[tokio::test]
    async fn test_resync_of_unchanged_rows_is_a_zero_delta() {
        let f = fixture();
        f.accounts
            .accounts
            .lock()
            .unwrap()
            .push(account("acc-1", false));
        f.client
            .transactions
            .lock()
            .unwrap()
            .push(settled("ext-1", "GROCER CARD", dec!(-50)));

        f.service
            .sync_account("user-1", "acc-1", None)
            .await
            .unwrap();
        let second = f
            .service
            .sync_account("user-1", "acc-1", None)
            .await
            .unwrap();

        assert_eq!(second.created, 0);
        assert_eq!(second.amended, 0);
        assert_eq!(second.unchanged, 1);
        assert_eq!(f.transactions.transactions.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_settlement_promotes_stored_pending_in_place() {
        let f = fixture();
        f.accounts
            .accounts
            .lock()
            .unwrap()
            .push(account("acc-1", true));
        // A stored pending from two days ago.
        f.transactions
            .create_many(vec![NewTransaction {
                id: None,
                user_id: "user-1".to_string(),
                account_id: Some("acc-1".to_string()),
                external_id: None,
                date: Local::now().date_naive() - Days::new(2),
                merchant: Some("Grocer".to_string()),
                description: "GROCER CARD".to_string(),
                amount: dec!(-50),
                status: TransactionStatus::Pending,
                is_manual: false,
            }])
            .await
            .unwrap();
        f.client
            .transactions
            .lock()
            .unwrap()
            .push(settled("ext-1", "GROCER CARD PURCHASE", dec!(-52)));

        let result = f
            .service
            .sync_account("user-1", "acc-1", None)
            .await
            .unwrap();

        assert_eq!(result.promoted, 1);
        assert_eq!(result.created, 0);
        let promoted = f.transactions.promoted.lock().unwrap();
        assert_eq!(promoted.len(), 1);
        assert_eq!(promoted[0].pending_id, "tx-1");
        assert_eq!(promoted[0].amount, dec!(-52));
        // Promoted rows never re-enter matching or categorization.
        assert!(f.scheduled.attempted.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_one_pending_settles_at_most_once_per_batch() {
        let f = fixture();
        f.accounts
            .accounts
            .lock()
            .unwrap()
            .push(account("acc-1", true));
        f.transactions
            .create_many(vec![NewTransaction {
                id: None,
                user_id: "user-1".to_string(),
                account_id: Some("acc-1".to_string()),
                external_id: None,
                date: Local::now().date_naive(),
                merchant: None,
                description: "COFFEE HOUSE".to_string(),
                amount: dec!(-8),
                status: TransactionStatus::Pending,
                is_manual: false,
            }])
            .await
            .unwrap();
        // Two settlements that both fuzzily match the single pending.
        f.client.transactions.lock().unwrap().extend([
            settled("ext-1", "COFFEE HOUSE", dec!(-8)),
            settled("ext-2", "COFFEE HOUSE", dec!(-8)),
        ]);

        let result = f
            .service
            .sync_account("user-1", "acc-1", None)
            .await
            .unwrap();

        assert_eq!(result.promoted, 1);
        assert_eq!(result.created, 1);
    }

    #[tokio::test]
    async fn test_amended_row_is_overwritten_and_flagged() {
        let f = fixture();
        f.accounts
            .accounts
            .lock()
            .unwrap()
            .push(account("acc-1", true));
        f.transactions
            .create_many(vec![NewTransaction {
                id: None,
                user_id: "user-1".to_string(),
                account_id: Some("acc-1".to_string()),
                external_id: Some("ext-1".to_string()),
                date: Local::now().date_naive(),
                merchant: Some("Grocer".to_string()),
                description: "GROCER CARD".to_string(),
                amount: dec!(-50),
                status: TransactionStatus::Confirmed,
                is_manual: false,
            }])
            .await
            .unwrap();
        f.client
            .transactions
            .lock()
            .unwrap()
            .push(settled("ext-1", "GROCER CARD", dec!(-55)));

        let result = f
            .service
            .sync_account("user-1", "acc-1", None)
            .await
            .unwrap();

        assert_eq!(result.amended, 1);
        let stored = f.transactions.transactions.lock().unwrap();
        assert_eq!(stored[0].amount, dec!(-55));
        assert!(stored[0].is_amended);
    }

    #[tokio::test]
    async fn test_new_rows_try_schedules_before_rules() {
        let f = fixture_with(MockScheduledService {
            match_everything: true,
            ..Default::default()
        });
        f.accounts
            .accounts
            .lock()
            .unwrap()
            .push(account("acc-1", true));
        f.client
            .transactions
            .lock()
            .unwrap()
            .push(settled("ext-1", "POWER CO", dec!(-120)));

        f.service
            .sync_account("user-1", "acc-1", None)
            .await
            .unwrap();

        assert_eq!(f.scheduled.attempted.lock().unwrap().len(), 1);
        // Schedule matched, so rules were never consulted.
        assert!(f.rules.attempted.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unmatched_rows_fall_through_to_rules() {
        let f = fixture();
        f.accounts
            .accounts
            .lock()
            .unwrap()
            .push(account("acc-1", true));
        f.client
            .transactions
            .lock()
            .unwrap()
            .push(settled("ext-1", "POWER CO", dec!(-120)));

        f.service
            .sync_account("user-1", "acc-1", None)
            .await
            .unwrap();

        assert_eq!(f.rules.attempted.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_failing_account_records_error_without_stopping_siblings() {
        let f = fixture();
        {
            let mut accounts = f.accounts.accounts.lock().unwrap();
            accounts.push(account("acc-1", true));
            accounts.push(account("acc-2", true));
        }
        f.client
            .failing_accounts
            .lock()
            .unwrap()
            .push("ext-acc-1".to_string());
        f.client
            .transactions
            .lock()
            .unwrap()
            .push(settled("ext-1", "GROCER CARD", dec!(-50)));

        let summary = f.service.sync_all("user-1", None).await.unwrap();

        assert_eq!(summary.results.len(), 2);
        assert_eq!(summary.failed_accounts(), 1);
        let failed = &summary.results[0];
        assert_eq!(failed.account_id, "acc-1");
        assert_eq!(failed.created, 0);
        assert!(failed.error.is_some());
        assert_eq!(summary.results[1].created, 1);
        // The failure landed on the account record.
        let errors = f.accounts.errors.lock().unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].0, "acc-1");
    }

    #[tokio::test]
    async fn test_sync_of_foreign_account_reports_not_found() {
        let f = fixture();
        let mut foreign = account("acc-1", true);
        foreign.user_id = "user-2".to_string();
        f.accounts.accounts.lock().unwrap().push(foreign);

        let result = f.service.sync_account("user-1", "acc-1", None).await;
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn test_link_accounts_upserts_by_external_id() {
        let f = fixture();
        f.client.accounts.lock().unwrap().push(ProviderAccount {
            external_id: "ext-abc".to_string(),
            name: "Everyday".to_string(),
            institution: "Test Bank".to_string(),
            currency: "AUD".to_string(),
            current_balance: dec!(1000),
            available_balance: Some(dec!(950)),
        });

        let first = f.service.link_accounts("user-1").await.unwrap();
        assert_eq!(first.len(), 1);

        // Linking again refreshes, never duplicates.
        f.client.accounts.lock().unwrap()[0].current_balance = dec!(1100);
        let second = f.service.link_accounts("user-1").await.unwrap();
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].id, first[0].id);
        assert_eq!(second[0].current_balance, dec!(1100));
        assert_eq!(f.accounts.accounts.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_pending_refresh_inserts_and_removes() {
        let f = fixture();
        f.accounts
            .accounts
            .lock()
            .unwrap()
            .push(account("acc-1", true));
        // One stored pending the provider still reports, one it dropped.
        f.transactions
            .create_many(vec![
                NewTransaction {
                    id: None,
                    user_id: "user-1".to_string(),
                    account_id: Some("acc-1".to_string()),
                    external_id: None,
                    date: date(2025, 1, 9),
                    merchant: None,
                    description: "COFFEE HOUSE".to_string(),
                    amount: dec!(-8),
                    status: TransactionStatus::Pending,
                    is_manual: false,
                },
                NewTransaction {
                    id: None,
                    user_id: "user-1".to_string(),
                    account_id: Some("acc-1".to_string()),
                    external_id: None,
                    date: date(2025, 1, 9),
                    merchant: None,
                    description: "FUEL STOP".to_string(),
                    amount: dec!(-60),
                    status: TransactionStatus::Pending,
                    is_manual: false,
                },
            ])
            .await
            .unwrap();
        f.client.pendings.lock().unwrap().extend([
            ProviderPendingTransaction {
                date: date(2025, 1, 9),
                merchant: None,
                description: "COFFEE HOUSE".to_string(),
                amount: dec!(-8),
            },
            ProviderPendingTransaction {
                date: date(2025, 1, 10),
                merchant: None,
                description: "BOOK SHOP".to_string(),
                amount: dec!(-30),
            },
        ]);

        let result = f.service.sync_pending("user-1", "acc-1").await.unwrap();

        assert_eq!(result.inserted, 1);
        assert_eq!(result.removed, 1);
        let stored = f.transactions.transactions.lock().unwrap();
        assert!(stored.iter().any(|t| t.description == "BOOK SHOP"));
        assert!(!stored.iter().any(|t| t.description == "FUEL STOP"));
    }

    #[tokio::test]
    async fn test_refresh_inside_cooldown_is_rate_limited() {
        let f = fixture();
        let mut recent = account("acc-1", true);
        recent.last_refreshed_at = Some(Utc::now().naive_utc() - chrono::Duration::seconds(600));
        f.accounts.accounts.lock().unwrap().push(recent);

        let result = f.service.refresh_account("user-1", "acc-1").await;
        match result {
            Err(Error::RateLimited { retry_after_secs }) => {
                assert!(retry_after_secs > 0 && retry_after_secs <= 3000);
            }
            other => panic!("expected RateLimited, got {:?}", other),
        }
        assert!(f.client.refreshed.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_refresh_after_cooldown_triggers_and_marks() {
        let f = fixture();
        let mut stale = account("acc-1", true);
        stale.last_refreshed_at = Some(Utc::now().naive_utc() - chrono::Duration::hours(2));
        f.accounts.accounts.lock().unwrap().push(stale);

        f.service.refresh_account("user-1", "acc-1").await.unwrap();

        assert_eq!(
            f.client.refreshed.lock().unwrap().as_slice(),
            ["ext-acc-1"]
        );
        assert_eq!(f.accounts.refreshed.lock().unwrap().as_slice(), ["acc-1"]);
    }
}
