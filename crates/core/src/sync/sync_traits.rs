//! Aggregator client and sync service traits.

use async_trait::async_trait;
use chrono::NaiveDate;

use super::sync_model::{
    AccountSyncResult, PendingSyncResult, ProviderAccount, ProviderPendingTransaction,
    ProviderTransaction, SyncSummary,
};
use crate::accounts::Account;
use crate::errors::Result;

/// Trait over the bank aggregator, implemented by the connect crate.
#[async_trait]
pub trait AggregatorClientTrait: Send + Sync {
    /// Lists every account the linked credentials can see, with current
    /// balances.
    async fn list_accounts(&self) -> Result<Vec<ProviderAccount>>;

    /// Lists settled transactions for one account from `since` onward.
    async fn list_transactions(
        &self,
        external_account_id: &str,
        since: NaiveDate,
    ) -> Result<Vec<ProviderTransaction>>;

    /// Lists the account's currently pending transactions.
    async fn list_pending_transactions(
        &self,
        external_account_id: &str,
    ) -> Result<Vec<ProviderPendingTransaction>>;

    /// Asks the aggregator to pull fresh data from the institution.
    async fn trigger_refresh(&self, external_account_id: &str) -> Result<()>;
}

/// Trait defining the sync orchestration contract.
#[async_trait]
pub trait SyncServiceTrait: Send + Sync {
    /// Pulls the aggregator's account list and upserts each account by
    /// external id, refreshing balances on existing ones.
    async fn link_accounts(&self, user_id: &str) -> Result<Vec<Account>>;

    /// Syncs one account's settled transactions. `initial_days` bounds the
    /// history depth of a first sync and is ignored afterwards. A provider
    /// failure is recorded on the account and reported in the result, not
    /// returned as an error.
    async fn sync_account(
        &self,
        user_id: &str,
        account_id: &str,
        initial_days: Option<u32>,
    ) -> Result<AccountSyncResult>;

    /// Syncs every account of the user. One account failing never stops
    /// the others.
    async fn sync_all(&self, user_id: &str, initial_days: Option<u32>) -> Result<SyncSummary>;

    /// Reconciles the account's stored pendings against the provider's
    /// current pending list.
    async fn sync_pending(&self, user_id: &str, account_id: &str) -> Result<PendingSyncResult>;

    /// Triggers a provider-side refresh, subject to a one-hour per-account
    /// cooldown. Reading stored history is never rate limited.
    async fn refresh_account(&self, user_id: &str, account_id: &str) -> Result<()>;
}
