//! Account repository and service traits.
//!
//! These traits define the contract for account operations without any
//! database-specific types, allowing for different storage implementations.

use async_trait::async_trait;

use super::accounts_model::{Account, AccountSnapshot, NewAccount};
use crate::errors::Result;

/// Trait defining the contract for Account repository operations.
#[async_trait]
pub trait AccountRepositoryTrait: Send + Sync {
    /// Creates the account if no row exists for (user, external id),
    /// otherwise updates the stored name, institution and balances.
    async fn upsert_by_external_id(&self, new_account: NewAccount) -> Result<Account>;

    /// Applies a balance snapshot from a sync.
    async fn update_snapshot(&self, snapshot: AccountSnapshot) -> Result<Account>;

    /// Records a successful sync. Sets `first_synced_at` when unset,
    /// bumps `last_synced_at` and clears `last_error`.
    async fn mark_synced(&self, account_id: String) -> Result<()>;

    /// Records a provider refresh trigger time.
    async fn mark_refreshed(&self, account_id: String) -> Result<()>;

    /// Records a connection error without touching the sync timestamps.
    async fn record_error(&self, account_id: String, error: String) -> Result<()>;

    /// Deletes an account by its ID, cascading to its transactions.
    ///
    /// Returns the number of deleted account records.
    async fn delete(&self, account_id: String) -> Result<usize>;

    /// Retrieves an account by its ID.
    fn get_by_id(&self, account_id: &str) -> Result<Account>;

    /// Lists all accounts belonging to a user.
    fn list_for_user(&self, user_id: &str) -> Result<Vec<Account>>;
}

/// Trait defining the contract for Account service operations.
///
/// The service layer enforces the ownership chain: every lookup resolves
/// the account to the calling user, and a mismatch surfaces as `NotFound`.
#[async_trait]
pub trait AccountServiceTrait: Send + Sync {
    /// Retrieves an account, verifying it belongs to the user.
    fn get_account(&self, user_id: &str, account_id: &str) -> Result<Account>;

    /// Lists all of the user's accounts.
    fn list_accounts(&self, user_id: &str) -> Result<Vec<Account>>;

    /// Deletes an account and all of its transactions.
    async fn delete_account(&self, user_id: &str, account_id: &str) -> Result<()>;
}
