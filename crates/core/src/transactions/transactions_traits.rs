//! Transaction repository and service traits.

use async_trait::async_trait;
use chrono::NaiveDate;

use super::transactions_model::{AmendmentUpdate, NewTransaction, PendingPromotion, Transaction};
use crate::errors::Result;

/// Trait defining the contract for Transaction repository operations.
#[async_trait]
pub trait TransactionRepositoryTrait: Send + Sync {
    /// Creates a single transaction.
    async fn create(&self, new_transaction: NewTransaction) -> Result<Transaction>;

    /// Creates a batch of transactions atomically.
    async fn create_many(&self, new_transactions: Vec<NewTransaction>) -> Result<Vec<Transaction>>;

    /// Promotes a stored pending transaction to confirmed, atomically with
    /// its allocation fix-up: a single allocation is corrected to the
    /// settled amount (flagging the transaction amended when it moved by
    /// more than the tolerance); a split is wiped back to unallocated.
    async fn promote_pending(&self, promotion: PendingPromotion) -> Result<Transaction>;

    /// Applies an amendment to a settled transaction, atomically deleting
    /// all of its allocations when it holds more than one.
    async fn apply_amendment(&self, amendment: AmendmentUpdate) -> Result<Transaction>;

    /// Deletes a transaction (allocations cascade).
    async fn delete(&self, transaction_id: String) -> Result<usize>;

    /// Deletes a batch of transactions atomically.
    async fn delete_many(&self, transaction_ids: Vec<String>) -> Result<usize>;

    /// Retrieves a transaction by its ID.
    fn get_by_id(&self, transaction_id: &str) -> Result<Transaction>;

    /// Batch-loads stored transactions for an account by external id.
    fn find_by_external_ids(
        &self,
        account_id: &str,
        external_ids: &[String],
    ) -> Result<Vec<Transaction>>;

    /// Lists the stored pending transactions for an account.
    fn list_pending_for_account(&self, account_id: &str) -> Result<Vec<Transaction>>;

    /// Lists an account's transactions, optionally bounded by date.
    fn list_for_account(
        &self,
        account_id: &str,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<Transaction>>;

    /// Lists every transaction reachable by a user: bank transactions via
    /// the account chain plus standalone manual entries.
    fn list_for_user(&self, user_id: &str) -> Result<Vec<Transaction>>;
}

/// Trait defining the contract for Transaction service operations.
#[async_trait]
pub trait TransactionServiceTrait: Send + Sync {
    /// Creates a manual transaction for the user.
    async fn create_manual(&self, new_transaction: NewTransaction) -> Result<Transaction>;

    /// Retrieves a transaction, verifying the ownership chain.
    fn get_transaction(&self, user_id: &str, transaction_id: &str) -> Result<Transaction>;

    /// Lists an account's transactions, verifying the account's owner.
    fn list_account_transactions(
        &self,
        user_id: &str,
        account_id: &str,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<Transaction>>;

    /// Lists every transaction reachable by the user.
    fn list_transactions(&self, user_id: &str) -> Result<Vec<Transaction>>;

    /// Deletes a manual transaction.
    async fn delete_manual(&self, user_id: &str, transaction_id: &str) -> Result<()>;
}
