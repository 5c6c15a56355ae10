//! Scheduled transaction repository and service traits.

use async_trait::async_trait;
use chrono::NaiveDate;

use super::scheduled_model::{
    NewScheduledTransaction, ScheduledTransaction, ScheduledTransactionUpdate,
};
use crate::ledger::NewAllocation;
use crate::errors::Result;
use crate::transactions::Transaction;

/// Trait defining the contract for scheduled transaction persistence.
#[async_trait]
pub trait ScheduledRepositoryTrait: Send + Sync {
    /// Creates a schedule with its seeded `next_due`.
    async fn create(
        &self,
        new_scheduled: NewScheduledTransaction,
        next_due: NaiveDate,
    ) -> Result<ScheduledTransaction>;

    /// Updates a schedule, replacing `next_due` with the recomputed value.
    async fn update(
        &self,
        update: ScheduledTransactionUpdate,
        next_due: NaiveDate,
    ) -> Result<ScheduledTransaction>;

    /// Flips the enabled flag.
    async fn set_enabled(&self, scheduled_id: String, enabled: bool) -> Result<()>;

    /// Deletes a schedule. Matched transactions keep their allocations but
    /// lose the link.
    async fn delete(&self, scheduled_id: String) -> Result<usize>;

    /// Retrieves a schedule by its ID.
    fn get_by_id(&self, scheduled_id: &str) -> Result<ScheduledTransaction>;

    /// Lists all of a user's schedules.
    fn list_for_user(&self, user_id: &str) -> Result<Vec<ScheduledTransaction>>;

    /// Lists the user's enabled schedules in ascending (`next_due`, `id`)
    /// order - the deterministic candidate order for auto-matching.
    fn list_enabled_for_user(&self, user_id: &str) -> Result<Vec<ScheduledTransaction>>;

    /// Records a successful match atomically: creates the allocation,
    /// advances the schedule's `next_due`, and links the transaction to
    /// the schedule. Either all three apply or none do.
    async fn record_match(
        &self,
        transaction_id: String,
        scheduled_id: String,
        new_next_due: NaiveDate,
        allocation: NewAllocation,
    ) -> Result<()>;
}

/// Trait defining the contract for scheduled transaction service operations.
#[async_trait]
pub trait ScheduledServiceTrait: Send + Sync {
    async fn create_scheduled(
        &self,
        user_id: &str,
        new_scheduled: NewScheduledTransaction,
    ) -> Result<ScheduledTransaction>;

    /// Updates a schedule, recomputing `next_due` whenever the start date,
    /// frequency, or interval changed.
    async fn update_scheduled(
        &self,
        user_id: &str,
        update: ScheduledTransactionUpdate,
    ) -> Result<ScheduledTransaction>;

    async fn set_enabled(&self, user_id: &str, scheduled_id: &str, enabled: bool) -> Result<()>;

    async fn delete_scheduled(&self, user_id: &str, scheduled_id: &str) -> Result<()>;

    fn get_scheduled(&self, user_id: &str, scheduled_id: &str) -> Result<ScheduledTransaction>;

    fn list_scheduled(&self, user_id: &str) -> Result<Vec<ScheduledTransaction>>;

    /// Attempts to match a freshly synced transaction against the user's
    /// enabled schedules. On a match the transaction is fully allocated to
    /// the schedule's bucket, the schedule advances one step, and the link
    /// is recorded; the matched schedule's id is returned. No match means
    /// no side effects.
    async fn auto_match_transaction(&self, transaction: &Transaction) -> Result<Option<String>>;
}
