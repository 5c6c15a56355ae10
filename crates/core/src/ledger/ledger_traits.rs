//! Ledger repository and service traits.

use async_trait::async_trait;
use rust_decimal::Decimal;

use super::ledger_model::{
    Allocation, AllocationInput, BucketBalance, BudgetAllocation, BudgetAllocationUpdate,
    NewAllocation, NewBudgetAllocation,
};
use crate::errors::Result;

/// Trait defining the contract for allocation and budget allocation
/// persistence.
#[async_trait]
pub trait LedgerRepositoryTrait: Send + Sync {
    /// Lists the allocation rows of a single transaction.
    fn list_allocations_for_transaction(&self, transaction_id: &str) -> Result<Vec<Allocation>>;

    /// Lists every allocation row belonging to a user's transactions.
    fn list_allocations_for_user(&self, user_id: &str) -> Result<Vec<Allocation>>;

    /// Replaces a transaction's allocation rows with a new set, atomically.
    /// Passing an empty set clears the transaction's allocations.
    async fn replace_allocations(
        &self,
        transaction_id: String,
        allocations: Vec<NewAllocation>,
    ) -> Result<Vec<Allocation>>;

    /// Drops every allocation row of a transaction.
    async fn clear_allocations(&self, transaction_id: String) -> Result<usize>;

    /// Retrieves a budget allocation by its ID.
    fn get_budget_allocation(&self, allocation_id: &str) -> Result<BudgetAllocation>;

    /// Lists a user's budget allocations, newest first.
    fn list_budget_allocations_for_user(&self, user_id: &str) -> Result<Vec<BudgetAllocation>>;

    /// Inserts a budget allocation. The available-to-budget pool is
    /// recomputed inside the same write transaction and the insert fails
    /// when it would push the pool negative.
    async fn create_budget_allocation(
        &self,
        new_allocation: NewBudgetAllocation,
    ) -> Result<BudgetAllocation>;

    /// Inserts a batch of budget allocations as one all-or-nothing job.
    /// The funds check covers the batch total, so a batch either lands
    /// whole or the pool is untouched.
    async fn create_budget_allocations(
        &self,
        user_id: String,
        new_allocations: Vec<NewBudgetAllocation>,
    ) -> Result<Vec<BudgetAllocation>>;

    /// Updates a budget allocation's amount and note. An amount increase
    /// runs the same funds check as an insert.
    async fn update_budget_allocation(
        &self,
        update: BudgetAllocationUpdate,
    ) -> Result<BudgetAllocation>;

    /// Deletes a budget allocation, returning its amount to the pool.
    async fn delete_budget_allocation(&self, allocation_id: String) -> Result<usize>;
}

/// Trait defining the ledger service contract.
#[async_trait]
pub trait LedgerServiceTrait: Send + Sync {
    /// Derives the user's available-to-budget pool: inflows minus the sum
    /// of budget allocations. Never stored, recomputed on every read.
    fn available_to_budget(&self, user_id: &str) -> Result<Decimal>;

    /// Derives the balance of every non-archived bucket.
    fn bucket_balances(&self, user_id: &str) -> Result<Vec<BucketBalance>>;

    /// Sums the upcoming scheduled outflows per bucket for the current
    /// budget period.
    fn reserved_by_bucket(&self, user_id: &str) -> Result<Vec<BucketBalance>>;

    /// Lists the allocation rows of an owned transaction.
    fn list_allocations(&self, user_id: &str, transaction_id: &str) -> Result<Vec<Allocation>>;

    /// Replaces a transaction's allocation split. The entries must sum to
    /// the transaction amount within tolerance.
    async fn allocate_transaction(
        &self,
        user_id: &str,
        transaction_id: &str,
        inputs: Vec<AllocationInput>,
    ) -> Result<Vec<Allocation>>;

    /// Clears a transaction's allocations, returning it to unallocated.
    async fn unallocate_transaction(&self, user_id: &str, transaction_id: &str) -> Result<()>;

    /// Lists a user's budget allocations.
    fn list_budget_allocations(&self, user_id: &str) -> Result<Vec<BudgetAllocation>>;

    /// Feeds a bucket from the available-to-budget pool.
    async fn create_budget_allocation(
        &self,
        user_id: &str,
        new_allocation: NewBudgetAllocation,
    ) -> Result<BudgetAllocation>;

    /// Edits a feed entry's amount or note.
    async fn update_budget_allocation(
        &self,
        user_id: &str,
        update: BudgetAllocationUpdate,
    ) -> Result<BudgetAllocation>;

    /// Removes a feed entry, returning its amount to the pool.
    async fn delete_budget_allocation(&self, user_id: &str, allocation_id: &str) -> Result<()>;

    /// Feeds every active bucket its configured auto-allocate amount in
    /// one all-or-nothing batch. Returns the created entries.
    async fn feed_all(&self, user_id: &str) -> Result<Vec<BudgetAllocation>>;
}
