//! Ledger module - transaction allocations, budget allocations, and the
//! derived available-to-budget pool.

mod ledger_model;
mod ledger_service;
mod ledger_traits;


// Re-export the public interface
pub use ledger_model::{
    Allocation, AllocationInput, BucketBalance, BudgetAllocation, BudgetAllocationUpdate,
    NewAllocation, NewBudgetAllocation,
};
pub use ledger_service::LedgerService;
pub use ledger_traits::{LedgerRepositoryTrait, LedgerServiceTrait};
