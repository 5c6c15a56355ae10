//! SQLite storage implementation for the allocation ledgers.

mod model;
mod repository;

pub use model::{AllocationDB, BudgetAllocationDB};
pub use repository::LedgerRepository;
