//! SQLite storage implementation for scheduled transactions.

mod model;
mod repository;

pub use model::ScheduledTransactionDB;
pub use repository::ScheduledRepository;
