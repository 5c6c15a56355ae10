//! Kitty Core - Domain entities, services, and traits.
//!
//! This crate contains the core business logic for Kitty, an
//! envelope-budgeting system over synced bank transactions.
//! It is database-agnostic and defines traits that are implemented
//! by the `storage-sqlite` crate; the bank aggregator is consumed
//! through a trait implemented by the `connect` crate.

pub mod accounts;
pub mod buckets;
pub mod budget;
pub mod constants;
pub mod errors;
pub mod ledger;
pub mod rules;
pub mod scheduled;
pub mod settings;
pub mod sync;
pub mod transactions;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
