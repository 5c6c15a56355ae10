//! Transactions module - domain models, services, and traits.

mod transactions_model;
mod transactions_service;
mod transactions_traits;


// Re-export the public interface
pub use transactions_model::{
    AmendmentUpdate, NewTransaction, PendingPromotion, Transaction, TransactionStatus,
};
pub use transactions_service::TransactionService;
pub use transactions_traits::{TransactionRepositoryTrait, TransactionServiceTrait};
