//! Sync module - reconciliation between the bank aggregator and local
//! storage: pure classification plus the orchestrating service.

mod classify;
mod sync_model;
mod sync_service;
mod sync_traits;

mod sync_service_tests;

// Re-export the public interface
pub use classify::{
    classify_incoming, descriptions_related, find_pending_match, is_amendment, matches_pending,
    pending_equivalent, Classification,
};
pub use sync_model::{
    AccountSyncResult, PendingSyncResult, ProviderAccount, ProviderPendingTransaction,
    ProviderTransaction, SyncSummary,
};
pub use sync_service::SyncService;
pub use sync_traits::{AggregatorClientTrait, SyncServiceTrait};
