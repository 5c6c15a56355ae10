//! Scheduled transactions - recurrence math, fuzzy matching, and CRUD.

mod recurrence;
mod scheduled_model;
mod scheduled_service;
mod scheduled_traits;

mod recurrence_tests;
mod scheduled_service_tests;

// Re-export the public interface
pub use recurrence::{advance_to_next_due, calculate_next_due, matches_scheduled};
pub use scheduled_model::{
    Frequency, NewScheduledTransaction, ScheduleMatch, ScheduledTransaction,
    ScheduledTransactionUpdate,
};
pub use scheduled_service::ScheduledService;
pub use scheduled_traits::{ScheduledRepositoryTrait, ScheduledServiceTrait};
