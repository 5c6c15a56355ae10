//! SQLite storage implementation for categorization rules.

mod model;
mod repository;

pub use model::CategorizationRuleDB;
pub use repository::RuleRepository;
