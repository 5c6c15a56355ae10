//! Auto-categorization rules - models, matcher, service.

mod rules_model;
mod rules_service;
mod rules_traits;


// Re-export the public interface
pub use rules_model::{find_matching_rule, CategorizationRule, NewCategorizationRule};
pub use rules_service::RuleService;
pub use rules_traits::{RuleRepositoryTrait, RuleServiceTrait};
