//! Categorization rule repository and service traits.

use async_trait::async_trait;

use super::rules_model::{CategorizationRule, NewCategorizationRule};
use crate::errors::Result;
use crate::transactions::Transaction;

/// Trait defining the contract for rule persistence.
#[async_trait]
pub trait RuleRepositoryTrait: Send + Sync {
    /// Creates the rule, or overwrites the bucket mapping when the user
    /// already has a rule for the same normalized pattern.
    async fn upsert(&self, new_rule: NewCategorizationRule) -> Result<CategorizationRule>;

    /// Deletes a rule by its ID.
    async fn delete(&self, rule_id: String) -> Result<usize>;

    /// Retrieves a rule by its ID.
    fn get_by_id(&self, rule_id: &str) -> Result<CategorizationRule>;

    /// Lists a user's rules in match-priority order (first registered
    /// first).
    fn list_for_user(&self, user_id: &str) -> Result<Vec<CategorizationRule>>;
}

/// Trait defining the contract for rule service operations.
#[async_trait]
pub trait RuleServiceTrait: Send + Sync {
    /// Validates and upserts a rule for the user.
    async fn upsert_rule(
        &self,
        user_id: &str,
        new_rule: NewCategorizationRule,
    ) -> Result<CategorizationRule>;

    async fn delete_rule(&self, user_id: &str, rule_id: &str) -> Result<()>;

    fn list_rules(&self, user_id: &str) -> Result<Vec<CategorizationRule>>;

    /// Attempts to categorize an unallocated transaction. On a rule match
    /// the transaction's full amount is allocated to the rule's bucket and
    /// the rule's id returned; otherwise nothing happens.
    async fn categorize_transaction(&self, transaction: &Transaction) -> Result<Option<String>>;
}
