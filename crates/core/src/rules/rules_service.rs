use log::debug;
use std::sync::Arc;

use super::rules_model::{find_matching_rule, CategorizationRule, NewCategorizationRule};
use super::rules_traits::{RuleRepositoryTrait, RuleServiceTrait};
use crate::buckets::BucketServiceTrait;
use crate::errors::{DatabaseError, Error, Result};
use crate::ledger::{LedgerRepositoryTrait, NewAllocation};
use crate::transactions::Transaction;

/// Service for categorization rules and rule-based auto-allocation.
pub struct RuleService {
    repository: Arc<dyn RuleRepositoryTrait>,
    ledger_repository: Arc<dyn LedgerRepositoryTrait>,
    bucket_service: Arc<dyn BucketServiceTrait>,
}

impl RuleService {
    pub fn new(
        repository: Arc<dyn RuleRepositoryTrait>,
        ledger_repository: Arc<dyn LedgerRepositoryTrait>,
        bucket_service: Arc<dyn BucketServiceTrait>,
    ) -> Self {
        Self {
            repository,
            ledger_repository,
            bucket_service,
        }
    }
}

#[async_trait::async_trait]
impl RuleServiceTrait for RuleService {
    async fn upsert_rule(
        &self,
        user_id: &str,
        new_rule: NewCategorizationRule,
    ) -> Result<CategorizationRule> {
        new_rule.validate()?;
        self.bucket_service.get_bucket(user_id, &new_rule.bucket_id)?;
        self.repository
            .upsert(NewCategorizationRule {
                user_id: user_id.to_string(),
                pattern: new_rule.normalized_pattern(),
                bucket_id: new_rule.bucket_id,
            })
            .await
    }

    async fn delete_rule(&self, user_id: &str, rule_id: &str) -> Result<()> {
        let rule = match self.repository.get_by_id(rule_id) {
            Ok(rule) => rule,
            Err(Error::Database(DatabaseError::NotFound(_))) => {
                return Err(Error::NotFound(format!("Rule {}", rule_id)))
            }
            Err(e) => return Err(e),
        };
        if rule.user_id != user_id {
            return Err(Error::NotFound(format!("Rule {}", rule_id)));
        }
        self.repository.delete(rule.id).await?;
        Ok(())
    }

    fn list_rules(&self, user_id: &str) -> Result<Vec<CategorizationRule>> {
        self.repository.list_for_user(user_id)
    }

    async fn categorize_transaction(&self, transaction: &Transaction) -> Result<Option<String>> {
        let Some(ref merchant) = transaction.merchant else {
            return Ok(None);
        };

        // Rules only apply to transactions holding zero allocations.
        let existing = self
            .ledger_repository
            .list_allocations_for_transaction(&transaction.id)?;
        if !existing.is_empty() {
            return Ok(None);
        }

        let rules = self.repository.list_for_user(&transaction.user_id)?;
        let Some(rule) = find_matching_rule(merchant, &rules) else {
            return Ok(None);
        };

        debug!(
            "Transaction {} matched rule '{}' -> bucket {}",
            transaction.id, rule.pattern, rule.bucket_id
        );
        self.ledger_repository
            .replace_allocations(
                transaction.id.clone(),
                vec![NewAllocation {
                    id: None,
                    transaction_id: transaction.id.clone(),
                    bucket_id: rule.bucket_id.clone(),
                    amount: transaction.amount,
                }],
            )
            .await?;
        Ok(Some(rule.id.clone()))
    }
}
