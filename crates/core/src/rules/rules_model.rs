//! Categorization rule domain models and the pure matcher.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::{errors::ValidationError, Error, Result};

/// A (user, merchant-substring pattern) -> bucket mapping.
///
/// Patterns are lowercased at creation and unique per user; creating a rule
/// for an existing pattern overwrites its bucket instead of duplicating.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorizationRule {
    pub id: String,
    pub user_id: String,
    pub pattern: String,
    pub bucket_id: String,
    pub created_at: NaiveDateTime,
}

impl CategorizationRule {
    /// Case-insensitive substring test against a merchant name.
    pub fn matches(&self, merchant: &str) -> bool {
        merchant.to_lowercase().contains(&self.pattern)
    }
}

/// Input model for creating (upserting) a rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCategorizationRule {
    pub user_id: String,
    pub pattern: String,
    pub bucket_id: String,
}

impl NewCategorizationRule {
    pub fn validate(&self) -> Result<()> {
        if self.pattern.trim().is_empty() {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Rule pattern cannot be empty".to_string(),
            )));
        }
        Ok(())
    }

    /// The pattern as stored: trimmed and lowercased.
    pub fn normalized_pattern(&self) -> String {
        self.pattern.trim().to_lowercase()
    }
}

/// First rule in stored order whose pattern the merchant contains.
///
/// Stored order is first-registered first, so when several distinct
/// patterns match the same merchant the oldest rule wins.
pub fn find_matching_rule<'a>(
    merchant: &str,
    rules: &'a [CategorizationRule],
) -> Option<&'a CategorizationRule> {
    rules.iter().find(|rule| rule.matches(merchant))
}
