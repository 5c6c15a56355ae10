//! Account domain models.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{errors::ValidationError, Error, Result};

/// Domain model representing a connected bank account.
///
/// Accounts are created on the first aggregator sync and updated on every
/// subsequent sync or refresh. Deleting an account cascades to all of its
/// transactions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: String,
    pub user_id: String,
    /// Stable key from the aggregator.
    pub external_id: String,
    pub name: String,
    pub institution: String,
    pub currency: String,
    pub current_balance: Decimal,
    pub available_balance: Option<Decimal>,
    /// Set once, on the first successful sync. Drives the initial-history
    /// window selection instead of counting stored rows.
    pub first_synced_at: Option<NaiveDateTime>,
    pub last_synced_at: Option<NaiveDateTime>,
    /// Last time a provider refresh was triggered for this account.
    pub last_refreshed_at: Option<NaiveDateTime>,
    /// Last connection error reported by the aggregator, if any.
    pub last_error: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Account {
    /// Whether this account has ever completed a sync.
    pub fn has_synced(&self) -> bool {
        self.first_synced_at.is_some()
    }
}

/// Input model for creating (or upserting) an account from aggregator data.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAccount {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub user_id: String,
    pub external_id: String,
    pub name: String,
    pub institution: String,
    pub currency: String,
    pub current_balance: Decimal,
    pub available_balance: Option<Decimal>,
}

impl NewAccount {
    /// Validates the new account data.
    pub fn validate(&self) -> Result<()> {
        if self.user_id.trim().is_empty() {
            return Err(Error::Validation(ValidationError::MissingField(
                "userId".to_string(),
            )));
        }
        if self.external_id.trim().is_empty() {
            return Err(Error::Validation(ValidationError::MissingField(
                "externalId".to_string(),
            )));
        }
        if self.name.trim().is_empty() {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Account name cannot be empty".to_string(),
            )));
        }
        Ok(())
    }
}

/// Balance snapshot applied to an account on each sync.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountSnapshot {
    pub account_id: String,
    pub current_balance: Decimal,
    pub available_balance: Option<Decimal>,
}
