//! Scheduled transaction domain models.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{errors::ValidationError, Error, Result};

/// Recurrence frequency of a scheduled transaction.
///
/// For `Custom` the interval is a plain day count; for every other
/// frequency it is a multiplier of the base unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Frequency {
    Weekly,
    Fortnightly,
    Monthly,
    Yearly,
    Custom,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Weekly => "WEEKLY",
            Frequency::Fortnightly => "FORTNIGHTLY",
            Frequency::Monthly => "MONTHLY",
            Frequency::Yearly => "YEARLY",
            Frequency::Custom => "CUSTOM",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "WEEKLY" => Frequency::Weekly,
            "FORTNIGHTLY" => Frequency::Fortnightly,
            "YEARLY" => Frequency::Yearly,
            "CUSTOM" => Frequency::Custom,
            _ => Frequency::Monthly,
        }
    }
}

/// Domain model representing a recurring expected transaction.
///
/// `next_due` is seeded to the first occurrence on or after "now" and only
/// ever advances forward, one recurrence step per matched transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledTransaction {
    pub id: String,
    pub user_id: String,
    pub bucket_id: String,
    pub name: String,
    pub amount: Decimal,
    pub frequency: Frequency,
    pub interval: u32,
    pub start_date: NaiveDate,
    pub next_due: NaiveDate,
    pub is_enabled: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Input model for creating a scheduled transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewScheduledTransaction {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub user_id: String,
    pub bucket_id: String,
    pub name: String,
    pub amount: Decimal,
    pub frequency: Frequency,
    pub interval: u32,
    pub start_date: NaiveDate,
    pub is_enabled: bool,
}

impl NewScheduledTransaction {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Schedule name cannot be empty".to_string(),
            )));
        }
        if self.amount == Decimal::ZERO {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Schedule amount cannot be zero".to_string(),
            )));
        }
        if self.interval == 0 {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Schedule interval must be at least 1".to_string(),
            )));
        }
        Ok(())
    }
}

/// Input model for updating a scheduled transaction.
///
/// Changing the start date, frequency, or interval recomputes `next_due`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledTransactionUpdate {
    pub id: String,
    pub bucket_id: String,
    pub name: String,
    pub amount: Decimal,
    pub frequency: Frequency,
    pub interval: u32,
    pub start_date: NaiveDate,
    pub is_enabled: bool,
}

impl ScheduledTransactionUpdate {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Schedule name cannot be empty".to_string(),
            )));
        }
        if self.interval == 0 {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Schedule interval must be at least 1".to_string(),
            )));
        }
        Ok(())
    }
}

/// Outcome of evaluating one transaction against one schedule.
///
/// Both diffs are populated whether or not the pair matched, so callers
/// can tie-break across candidates.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleMatch {
    pub matches: bool,
    pub amount_diff: Decimal,
    pub days_diff: i64,
}
