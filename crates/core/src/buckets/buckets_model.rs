//! Bucket and bucket-group domain models.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{errors::ValidationError, Error, Result};

/// The two envelope flavors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BucketKind {
    #[default]
    Spending,
    Savings,
}

impl BucketKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BucketKind::Spending => "SPENDING",
            BucketKind::Savings => "SAVINGS",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "SAVINGS" => BucketKind::Savings,
            _ => BucketKind::Spending,
        }
    }
}

/// Domain model representing an envelope.
///
/// A bucket's balance is never stored; it is always derived from the
/// allocation ledgers (see the ledger service).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bucket {
    pub id: String,
    pub group_id: String,
    pub name: String,
    pub kind: BucketKind,
    pub color: String,
    /// Suggested recurring feed amount, used by the "feed all" batch.
    pub auto_allocate_amount: Option<Decimal>,
    pub rollover: bool,
    /// Where the balance goes at cycle end when rollover is off.
    pub rollover_target_id: Option<String>,
    pub sort_order: i32,
    /// Soft-delete flag; archived buckets keep their allocation history.
    pub is_archived: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Input model for creating a bucket.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBucket {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub group_id: String,
    pub name: String,
    pub kind: BucketKind,
    pub color: String,
    pub auto_allocate_amount: Option<Decimal>,
    pub rollover: bool,
    pub rollover_target_id: Option<String>,
    pub sort_order: i32,
}

impl NewBucket {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Bucket name cannot be empty".to_string(),
            )));
        }
        if let Some(amount) = self.auto_allocate_amount {
            if amount < Decimal::ZERO {
                return Err(Error::Validation(ValidationError::InvalidInput(
                    "Auto-allocation amount cannot be negative".to_string(),
                )));
            }
        }
        Ok(())
    }
}

/// Input model for updating a bucket.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketUpdate {
    pub id: String,
    pub name: String,
    pub kind: BucketKind,
    pub color: String,
    pub auto_allocate_amount: Option<Decimal>,
    pub rollover: bool,
    pub rollover_target_id: Option<String>,
    pub sort_order: i32,
}

impl BucketUpdate {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Bucket name cannot be empty".to_string(),
            )));
        }
        Ok(())
    }
}

/// A named, ordered collection of buckets ("clowder").
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketGroup {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub sort_order: i32,
    pub created_at: NaiveDateTime,
}

/// Input model for creating a bucket group.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBucketGroup {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub user_id: String,
    pub name: String,
    pub sort_order: i32,
}

impl NewBucketGroup {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Group name cannot be empty".to_string(),
            )));
        }
        Ok(())
    }
}

/// Amount a bucket carries into the next cycle.
///
/// Spending and savings buckets currently behave identically (the full
/// balance rolls over, including debt), but the two cases stay distinct
/// here as the policy seam for future divergence.
pub fn rollover_amount(balance: Decimal, rollover_enabled: bool, kind: BucketKind) -> Decimal {
    if !rollover_enabled {
        return Decimal::ZERO;
    }
    match kind {
        BucketKind::Savings => balance,
        BucketKind::Spending => balance,
    }
}
