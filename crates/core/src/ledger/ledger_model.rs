//! Ledger domain models.
//!
//! Two append-style ledgers drive every derived balance:
//! - `Allocation` rows assign (part of) a transaction's amount to a bucket;
//! - `BudgetAllocation` rows move funds from the available-to-budget pool
//!   into a bucket, independent of any transaction.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{errors::ValidationError, Error, Result};

/// Ledger row linking a transaction to a bucket for a signed amount.
///
/// The rows for one transaction always sum to that transaction's amount
/// (within a 0.01 tolerance, enforced at write time).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Allocation {
    pub id: String,
    pub transaction_id: String,
    pub bucket_id: String,
    pub amount: Decimal,
    pub created_at: NaiveDateTime,
}

/// Input model for creating an allocation row.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAllocation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub transaction_id: String,
    pub bucket_id: String,
    pub amount: Decimal,
}

/// One (bucket, amount) entry of a caller-requested allocation split.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationInput {
    pub bucket_id: String,
    pub amount: Decimal,
}

/// Ledger row feeding a bucket from the available-to-budget pool.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetAllocation {
    pub id: String,
    pub user_id: String,
    pub bucket_id: String,
    /// Always positive; deleting the row returns the funds to the pool.
    pub amount: Decimal,
    pub note: Option<String>,
    pub created_at: NaiveDateTime,
}

/// Input model for feeding a bucket.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBudgetAllocation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub user_id: String,
    pub bucket_id: String,
    pub amount: Decimal,
    pub note: Option<String>,
}

impl NewBudgetAllocation {
    pub fn validate(&self) -> Result<()> {
        if self.amount <= Decimal::ZERO {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Budget allocation amount must be positive".to_string(),
            )));
        }
        Ok(())
    }
}

/// Input model for editing a feed entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetAllocationUpdate {
    pub id: String,
    pub amount: Decimal,
    pub note: Option<String>,
}

impl BudgetAllocationUpdate {
    pub fn validate(&self) -> Result<()> {
        if self.amount <= Decimal::ZERO {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Budget allocation amount must be positive".to_string(),
            )));
        }
        Ok(())
    }
}

/// A bucket id paired with its derived balance.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketBalance {
    pub bucket_id: String,
    pub balance: Decimal,
}
