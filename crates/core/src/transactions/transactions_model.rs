//! Transaction domain models.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{errors::ValidationError, Error, Result};

/// Settlement status of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    /// Bank-reported but not yet settled; carries no stable external id.
    Pending,
    Confirmed,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Pending => "PENDING",
            TransactionStatus::Confirmed => "CONFIRMED",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "PENDING" => TransactionStatus::Pending,
            _ => TransactionStatus::Confirmed,
        }
    }
}

/// Domain model representing a monetary event.
///
/// A transaction belongs to exactly one account, or is manual and
/// accountless. Positive amounts are income, negative are expenses.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub user_id: String,
    pub account_id: Option<String>,
    /// Stable key from the aggregator; None for manual and pending rows.
    pub external_id: Option<String>,
    pub date: NaiveDate,
    /// Display name of the merchant, when the aggregator provides one.
    pub merchant: Option<String>,
    /// Raw bank statement description.
    pub description: String,
    pub amount: Decimal,
    pub status: TransactionStatus,
    pub is_manual: bool,
    /// Set when a settled transaction's amount or merchant changed after
    /// it was first synced, or when a pending settled at a different amount.
    pub is_amended: bool,
    /// Link to the schedule this transaction was matched against, if any.
    pub scheduled_transaction_id: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Transaction {
    pub fn is_pending(&self) -> bool {
        self.status == TransactionStatus::Pending
    }

    pub fn is_income(&self) -> bool {
        self.amount > Decimal::ZERO
    }
}

/// Input model for creating a transaction, either from a sync or manually.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTransaction {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub user_id: String,
    pub account_id: Option<String>,
    pub external_id: Option<String>,
    pub date: NaiveDate,
    pub merchant: Option<String>,
    pub description: String,
    pub amount: Decimal,
    pub status: TransactionStatus,
    pub is_manual: bool,
}

impl NewTransaction {
    /// Builds a manual, always-confirmed transaction.
    pub fn manual(
        user_id: impl Into<String>,
        date: NaiveDate,
        merchant: Option<String>,
        description: impl Into<String>,
        amount: Decimal,
    ) -> Self {
        Self {
            id: None,
            user_id: user_id.into(),
            account_id: None,
            external_id: None,
            date,
            merchant,
            description: description.into(),
            amount,
            status: TransactionStatus::Confirmed,
            is_manual: true,
        }
    }

    /// Validates the transaction data.
    ///
    /// A transaction is either bank-sourced (has an account) or manual and
    /// accountless; manual entries are always confirmed and never carry an
    /// external id.
    pub fn validate(&self) -> Result<()> {
        if self.user_id.trim().is_empty() {
            return Err(Error::Validation(ValidationError::MissingField(
                "userId".to_string(),
            )));
        }
        if self.description.trim().is_empty() {
            return Err(Error::Validation(ValidationError::MissingField(
                "description".to_string(),
            )));
        }
        if self.amount == Decimal::ZERO {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Transaction amount cannot be zero".to_string(),
            )));
        }
        if self.is_manual {
            if self.account_id.is_some() {
                return Err(Error::Validation(ValidationError::InvalidInput(
                    "Manual transactions cannot belong to an account".to_string(),
                )));
            }
            if self.external_id.is_some() {
                return Err(Error::Validation(ValidationError::InvalidInput(
                    "Manual transactions cannot carry an external id".to_string(),
                )));
            }
            if self.status != TransactionStatus::Confirmed {
                return Err(Error::Validation(ValidationError::InvalidInput(
                    "Manual transactions are always confirmed".to_string(),
                )));
            }
        } else if self.account_id.is_none() {
            return Err(Error::Validation(ValidationError::MissingField(
                "accountId".to_string(),
            )));
        }
        Ok(())
    }
}

/// Update applied when a stored pending transaction settles.
///
/// The pending row is updated in place: it receives the confirmed external
/// id and final values, and flips to CONFIRMED.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingPromotion {
    pub pending_id: String,
    pub external_id: String,
    pub date: NaiveDate,
    pub merchant: Option<String>,
    pub description: String,
    pub amount: Decimal,
}

/// Update applied when a settled transaction is found amended at source.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AmendmentUpdate {
    pub transaction_id: String,
    pub merchant: Option<String>,
    pub description: String,
    pub amount: Decimal,
}
