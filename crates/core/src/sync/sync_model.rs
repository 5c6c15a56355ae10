//! Sync domain models: aggregator wire shapes and per-account outcomes.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// An account as reported by the bank aggregator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderAccount {
    pub external_id: String,
    pub name: String,
    pub institution: String,
    pub currency: String,
    pub current_balance: Decimal,
    pub available_balance: Option<Decimal>,
}

/// A settled transaction as reported by the aggregator. Settled records
/// always carry a stable external id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderTransaction {
    pub external_id: String,
    pub date: NaiveDate,
    pub merchant: Option<String>,
    pub description: String,
    pub amount: Decimal,
}

/// A pending transaction as reported by the aggregator. Pendings have no
/// stable id; identity is positional (date + description + amount).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderPendingTransaction {
    pub date: NaiveDate,
    pub merchant: Option<String>,
    pub description: String,
    pub amount: Decimal,
}

/// Outcome of syncing one account's settled transactions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountSyncResult {
    pub account_id: String,
    /// New confirmed transactions inserted.
    pub created: usize,
    /// Stored pendings promoted to confirmed in place.
    pub promoted: usize,
    /// Already-stored transactions overwritten with changed data.
    pub amended: usize,
    /// Re-fetched rows that matched the stored copy exactly.
    pub unchanged: usize,
    /// Recorded failure; all counters are zero when set.
    pub error: Option<String>,
}

impl AccountSyncResult {
    pub fn failed(account_id: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            account_id: account_id.into(),
            error: Some(error.into()),
            ..Default::default()
        }
    }
}

/// Outcome of refreshing one account's pending transactions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingSyncResult {
    pub account_id: String,
    /// Provider pendings with no stored equivalent, inserted as PENDING.
    pub inserted: usize,
    /// Stored pendings the provider no longer reports, deleted.
    pub removed: usize,
}

/// Aggregate outcome of a sync run across a user's accounts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncSummary {
    pub results: Vec<AccountSyncResult>,
}

impl SyncSummary {
    pub fn failed_accounts(&self) -> usize {
        self.results.iter().filter(|r| r.error.is_some()).count()
    }
}
