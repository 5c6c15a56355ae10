//! Wire shapes of the aggregator REST API.
//!
//! The aggregator speaks snake_case JSON; these types parse it and convert
//! into the provider models `kitty-core` consumes. Parsing stays lenient on
//! optional fields so a provider-side schema addition never breaks a sync.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;

use kitty_core::sync::{ProviderAccount, ProviderPendingTransaction, ProviderTransaction};

#[derive(Debug, Deserialize)]
pub(crate) struct ApiAccountsResponse {
    #[serde(default)]
    pub accounts: Vec<ApiAccount>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) struct ApiAccount {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub institution: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
    pub current_balance: Decimal,
    #[serde(default)]
    pub available_balance: Option<Decimal>,
}

impl From<ApiAccount> for ProviderAccount {
    fn from(api: ApiAccount) -> Self {
        ProviderAccount {
            external_id: api.id,
            name: api.name,
            institution: api.institution.unwrap_or_default(),
            currency: api.currency.unwrap_or_else(|| "AUD".to_string()),
            current_balance: api.current_balance,
            available_balance: api.available_balance,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiTransactionsResponse {
    #[serde(default)]
    pub transactions: Vec<ApiTransaction>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) struct ApiTransaction {
    pub id: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub merchant: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub amount: Decimal,
}

impl From<ApiTransaction> for ProviderTransaction {
    fn from(api: ApiTransaction) -> Self {
        ProviderTransaction {
            external_id: api.id,
            date: api.date,
            merchant: api.merchant,
            description: api.description.unwrap_or_default(),
            amount: api.amount,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiPendingResponse {
    #[serde(default)]
    pub pending: Vec<ApiPendingTransaction>,
}

/// Pending rows carry no id on the wire; identity is positional.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) struct ApiPendingTransaction {
    pub date: NaiveDate,
    #[serde(default)]
    pub merchant: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub amount: Decimal,
}

impl From<ApiPendingTransaction> for ProviderPendingTransaction {
    fn from(api: ApiPendingTransaction) -> Self {
        ProviderPendingTransaction {
            date: api.date,
            merchant: api.merchant,
            description: api.description.unwrap_or_default(),
            amount: api.amount,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorResponse {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}
