//! Database model for transactions.

use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use kitty_core::transactions::{NewTransaction, Transaction, TransactionStatus};

use crate::utils::parse_stored_decimal;

/// Database model for transactions. The amount is stored as text; status
/// is the enum's SCREAMING_SNAKE_CASE string.
#[derive(
    Queryable,
    Identifiable,
    Insertable,
    AsChangeset,
    Selectable,
    PartialEq,
    Serialize,
    Deserialize,
    Debug,
    Clone,
)]
#[diesel(table_name = crate::schema::transactions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct TransactionDB {
    pub id: String,
    pub user_id: String,
    pub account_id: Option<String>,
    pub external_id: Option<String>,
    pub date: NaiveDate,
    pub merchant: Option<String>,
    pub description: String,
    pub amount: String,
    pub status: String,
    pub is_manual: bool,
    pub is_amended: bool,
    pub scheduled_transaction_id: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<TransactionDB> for Transaction {
    fn from(db: TransactionDB) -> Self {
        Self {
            id: db.id,
            user_id: db.user_id,
            account_id: db.account_id,
            external_id: db.external_id,
            date: db.date,
            merchant: db.merchant,
            description: db.description,
            amount: parse_stored_decimal(&db.amount, "amount"),
            status: TransactionStatus::from_str(&db.status),
            is_manual: db.is_manual,
            is_amended: db.is_amended,
            scheduled_transaction_id: db.scheduled_transaction_id,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}

impl From<NewTransaction> for TransactionDB {
    fn from(domain: NewTransaction) -> Self {
        let now = chrono::Utc::now().naive_utc();
        Self {
            id: domain.id.unwrap_or_default(),
            user_id: domain.user_id,
            account_id: domain.account_id,
            external_id: domain.external_id,
            date: domain.date,
            merchant: domain.merchant,
            description: domain.description,
            amount: domain.amount.to_string(),
            status: domain.status.as_str().to_string(),
            is_manual: domain.is_manual,
            is_amended: false,
            scheduled_transaction_id: None,
            created_at: now,
            updated_at: now,
        }
    }
}
