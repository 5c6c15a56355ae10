//! Database model for accounts.

use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use kitty_core::accounts::{Account, NewAccount};

use crate::utils::parse_stored_decimal;

/// Database model for accounts. Balances are stored as text and parsed to
/// `Decimal` on read.
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
#[diesel(table_name = crate::schema::accounts)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct AccountDB {
    pub id: String,
    pub user_id: String,
    pub external_id: String,
    pub name: String,
    pub institution: String,
    pub currency: String,
    pub current_balance: String,
    pub available_balance: Option<String>,
    pub first_synced_at: Option<NaiveDateTime>,
    pub last_synced_at: Option<NaiveDateTime>,
    pub last_refreshed_at: Option<NaiveDateTime>,
    pub last_error: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<AccountDB> for Account {
    fn from(db: AccountDB) -> Self {
        Self {
            id: db.id,
            user_id: db.user_id,
            external_id: db.external_id,
            name: db.name,
            institution: db.institution,
            currency: db.currency,
            current_balance: parse_stored_decimal(&db.current_balance, "current_balance"),
            available_balance: db
                .available_balance
                .as_deref()
                .map(|s| parse_stored_decimal(s, "available_balance")),
            first_synced_at: db.first_synced_at,
            last_synced_at: db.last_synced_at,
            last_refreshed_at: db.last_refreshed_at,
            last_error: db.last_error,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}

impl From<NewAccount> for AccountDB {
    fn from(domain: NewAccount) -> Self {
        let now = chrono::Utc::now().naive_utc();
        Self {
            id: domain.id.unwrap_or_default(),
            user_id: domain.user_id,
            external_id: domain.external_id,
            name: domain.name,
            institution: domain.institution,
            currency: domain.currency,
            current_balance: domain.current_balance.to_string(),
            available_balance: domain.available_balance.map(|d| d.to_string()),
            first_synced_at: None,
            last_synced_at: None,
            last_refreshed_at: None,
            last_error: None,
            created_at: now,
            updated_at: now,
        }
    }
}
