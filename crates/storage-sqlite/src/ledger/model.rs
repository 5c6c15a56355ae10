//! Database models for the two ledgers.

use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use kitty_core::ledger::{Allocation, BudgetAllocation, NewAllocation, NewBudgetAllocation};

use crate::utils::parse_stored_decimal;

/// Database model for transaction allocations.
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
#[diesel(table_name = crate::schema::allocations)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct AllocationDB {
    pub id: String,
    pub transaction_id: String,
    pub bucket_id: String,
    pub amount: String,
    pub created_at: NaiveDateTime,
}

/// Database model for budget allocations (the feed ledger).
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
#[diesel(table_name = crate::schema::budget_allocations)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct BudgetAllocationDB {
    pub id: String,
    pub user_id: String,
    pub bucket_id: String,
    pub amount: String,
    pub note: Option<String>,
    pub created_at: NaiveDateTime,
}

impl From<AllocationDB> for Allocation {
    fn from(db: AllocationDB) -> Self {
        Self {
            id: db.id,
            transaction_id: db.transaction_id,
            bucket_id: db.bucket_id,
            amount: parse_stored_decimal(&db.amount, "amount"),
            created_at: db.created_at,
        }
    }
}

impl From<NewAllocation> for AllocationDB {
    fn from(domain: NewAllocation) -> Self {
        Self {
            id: domain.id.unwrap_or_default(),
            transaction_id: domain.transaction_id,
            bucket_id: domain.bucket_id,
            amount: domain.amount.to_string(),
            created_at: chrono::Utc::now().naive_utc(),
        }
    }
}

impl From<BudgetAllocationDB> for BudgetAllocation {
    fn from(db: BudgetAllocationDB) -> Self {
        Self {
            id: db.id,
            user_id: db.user_id,
            bucket_id: db.bucket_id,
            amount: parse_stored_decimal(&db.amount, "amount"),
            note: db.note,
            created_at: db.created_at,
        }
    }
}

impl From<NewBudgetAllocation> for BudgetAllocationDB {
    fn from(domain: NewBudgetAllocation) -> Self {
        Self {
            id: domain.id.unwrap_or_default(),
            user_id: domain.user_id,
            bucket_id: domain.bucket_id,
            amount: domain.amount.to_string(),
            note: domain.note,
            created_at: chrono::Utc::now().naive_utc(),
        }
    }
}
