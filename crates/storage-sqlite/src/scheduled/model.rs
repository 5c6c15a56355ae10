use chrono::{NaiveDate, NaiveDateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use kitty_core::scheduled::{Frequency, NewScheduledTransaction, ScheduledTransaction};

use crate::schema::scheduled_transactions;
use crate::utils::parse_stored_decimal;

#[derive(
    Queryable, Identifiable, Insertable, AsChangeset, Selectable, Serialize, Deserialize, Debug,
    Clone,
)]
#[diesel(table_name = scheduled_transactions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ScheduledTransactionDB {
    pub id: String,
    pub user_id: String,
    pub bucket_id: String,
    pub name: String,
    pub amount: String,
    pub frequency: String,
    pub interval: i32,
    pub start_date: NaiveDate,
    pub next_due: NaiveDate,
    pub is_enabled: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<ScheduledTransactionDB> for ScheduledTransaction {
    fn from(db: ScheduledTransactionDB) -> Self {
        ScheduledTransaction {
            id: db.id,
            user_id: db.user_id,
            bucket_id: db.bucket_id,
            name: db.name,
            amount: parse_stored_decimal(&db.amount, "amount"),
            frequency: Frequency::from_str(&db.frequency),
            interval: db.interval.max(1) as u32,
            start_date: db.start_date,
            next_due: db.next_due,
            is_enabled: db.is_enabled,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}

impl ScheduledTransactionDB {
    pub fn from_new(new_scheduled: NewScheduledTransaction, next_due: NaiveDate) -> Self {
        let now = Utc::now().naive_utc();
        ScheduledTransactionDB {
            id: new_scheduled.id.unwrap_or_default(),
            user_id: new_scheduled.user_id,
            bucket_id: new_scheduled.bucket_id,
            name: new_scheduled.name,
            amount: new_scheduled.amount.to_string(),
            frequency: new_scheduled.frequency.as_str().to_string(),
            interval: new_scheduled.interval as i32,
            start_date: new_scheduled.start_date,
            next_due,
            is_enabled: new_scheduled.is_enabled,
            created_at: now,
            updated_at: now,
        }
    }
}
