use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use diesel::prelude::*;
use std::sync::Arc;

use kitty_core::ledger::NewAllocation;
use kitty_core::scheduled::{
    NewScheduledTransaction, ScheduledRepositoryTrait, ScheduledTransaction,
    ScheduledTransactionUpdate,
};
use kitty_core::Result;

use super::model::ScheduledTransactionDB;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::ledger::AllocationDB;
use crate::schema::{allocations, scheduled_transactions, transactions};

pub struct ScheduledRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl ScheduledRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl ScheduledRepositoryTrait for ScheduledRepository {
    async fn create(
        &self,
        new_scheduled: NewScheduledTransaction,
        next_due: NaiveDate,
    ) -> Result<ScheduledTransaction> {
        self.writer
            .exec(move |conn| {
                let mut row = ScheduledTransactionDB::from_new(new_scheduled, next_due);
                if row.id.is_empty() {
                    row.id = uuid::Uuid::new_v4().to_string();
                }
                diesel::insert_into(scheduled_transactions::table)
                    .values(&row)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(row.into())
            })
            .await
    }

    async fn update(
        &self,
        update: ScheduledTransactionUpdate,
        next_due: NaiveDate,
    ) -> Result<ScheduledTransaction> {
        self.writer
            .exec(move |conn| {
                diesel::update(scheduled_transactions::table.find(&update.id))
                    .set((
                        scheduled_transactions::bucket_id.eq(&update.bucket_id),
                        scheduled_transactions::name.eq(&update.name),
                        scheduled_transactions::amount.eq(update.amount.to_string()),
                        scheduled_transactions::frequency.eq(update.frequency.as_str()),
                        scheduled_transactions::interval.eq(update.interval as i32),
                        scheduled_transactions::start_date.eq(update.start_date),
                        scheduled_transactions::next_due.eq(next_due),
                        scheduled_transactions::is_enabled.eq(update.is_enabled),
                        scheduled_transactions::updated_at.eq(Utc::now().naive_utc()),
                    ))
                    .execute(conn)
                    .map_err(StorageError::from)?;

                let row = scheduled_transactions::table
                    .select(ScheduledTransactionDB::as_select())
                    .find(&update.id)
                    .first::<ScheduledTransactionDB>(conn)
                    .map_err(StorageError::from)?;
                Ok(row.into())
            })
            .await
    }

    async fn set_enabled(&self, scheduled_id: String, enabled: bool) -> Result<()> {
        self.writer
            .exec(move |conn| {
                diesel::update(scheduled_transactions::table.find(&scheduled_id))
                    .set((
                        scheduled_transactions::is_enabled.eq(enabled),
                        scheduled_transactions::updated_at.eq(Utc::now().naive_utc()),
                    ))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(())
            })
            .await
    }

    async fn delete(&self, scheduled_id: String) -> Result<usize> {
        self.writer
            .exec(move |conn| {
                // The FK is ON DELETE SET NULL, so linked transactions keep
                // their allocations and simply lose the link.
                Ok(
                    diesel::delete(scheduled_transactions::table.find(scheduled_id))
                        .execute(conn)
                        .map_err(StorageError::from)?,
                )
            })
            .await
    }

    fn get_by_id(&self, scheduled_id: &str) -> Result<ScheduledTransaction> {
        let mut conn = get_connection(&self.pool)?;
        let row = scheduled_transactions::table
            .select(ScheduledTransactionDB::as_select())
            .find(scheduled_id)
            .first::<ScheduledTransactionDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(row.into())
    }

    fn list_for_user(&self, user_id: &str) -> Result<Vec<ScheduledTransaction>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = scheduled_transactions::table
            .filter(scheduled_transactions::user_id.eq(user_id))
            .order(scheduled_transactions::created_at.asc())
            .select(ScheduledTransactionDB::as_select())
            .load::<ScheduledTransactionDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(ScheduledTransaction::from).collect())
    }

    fn list_enabled_for_user(&self, user_id: &str) -> Result<Vec<ScheduledTransaction>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = scheduled_transactions::table
            .filter(scheduled_transactions::user_id.eq(user_id))
            .filter(scheduled_transactions::is_enabled.eq(true))
            .order((
                scheduled_transactions::next_due.asc(),
                scheduled_transactions::id.asc(),
            ))
            .select(ScheduledTransactionDB::as_select())
            .load::<ScheduledTransactionDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(ScheduledTransaction::from).collect())
    }

    async fn record_match(
        &self,
        transaction_id: String,
        scheduled_id: String,
        new_next_due: NaiveDate,
        allocation: NewAllocation,
    ) -> Result<()> {
        self.writer
            .exec(move |conn| {
                diesel::update(transactions::table.find(&transaction_id))
                    .set((
                        transactions::scheduled_transaction_id.eq(Some(scheduled_id.clone())),
                        transactions::updated_at.eq(Utc::now().naive_utc()),
                    ))
                    .execute(conn)
                    .map_err(StorageError::from)?;

                diesel::delete(
                    allocations::table.filter(allocations::transaction_id.eq(&transaction_id)),
                )
                .execute(conn)
                .map_err(StorageError::from)?;

                let mut row: AllocationDB = allocation.into();
                row.id = uuid::Uuid::new_v4().to_string();
                diesel::insert_into(allocations::table)
                    .values(&row)
                    .execute(conn)
                    .map_err(StorageError::from)?;

                diesel::update(scheduled_transactions::table.find(&scheduled_id))
                    .set((
                        scheduled_transactions::next_due.eq(new_next_due),
                        scheduled_transactions::updated_at.eq(Utc::now().naive_utc()),
                    ))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(())
            })
            .await
    }
}
