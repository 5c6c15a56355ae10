use async_trait::async_trait;
use chrono::NaiveDate;
use diesel::prelude::*;
use diesel::SqliteConnection;
use std::sync::Arc;

use kitty_core::constants::amendment_tolerance;
use kitty_core::transactions::{
    AmendmentUpdate, NewTransaction, PendingPromotion, Transaction, TransactionRepositoryTrait,
    TransactionStatus,
};
use kitty_core::Result;

use super::model::TransactionDB;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::allocations;
use crate::schema::transactions;
use crate::utils::{chunk_for_sqlite, parse_stored_decimal};

/// Repository for managing transaction rows.
///
/// Promotion and amendment touch the transaction and its allocation rows
/// together, so both run as single writer jobs.
pub struct TransactionRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl TransactionRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

/// Reconciles a transaction's allocation rows with its post-settlement
/// amount: a single row is corrected to the new total, multiple rows are
/// dropped because the original split intent is unknowable.
fn fix_up_allocations(
    conn: &mut SqliteConnection,
    transaction_id: &str,
    new_amount: &str,
) -> std::result::Result<(), diesel::result::Error> {
    let allocation_ids: Vec<String> = allocations::table
        .filter(allocations::transaction_id.eq(transaction_id))
        .select(allocations::id)
        .load::<String>(conn)?;

    match allocation_ids.len() {
        0 => {}
        1 => {
            diesel::update(allocations::table.find(&allocation_ids[0]))
                .set(allocations::amount.eq(new_amount))
                .execute(conn)?;
        }
        _ => {
            diesel::delete(
                allocations::table.filter(allocations::transaction_id.eq(transaction_id)),
            )
            .execute(conn)?;
        }
    }
    Ok(())
}

#[async_trait]
impl TransactionRepositoryTrait for TransactionRepository {
    async fn create(&self, new_transaction: NewTransaction) -> Result<Transaction> {
        self.writer
            .exec(move |conn| {
                let mut row: TransactionDB = new_transaction.into();
                row.id = uuid::Uuid::new_v4().to_string();
                diesel::insert_into(transactions::table)
                    .values(&row)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(row.into())
            })
            .await
    }

    async fn create_many(&self, new_transactions: Vec<NewTransaction>) -> Result<Vec<Transaction>> {
        self.writer
            .exec(move |conn| {
                let mut created = Vec::with_capacity(new_transactions.len());
                for new_transaction in new_transactions {
                    let mut row: TransactionDB = new_transaction.into();
                    row.id = uuid::Uuid::new_v4().to_string();
                    diesel::insert_into(transactions::table)
                        .values(&row)
                        .execute(conn)
                        .map_err(StorageError::from)?;
                    created.push(row.into());
                }
                Ok(created)
            })
            .await
    }

    async fn promote_pending(&self, promotion: PendingPromotion) -> Result<Transaction> {
        self.writer
            .exec(move |conn| {
                let row = transactions::table
                    .select(TransactionDB::as_select())
                    .find(&promotion.pending_id)
                    .first::<TransactionDB>(conn)
                    .map_err(StorageError::from)?;

                let old_amount = parse_stored_decimal(&row.amount, "amount");
                let amount_moved =
                    (old_amount - promotion.amount).abs() > amendment_tolerance();
                let new_amount = promotion.amount.to_string();

                if amount_moved {
                    fix_up_allocations(conn, &row.id, &new_amount)
                        .map_err(StorageError::from)?;
                }

                diesel::update(transactions::table.find(&row.id))
                    .set((
                        transactions::external_id.eq(Some(promotion.external_id)),
                        transactions::date.eq(promotion.date),
                        transactions::merchant.eq(promotion.merchant),
                        transactions::description.eq(promotion.description),
                        transactions::amount.eq(&new_amount),
                        transactions::status.eq(TransactionStatus::Confirmed.as_str()),
                        transactions::is_amended.eq(row.is_amended || amount_moved),
                        transactions::updated_at.eq(chrono::Utc::now().naive_utc()),
                    ))
                    .execute(conn)
                    .map_err(StorageError::from)?;

                let updated = transactions::table
                    .select(TransactionDB::as_select())
                    .find(&row.id)
                    .first::<TransactionDB>(conn)
                    .map_err(StorageError::from)?;
                Ok(updated.into())
            })
            .await
    }

    async fn apply_amendment(&self, amendment: AmendmentUpdate) -> Result<Transaction> {
        self.writer
            .exec(move |conn| {
                let new_amount = amendment.amount.to_string();
                fix_up_allocations(conn, &amendment.transaction_id, &new_amount)
                    .map_err(StorageError::from)?;

                diesel::update(transactions::table.find(&amendment.transaction_id))
                    .set((
                        transactions::merchant.eq(amendment.merchant),
                        transactions::description.eq(amendment.description),
                        transactions::amount.eq(&new_amount),
                        transactions::is_amended.eq(true),
                        transactions::updated_at.eq(chrono::Utc::now().naive_utc()),
                    ))
                    .execute(conn)
                    .map_err(StorageError::from)?;

                let updated = transactions::table
                    .select(TransactionDB::as_select())
                    .find(&amendment.transaction_id)
                    .first::<TransactionDB>(conn)
                    .map_err(StorageError::from)?;
                Ok(updated.into())
            })
            .await
    }

    async fn delete(&self, transaction_id: String) -> Result<usize> {
        self.writer
            .exec(move |conn| {
                Ok(diesel::delete(transactions::table.find(transaction_id))
                    .execute(conn)
                    .map_err(StorageError::from)?)
            })
            .await
    }

    async fn delete_many(&self, transaction_ids: Vec<String>) -> Result<usize> {
        self.writer
            .exec(move |conn| {
                let mut deleted = 0;
                for chunk in chunk_for_sqlite(&transaction_ids) {
                    deleted += diesel::delete(
                        transactions::table.filter(transactions::id.eq_any(chunk)),
                    )
                    .execute(conn)
                    .map_err(StorageError::from)?;
                }
                Ok(deleted)
            })
            .await
    }

    fn get_by_id(&self, transaction_id: &str) -> Result<Transaction> {
        let mut conn = get_connection(&self.pool)?;
        let row = transactions::table
            .select(TransactionDB::as_select())
            .find(transaction_id)
            .first::<TransactionDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(row.into())
    }

    fn find_by_external_ids(
        &self,
        account_id: &str,
        external_ids: &[String],
    ) -> Result<Vec<Transaction>> {
        let mut conn = get_connection(&self.pool)?;
        let mut rows: Vec<TransactionDB> = Vec::new();
        for chunk in chunk_for_sqlite(external_ids) {
            rows.extend(
                transactions::table
                    .filter(transactions::account_id.eq(account_id))
                    .filter(
                        transactions::external_id
                            .eq_any(chunk.iter().cloned().map(Some).collect::<Vec<_>>()),
                    )
                    .select(TransactionDB::as_select())
                    .load::<TransactionDB>(&mut conn)
                    .map_err(StorageError::from)?,
            );
        }
        Ok(rows.into_iter().map(Transaction::from).collect())
    }

    fn list_pending_for_account(&self, account_id: &str) -> Result<Vec<Transaction>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = transactions::table
            .filter(transactions::account_id.eq(account_id))
            .filter(transactions::status.eq(TransactionStatus::Pending.as_str()))
            .order(transactions::created_at.asc())
            .select(TransactionDB::as_select())
            .load::<TransactionDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(Transaction::from).collect())
    }

    fn list_for_account(
        &self,
        account_id: &str,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<Transaction>> {
        let mut conn = get_connection(&self.pool)?;
        let mut query = transactions::table
            .filter(transactions::account_id.eq(account_id))
            .into_boxed();
        if let Some(from) = from {
            query = query.filter(transactions::date.ge(from));
        }
        if let Some(to) = to {
            query = query.filter(transactions::date.le(to));
        }
        let rows = query
            .order(transactions::date.desc())
            .select(TransactionDB::as_select())
            .load::<TransactionDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(Transaction::from).collect())
    }

    fn list_for_user(&self, user_id: &str) -> Result<Vec<Transaction>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = transactions::table
            .filter(transactions::user_id.eq(user_id))
            .order(transactions::date.desc())
            .select(TransactionDB::as_select())
            .load::<TransactionDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(Transaction::from).collect())
    }
}
