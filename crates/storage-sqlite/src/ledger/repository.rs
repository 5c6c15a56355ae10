use async_trait::async_trait;
use diesel::prelude::*;
use diesel::SqliteConnection;
use rust_decimal::Decimal;
use std::sync::Arc;

use kitty_core::errors::Error;
use kitty_core::ledger::{
    Allocation, BudgetAllocation, BudgetAllocationUpdate, LedgerRepositoryTrait, NewAllocation,
    NewBudgetAllocation,
};
use kitty_core::transactions::TransactionStatus;
use kitty_core::Result;

use super::model::{AllocationDB, BudgetAllocationDB};
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::{allocations, budget_allocations, transactions};
use crate::utils::parse_stored_decimal;

/// Repository for allocation and budget allocation rows.
///
/// The funds guard lives here: it re-derives available-to-budget on the
/// writer connection so the check and the insert share one transaction.
pub struct LedgerRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl LedgerRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

/// Derives the user's available-to-budget pool on the given connection:
/// confirmed inflows minus the feed ledger total.
fn available_in_tx(
    conn: &mut SqliteConnection,
    user: &str,
) -> std::result::Result<Decimal, diesel::result::Error> {
    let amounts: Vec<String> = transactions::table
        .filter(transactions::user_id.eq(user))
        .filter(transactions::status.eq(TransactionStatus::Confirmed.as_str()))
        .select(transactions::amount)
        .load::<String>(conn)?;
    let inflows: Decimal = amounts
        .iter()
        .map(|s| parse_stored_decimal(s, "amount"))
        .filter(|d| *d > Decimal::ZERO)
        .sum();

    let allocated_amounts: Vec<String> = budget_allocations::table
        .filter(budget_allocations::user_id.eq(user))
        .select(budget_allocations::amount)
        .load::<String>(conn)?;
    let allocated: Decimal = allocated_amounts
        .iter()
        .map(|s| parse_stored_decimal(s, "amount"))
        .sum();

    Ok(inflows - allocated)
}

fn insert_budget_allocation(
    conn: &mut SqliteConnection,
    new_allocation: NewBudgetAllocation,
) -> std::result::Result<BudgetAllocationDB, diesel::result::Error> {
    let mut row: BudgetAllocationDB = new_allocation.into();
    row.id = uuid::Uuid::new_v4().to_string();
    diesel::insert_into(budget_allocations::table)
        .values(&row)
        .execute(conn)?;
    Ok(row)
}

#[async_trait]
impl LedgerRepositoryTrait for LedgerRepository {
    fn list_allocations_for_transaction(&self, transaction_id: &str) -> Result<Vec<Allocation>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = allocations::table
            .filter(allocations::transaction_id.eq(transaction_id))
            .order(allocations::created_at.asc())
            .select(AllocationDB::as_select())
            .load::<AllocationDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(Allocation::from).collect())
    }

    fn list_allocations_for_user(&self, user_id: &str) -> Result<Vec<Allocation>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = allocations::table
            .inner_join(transactions::table)
            .filter(transactions::user_id.eq(user_id))
            .select(AllocationDB::as_select())
            .load::<AllocationDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(Allocation::from).collect())
    }

    async fn replace_allocations(
        &self,
        transaction_id: String,
        new_allocations: Vec<NewAllocation>,
    ) -> Result<Vec<Allocation>> {
        self.writer
            .exec(move |conn| {
                diesel::delete(
                    allocations::table.filter(allocations::transaction_id.eq(&transaction_id)),
                )
                .execute(conn)
                .map_err(StorageError::from)?;

                let mut created = Vec::with_capacity(new_allocations.len());
                for new_allocation in new_allocations {
                    let mut row: AllocationDB = new_allocation.into();
                    row.id = uuid::Uuid::new_v4().to_string();
                    diesel::insert_into(allocations::table)
                        .values(&row)
                        .execute(conn)
                        .map_err(StorageError::from)?;
                    created.push(row.into());
                }
                Ok(created)
            })
            .await
    }

    async fn clear_allocations(&self, transaction_id: String) -> Result<usize> {
        self.writer
            .exec(move |conn| {
                Ok(diesel::delete(
                    allocations::table.filter(allocations::transaction_id.eq(transaction_id)),
                )
                .execute(conn)
                .map_err(StorageError::from)?)
            })
            .await
    }

    fn get_budget_allocation(&self, allocation_id: &str) -> Result<BudgetAllocation> {
        let mut conn = get_connection(&self.pool)?;
        let row = budget_allocations::table
            .select(BudgetAllocationDB::as_select())
            .find(allocation_id)
            .first::<BudgetAllocationDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(row.into())
    }

    fn list_budget_allocations_for_user(&self, user_id: &str) -> Result<Vec<BudgetAllocation>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = budget_allocations::table
            .filter(budget_allocations::user_id.eq(user_id))
            .order(budget_allocations::created_at.desc())
            .select(BudgetAllocationDB::as_select())
            .load::<BudgetAllocationDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(BudgetAllocation::from).collect())
    }

    async fn create_budget_allocation(
        &self,
        new_allocation: NewBudgetAllocation,
    ) -> Result<BudgetAllocation> {
        self.writer
            .exec(move |conn| {
                let available =
                    available_in_tx(conn, &new_allocation.user_id).map_err(StorageError::from)?;
                if new_allocation.amount > available {
                    return Err(Error::InsufficientFunds {
                        requested: new_allocation.amount,
                        available,
                    });
                }
                let row =
                    insert_budget_allocation(conn, new_allocation).map_err(StorageError::from)?;
                Ok(row.into())
            })
            .await
    }

    async fn create_budget_allocations(
        &self,
        user_id: String,
        new_allocations: Vec<NewBudgetAllocation>,
    ) -> Result<Vec<BudgetAllocation>> {
        self.writer
            .exec(move |conn| {
                // One aggregate check; the batch lands whole or not at all.
                let total: Decimal = new_allocations.iter().map(|a| a.amount).sum();
                let available = available_in_tx(conn, &user_id).map_err(StorageError::from)?;
                if total > available {
                    return Err(Error::InsufficientFunds {
                        requested: total,
                        available,
                    });
                }

                let mut created = Vec::with_capacity(new_allocations.len());
                for new_allocation in new_allocations {
                    let row = insert_budget_allocation(conn, new_allocation)
                        .map_err(StorageError::from)?;
                    created.push(row.into());
                }
                Ok(created)
            })
            .await
    }

    async fn update_budget_allocation(
        &self,
        update: BudgetAllocationUpdate,
    ) -> Result<BudgetAllocation> {
        self.writer
            .exec(move |conn| {
                let row = budget_allocations::table
                    .select(BudgetAllocationDB::as_select())
                    .find(&update.id)
                    .first::<BudgetAllocationDB>(conn)
                    .map_err(StorageError::from)?;

                // Only the increase draws on the pool.
                let old_amount = parse_stored_decimal(&row.amount, "amount");
                let increase = update.amount - old_amount;
                if increase > Decimal::ZERO {
                    let available =
                        available_in_tx(conn, &row.user_id).map_err(StorageError::from)?;
                    if increase > available {
                        return Err(Error::InsufficientFunds {
                            requested: increase,
                            available,
                        });
                    }
                }

                diesel::update(budget_allocations::table.find(&update.id))
                    .set((
                        budget_allocations::amount.eq(update.amount.to_string()),
                        budget_allocations::note.eq(update.note),
                    ))
                    .execute(conn)
                    .map_err(StorageError::from)?;

                let updated = budget_allocations::table
                    .select(BudgetAllocationDB::as_select())
                    .find(&update.id)
                    .first::<BudgetAllocationDB>(conn)
                    .map_err(StorageError::from)?;
                Ok(updated.into())
            })
            .await
    }

    async fn delete_budget_allocation(&self, allocation_id: String) -> Result<usize> {
        self.writer
            .exec(move |conn| {
                Ok(diesel::delete(budget_allocations::table.find(allocation_id))
                    .execute(conn)
                    .map_err(StorageError::from)?)
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_pool, run_migrations, spawn_writer};
    use rust_decimal_macros::dec;
    use tempfile::tempdir;

    async fn create_test_repository() -> (LedgerRepository, Arc<DbPool>, tempfile::TempDir) {
        let temp_dir = tempdir().expect("Failed to create temp directory");
        let db_path = temp_dir.path().join("test.db");
        let db_path_str = db_path.to_string_lossy().to_string();

        let pool = create_pool(&db_path_str).expect("Failed to create pool");
        run_migrations(&pool).expect("Failed to run migrations");
        let writer = spawn_writer((*pool).clone());

        let repo = LedgerRepository::new(Arc::clone(&pool), writer);
        (repo, pool, temp_dir)
    }

    fn seed_bucket(pool: &Arc<DbPool>, bucket_id: &str, user_id: &str) {
        let mut conn = get_connection(pool).expect("Failed to get connection");
        diesel::sql_query(format!(
            "INSERT INTO bucket_groups (id, user_id, name, sort_order, created_at) \
             VALUES ('grp-{bucket_id}', '{user_id}', 'Essentials', 0, datetime('now'))"
        ))
        .execute(&mut conn)
        .expect("Failed to create test group");
        diesel::sql_query(format!(
            "INSERT INTO buckets (id, group_id, name, kind, color, rollover, sort_order, \
             is_archived, created_at, updated_at) \
             VALUES ('{bucket_id}', 'grp-{bucket_id}', 'Groceries', 'SPENDING', '#3b82f6', 1, 0, \
             0, datetime('now'), datetime('now'))"
        ))
        .execute(&mut conn)
        .expect("Failed to create test bucket");
    }

    fn seed_transaction(pool: &Arc<DbPool>, id: &str, user_id: &str, amount: &str, status: &str) {
        let mut conn = get_connection(pool).expect("Failed to get connection");
        diesel::sql_query(format!(
            "INSERT INTO transactions (id, user_id, date, description, amount, status, \
             is_manual, is_amended, created_at, updated_at) \
             VALUES ('{id}', '{user_id}', '2025-06-01', 'SALARY', '{amount}', '{status}', \
             0, 0, datetime('now'), datetime('now'))"
        ))
        .execute(&mut conn)
        .expect("Failed to create test transaction");
    }

    #[tokio::test]
    async fn test_create_budget_allocation_respects_available_pool() {
        let (repo, pool, _temp_dir) = create_test_repository().await;
        seed_bucket(&pool, "bucket-1", "user-1");
        seed_transaction(&pool, "txn-1", "user-1", "1000", "CONFIRMED");

        let created = repo
            .create_budget_allocation(NewBudgetAllocation {
                id: None,
                user_id: "user-1".to_string(),
                bucket_id: "bucket-1".to_string(),
                amount: dec!(600),
                note: None,
            })
            .await
            .expect("First allocation should fit");
        assert_eq!(created.amount, dec!(600));

        let err = repo
            .create_budget_allocation(NewBudgetAllocation {
                id: None,
                user_id: "user-1".to_string(),
                bucket_id: "bucket-1".to_string(),
                amount: dec!(500),
                note: None,
            })
            .await
            .expect_err("Second allocation should overdraw");
        match err {
            Error::InsufficientFunds {
                requested,
                available,
            } => {
                assert_eq!(requested, dec!(500));
                assert_eq!(available, dec!(400));
            }
            other => panic!("Expected InsufficientFunds, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_pending_inflows_do_not_fund_budget_allocations() {
        let (repo, pool, _temp_dir) = create_test_repository().await;
        seed_bucket(&pool, "bucket-1", "user-1");
        seed_transaction(&pool, "txn-1", "user-1", "250", "PENDING");

        let err = repo
            .create_budget_allocation(NewBudgetAllocation {
                id: None,
                user_id: "user-1".to_string(),
                bucket_id: "bucket-1".to_string(),
                amount: dec!(100),
                note: None,
            })
            .await
            .expect_err("Pending income must not count");
        assert!(matches!(err, Error::InsufficientFunds { .. }));
    }

    #[tokio::test]
    async fn test_batch_create_is_all_or_nothing() {
        let (repo, pool, _temp_dir) = create_test_repository().await;
        seed_bucket(&pool, "bucket-1", "user-1");
        seed_transaction(&pool, "txn-1", "user-1", "500", "CONFIRMED");

        let batch = vec![
            NewBudgetAllocation {
                id: None,
                user_id: "user-1".to_string(),
                bucket_id: "bucket-1".to_string(),
                amount: dec!(300),
                note: Some("Auto feed".to_string()),
            },
            NewBudgetAllocation {
                id: None,
                user_id: "user-1".to_string(),
                bucket_id: "bucket-1".to_string(),
                amount: dec!(300),
                note: Some("Auto feed".to_string()),
            },
        ];
        let err = repo
            .create_budget_allocations("user-1".to_string(), batch)
            .await
            .expect_err("Aggregate exceeds the pool");
        assert!(matches!(err, Error::InsufficientFunds { .. }));

        let remaining = repo
            .list_budget_allocations_for_user("user-1")
            .expect("List should succeed");
        assert!(remaining.is_empty(), "No partial rows may land");
    }

    #[tokio::test]
    async fn test_replace_allocations_swaps_the_full_set() {
        let (repo, pool, _temp_dir) = create_test_repository().await;
        seed_bucket(&pool, "bucket-1", "user-1");
        seed_bucket(&pool, "bucket-2", "user-1");
        seed_transaction(&pool, "txn-1", "user-1", "-80", "CONFIRMED");

        repo.replace_allocations(
            "txn-1".to_string(),
            vec![NewAllocation {
                id: None,
                transaction_id: "txn-1".to_string(),
                bucket_id: "bucket-1".to_string(),
                amount: dec!(-80),
            }],
        )
        .await
        .expect("Initial allocation");

        let replaced = repo
            .replace_allocations(
                "txn-1".to_string(),
                vec![
                    NewAllocation {
                        id: None,
                        transaction_id: "txn-1".to_string(),
                        bucket_id: "bucket-1".to_string(),
                        amount: dec!(-50),
                    },
                    NewAllocation {
                        id: None,
                        transaction_id: "txn-1".to_string(),
                        bucket_id: "bucket-2".to_string(),
                        amount: dec!(-30),
                    },
                ],
            )
            .await
            .expect("Replacement allocation");
        assert_eq!(replaced.len(), 2);

        let stored = repo
            .list_allocations_for_transaction("txn-1")
            .expect("List should succeed");
        assert_eq!(stored.len(), 2);
        let total: Decimal = stored.iter().map(|a| a.amount).sum();
        assert_eq!(total, dec!(-80));
    }

    #[tokio::test]
    async fn test_update_only_checks_the_increase() {
        let (repo, pool, _temp_dir) = create_test_repository().await;
        seed_bucket(&pool, "bucket-1", "user-1");
        seed_transaction(&pool, "txn-1", "user-1", "500", "CONFIRMED");

        let created = repo
            .create_budget_allocation(NewBudgetAllocation {
                id: None,
                user_id: "user-1".to_string(),
                bucket_id: "bucket-1".to_string(),
                amount: dec!(400),
                note: None,
            })
            .await
            .expect("Create should fit");

        // Shrinking always succeeds, even with the pool nearly drained.
        let shrunk = repo
            .update_budget_allocation(BudgetAllocationUpdate {
                id: created.id.clone(),
                amount: dec!(100),
                note: None,
            })
            .await
            .expect("Decrease should never overdraw");
        assert_eq!(shrunk.amount, dec!(100));

        // Growing back past the pool fails on the delta alone.
        let err = repo
            .update_budget_allocation(BudgetAllocationUpdate {
                id: created.id,
                amount: dec!(600),
                note: None,
            })
            .await
            .expect_err("Increase of 500 exceeds the 400 still free");
        assert!(matches!(err, Error::InsufficientFunds { .. }));
    }
}
