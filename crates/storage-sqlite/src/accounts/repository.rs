use async_trait::async_trait;
use diesel::prelude::*;
use std::sync::Arc;

use kitty_core::accounts::{Account, AccountRepositoryTrait, AccountSnapshot, NewAccount};
use kitty_core::Result;

use super::model::AccountDB;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::accounts;
use crate::schema::accounts::dsl::*;

/// Repository for managing account rows.
pub struct AccountRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl AccountRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl AccountRepositoryTrait for AccountRepository {
    async fn upsert_by_external_id(&self, new_account: NewAccount) -> Result<Account> {
        new_account.validate()?;

        self.writer
            .exec(move |conn| {
                let existing = accounts
                    .filter(external_id.eq(&new_account.external_id))
                    .select(AccountDB::as_select())
                    .first::<AccountDB>(conn)
                    .optional()
                    .map_err(StorageError::from)?;

                let account_db = match existing {
                    Some(mut row) => {
                        // Re-linking refreshes the provider-owned fields
                        // and leaves sync bookkeeping untouched.
                        row.name = new_account.name;
                        row.institution = new_account.institution;
                        row.currency = new_account.currency;
                        row.current_balance = new_account.current_balance.to_string();
                        row.available_balance =
                            new_account.available_balance.map(|d| d.to_string());
                        row.updated_at = chrono::Utc::now().naive_utc();
                        diesel::update(accounts.find(&row.id))
                            .set(&row)
                            .execute(conn)
                            .map_err(StorageError::from)?;
                        row
                    }
                    None => {
                        let mut row: AccountDB = new_account.into();
                        row.id = uuid::Uuid::new_v4().to_string();
                        diesel::insert_into(accounts::table)
                            .values(&row)
                            .execute(conn)
                            .map_err(StorageError::from)?;
                        row
                    }
                };
                Ok(account_db.into())
            })
            .await
    }

    async fn update_snapshot(&self, snapshot: AccountSnapshot) -> Result<Account> {
        self.writer
            .exec(move |conn| {
                diesel::update(accounts.find(&snapshot.account_id))
                    .set((
                        current_balance.eq(snapshot.current_balance.to_string()),
                        available_balance.eq(snapshot.available_balance.map(|d| d.to_string())),
                        updated_at.eq(chrono::Utc::now().naive_utc()),
                    ))
                    .execute(conn)
                    .map_err(StorageError::from)?;

                let row = accounts
                    .select(AccountDB::as_select())
                    .find(&snapshot.account_id)
                    .first::<AccountDB>(conn)
                    .map_err(StorageError::from)?;
                Ok(row.into())
            })
            .await
    }

    async fn mark_synced(&self, account_id: String) -> Result<()> {
        self.writer
            .exec(move |conn| {
                let now = chrono::Utc::now().naive_utc();
                let row = accounts
                    .select(AccountDB::as_select())
                    .find(&account_id)
                    .first::<AccountDB>(conn)
                    .map_err(StorageError::from)?;

                // first_synced_at is written exactly once.
                diesel::update(accounts.find(&account_id))
                    .set((
                        first_synced_at.eq(row.first_synced_at.or(Some(now))),
                        last_synced_at.eq(Some(now)),
                        last_error.eq(None::<String>),
                        updated_at.eq(now),
                    ))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(())
            })
            .await
    }

    async fn mark_refreshed(&self, account_id: String) -> Result<()> {
        self.writer
            .exec(move |conn| {
                let now = chrono::Utc::now().naive_utc();
                diesel::update(accounts.find(&account_id))
                    .set((last_refreshed_at.eq(Some(now)), updated_at.eq(now)))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(())
            })
            .await
    }

    async fn record_error(&self, account_id: String, error: String) -> Result<()> {
        self.writer
            .exec(move |conn| {
                diesel::update(accounts.find(&account_id))
                    .set((
                        last_error.eq(Some(error)),
                        updated_at.eq(chrono::Utc::now().naive_utc()),
                    ))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(())
            })
            .await
    }

    async fn delete(&self, account_id: String) -> Result<usize> {
        self.writer
            .exec(move |conn| {
                // Transactions and their allocations go with the account
                // via FK cascades.
                Ok(diesel::delete(accounts.find(account_id))
                    .execute(conn)
                    .map_err(StorageError::from)?)
            })
            .await
    }

    fn get_by_id(&self, account_id: &str) -> Result<Account> {
        let mut conn = get_connection(&self.pool)?;
        let row = accounts
            .select(AccountDB::as_select())
            .find(account_id)
            .first::<AccountDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(row.into())
    }

    fn list_for_user(&self, user_id_filter: &str) -> Result<Vec<Account>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = accounts
            .filter(user_id.eq(user_id_filter))
            .order(created_at.asc())
            .select(AccountDB::as_select())
            .load::<AccountDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(Account::from).collect())
    }
}
