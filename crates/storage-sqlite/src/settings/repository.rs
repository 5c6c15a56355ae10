use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use std::sync::Arc;

use kitty_core::settings::{SettingsRepositoryTrait, UserSettings};
use kitty_core::Result;

use super::model::UserSettingsDB;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::user_settings;

pub struct SettingsRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl SettingsRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl SettingsRepositoryTrait for SettingsRepository {
    fn get_for_user(&self, user_id: &str) -> Result<Option<UserSettings>> {
        let mut conn = get_connection(&self.pool)?;
        let row = user_settings::table
            .select(UserSettingsDB::as_select())
            .find(user_id)
            .first::<UserSettingsDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        Ok(row.map(UserSettings::from))
    }

    async fn upsert(&self, settings: UserSettings) -> Result<UserSettings> {
        self.writer
            .exec(move |conn| {
                let row: UserSettingsDB = settings.into();
                diesel::insert_into(user_settings::table)
                    .values(&row)
                    .on_conflict(user_settings::user_id)
                    .do_update()
                    .set((
                        user_settings::cycle_type.eq(&row.cycle_type),
                        user_settings::cycle_start_day.eq(row.cycle_start_day),
                        user_settings::updated_at.eq(Utc::now().naive_utc()),
                    ))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(row.into())
            })
            .await
    }
}
