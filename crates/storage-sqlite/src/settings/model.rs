use chrono::{NaiveDateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use kitty_core::settings::{CycleType, UserSettings};

use crate::schema::user_settings;

#[derive(
    Queryable, Identifiable, Insertable, AsChangeset, Selectable, Serialize, Deserialize, Debug,
    Clone,
)]
#[diesel(table_name = user_settings)]
#[diesel(primary_key(user_id))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct UserSettingsDB {
    pub user_id: String,
    pub cycle_type: String,
    pub cycle_start_day: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<UserSettingsDB> for UserSettings {
    fn from(db: UserSettingsDB) -> Self {
        UserSettings {
            user_id: db.user_id,
            cycle_type: CycleType::from_str(&db.cycle_type),
            cycle_start_day: db.cycle_start_day.max(0) as u32,
        }
    }
}

impl From<UserSettings> for UserSettingsDB {
    fn from(settings: UserSettings) -> Self {
        let now = Utc::now().naive_utc();
        UserSettingsDB {
            user_id: settings.user_id,
            cycle_type: settings.cycle_type.as_str().to_string(),
            cycle_start_day: settings.cycle_start_day as i32,
            created_at: now,
            updated_at: now,
        }
    }
}
