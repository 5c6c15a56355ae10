use std::sync::Arc;

use super::settings_model::{UserSettings, UserSettingsUpdate};
use super::settings_traits::{SettingsRepositoryTrait, SettingsServiceTrait};
use crate::errors::Result;

/// Service for reading and writing budget cycle settings.
pub struct SettingsService {
    repository: Arc<dyn SettingsRepositoryTrait>,
}

impl SettingsService {
    pub fn new(repository: Arc<dyn SettingsRepositoryTrait>) -> Self {
        Self { repository }
    }
}

#[async_trait::async_trait]
impl SettingsServiceTrait for SettingsService {
    fn get_settings(&self, user_id: &str) -> Result<UserSettings> {
        Ok(self
            .repository
            .get_for_user(user_id)?
            .unwrap_or_else(|| UserSettings::defaults_for(user_id)))
    }

    async fn update_settings(
        &self,
        user_id: &str,
        update: UserSettingsUpdate,
    ) -> Result<UserSettings> {
        update.validate()?;
        self.repository
            .upsert(UserSettings {
                user_id: user_id.to_string(),
                cycle_type: update.cycle_type,
                cycle_start_day: update.cycle_start_day,
            })
            .await
    }
}
