//! Repository and service traits for budget cycle settings.

use async_trait::async_trait;

use super::settings_model::{UserSettings, UserSettingsUpdate};
use crate::errors::Result;

/// Repository trait for cycle settings rows.
#[async_trait]
pub trait SettingsRepositoryTrait: Send + Sync {
    /// Returns the stored settings for the user, if any.
    fn get_for_user(&self, user_id: &str) -> Result<Option<UserSettings>>;

    /// Creates or replaces the user's settings row.
    async fn upsert(&self, settings: UserSettings) -> Result<UserSettings>;
}

/// Service trait for cycle settings.
#[async_trait]
pub trait SettingsServiceTrait: Send + Sync {
    /// Returns the user's settings, falling back to the defaults
    /// (fortnightly, anchored Thursday) when none are stored.
    fn get_settings(&self, user_id: &str) -> Result<UserSettings>;

    /// Validates and stores new cycle settings.
    async fn update_settings(
        &self,
        user_id: &str,
        update: UserSettingsUpdate,
    ) -> Result<UserSettings>;
}
