//! Budget cycle settings models.

use serde::{Deserialize, Serialize};

use crate::{errors::ValidationError, Error, Result};

/// How often the budget cycle repeats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CycleType {
    Weekly,
    #[default]
    Fortnightly,
    Monthly,
}

impl CycleType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CycleType::Weekly => "WEEKLY",
            CycleType::Fortnightly => "FORTNIGHTLY",
            CycleType::Monthly => "MONTHLY",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "WEEKLY" => CycleType::Weekly,
            "MONTHLY" => CycleType::Monthly,
            _ => CycleType::Fortnightly,
        }
    }
}

/// Per-user budget cycle configuration.
///
/// `cycle_start_day` is a day-of-week (0 = Sunday .. 6 = Saturday) for
/// weekly and fortnightly cycles, or a day-of-month (1..=31) for monthly.
/// This drives period-boundary computation only; it gates no writes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSettings {
    pub user_id: String,
    pub cycle_type: CycleType,
    pub cycle_start_day: u32,
}

impl UserSettings {
    /// The defaults applied before a user configures anything:
    /// fortnightly, anchored on Thursday.
    pub fn defaults_for(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            cycle_type: CycleType::Fortnightly,
            cycle_start_day: 4,
        }
    }
}

/// Input model for updating a user's cycle settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSettingsUpdate {
    pub cycle_type: CycleType,
    pub cycle_start_day: u32,
}

impl UserSettingsUpdate {
    pub fn validate(&self) -> Result<()> {
        let valid = match self.cycle_type {
            CycleType::Weekly | CycleType::Fortnightly => self.cycle_start_day <= 6,
            CycleType::Monthly => (1..=31).contains(&self.cycle_start_day),
        };
        if !valid {
            return Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Start day {} is out of range for a {} cycle",
                self.cycle_start_day,
                self.cycle_type.as_str()
            ))));
        }
        Ok(())
    }
}
