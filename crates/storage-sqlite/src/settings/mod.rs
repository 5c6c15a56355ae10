//! SQLite storage implementation for budget cycle settings.

mod model;
mod repository;

pub use model::UserSettingsDB;
pub use repository::SettingsRepository;
