use chrono::NaiveDate;
use rust_decimal::Decimal;

/// Tolerance when comparing an allocation set against its transaction amount.
pub fn allocation_tolerance() -> Decimal {
    Decimal::new(1, 2) // 0.01
}

/// Amendment detection threshold for amount changes.
pub fn amendment_tolerance() -> Decimal {
    Decimal::new(1, 2) // 0.01
}

/// Relative amount tolerance when matching a transaction to a schedule.
pub fn scheduled_amount_tolerance() -> Decimal {
    Decimal::new(2, 1) // 0.2
}

/// Relative amount tolerance when matching a settled transaction to a pending one.
pub fn pending_amount_tolerance() -> Decimal {
    Decimal::new(3, 1) // 0.3
}

/// Date tolerance (days) when matching a transaction to a schedule.
pub const SCHEDULED_DATE_TOLERANCE_DAYS: i64 = 5;

/// Date tolerance (days) when matching a settled transaction to a pending one.
pub const PENDING_DATE_TOLERANCE_DAYS: i64 = 5;

/// Minimum word length considered when comparing descriptions.
pub const DESCRIPTION_TOKEN_MIN_LEN: usize = 3;

/// Trailing window fetched on steady-state syncs.
pub const SYNC_WINDOW_DAYS: i64 = 7;

/// Bounds on the history depth fetched on an account's first sync.
pub const INITIAL_SYNC_MIN_DAYS: u32 = 1;
pub const INITIAL_SYNC_MAX_DAYS: u32 = 30;

/// Cooldown between provider refresh triggers for one account.
pub const REFRESH_COOLDOWN_SECS: i64 = 3600;

/// Fixed Monday anchoring the global fortnightly grid. Every user's
/// fortnight boundaries sit a whole number of fortnights from this date,
/// so the 14-day grid never drifts with setup time.
pub fn fortnight_epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).expect("valid epoch date")
}
