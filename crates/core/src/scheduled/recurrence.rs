//! Pure recurrence math and the schedule matcher.
//!
//! The tolerances live in `constants`; keeping these as named functions
//! (rather than thresholds inlined in the sync engine) lets them be tuned
//! or replaced with a scored model without touching orchestration code.

use chrono::{Days, Months, NaiveDate};
use rust_decimal::Decimal;

use super::scheduled_model::{Frequency, ScheduleMatch};
use crate::constants::{scheduled_amount_tolerance, SCHEDULED_DATE_TOLERANCE_DAYS};

/// First occurrence of the recurrence strictly after `today`, starting
/// from `start_date`.
///
/// A start date in the future is returned unchanged (date-only
/// comparison). Otherwise the date is stepped forward one recurrence unit
/// at a time; monthly and yearly frequencies step by calendar months and
/// years, so large intervals never degrade to per-day iteration.
pub fn calculate_next_due(
    start_date: NaiveDate,
    frequency: Frequency,
    interval: u32,
    today: NaiveDate,
) -> NaiveDate {
    if start_date > today {
        return start_date;
    }
    let mut due = start_date;
    while due <= today {
        due = advance_to_next_due(due, frequency, interval);
    }
    due
}

/// Single recurrence step from an already-due date.
///
/// Used after a successful match; never for initial seeding.
pub fn advance_to_next_due(current_due: NaiveDate, frequency: Frequency, interval: u32) -> NaiveDate {
    match frequency {
        Frequency::Weekly => current_due + Days::new(7 * interval as u64),
        Frequency::Fortnightly => current_due + Days::new(14 * interval as u64),
        Frequency::Monthly => current_due + Months::new(interval),
        Frequency::Yearly => current_due + Months::new(12 * interval),
        Frequency::Custom => current_due + Days::new(interval as u64),
    }
}

/// Evaluates a transaction against a schedule's expected amount and date.
///
/// Matches when the absolute amounts differ by no more than 20% of the
/// scheduled amount and the dates by no more than 5 days. Both diffs come
/// back regardless of the outcome, for best-match tie-breaking.
pub fn matches_scheduled(
    transaction_amount: Decimal,
    transaction_date: NaiveDate,
    scheduled_amount: Decimal,
    next_due: NaiveDate,
) -> ScheduleMatch {
    let amount_diff = (transaction_amount.abs() - scheduled_amount.abs()).abs();
    let days_diff = (transaction_date - next_due).num_days().abs();

    let matches = amount_diff <= scheduled_amount_tolerance() * scheduled_amount.abs()
        && days_diff <= SCHEDULED_DATE_TOLERANCE_DAYS;

    ScheduleMatch {
        matches,
        amount_diff,
        days_diff,
    }
}
