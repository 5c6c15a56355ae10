//! Budget cycle period computation.
//!
//! Given a cycle type and a start anchor, these functions compute the
//! bounding dates of the cycle containing a reference date. Out-of-range
//! anchors are a caller validation responsibility (see the settings
//! service); nothing here errors.

use chrono::{Datelike, Days, Months, NaiveDate};

use crate::constants::fortnight_epoch;
use crate::settings::CycleType;

/// First day of the cycle containing `reference`.
pub fn period_start(cycle: CycleType, start_day: u32, reference: NaiveDate) -> NaiveDate {
    match cycle {
        CycleType::Weekly => weekly_start(start_day, reference),
        CycleType::Fortnightly => fortnightly_start(start_day, reference),
        CycleType::Monthly => monthly_start(start_day, reference),
    }
}

/// Last day of the cycle containing `reference`.
pub fn period_end(cycle: CycleType, start_day: u32, reference: NaiveDate) -> NaiveDate {
    let start = period_start(cycle, start_day, reference);
    match cycle {
        CycleType::Weekly => start + Days::new(6),
        CycleType::Fortnightly => start + Days::new(13),
        CycleType::Monthly => {
            let next_month = start + Months::new(1);
            let next_start = with_clamped_day(next_month.year(), next_month.month(), start_day);
            next_start - Days::new(1)
        }
    }
}

/// Most recent date on or before `reference` whose day-of-week equals
/// `start_day` (0 = Sunday .. 6 = Saturday).
fn weekly_start(start_day: u32, reference: NaiveDate) -> NaiveDate {
    let dow = reference.weekday().num_days_from_sunday();
    let back = (dow + 7 - start_day) % 7;
    reference - Days::new(back as u64)
}

/// Weekly rule, parity-checked against a fixed Monday epoch.
///
/// Counting elapsed whole weeks from the epoch to the weekly candidate and
/// shifting back a week when the count is odd pins every user to the same
/// non-drifting 14-day grid, regardless of when they configured the cycle.
fn fortnightly_start(start_day: u32, reference: NaiveDate) -> NaiveDate {
    let candidate = weekly_start(start_day, reference);
    let elapsed_days = (candidate - fortnight_epoch()).num_days();
    let elapsed_weeks = elapsed_days.div_euclid(7);
    if elapsed_weeks.rem_euclid(2) == 1 {
        candidate - Days::new(7)
    } else {
        candidate
    }
}

/// Start-day occurrence in the reference month, falling back to last month
/// when the reference sits before it. The anchor is clamped to each month's
/// length, so day 31 anchors to Feb 28/29 in February.
fn monthly_start(start_day: u32, reference: NaiveDate) -> NaiveDate {
    let this_month = with_clamped_day(reference.year(), reference.month(), start_day);
    if reference >= this_month {
        this_month
    } else {
        let previous = reference - Months::new(1);
        with_clamped_day(previous.year(), previous.month(), start_day)
    }
}

fn with_clamped_day(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_else(|| {
        // Day exceeds the month's length; use the month's last day.
        let first = NaiveDate::from_ymd_opt(year, month, 1)
            .expect("month is always 1..=12 here");
        (first + Months::new(1)) - Days::new(1)
    })
}
