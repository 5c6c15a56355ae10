//! Tests for recurrence math and the schedule matcher.

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    use crate::scheduled::{
        advance_to_next_due, calculate_next_due, matches_scheduled, Frequency,
    };

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_future_start_date_is_returned_unchanged() {
        let today = date(2025, 1, 9);
        let start = date(2025, 2, 1);
        assert_eq!(
            calculate_next_due(start, Frequency::Weekly, 1, today),
            start
        );
        // Idempotent: running it again changes nothing.
        assert_eq!(
            calculate_next_due(start, Frequency::Weekly, 1, today),
            calculate_next_due(start, Frequency::Weekly, 1, today)
        );
    }

    #[test]
    fn test_past_start_steps_forward_until_after_today() {
        let today = date(2025, 1, 9);
        // Weekly from Dec 5: Dec 5, 12, 19, 26, Jan 2, Jan 9 -> Jan 16.
        assert_eq!(
            calculate_next_due(date(2024, 12, 5), Frequency::Weekly, 1, today),
            date(2025, 1, 16)
        );
        // A due date equal to today is not "next"; it must be strictly after.
        assert_eq!(
            calculate_next_due(date(2025, 1, 2), Frequency::Weekly, 1, today),
            date(2025, 1, 16)
        );
    }

    #[test]
    fn test_monthly_steps_by_calendar_months() {
        let today = date(2025, 3, 10);
        // Month-end starts clamp at each short month and stay clamped
        // (Jan 31 2024 -> Feb 29 -> ... -> Feb 28 2025 -> Mar 28).
        assert_eq!(
            calculate_next_due(date(2024, 1, 31), Frequency::Monthly, 1, today),
            date(2025, 3, 28)
        );
        // Large intervals stay coarse: monthly x 6 from 2020 lands on the grid.
        assert_eq!(
            calculate_next_due(date(2020, 1, 15), Frequency::Monthly, 6, today),
            date(2025, 7, 15)
        );
    }

    #[test]
    fn test_yearly_and_custom_frequencies() {
        let today = date(2025, 1, 9);
        assert_eq!(
            calculate_next_due(date(2023, 6, 1), Frequency::Yearly, 1, today),
            date(2025, 6, 1)
        );
        // Custom treats the interval as a day count.
        assert_eq!(
            advance_to_next_due(date(2025, 1, 9), Frequency::Custom, 10),
            date(2025, 1, 19)
        );
    }

    #[test]
    fn test_fortnightly_advance_is_fourteen_days() {
        assert_eq!(
            advance_to_next_due(date(2025, 1, 9), Frequency::Fortnightly, 1),
            date(2025, 1, 23)
        );
        assert_eq!(
            advance_to_next_due(date(2025, 1, 9), Frequency::Weekly, 2),
            date(2025, 1, 23)
        );
    }

    #[test]
    fn test_matcher_accepts_within_both_tolerances() {
        let outcome = matches_scheduled(dec!(-95), date(2025, 1, 11), dec!(-100), date(2025, 1, 9));
        assert!(outcome.matches);
        assert_eq!(outcome.amount_diff, dec!(5));
        assert_eq!(outcome.days_diff, 2);
    }

    #[test]
    fn test_matcher_rejects_amount_outside_twenty_percent() {
        let outcome = matches_scheduled(dec!(-79), date(2025, 1, 9), dec!(-100), date(2025, 1, 9));
        assert!(!outcome.matches);
        assert_eq!(outcome.amount_diff, dec!(21));
    }

    #[test]
    fn test_matcher_rejects_date_beyond_five_days() {
        let outcome = matches_scheduled(dec!(-100), date(2025, 1, 15), dec!(-100), date(2025, 1, 9));
        assert!(!outcome.matches);
        assert_eq!(outcome.days_diff, 6);
    }

    #[test]
    fn test_matcher_compares_magnitudes_across_signs() {
        // An expense matched against a schedule recorded as a positive amount.
        let outcome = matches_scheduled(dec!(-100), date(2025, 1, 9), dec!(100), date(2025, 1, 9));
        assert!(outcome.matches);
    }

    #[test]
    fn test_match_then_advance_leaves_short_recurrences_unmatched() {
        // Once a weekly schedule advances, the same transaction date sits
        // 7 days from the new due date - outside the 5-day tolerance.
        let tx_date = date(2025, 1, 9);
        let due = date(2025, 1, 9);
        assert!(matches_scheduled(dec!(-50), tx_date, dec!(-50), due).matches);
        let advanced = advance_to_next_due(due, Frequency::Weekly, 1);
        assert!(!matches_scheduled(dec!(-50), tx_date, dec!(-50), advanced).matches);
    }
}
