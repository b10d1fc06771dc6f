//! Period arithmetic for stepping a recurrence forward.
//!
//! Month and year steps roll over instead of clamping: adding one month to
//! Jan 31 targets "Feb 31", which is read as Feb 1 plus 30 days and lands on
//! Mar 3 (Mar 2 in a leap year). The time of day is always kept.

use chrono::{Datelike, Days, NaiveDate};

use super::rule::Frequency;
use crate::event::Instant;

/// Step `current` forward by `interval` periods of `freq`.
///
/// Returns `None` when the result is outside chrono's calendar.
pub fn advance(current: Instant, freq: Frequency, interval: u32) -> Option<Instant> {
    let interval = u64::from(interval);
    match freq {
        Frequency::Daily => current.checked_add_days(Days::new(interval)),
        Frequency::Weekly => current.checked_add_days(Days::new(7 * interval)),
        Frequency::Monthly => add_months_rolling(current, i64::try_from(interval).ok()?),
        Frequency::Yearly => {
            add_months_rolling(current, i64::try_from(interval).ok()?.checked_mul(12)?)
        }
    }
}

/// Add `months` to `instant`, rolling a day-of-month overflow into the next month.
pub fn add_months_rolling(instant: Instant, months: i64) -> Option<Instant> {
    let date = instant.date();
    let total = i64::from(date.year()) * 12 + i64::from(date.month0()) + months;

    let year = i32::try_from(total.div_euclid(12)).ok()?;
    let month0 = u32::try_from(total.rem_euclid(12)).ok()?;

    let first = NaiveDate::from_ymd_opt(year, month0 + 1, 1)?;
    let target = first.checked_add_days(Days::new(u64::from(date.day0())))?;

    Some(target.and_time(instant.time()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32) -> Instant {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap()
    }

    #[test]
    fn test_month_overflow_rolls_into_next_month() {
        assert_eq!(add_months_rolling(at(2025, 1, 31), 1), Some(at(2025, 3, 3)));
        assert_eq!(add_months_rolling(at(2024, 1, 31), 1), Some(at(2024, 3, 2)));
        assert_eq!(add_months_rolling(at(2025, 3, 31), 1), Some(at(2025, 5, 1)));
    }

    #[test]
    fn test_month_add_without_overflow_keeps_day() {
        assert_eq!(add_months_rolling(at(2025, 1, 15), 1), Some(at(2025, 2, 15)));
        assert_eq!(add_months_rolling(at(2025, 11, 15), 3), Some(at(2026, 2, 15)));
        assert_eq!(add_months_rolling(at(2025, 3, 15), -3), Some(at(2024, 12, 15)));
    }

    #[test]
    fn test_leap_day_yearly_rolls_to_march() {
        assert_eq!(
            advance(at(2024, 2, 29), Frequency::Yearly, 1),
            Some(at(2025, 3, 1))
        );
        assert_eq!(
            advance(at(2024, 2, 29), Frequency::Yearly, 4),
            Some(at(2028, 2, 29))
        );
    }

    #[test]
    fn test_daily_and_weekly_steps() {
        assert_eq!(advance(at(2025, 12, 30), Frequency::Daily, 3), Some(at(2026, 1, 2)));
        assert_eq!(advance(at(2025, 1, 6), Frequency::Weekly, 2), Some(at(2025, 1, 20)));
    }

    #[test]
    fn test_overflow_past_calendar_end_is_none() {
        let last = NaiveDate::MAX.and_hms_opt(0, 0, 0).unwrap();
        assert_eq!(advance(last, Frequency::Daily, 1), None);
        assert_eq!(advance(last, Frequency::Monthly, 1), None);
    }
}
