//! Weekday grid arithmetic for the booking calendar.
//!
//! The bookable grid is Monday through Friday, two periods per day, computed
//! exclusively in UTC. Saturday and Sunday are never part of the grid: they
//! are not emitted by any function here and must not be accepted as bookable
//! dates anywhere downstream.
//!
//! Week identity: a week is identified by its Monday. A date on Sunday
//! belongs to the **following** week, never the prior one.

use chrono::{Datelike, Days, NaiveDate, Weekday};

/// Number of bookable days per week (Monday through Friday).
pub const DAYS_PER_WEEK: usize = 5;

/// Returns the Monday of the week containing `date`.
///
/// Sunday maps to the following Monday; every other weekday maps back to
/// the Monday of its own week.
#[must_use]
pub fn week_start(date: NaiveDate) -> NaiveDate {
    match date.weekday() {
        Weekday::Sun => date.checked_add_days(Days::new(1)).unwrap_or(date),
        weekday => {
            let back = u64::from(weekday.number_from_monday()) - 1;
            date.checked_sub_days(Days::new(back)).unwrap_or(date)
        }
    }
}

/// Returns the five bookable days of the week containing `date`.
///
/// The input is normalized with [`week_start`] first, so any weekday
/// (including Sunday, which normalizes forward) selects a well-defined week.
#[must_use]
pub fn week_days(date: NaiveDate) -> [NaiveDate; DAYS_PER_WEEK] {
    let monday = week_start(date);
    std::array::from_fn(|i| {
        monday
            .checked_add_days(Days::new(i as u64))
            .unwrap_or(monday)
    })
}

/// Returns the Friday of the week containing `date`.
#[must_use]
pub fn week_end(date: NaiveDate) -> NaiveDate {
    week_days(date)[DAYS_PER_WEEK - 1]
}

/// Returns the Monday of the week after the one containing `date`.
#[must_use]
pub fn next_week_start(date: NaiveDate) -> NaiveDate {
    let monday = week_start(date);
    monday.checked_add_days(Days::new(7)).unwrap_or(monday)
}

/// Returns true if `date` falls on Monday through Friday.
#[must_use]
pub fn is_weekday(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_week_start_for_each_weekday() {
        // 2025-03-10 is a Monday.
        let monday = date(2025, 3, 10);
        assert_eq!(week_start(date(2025, 3, 10)), monday); // Mon
        assert_eq!(week_start(date(2025, 3, 11)), monday); // Tue
        assert_eq!(week_start(date(2025, 3, 12)), monday); // Wed
        assert_eq!(week_start(date(2025, 3, 13)), monday); // Thu
        assert_eq!(week_start(date(2025, 3, 14)), monday); // Fri
        assert_eq!(week_start(date(2025, 3, 15)), monday); // Sat
    }

    #[test]
    fn test_sunday_belongs_to_the_following_week() {
        // 2025-03-16 is a Sunday; its week's Monday is 2025-03-17.
        assert_eq!(week_start(date(2025, 3, 16)), date(2025, 3, 17));
    }

    #[test]
    fn test_week_start_is_idempotent() {
        let monday = week_start(date(2025, 7, 24));
        assert_eq!(week_start(monday), monday);
    }

    #[test]
    fn test_week_days_are_monday_through_friday() {
        let days = week_days(date(2025, 3, 12));
        assert_eq!(
            days,
            [
                date(2025, 3, 10),
                date(2025, 3, 11),
                date(2025, 3, 12),
                date(2025, 3, 13),
                date(2025, 3, 14),
            ]
        );
        for day in days {
            assert!(is_weekday(day));
        }
    }

    #[test]
    fn test_week_days_never_contain_weekend() {
        // Sweep a full year of inputs; no Saturday or Sunday may ever appear.
        let mut day = date(2025, 1, 1);
        for _ in 0..365 {
            for d in week_days(day) {
                assert!(
                    !matches!(d.weekday(), Weekday::Sat | Weekday::Sun),
                    "weekend day {d} emitted for input {day}"
                );
            }
            day = day.succ_opt().unwrap();
        }
    }

    #[test]
    fn test_week_end_is_friday() {
        assert_eq!(week_end(date(2025, 3, 12)), date(2025, 3, 14));
    }

    #[test]
    fn test_next_week_start() {
        assert_eq!(next_week_start(date(2025, 3, 12)), date(2025, 3, 17));
        // From a Sunday the "current" week is already the following one.
        assert_eq!(next_week_start(date(2025, 3, 16)), date(2025, 3, 24));
    }

    #[test]
    fn test_is_weekday() {
        assert!(is_weekday(date(2025, 3, 14))); // Fri
        assert!(!is_weekday(date(2025, 3, 15))); // Sat
        assert!(!is_weekday(date(2025, 3, 16))); // Sun
        assert!(is_weekday(date(2025, 3, 17))); // Mon
    }
}
