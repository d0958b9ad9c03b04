//! Billing period calculations.
//!
//! Accounts are charged on the first day of each calendar month; purchases
//! made mid-month are prorated over the days left in the current month,
//! counting today.

use chrono::{Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Returns the next charge date: the first day of the following calendar
/// month. December wraps to January of the next year.
#[must_use]
pub fn next_charge_date(today: NaiveDate) -> NaiveDate {
    let (year, month) = if today.month() == 12 {
        (today.year() + 1, 1)
    } else {
        (today.year(), today.month() + 1)
    };
    // Day 1 of a valid month always exists.
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(today)
}

/// Returns the number of days left in the current calendar month, inclusive
/// of today.
#[must_use]
pub fn days_left_in_period(today: NaiveDate) -> u32 {
    let last_day = next_charge_date(today).pred_opt().map_or_else(|| today.day(), |d| d.day());
    last_day - today.day() + 1
}

/// Date context for a purchase flow, captured once at dialog open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingSchedule {
    /// First day of the next billing period.
    pub next_charge_date: NaiveDate,
    /// Days remaining in the current period, inclusive of today.
    pub days_left: u32,
}

impl BillingSchedule {
    /// Builds the schedule for an arbitrary date.
    #[must_use]
    pub fn for_date(today: NaiveDate) -> Self {
        Self { next_charge_date: next_charge_date(today), days_left: days_left_in_period(today) }
    }

    /// Builds the schedule for the current wall-clock date.
    #[must_use]
    pub fn current() -> Self {
        Self::for_date(Utc::now().date_naive())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn test_next_charge_date_mid_year() {
        assert_eq!(next_charge_date(date(2024, 6, 15)), date(2024, 7, 1));
    }

    #[test]
    fn test_next_charge_date_first_of_month() {
        assert_eq!(next_charge_date(date(2024, 3, 1)), date(2024, 4, 1));
    }

    #[test]
    fn test_next_charge_date_december_wraps_year() {
        assert_eq!(next_charge_date(date(2024, 12, 31)), date(2025, 1, 1));
        assert_eq!(next_charge_date(date(2024, 12, 1)), date(2025, 1, 1));
    }

    #[test]
    fn test_days_left_counts_today() {
        // June has 30 days; on June 30 exactly one chargeable day remains.
        assert_eq!(days_left_in_period(date(2024, 6, 30)), 1);
    }

    #[test]
    fn test_days_left_full_month() {
        assert_eq!(days_left_in_period(date(2024, 6, 1)), 30);
        assert_eq!(days_left_in_period(date(2024, 1, 1)), 31);
    }

    #[test]
    fn test_days_left_february_leap_year() {
        assert_eq!(days_left_in_period(date(2024, 2, 28)), 2);
        assert_eq!(days_left_in_period(date(2023, 2, 28)), 1);
    }

    #[test]
    fn test_schedule_for_date() {
        let schedule = BillingSchedule::for_date(date(2024, 11, 20));
        assert_eq!(schedule.next_charge_date, date(2024, 12, 1));
        assert_eq!(schedule.days_left, 11);
    }
}
