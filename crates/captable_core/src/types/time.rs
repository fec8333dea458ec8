//! Date type and year-fraction helpers.
//!
//! This module provides:
//! - `Date`: Type-safe date wrapper around chrono::NaiveDate
//! - ACT/365F year fractions, used for cumulative-dividend accrual and
//!   holding-period returns
//!
//! # Examples
//!
//! ```
//! use captable_core::types::time::{Date, year_fraction};
//!
//! let start = Date::from_ymd(2021, 6, 1).unwrap();
//! let end = Date::from_ymd(2024, 6, 1).unwrap();
//!
//! let years = year_fraction(start, end);
//! assert!((years - 3.0).abs() < 0.01);
//! ```

use chrono::{Datelike, Local, NaiveDate};
use std::fmt;
use std::ops::Sub;
use std::str::FromStr;

use super::error::DateError;

/// Days per year under the ACT/365 Fixed convention.
const DAYS_PER_YEAR: f64 = 365.0;

/// Type-safe date wrapper around chrono::NaiveDate.
///
/// Provides ISO 8601 serialisation and standard date arithmetic. Rounds
/// and snapshots are ordered by `Date`; dividend accrual measures the
/// span between two of them.
///
/// # Examples
///
/// ```
/// use captable_core::types::time::Date;
///
/// // Create from year, month, day
/// let date = Date::from_ymd(2024, 6, 15).unwrap();
/// assert_eq!(date.year(), 2024);
///
/// // Parse from ISO 8601 string
/// let parsed: Date = "2024-06-15".parse().unwrap();
/// assert_eq!(date, parsed);
///
/// // Calculate days between dates
/// let start = Date::from_ymd(2024, 1, 1).unwrap();
/// let end = Date::from_ymd(2024, 1, 11).unwrap();
/// assert_eq!(end - start, 10);
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Date(NaiveDate);

impl Date {
    /// Creates a Date from year, month, and day components.
    ///
    /// # Arguments
    /// * `year` - Year (e.g., 2024)
    /// * `month` - Month (1-12)
    /// * `day` - Day (1-31, depending on month)
    ///
    /// # Returns
    /// `Ok(Date)` if the date is valid, `Err(DateError::InvalidDate)` otherwise.
    ///
    /// # Examples
    ///
    /// ```
    /// use captable_core::types::time::Date;
    ///
    /// let date = Date::from_ymd(2024, 2, 29).unwrap();
    /// assert!(Date::from_ymd(2023, 2, 29).is_err());
    /// ```
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Result<Self, DateError> {
        NaiveDate::from_ymd_opt(year, month, day)
            .map(Date)
            .ok_or(DateError::InvalidDate { year, month, day })
    }

    /// Returns today's date based on local system time.
    pub fn today() -> Self {
        Date(Local::now().date_naive())
    }

    /// Parses a date from ISO 8601 format string (YYYY-MM-DD).
    ///
    /// # Arguments
    /// * `s` - Date string in ISO 8601 format
    ///
    /// # Returns
    /// `Ok(Date)` if parsing succeeds, `Err(DateError::ParseError)` otherwise.
    ///
    /// # Examples
    ///
    /// ```
    /// use captable_core::types::time::Date;
    ///
    /// let date = Date::parse("2024-06-15").unwrap();
    /// assert_eq!(date.year(), 2024);
    ///
    /// assert!(Date::parse("not-a-date").is_err());
    /// ```
    pub fn parse(s: &str) -> Result<Self, DateError> {
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Date)
            .map_err(|e| DateError::ParseError(e.to_string()))
    }

    /// Returns the underlying NaiveDate.
    ///
    /// Use this method when you need access to chrono's full API.
    pub fn into_inner(self) -> NaiveDate {
        self.0
    }

    /// Returns the year component.
    pub fn year(&self) -> i32 {
        self.0.year()
    }

    /// Returns the month component (1-12).
    pub fn month(&self) -> u32 {
        self.0.month()
    }

    /// Returns the day component (1-31).
    pub fn day(&self) -> u32 {
        self.0.day()
    }

    /// Years from this date to `end` under ACT/365F.
    ///
    /// Negative when `end` precedes `self`; the sign carries direction,
    /// so callers never need to pre-sort their dates.
    ///
    /// # Examples
    ///
    /// ```
    /// use captable_core::types::time::Date;
    ///
    /// let issued = Date::from_ymd(2020, 1, 1).unwrap();
    /// let exit = Date::from_ymd(2025, 1, 1).unwrap();
    ///
    /// let held = issued.years_until(exit);
    /// assert!((held - 5.0).abs() < 0.01);
    /// assert!(exit.years_until(issued) < 0.0);
    /// ```
    pub fn years_until(&self, end: Date) -> f64 {
        (end - *self) as f64 / DAYS_PER_YEAR
    }
}

impl Sub for Date {
    type Output = i64;

    /// Returns the number of days between two dates.
    ///
    /// The result is positive if `self` is after `other`, negative otherwise.
    fn sub(self, other: Self) -> i64 {
        (self.0 - other.0).num_days()
    }
}

impl FromStr for Date {
    type Err = DateError;

    /// Parses a date from ISO 8601 format string (YYYY-MM-DD).
    fn from_str(s: &str) -> Result<Self, DateError> {
        Date::parse(s)
    }
}

impl fmt::Display for Date {
    /// Formats the date as ISO 8601 (YYYY-MM-DD).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

/// ACT/365F year fraction between two dates.
///
/// Free-function form of [`Date::years_until`] for call sites that read
/// better with both dates visible.
///
/// # Examples
///
/// ```
/// use captable_core::types::time::{Date, year_fraction};
///
/// let start = Date::from_ymd(2024, 1, 1).unwrap();
/// let end = Date::from_ymd(2024, 7, 1).unwrap();
///
/// let yf = year_fraction(start, end);
/// assert!((yf - 182.0 / 365.0).abs() < 1e-12);
/// ```
pub fn year_fraction(start: Date, end: Date) -> f64 {
    start.years_until(end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_date_from_ymd_valid() {
        let date = Date::from_ymd(2024, 6, 15).unwrap();
        assert_eq!(date.year(), 2024);
        assert_eq!(date.month(), 6);
        assert_eq!(date.day(), 15);
    }

    #[test]
    fn test_date_from_ymd_leap_year() {
        let date = Date::from_ymd(2024, 2, 29).unwrap();
        assert_eq!(date.month(), 2);
        assert_eq!(date.day(), 29);
    }

    #[test]
    fn test_date_from_ymd_invalid() {
        assert!(Date::from_ymd(2024, 2, 30).is_err());
        assert!(Date::from_ymd(2024, 13, 1).is_err());
        assert!(Date::from_ymd(2023, 2, 29).is_err());
    }

    #[test]
    fn test_date_parse_valid() {
        let date = Date::parse("2024-06-15").unwrap();
        assert_eq!(date.year(), 2024);
        assert_eq!(date.month(), 6);
        assert_eq!(date.day(), 15);
    }

    #[test]
    fn test_date_parse_invalid() {
        assert!(Date::parse("not-a-date").is_err());
        assert!(Date::parse("2024/06/15").is_err());
    }

    #[test]
    fn test_date_from_str() {
        let date: Date = "2024-06-15".parse().unwrap();
        assert_eq!(date.year(), 2024);
    }

    #[test]
    fn test_date_display() {
        let date = Date::from_ymd(2024, 6, 15).unwrap();
        assert_eq!(format!("{}", date), "2024-06-15");
    }

    #[test]
    fn test_date_subtraction() {
        let start = Date::from_ymd(2024, 1, 1).unwrap();
        let end = Date::from_ymd(2024, 1, 11).unwrap();

        assert_eq!(end - start, 10);
        assert_eq!(start - end, -10);
    }

    #[test]
    fn test_date_ordering() {
        let earlier = Date::from_ymd(2024, 1, 1).unwrap();
        let later = Date::from_ymd(2024, 12, 31).unwrap();

        assert!(earlier < later);
        assert!(later > earlier);
    }

    #[test]
    fn test_years_until_known_span() {
        // 2024-01-01 to 2024-07-01 is 182 days
        let start = Date::from_ymd(2024, 1, 1).unwrap();
        let end = Date::from_ymd(2024, 7, 1).unwrap();

        assert_relative_eq!(start.years_until(end), 182.0 / 365.0, epsilon = 1e-12);
    }

    #[test]
    fn test_years_until_negative_when_reversed() {
        let start = Date::from_ymd(2024, 7, 1).unwrap();
        let end = Date::from_ymd(2024, 1, 1).unwrap();

        assert_relative_eq!(start.years_until(end), -182.0 / 365.0, epsilon = 1e-12);
    }

    #[test]
    fn test_years_until_same_date_is_zero() {
        let date = Date::from_ymd(2024, 6, 15).unwrap();
        assert_eq!(date.years_until(date), 0.0);
    }

    #[test]
    fn test_year_fraction_matches_method() {
        let start = Date::from_ymd(2021, 3, 1).unwrap();
        let end = Date::from_ymd(2023, 9, 1).unwrap();

        assert_relative_eq!(
            year_fraction(start, end),
            start.years_until(end),
            epsilon = 1e-15
        );
    }

    #[test]
    fn test_date_serde_roundtrip() {
        let date = Date::from_ymd(2024, 6, 15).unwrap();
        let json = serde_json::to_string(&date).unwrap();
        assert_eq!(json, "\"2024-06-15\"");

        let parsed: Date = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, date);
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        fn date_strategy() -> impl Strategy<Value = Date> {
            (2000i32..2100i32, 1u32..13u32, 1u32..29u32)
                .prop_filter_map("valid date", |(y, m, d)| Date::from_ymd(y, m, d).ok())
        }

        proptest! {
            #[test]
            fn test_years_until_antisymmetric(a in date_strategy(), b in date_strategy()) {
                prop_assert!((a.years_until(b) + b.years_until(a)).abs() < 1e-12);
            }

            #[test]
            fn test_years_until_additive(a in date_strategy(), b in date_strategy(), c in date_strategy()) {
                let mut dates = [a, b, c];
                dates.sort();
                let [d1, d2, d3] = dates;

                let direct = d1.years_until(d3);
                let via_mid = d1.years_until(d2) + d2.years_until(d3);
                prop_assert!((direct - via_mid).abs() < 1e-10);
            }
        }
    }
}
