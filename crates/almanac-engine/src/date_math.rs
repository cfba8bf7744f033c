//! Proleptic Gregorian date arithmetic.
//!
//! [`CalendarDate`] is always normalized: no constructor or operation hands
//! out a date with an out-of-range month or day. Arbitrary day offsets are
//! absorbed by [`normalize`], which walks month by month across month and
//! year boundaries instead of assuming the overflow is small.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Serialize, Serializer};

use crate::error::AlmanacError;

/// Largest shift, in either direction, that
/// [`CalendarDate::checked_add_days`] accepts (about 2,700 years).
pub const MAX_DAY_SHIFT: i64 = 1_000_000;

const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

// ── Month lengths ───────────────────────────────────────────────────────────

/// Gregorian leap-year rule: divisible by 4, not by 100, unless by 400.
pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Number of days in `month` (1-12) of `year`.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        2 if is_leap_year(year) => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

// ── CalendarDate ────────────────────────────────────────────────────────────

/// A normalized proleptic Gregorian date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CalendarDate {
    year: i32,
    month: u32,
    day: u32,
}

impl CalendarDate {
    /// Create a date from already-valid components.
    ///
    /// # Errors
    ///
    /// Returns [`AlmanacError::InvalidDate`] if the month is outside 1-12 or
    /// the day does not exist in that month. Use [`normalize`] to roll
    /// out-of-range values into adjacent months instead.
    pub fn new(year: i32, month: u32, day: u32) -> Result<Self, AlmanacError> {
        if !(1..=12).contains(&month) {
            return Err(AlmanacError::InvalidDate(format!(
                "month {month} out of range in {year}-{month:02}-{day:02}"
            )));
        }
        let max_day = days_in_month(year, month);
        if day == 0 || day > max_day {
            return Err(AlmanacError::InvalidDate(format!(
                "day {day} out of range in {year}-{month:02}-{day:02} (max {max_day})"
            )));
        }
        Ok(Self { year, month, day })
    }

    pub fn year(self) -> i32 {
        self.year
    }

    pub fn month(self) -> u32 {
        self.month
    }

    pub fn day(self) -> u32 {
        self.day
    }

    /// Shift by a signed number of days.
    ///
    /// For offsets from user input use [`checked_add_days`](Self::checked_add_days).
    pub fn add_days(self, days: i64) -> Self {
        normalize(self.year, self.month as i32, i64::from(self.day) + days)
    }

    /// Shift by a signed number of days, rejecting shifts beyond
    /// [`MAX_DAY_SHIFT`].
    ///
    /// # Errors
    ///
    /// Returns [`AlmanacError::InvalidDate`] if `days` is out of range.
    pub fn checked_add_days(self, days: i64) -> Result<Self, AlmanacError> {
        if days.unsigned_abs() > MAX_DAY_SHIFT.unsigned_abs() {
            return Err(AlmanacError::InvalidDate(format!(
                "day offset {days} is beyond {MAX_DAY_SHIFT} days"
            )));
        }
        Ok(self.add_days(days))
    }

    /// Days since 1970-01-01 (negative before it).
    ///
    /// Computed directly rather than through `chrono`, whose `NaiveDate`
    /// does not cover every `i32` year.
    pub fn days_since_epoch(self) -> i64 {
        // Howard Hinnant's days_from_civil, years starting in March.
        let y = i64::from(self.year) - i64::from(self.month <= 2);
        let era = y.div_euclid(400);
        let yoe = y - era * 400;
        let m = i64::from(self.month);
        let doy = (153 * (if m > 2 { m - 3 } else { m + 9 }) + 2) / 5 + i64::from(self.day) - 1;
        let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
        era * 146_097 + doe - 719_468
    }

    /// Signed number of days from `self` to `other`.
    pub fn days_until(self, other: CalendarDate) -> i64 {
        other.days_since_epoch() - self.days_since_epoch()
    }

    pub fn weekday(self) -> Weekday {
        // 1970-01-01 was a Thursday.
        let index = (self.days_since_epoch() + 3).rem_euclid(7) as usize;
        WEEKDAYS[index]
    }

    /// The same date as a `chrono` date, if it lies within chrono's range.
    pub fn to_naive(self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, self.day)
    }
}

impl From<NaiveDate> for CalendarDate {
    fn from(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
            day: date.day(),
        }
    }
}

impl fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

impl FromStr for CalendarDate {
    type Err = AlmanacError;

    /// Parse a `YYYY-MM-DD` date.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || AlmanacError::InvalidDate(format!("'{s}': expected YYYY-MM-DD"));
        let mut parts = s.trim().splitn(3, '-');
        let (Some(y), Some(m), Some(d)) = (parts.next(), parts.next(), parts.next()) else {
            return Err(invalid());
        };
        if y.is_empty() || m.len() != 2 || d.len() != 2 {
            return Err(invalid());
        }
        let year = y.parse::<i32>().map_err(|_| invalid())?;
        let month = m.parse::<u32>().map_err(|_| invalid())?;
        let day = d.parse::<u32>().map_err(|_| invalid())?;
        Self::new(year, month, day)
    }
}

impl Serialize for CalendarDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// ── Normalization ───────────────────────────────────────────────────────────

/// Roll an arbitrary `(year, month, day)` triple into a valid date.
///
/// The month is folded into 1-12 first (month 13 is January of the next
/// year, month 0 December of the previous one). The day is then walked
/// backward while it is not positive, adding the length of each preceding
/// month, and forward while it exceeds the current month's length.
///
/// # Examples
///
/// ```
/// use almanac_engine::date_math::normalize;
///
/// assert_eq!(normalize(2024, 2, 30).to_string(), "2024-03-01");
/// assert_eq!(normalize(2024, 1, 0).to_string(), "2023-12-31");
/// assert_eq!(normalize(2023, 13, 1).to_string(), "2024-01-01");
/// ```
pub fn normalize(year: i32, month: i32, day: i64) -> CalendarDate {
    let mut year = year + (month - 1).div_euclid(12);
    let mut month = (month - 1).rem_euclid(12) as u32 + 1;
    let mut day = day;

    while day <= 0 {
        if month == 1 {
            month = 12;
            year -= 1;
        } else {
            month -= 1;
        }
        day += i64::from(days_in_month(year, month));
    }

    loop {
        let max_day = i64::from(days_in_month(year, month));
        if day <= max_day {
            break;
        }
        day -= max_day;
        if month == 12 {
            month = 1;
            year += 1;
        } else {
            month += 1;
        }
    }

    CalendarDate {
        year,
        month,
        day: day as u32,
    }
}

// ── Weekday anchoring ───────────────────────────────────────────────────────

/// First `target` weekday on or after `reference`, then shifted by `extra_days`.
///
/// `extra_days` reaches dates such as "the Saturday after the first Sunday
/// on or after January 1st" (`extra_days = 6`).
pub fn weekday_on_or_after(
    target: Weekday,
    reference: CalendarDate,
    extra_days: i64,
) -> CalendarDate {
    let diff = (i64::from(target.num_days_from_monday())
        - i64::from(reference.weekday().num_days_from_monday()))
    .rem_euclid(7);
    reference.add_days(diff + extra_days)
}

/// The `target` weekday in the `week`-th 7-day bucket of a month.
///
/// Buckets are counted from the 1st, so week 1 covers days 1-7, week 2
/// days 8-14 and so on. Out-of-range weeks (0, negative, or past the end)
/// roll into adjacent months rather than failing.
///
/// # Examples
///
/// ```
/// use almanac_engine::date_math::nth_weekday_of_month;
/// use chrono::Weekday;
///
/// let d = nth_weekday_of_month(Weekday::Tue, 2023, 10, 2, 0);
/// assert_eq!(d.to_string(), "2023-10-10");
/// ```
pub fn nth_weekday_of_month(
    target: Weekday,
    year: i32,
    month: u32,
    week: i64,
    extra_days: i64,
) -> CalendarDate {
    let first = normalize(year, month as i32, 1);
    let lead = (i64::from(target.num_days_from_monday())
        - i64::from(first.weekday().num_days_from_monday()))
    .rem_euclid(7);
    normalize(
        first.year,
        first.month as i32,
        1 + lead + 7 * (week - 1) + extra_days,
    )
}

// ── Tests ───────────────────────────────────────────────────────────────────
