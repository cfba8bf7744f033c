//! Gregorian Easter Sunday.

use crate::date_math::{normalize, CalendarDate};

/// Month and day of Western (Gregorian) Easter Sunday in `year`.
///
/// Uses the anonymous Gregorian congruence (Meeus/Jones/Butcher). The result
/// is meaningful from 1583 onward; earlier years get the proleptic answer.
///
/// # Examples
///
/// ```
/// use almanac_engine::easter::easter;
///
/// assert_eq!(easter(2024), (3, 31));
/// assert_eq!(easter(2025), (4, 20));
/// ```
pub fn easter(year: i32) -> (u32, u32) {
    let a = year.rem_euclid(19);
    let b = year.div_euclid(100);
    let c = year.rem_euclid(100);
    let d = b.div_euclid(4);
    let e = b.rem_euclid(4);
    let f = (b + 8).div_euclid(25);
    let g = (b - f + 1).div_euclid(3);
    let h = (19 * a + b - d - g + 15).rem_euclid(30);
    let i = c.div_euclid(4);
    let k = c.rem_euclid(4);
    let l = (32 + 2 * e + 2 * i - h - k).rem_euclid(7);
    let m = (a + 11 * h + 22 * l).div_euclid(451);
    let n = (h + l - 7 * m + 114).div_euclid(31);
    let p = (h + l - 7 * m + 114).rem_euclid(31);
    (n as u32, p as u32 + 1)
}

/// Easter Sunday of `year` as a date.
pub fn easter_date(year: i32) -> CalendarDate {
    let (month, day) = easter(year);
    normalize(year, month as i32, i64::from(day))
}
