//! Lookahead filtering of dated events.
//!
//! Events arrive as `(payload, date)` pairs where the date is either a full
//! `YYYY-MM-DD` date or a bare `MM-DD` month-day. A bare date is tried in
//! the current year and again in the following one, so a January date is
//! still found when the query is made late in December.

use chrono::{DateTime, TimeZone};
use serde::Serialize;
use tracing::debug;

use crate::date_math::{is_leap_year, CalendarDate};
use crate::error::AlmanacError;
use crate::observances::Observance;

/// The date part of an event, before year disambiguation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateSpec {
    Full(CalendarDate),
    Bare { month: u32, day: u32 },
}

impl DateSpec {
    /// Parse `YYYY-MM-DD` or `MM-DD`.
    ///
    /// # Errors
    ///
    /// Returns [`AlmanacError::InvalidDate`] for any other shape, or for a
    /// month-day that exists in no year.
    pub fn parse(s: &str) -> Result<Self, AlmanacError> {
        let s = s.trim();
        match s.split('-').count() {
            2 => {
                let invalid = || AlmanacError::InvalidDate(format!("'{s}': expected MM-DD"));
                let (m, d) = s.split_once('-').ok_or_else(invalid)?;
                if m.len() != 2 || d.len() != 2 {
                    return Err(invalid());
                }
                let month = m.parse::<u32>().map_err(|_| invalid())?;
                let day = d.parse::<u32>().map_err(|_| invalid())?;
                // Validate against a leap year so that 02-29 is accepted.
                CalendarDate::new(2000, month, day)?;
                Ok(DateSpec::Bare { month, day })
            }
            _ => s.parse().map(DateSpec::Full),
        }
    }

    /// The concrete date in `year`, if the month-day exists then.
    fn in_year(month: u32, day: u32, year: i32) -> Option<CalendarDate> {
        if month == 2 && day == 29 && !is_leap_year(year) {
            return None;
        }
        CalendarDate::new(year, month, day).ok()
    }
}

impl From<CalendarDate> for DateSpec {
    fn from(date: CalendarDate) -> Self {
        DateSpec::Full(date)
    }
}

/// An event placed relative to "now".
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedEvent<T> {
    pub payload: T,
    /// Whole local calendar days until the event; 0 means today.
    pub days_until: i64,
    pub date: CalendarDate,
}

/// Keep the events occurring within `window_days` of `now`, nearest first.
///
/// `days_until` is counted in local calendar days of `now`'s timezone, so an
/// event tomorrow is 1 day away whether it is 00:05 or 23:55 today. Events
/// with `days_until` outside `0..window_days` are dropped. Ties keep input
/// order, with next-year candidates of bare dates after all input events.
///
/// # Errors
///
/// Returns [`AlmanacError::InvalidDate`] if any date string is malformed.
///
/// # Examples
///
/// ```
/// use almanac_engine::events::filter_soon;
/// use chrono::TimeZone;
/// use chrono_tz::Europe::Stockholm;
///
/// let now = Stockholm.with_ymd_and_hms(2029, 12, 28, 9, 0, 0).unwrap();
/// let soon = filter_soon(vec![("A", "01-01"), ("B", "2030-06-15")], 10, &now).unwrap();
/// assert_eq!(soon.len(), 1);
/// assert_eq!(soon[0].days_until, 4);
/// assert_eq!(soon[0].date.to_string(), "2030-01-01");
/// ```
pub fn filter_soon<T, S, I, Tz>(
    events: I,
    window_days: i64,
    now: &DateTime<Tz>,
) -> Result<Vec<ResolvedEvent<T>>, AlmanacError>
where
    I: IntoIterator<Item = (T, S)>,
    S: AsRef<str>,
    T: Clone,
    Tz: TimeZone,
{
    let specs = events
        .into_iter()
        .map(|(payload, date)| DateSpec::parse(date.as_ref()).map(|spec| (payload, spec)))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(filter_specs(specs, window_days, now))
}

/// [`filter_soon`] for observances, which already carry concrete dates.
pub fn filter_observances<Tz: TimeZone>(
    observances: Vec<Observance>,
    window_days: i64,
    now: &DateTime<Tz>,
) -> Vec<ResolvedEvent<String>> {
    let specs = observances
        .into_iter()
        .map(|o| (o.label, DateSpec::Full(o.date)))
        .collect();
    filter_specs(specs, window_days, now)
}

/// Core of [`filter_soon`] over already-parsed date specs.
pub fn filter_specs<T, Tz>(
    events: Vec<(T, DateSpec)>,
    window_days: i64,
    now: &DateTime<Tz>,
) -> Vec<ResolvedEvent<T>>
where
    T: Clone,
    Tz: TimeZone,
{
    let today = CalendarDate::from(now.date_naive());
    let year = today.year();
    let total = events.len();

    let mut next_year = Vec::new();
    let mut candidates = Vec::with_capacity(total);
    for (payload, spec) in events {
        match spec {
            DateSpec::Full(date) => candidates.push((payload, Some(date))),
            DateSpec::Bare { month, day } => {
                next_year.push((payload.clone(), DateSpec::in_year(month, day, year + 1)));
                candidates.push((payload, DateSpec::in_year(month, day, year)));
            }
        }
    }
    candidates.extend(next_year);

    let mut soon: Vec<ResolvedEvent<T>> = candidates
        .into_iter()
        .filter_map(|(payload, date)| {
            let date = date?;
            let days_until = today.days_until(date);
            (0..window_days)
                .contains(&days_until)
                .then_some(ResolvedEvent {
                    payload,
                    days_until,
                    date,
                })
        })
        .collect();
    soon.sort_by_key(|event| event.days_until);

    debug!(
        events = total,
        kept = soon.len(),
        window_days,
        today = %today,
        "filtered events"
    );
    soon
}

// ── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use chrono_tz::Europe::Stockholm;
    use chrono_tz::Tz;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Tz> {
        Stockholm.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    #[test]
    fn test_parse_specs() {
        assert_eq!(
            DateSpec::parse("2030-06-15").unwrap(),
            DateSpec::Full(CalendarDate::new(2030, 6, 15).unwrap())
        );
        assert_eq!(
            DateSpec::parse("01-01").unwrap(),
            DateSpec::Bare { month: 1, day: 1 }
        );
        assert!(DateSpec::parse("02-29").is_ok());
        assert!(DateSpec::parse("02-30").is_err());
        assert!(DateSpec::parse("tomorrow").is_err());
        assert!(DateSpec::parse("1-1").is_err());
    }

    #[test]
    fn test_bare_date_rolls_into_next_year() {
        let now = at(2029, 12, 28, 9, 0);
        let soon = filter_soon(vec![("A", "01-01"), ("B", "2030-06-15")], 10, &now).unwrap();
        assert_eq!(soon.len(), 1);
        assert_eq!(soon[0].payload, "A");
        assert_eq!(soon[0].days_until, 4);
        assert_eq!(soon[0].date.to_string(), "2030-01-01");
    }

    #[test]
    fn test_in_window_events_sorted_by_proximity() {
        let now = at(2029, 12, 28, 9, 0);
        let soon = filter_soon(
            vec![("B", "2030-01-05"), ("A", "01-01"), ("today", "2029-12-28")],
            10,
            &now,
        )
        .unwrap();
        let order: Vec<_> = soon.iter().map(|e| (e.payload, e.days_until)).collect();
        assert_eq!(order, vec![("today", 0), ("A", 4), ("B", 8)]);
    }

    #[test]
    fn test_window_is_half_open() {
        let now = at(2024, 5, 1, 12, 0);
        let soon = filter_soon(
            vec![("edge", "2024-05-11"), ("inside", "2024-05-10"), ("past", "2024-04-30")],
            10,
            &now,
        )
        .unwrap();
        assert_eq!(soon.len(), 1);
        assert_eq!(soon[0].payload, "inside");
        assert_eq!(soon[0].days_until, 9);
    }

    #[test]
    fn test_days_counted_in_local_calendar_days() {
        // 23:55 local: tomorrow is one day away, not zero.
        let late = at(2024, 5, 1, 23, 55);
        let soon = filter_soon(vec![("x", "2024-05-02")], 3, &late).unwrap();
        assert_eq!(soon[0].days_until, 1);

        // 22:30 UTC on May 1 is already May 2 in Stockholm.
        let utc = Utc.with_ymd_and_hms(2024, 5, 1, 22, 30, 0).unwrap();
        let soon = filter_soon(vec![("x", "2024-05-02")], 3, &utc.with_timezone(&Stockholm))
            .unwrap();
        assert_eq!(soon[0].days_until, 0);
    }

    #[test]
    fn test_ties_preserve_input_order() {
        let now = at(2024, 5, 1, 12, 0);
        let soon = filter_soon(
            vec![("first", "05-03"), ("second", "2024-05-03"), ("third", "05-03")],
            10,
            &now,
        )
        .unwrap();
        let labels: Vec<_> = soon.iter().map(|e| e.payload).collect();
        assert_eq!(labels, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_leap_day_skipped_in_common_year() {
        let now = at(2023, 2, 25, 12, 0);
        let soon = filter_soon(vec![("leap", "02-29")], 10, &now).unwrap();
        assert!(soon.is_empty());

        let now = at(2024, 2, 25, 12, 0);
        let soon = filter_soon(vec![("leap", "02-29")], 10, &now).unwrap();
        assert_eq!(soon[0].days_until, 4);
    }

    #[test]
    fn test_malformed_date_is_error() {
        let now = at(2024, 5, 1, 12, 0);
        let err = filter_soon(vec![("x", "2024-13-01")], 10, &now).unwrap_err();
        assert!(err.to_string().contains("Invalid date"), "got: {err}");
    }

    #[test]
    fn test_filter_observances() {
        let obs = vec![Observance {
            label: "Lucia".to_string(),
            date: CalendarDate::new(2024, 12, 13).unwrap(),
        }];
        let soon = filter_observances(obs, 10, &at(2024, 12, 10, 8, 0));
        assert_eq!(soon[0].payload, "Lucia");
        assert_eq!(soon[0].days_until, 3);
    }
}
