//! Leap-second history from an IERS/USNO-style `leapsec.dat` table.
//!
//! The table lists cumulative TAI−UTC offsets with the date each became
//! effective:
//!
//! ```text
//!  1972 JAN  1 =JD 2441317.5  TAI-UTC=  10.0       S + (MJD - 41317.) X 0.0      S
//!  1972 JUL  1 =JD 2441499.5  TAI-UTC=  11.0       S + (MJD - 41317.) X 0.0      S
//! ```
//!
//! Each row is turned into an announcement for the last UTC minute before
//! its effective date, carrying the *change* in offset from the previous
//! row. The oldest row has no predecessor and is dropped, as are rows whose
//! offset did not change. Parsing is all-or-nothing: one malformed row
//! invalidates the whole table.

use std::fmt;
use std::path::Path;

use serde::Serialize;
use tracing::{debug, warn};

use crate::date_math::{normalize, CalendarDate};
use crate::error::AlmanacError;
use crate::zone::LocalZone;

const MONTHS: [&str; 12] = [
    "JAN", "FEB", "MAR", "APR", "MAY", "JUN", "JUL", "AUG", "SEP", "OCT", "NOV", "DEC",
];

// ── Types ───────────────────────────────────────────────────────────────────

/// A wall-clock minute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Timestamp {
    pub date: CalendarDate,
    pub hour: u32,
    pub minute: u32,
}

impl Timestamp {
    /// Shift by a UTC offset in seconds, carrying into adjacent days.
    fn shifted(self, offset_seconds: i32) -> Self {
        let minutes = i64::from(self.hour * 60 + self.minute)
            + i64::from(offset_seconds).div_euclid(60);
        Self {
            date: self.date.add_days(minutes.div_euclid(1440)),
            hour: (minutes.rem_euclid(1440) / 60) as u32,
            minute: (minutes.rem_euclid(60)) as u32,
        }
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:02}:{:02}", self.date, self.hour, self.minute)
    }
}

/// Scheduling slot of an announcement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Slot {
    /// End of June or December.
    Primary,
    /// End of March or September.
    Secondary,
    /// Any other time.
    OutOfBand,
}

impl Slot {
    fn suffix(self) -> &'static str {
        match self {
            Slot::Primary => "",
            Slot::Secondary => "; secondary slot",
            Slot::OutOfBand => "; out-of-band",
        }
    }
}

/// One change of TAI−UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LeapSecondAnnouncement {
    /// Last UTC minute before the change takes effect.
    pub utc: Timestamp,
    /// The same minute in local time.
    pub local: Timestamp,
    /// Seconds inserted (positive) or removed (negative).
    pub delta_seconds: i64,
    pub slot: Slot,
}

/// A table row before delta reconstruction.
#[derive(Debug, Clone, Copy)]
struct Row {
    utc: Timestamp,
    slot: Slot,
    offset: i64,
}

// ── Parsing ─────────────────────────────────────────────────────────────────

/// Parse a leap-second table.
///
/// # Errors
///
/// Returns [`AlmanacError::LeapSecondTable`] if any data row is malformed or
/// the rows are not in chronological order.
pub fn parse_table(
    text: &str,
    zone: &LocalZone,
) -> Result<Vec<LeapSecondAnnouncement>, AlmanacError> {
    let rows = text
        .lines()
        .skip_while(|line| !line.starts_with(char::is_whitespace))
        .map(collapse_spaces)
        .filter(|line| !line.is_empty())
        .map(|line| parse_row(&line))
        .collect::<Result<Vec<_>, _>>()?;

    if let Some(pair) = rows.windows(2).find(|pair| pair[0].utc >= pair[1].utc) {
        return Err(AlmanacError::LeapSecondTable(format!(
            "rows out of order: {} is not before {}",
            pair[0].utc, pair[1].utc
        )));
    }

    // Each row's delta is its offset minus the preceding row's; the oldest
    // row has nothing to compare against and does not survive.
    let announcements = rows
        .windows(2)
        .map(|pair| (pair[1], pair[1].offset - pair[0].offset))
        .filter(|(_, delta)| *delta != 0)
        .map(|(row, delta_seconds)| {
            Ok(LeapSecondAnnouncement {
                utc: row.utc,
                local: to_local(row.utc, zone)?,
                delta_seconds,
                slot: row.slot,
            })
        })
        .collect::<Result<Vec<_>, AlmanacError>>()?;

    debug!(
        rows = rows.len(),
        announcements = announcements.len(),
        "parsed leap-second table"
    );
    Ok(announcements)
}

/// Parse a table, treating any failure as "no data".
pub fn leap_seconds(text: &str, zone: &LocalZone) -> Option<Vec<LeapSecondAnnouncement>> {
    match parse_table(text, zone) {
        Ok(announcements) => Some(announcements),
        Err(e) => {
            warn!(error = %e, "leap-second table unavailable");
            None
        }
    }
}

/// Read and parse a local copy of the table, treating any failure as "no data".
pub fn read_table(path: &Path, zone: &LocalZone) -> Option<Vec<LeapSecondAnnouncement>> {
    match std::fs::read_to_string(path) {
        Ok(text) => leap_seconds(&text, zone),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "cannot read leap-second table");
            None
        }
    }
}

/// Single spaces only, with `= ` and `=JD ` glued to their values.
fn collapse_spaces(line: &str) -> String {
    line.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .replace("= ", "=")
        .replace("=JD ", "=JD")
}

fn parse_row(line: &str) -> Result<Row, AlmanacError> {
    let malformed = |what: &str| AlmanacError::LeapSecondTable(format!("{what} in row '{line}'"));
    let tokens: Vec<&str> = line.split(' ').collect();
    if tokens.len() < 4 {
        return Err(malformed("too few columns"));
    }

    let year = tokens[0]
        .parse::<i32>()
        .map_err(|_| malformed("bad year"))?;
    let month = MONTHS
        .iter()
        .position(|m| m.eq_ignore_ascii_case(tokens[1]))
        .map(|i| i as u32 + 1)
        .ok_or_else(|| malformed("bad month"))?;
    let day = tokens[2].parse::<u32>().map_err(|_| malformed("bad day"))?;
    CalendarDate::new(year, month, day).map_err(|_| malformed("nonexistent date"))?;

    let offset_field = tokens[3..]
        .iter()
        .find(|t| t.starts_with("TAI-UTC=") || t.starts_with("UTC-TAI="))
        .ok_or_else(|| malformed("no TAI-UTC= or UTC-TAI= field"))?;
    let (name, value) = offset_field
        .split_once('=')
        .ok_or_else(|| malformed("bad offset field"))?;
    // Only the integer part counts; pre-1972 rows carry fractional drift terms.
    let whole = value
        .split('.')
        .next()
        .unwrap_or_default()
        .parse::<i64>()
        .map_err(|_| malformed("bad offset value"))?;
    let offset = if name == "UTC-TAI" { -whole } else { whole };

    // Effective from 00:00 on the listed day, so the event is the minute before.
    let date = normalize(year, month as i32, i64::from(day) - 1);
    let slot = match (day, date.month()) {
        (1, 6 | 12) => Slot::Primary,
        (1, 3 | 9) => Slot::Secondary,
        _ => Slot::OutOfBand,
    };

    Ok(Row {
        utc: Timestamp {
            date,
            hour: 23,
            minute: 59,
        },
        slot,
        offset,
    })
}

/// Convert a UTC minute to local time.
///
/// The local date is first estimated with the standard offset; the offset
/// actually in effect on that date is then probed and applied.
fn to_local(utc: Timestamp, zone: &LocalZone) -> Result<Timestamp, AlmanacError> {
    let standard = zone.offsets(utc.date.year()).standard;
    let estimate = utc.shifted(standard.local_minus_utc());
    let offset = zone.offset_on(estimate.date)?;
    Ok(utc.shifted(offset.local_minus_utc()))
}

// ── Display ─────────────────────────────────────────────────────────────────

/// Render announcements as `(text, local date)` pairs for [`crate::events::filter_soon`].
///
/// Inserted seconds are listed as `hh:mm:60`, `hh:mm:61`, …; removed seconds
/// as the struck-through `\sout{hh:mm:59}` counting down from the end of the
/// minute. The clock reading is local or UTC per `use_local`; the anchor
/// date is always the local date.
pub fn to_display_strings(
    announcements: &[LeapSecondAnnouncement],
    use_local: bool,
    include_date: bool,
    include_label: bool,
) -> Vec<(String, String)> {
    let zone_label = if use_local { "local time" } else { "UTC" };
    let prefix = if include_label { "Leap seconds: " } else { "" };

    announcements
        .iter()
        .map(|a| {
            let stamp = if use_local { a.local } else { a.utc };
            let clock = format!("{:02}:{:02}", stamp.hour, stamp.minute);
            let seconds: Vec<String> = if a.delta_seconds > 0 {
                (0..a.delta_seconds)
                    .map(|n| format!("{clock}:{}", 60 + n))
                    .collect()
            } else {
                (0..-a.delta_seconds)
                    .rev()
                    .map(|n| format!("\\sout{{{clock}:{}}}", 59 - n))
                    .collect()
            };
            let date = if include_date {
                format!("{} ", stamp.date)
            } else {
                String::new()
            };
            let text = format!(
                "{prefix}{date}{} ({zone_label}{})",
                seconds.join(", "),
                a.slot.suffix()
            );
            (text, a.local.date.to_string())
        })
        .collect()
}

// ── Tests ───────────────────────────────────────────────────────────────────
