//! Is daylight saving time in effect at a given local wall-clock time?

use chrono::NaiveTime;
use serde::Serialize;
use tracing::debug;

use crate::date_math::CalendarDate;
use crate::error::AlmanacError;
use crate::zone::{Clock, LocalZone, ZoneVariant};

/// Outcome of a daylight-saving probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DstResult {
    pub in_effect: bool,
    /// The local date that was probed.
    pub date: CalendarDate,
}

/// Parse `HH:MM` or `HH:MM:SS`.
///
/// # Errors
///
/// Returns [`AlmanacError::InvalidTime`] for anything else.
pub fn parse_time_of_day(s: &str) -> Result<NaiveTime, AlmanacError> {
    let s = s.trim();
    let format = match s.matches(':').count() {
        1 => "%H:%M",
        2 => "%H:%M:%S",
        _ => return Err(AlmanacError::InvalidTime(format!("'{s}': expected HH:MM[:SS]"))),
    };
    NaiveTime::parse_from_str(s, format)
        .map_err(|e| AlmanacError::InvalidTime(format!("'{s}': {e}")))
}

/// Whether daylight saving time applies at `check_time` on the local day
/// `day_offset` days from today.
///
/// A wall-clock time that does not exist (inside a spring-forward gap)
/// is reported as not in effect, as is any time in a zone without daylight
/// saving.
///
/// # Errors
///
/// Returns [`AlmanacError::InvalidTime`] if `check_time` is malformed, and
/// [`AlmanacError::InvalidDate`] if `day_offset` exceeds
/// [`MAX_DAY_SHIFT`](crate::date_math::MAX_DAY_SHIFT).
///
/// # Examples
///
/// ```
/// use almanac_engine::summertime::is_summer_time;
/// use almanac_engine::zone::{FixedClock, LocalZone};
/// use chrono::{TimeZone, Utc};
///
/// let clock = FixedClock(Utc.with_ymd_and_hms(2024, 7, 1, 10, 0, 0).unwrap());
/// let zone = LocalZone::parse("Europe/Stockholm").unwrap();
/// assert!(is_summer_time(&clock, &zone, 0, "12:00").unwrap().in_effect);
/// ```
pub fn is_summer_time(
    clock: &(impl Clock + ?Sized),
    zone: &LocalZone,
    day_offset: i64,
    check_time: &str,
) -> Result<DstResult, AlmanacError> {
    let time = parse_time_of_day(check_time)?;
    let today = zone.today(clock);
    let date = today.checked_add_days(day_offset)?;
    let wall = date
        .to_naive()
        .ok_or_else(|| AlmanacError::InvalidDate(format!("{date} is outside the supported range")))?
        .and_time(time);

    let variant = zone.probe(wall);
    debug!(zone = zone.name(), %wall, ?variant, "daylight saving probe");
    Ok(DstResult {
        in_effect: variant == Some(ZoneVariant::Daylight),
        date,
    })
}
