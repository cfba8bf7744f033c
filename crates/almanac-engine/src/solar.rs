//! Solar-elevation boundaries of a local day.
//!
//! The solver is generic over an [`ElevationModel`]: anything that can give
//! the sun's elevation at an instant. Crossing searches (dawn, dusk, solar
//! noon) are provided by the trait as a fixed-step scan followed by
//! bisection, so a model only has to supply the elevation itself and its
//! time-unit conversions. [`NoaaModel`] implements the NOAA solar-position
//! equations.
//!
//! All instants in results are in the caller's [`LocalZone`]. The day window
//! runs from local midnight to exactly 24 hours later.

use chrono::{DateTime, TimeDelta, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use tracing::debug;

use crate::date_math::CalendarDate;
use crate::error::AlmanacError;
use crate::location::Location;
use crate::zone::{Clock, LocalZone};

// ── Thresholds ──────────────────────────────────────────────────────────────

/// Elevation of the sun's centre at astronomical dawn and dusk, in degrees.
pub const ASTRONOMICAL_DUSK_DAWN: f64 = -18.0;
pub const NAUTICAL_DUSK_DAWN: f64 = -12.0;
pub const CIVIL_DUSK_DAWN: f64 = -6.0;
pub const SUNSET_SUNRISE: f64 = 0.0;

/// Dawn/dusk thresholds from darkest to brightest.
pub const THRESHOLDS: [f64; 4] = [
    ASTRONOMICAL_DUSK_DAWN,
    NAUTICAL_DUSK_DAWN,
    CIVIL_DUSK_DAWN,
    SUNSET_SUNRISE,
];

/// Seconds between scan samples.
const SCAN_STEP: f64 = 300.0;
/// How far a crossing search looks before giving up.
const SEARCH_SPAN: f64 = 2.0 * 86_400.0;
/// Bisection stops when the bracket is this narrow, in seconds.
const TOLERANCE: f64 = 0.5;
/// Half-width of the central difference, in seconds.
const DERIVATIVE_STEP: f64 = 1.0;
/// Offset past a found root before looking for the next one.
const ROOT_NUDGE: f64 = 60.0;

// ── ElevationModel ──────────────────────────────────────────────────────────

/// A solar-position evaluator.
///
/// Models work in their own time unit `t` (for [`NoaaModel`], Julian
/// centuries since J2000.0); [`ElevationModel::to_epoch`] and
/// [`ElevationModel::from_epoch`] convert to and from Unix seconds.
pub trait ElevationModel {
    /// Elevation of the sun's centre above the horizon, in degrees.
    fn elevation(&self, location: &Location, t: f64) -> f64;

    /// Model time to Unix seconds.
    fn to_epoch(&self, t: f64) -> f64;

    /// Unix seconds to model time.
    fn from_epoch(&self, seconds: f64) -> f64;

    /// Rate of change of the elevation, in degrees per second.
    fn elevation_derivative(&self, location: &Location, t: f64) -> f64 {
        let s = self.to_epoch(t);
        let before = self.elevation(location, self.from_epoch(s - DERIVATIVE_STEP));
        let after = self.elevation(location, self.from_epoch(s + DERIVATIVE_STEP));
        (after - before) / (2.0 * DERIVATIVE_STEP)
    }

    /// First time after `t` at which the elevation crosses `target`.
    fn future_elevation(&self, location: &Location, target: f64, t: f64) -> Option<f64> {
        crossing(
            |s| self.elevation(location, self.from_epoch(s)) - target,
            self.to_epoch(t),
            SCAN_STEP,
            SEARCH_SPAN,
        )
        .map(|s| self.from_epoch(s))
    }

    /// Last time before `t` at which the elevation crosses `target`.
    fn past_elevation(&self, location: &Location, target: f64, t: f64) -> Option<f64> {
        crossing(
            |s| self.elevation(location, self.from_epoch(s)) - target,
            self.to_epoch(t),
            -SCAN_STEP,
            SEARCH_SPAN,
        )
        .map(|s| self.from_epoch(s))
    }

    /// First time after `t` at which the elevation stops rising or falling.
    fn future_derivative_root(&self, location: &Location, t: f64) -> Option<f64> {
        crossing(
            |s| self.elevation_derivative(location, self.from_epoch(s)),
            self.to_epoch(t),
            SCAN_STEP,
            SEARCH_SPAN,
        )
        .map(|s| self.from_epoch(s))
    }
}

/// Scan from `from` in steps of `step` seconds (negative to go back in time)
/// for a sign change of `f`, then bisect the bracketing step.
fn crossing(f: impl Fn(f64) -> f64, from: f64, step: f64, span: f64) -> Option<f64> {
    let mut a = from;
    let mut fa = f(a);
    if fa == 0.0 {
        return Some(a);
    }
    let steps = (span / step.abs()).ceil() as usize;
    for _ in 0..steps {
        let b = a + step;
        let fb = f(b);
        if (fa < 0.0) != (fb < 0.0) {
            return Some(bisect(&f, a, fa, b));
        }
        a = b;
        fa = fb;
    }
    None
}

fn bisect(f: &impl Fn(f64) -> f64, mut a: f64, mut fa: f64, mut b: f64) -> f64 {
    while (b - a).abs() > TOLERANCE {
        let mid = (a + b) / 2.0;
        let fm = f(mid);
        if (fm < 0.0) == (fa < 0.0) {
            a = mid;
            fa = fm;
        } else {
            b = mid;
        }
    }
    (a + b) / 2.0
}

// ── NOAA model ──────────────────────────────────────────────────────────────

/// Unix time of J2000.0 (2000-01-01T12:00:00Z).
const J2000_UNIX: f64 = 946_728_000.0;
const SECONDS_PER_CENTURY: f64 = 36_525.0 * 86_400.0;

/// The NOAA solar-position equations, without atmospheric refraction.
///
/// Time unit: Julian centuries since J2000.0.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoaaModel;

impl NoaaModel {
    /// Solar declination in degrees.
    pub fn declination(&self, t: f64) -> f64 {
        let e = corrected_obliquity(t).to_radians();
        let lambda = apparent_longitude(t).to_radians();
        (e.sin() * lambda.sin()).asin().to_degrees()
    }

    /// Apparent minus mean solar time, in minutes.
    pub fn equation_of_time(&self, t: f64) -> f64 {
        let l0 = geometric_mean_longitude(t).to_radians();
        let m = geometric_mean_anomaly(t).to_radians();
        let e = eccentricity(t);
        let y = (corrected_obliquity(t).to_radians() / 2.0).tan().powi(2);
        let radians = y * (2.0 * l0).sin() - 2.0 * e * m.sin()
            + 4.0 * e * y * m.sin() * (2.0 * l0).cos()
            - 0.5 * y * y * (4.0 * l0).sin()
            - 1.25 * e * e * (2.0 * m).sin();
        4.0 * radians.to_degrees()
    }

    /// Whether `location` is in its summer half-year at `at`.
    pub fn season(&self, location: &Location, at: DateTime<Utc>) -> Season {
        let declination = self.declination(self.from_epoch(epoch_seconds(&at)));
        let summer = if location.latitude < 0.0 {
            declination < 0.0
        } else {
            declination > 0.0
        };
        if summer {
            Season::Summer
        } else {
            Season::Winter
        }
    }

    /// Whether the sun both rises and sets at `location` around `at`,
    /// as opposed to midnight sun or polar night.
    pub fn has_sunrise_and_sunset(&self, location: &Location, at: DateTime<Utc>) -> bool {
        let declination = self.declination(self.from_epoch(epoch_seconds(&at)));
        location.latitude.abs() < 90.0 - declination.abs()
    }

    /// The next time the declination changes sign.
    pub fn next_equinox(&self, after: DateTime<Utc>) -> Option<DateTime<Utc>> {
        crossing(
            |s| self.declination(self.from_epoch(s)),
            epoch_seconds(&after),
            6.0 * 3600.0,
            370.0 * 86_400.0,
        )
        .and_then(utc_instant)
    }

    /// The next extreme of the declination.
    pub fn next_solstice(&self, after: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let slope = |s: f64| {
            self.declination(self.from_epoch(s + 3600.0))
                - self.declination(self.from_epoch(s - 3600.0))
        };
        crossing(slope, epoch_seconds(&after), 6.0 * 3600.0, 370.0 * 86_400.0)
            .and_then(utc_instant)
    }
}

impl ElevationModel for NoaaModel {
    fn elevation(&self, location: &Location, t: f64) -> f64 {
        let utc_minutes = self.to_epoch(t).rem_euclid(86_400.0) / 60.0;
        let true_solar = utc_minutes + self.equation_of_time(t) + 4.0 * location.longitude;
        let hour_angle = (true_solar / 4.0 - 180.0).to_radians();
        let latitude = location.latitude.to_radians();
        let declination = self.declination(t).to_radians();
        let cos_zenith = latitude.sin() * declination.sin()
            + latitude.cos() * declination.cos() * hour_angle.cos();
        90.0 - cos_zenith.clamp(-1.0, 1.0).acos().to_degrees()
    }

    fn to_epoch(&self, t: f64) -> f64 {
        J2000_UNIX + t * SECONDS_PER_CENTURY
    }

    fn from_epoch(&self, seconds: f64) -> f64 {
        (seconds - J2000_UNIX) / SECONDS_PER_CENTURY
    }
}

fn geometric_mean_longitude(t: f64) -> f64 {
    (280.46646 + t * (36000.76983 + t * 0.0003032)).rem_euclid(360.0)
}

fn geometric_mean_anomaly(t: f64) -> f64 {
    357.52911 + t * (35999.05029 - 0.0001537 * t)
}

fn eccentricity(t: f64) -> f64 {
    0.016708634 - t * (0.000042037 + 0.0000001267 * t)
}

fn equation_of_centre(t: f64) -> f64 {
    let m = geometric_mean_anomaly(t).to_radians();
    m.sin() * (1.914602 - t * (0.004817 + 0.000014 * t))
        + (2.0 * m).sin() * (0.019993 - 0.000101 * t)
        + (3.0 * m).sin() * 0.000289
}

fn apparent_longitude(t: f64) -> f64 {
    let true_longitude = geometric_mean_longitude(t) + equation_of_centre(t);
    let omega = (125.04 - 1934.136 * t).to_radians();
    true_longitude - 0.00569 - 0.00478 * omega.sin()
}

fn corrected_obliquity(t: f64) -> f64 {
    let seconds = 21.448 - t * (46.815 + t * (0.00059 - t * 0.001813));
    let mean = 23.0 + (26.0 + seconds / 60.0) / 60.0;
    let omega = (125.04 - 1934.136 * t).to_radians();
    mean + 0.00256 * omega.cos()
}

/// Which half of the year a location is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    Summer,
    Winter,
}

// ── Day window ──────────────────────────────────────────────────────────────

/// The local day being examined, in both clock and epoch terms.
struct DayWindow {
    start: DateTime<Tz>,
    end: DateTime<Tz>,
    start_s: f64,
    end_s: f64,
}

impl DayWindow {
    fn new(zone: &LocalZone, date: CalendarDate) -> Result<Self, AlmanacError> {
        let start = zone.start_of_day(date)?;
        let end = start + TimeDelta::days(1);
        Ok(Self {
            start_s: epoch_seconds(&start),
            end_s: epoch_seconds(&end),
            start,
            end,
        })
    }

    /// `t` as a local instant, if it falls inside the window.
    fn clip<M: ElevationModel + ?Sized>(
        &self,
        model: &M,
        zone: &LocalZone,
        t: Option<f64>,
    ) -> Option<DateTime<Tz>> {
        let s = model.to_epoch(t?);
        if (self.start_s..=self.end_s).contains(&s) {
            local_instant(zone, s)
        } else {
            None
        }
    }

    /// The local instant of the day's highest elevation, held inside the
    /// window. Falls back to the window midpoint.
    fn peak<M: ElevationModel + ?Sized>(
        &self,
        model: &M,
        location: &Location,
        zone: &LocalZone,
    ) -> DateTime<Tz> {
        let midpoint = (self.start_s + self.end_s) / 2.0;
        let s = solar_noon(model, location, model.from_epoch(self.start_s))
            .map_or(midpoint, |(t, _)| model.to_epoch(t))
            .clamp(self.start_s, self.end_s);
        local_instant(zone, s).unwrap_or(self.start + (self.end - self.start) / 2)
    }
}

fn epoch_seconds<Z: chrono::TimeZone>(dt: &DateTime<Z>) -> f64 {
    dt.timestamp() as f64 + f64::from(dt.timestamp_subsec_nanos()) * 1e-9
}

fn utc_instant(seconds: f64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(seconds.round() as i64, 0)
}

fn local_instant(zone: &LocalZone, seconds: f64) -> Option<DateTime<Tz>> {
    utc_instant(seconds).map(|dt| dt.with_timezone(&zone.tz()))
}

// ── SolarDay ────────────────────────────────────────────────────────────────

/// Solar-elevation boundaries of one local day.
///
/// `dawns` and `dusks` are indexed like [`THRESHOLDS`]: astronomical,
/// nautical, civil, then sunrise/sunset. A boundary the sun does not cross
/// inside the window is `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct SolarDay {
    pub window_start: DateTime<Tz>,
    pub window_end: DateTime<Tz>,
    /// Elevation at solar noon, in degrees.
    pub noon_elevation: f64,
    pub dawns: [Option<DateTime<Tz>>; 4],
    pub solar_noon: DateTime<Tz>,
    pub dusks: [Option<DateTime<Tz>>; 4],
}

impl SolarDay {
    /// The nine boundaries in chronological order: astronomical, nautical and
    /// civil dawn, sunrise, solar noon, sunset, civil, nautical and
    /// astronomical dusk.
    pub fn as_array(&self) -> [Option<DateTime<Tz>>; 9] {
        let [ad, nd, cd, sr] = self.dawns;
        let [ak, nk, ck, ss] = self.dusks;
        [ad, nd, cd, sr, Some(self.solar_noon), ss, ck, nk, ak]
    }

    /// [`SolarDay::as_array`] formatted as `YYYY-MM-DD HH:MM:SS` local time.
    pub fn to_local_strings(&self) -> [Option<String>; 9] {
        self.as_array()
            .map(|t| t.map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string()))
    }
}

/// Boundaries of the local day `day_offset` days from today.
///
/// # Errors
///
/// Returns [`AlmanacError::Solar`] if no solar noon can be found, which only
/// happens with a model whose elevation never turns, and
/// [`AlmanacError::InvalidDate`] if `day_offset` exceeds
/// [`MAX_DAY_SHIFT`](crate::date_math::MAX_DAY_SHIFT).
pub fn elevations<M: ElevationModel + ?Sized>(
    model: &M,
    location: &Location,
    zone: &LocalZone,
    clock: &(impl Clock + ?Sized),
    day_offset: i64,
) -> Result<SolarDay, AlmanacError> {
    let date = zone.today(clock).checked_add_days(day_offset)?;
    solar_day(model, location, zone, date)
}

/// Boundaries of the local day `date`.
///
/// # Errors
///
/// See [`elevations`].
pub fn solar_day<M: ElevationModel + ?Sized>(
    model: &M,
    location: &Location,
    zone: &LocalZone,
    date: CalendarDate,
) -> Result<SolarDay, AlmanacError> {
    let window = DayWindow::new(zone, date)?;
    let t0 = model.from_epoch(window.start_s);
    let t1 = model.from_epoch(window.end_s);

    let dawns = THRESHOLDS
        .map(|target| window.clip(model, zone, model.future_elevation(location, target, t0)));
    let dusks = THRESHOLDS
        .map(|target| window.clip(model, zone, model.past_elevation(location, target, t1)));

    let (noon, noon_elevation) = solar_noon(model, location, t0)
        .ok_or_else(|| AlmanacError::Solar(format!("no solar noon found on {date}")))?;
    let solar_noon = local_instant(zone, model.to_epoch(noon))
        .ok_or_else(|| AlmanacError::Solar(format!("solar noon on {date} is out of range")))?;

    debug!(
        %date,
        window_start = %window.start,
        %solar_noon,
        noon_elevation,
        "computed solar day"
    );
    Ok(SolarDay {
        window_start: window.start,
        window_end: window.end,
        noon_elevation,
        dawns,
        solar_noon,
        dusks,
    })
}

/// The first turning point after `t0` and the one after it are the day's
/// noon and midnight in some order; the higher one is noon.
fn solar_noon<M: ElevationModel + ?Sized>(
    model: &M,
    location: &Location,
    t0: f64,
) -> Option<(f64, f64)> {
    let first = model.future_derivative_root(location, t0)?;
    let after = model.from_epoch(model.to_epoch(first) + ROOT_NUDGE);
    let candidates = [Some(first), model.future_derivative_root(location, after)];
    candidates
        .into_iter()
        .flatten()
        .map(|t| (t, model.elevation(location, t)))
        .fold(None, |best: Option<(f64, f64)>, candidate| match best {
            Some(b) if b.1 >= candidate.1 => Some(b),
            _ => Some(candidate),
        })
}

// ── Golden and blue hours ───────────────────────────────────────────────────

/// An elevation band of photographic interest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Band {
    /// Sun between −4° and 6°.
    Golden,
    /// Sun between −6° and −4°.
    Blue,
}

impl Band {
    /// Lower and upper elevation in degrees.
    pub fn range(self) -> (f64, f64) {
        match self {
            Band::Golden => (-4.0, 6.0),
            Band::Blue => (-6.0, -4.0),
        }
    }
}

/// A span of local time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Window {
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
}

impl Window {
    fn ordered(a: DateTime<Tz>, b: DateTime<Tz>) -> Self {
        if a <= b {
            Self { start: a, end: b }
        } else {
            Self { start: b, end: a }
        }
    }

    pub fn duration(&self) -> TimeDelta {
        self.end - self.start
    }
}

/// When the sun is inside a band during one local day.
#[derive(Debug, Clone, PartialEq)]
pub struct BandHours {
    pub band: Band,
    pub morning: Option<Window>,
    pub evening: Option<Window>,
}

impl BandHours {
    pub fn total(&self) -> TimeDelta {
        [self.morning, self.evening]
            .iter()
            .flatten()
            .fold(TimeDelta::zero(), |total, window| total + window.duration())
    }
}

/// The morning and evening `band` windows of the local day `day_offset` days
/// from today.
///
/// # Errors
///
/// Returns [`AlmanacError::InvalidDate`] if `day_offset` exceeds
/// [`MAX_DAY_SHIFT`](crate::date_math::MAX_DAY_SHIFT), or an error if the
/// local day cannot be placed in the zone.
pub fn hours<M: ElevationModel + ?Sized>(
    model: &M,
    location: &Location,
    zone: &LocalZone,
    clock: &(impl Clock + ?Sized),
    band: Band,
    day_offset: i64,
) -> Result<BandHours, AlmanacError> {
    let date = zone.today(clock).checked_add_days(day_offset)?;
    band_hours(model, location, zone, band, date)
}

/// [`hours`] for an explicit local date.
///
/// The morning runs from the first crossing of the band's lower edge to the
/// first crossing of its upper edge; the evening from the last crossing of the
/// upper edge to the last crossing of the lower edge. A missing beginning
/// defaults to the start of the day and a missing ending to its end, except
/// that when the sun rises into the band and sets out of it without reaching
/// the upper edge, the morning ends and the evening begins at the day's peak.
/// If the sun crosses neither edge all day, the whole day is one morning
/// window when the sun sits inside the band, and there are no windows
/// otherwise.
///
/// # Errors
///
/// See [`hours`].
pub fn band_hours<M: ElevationModel + ?Sized>(
    model: &M,
    location: &Location,
    zone: &LocalZone,
    band: Band,
    date: CalendarDate,
) -> Result<BandHours, AlmanacError> {
    let window = DayWindow::new(zone, date)?;
    let t0 = model.from_epoch(window.start_s);
    let t1 = model.from_epoch(window.end_s);
    let (low, high) = band.range();

    let rising = (
        window.clip(model, zone, model.future_elevation(location, low, t0)),
        window.clip(model, zone, model.future_elevation(location, high, t0)),
    );
    let setting = (
        window.clip(model, zone, model.past_elevation(location, high, t1)),
        window.clip(model, zone, model.past_elevation(location, low, t1)),
    );

    // A sun that enters the band but never reaches its upper edge turns
    // around at its peak; both sub-windows meet there.
    let both_sides = rising != (None, None) && setting != (None, None);
    let peak = (both_sides && (rising.1.is_none() || setting.0.is_none()))
        .then(|| window.peak(model, location, zone));

    let sub_window = |edges: (Option<DateTime<Tz>>, Option<DateTime<Tz>>),
                      default_begin: DateTime<Tz>,
                      default_end: DateTime<Tz>| match edges {
        (None, None) => None,
        (begin, end) => Some(Window::ordered(
            begin.unwrap_or(default_begin),
            end.unwrap_or(default_end),
        )),
    };

    let (morning, evening) = match (rising, setting) {
        ((None, None), (None, None)) => {
            let midpoint = model.from_epoch((window.start_s + window.end_s) / 2.0);
            let elevation = model.elevation(location, midpoint);
            let full = (low..=high).contains(&elevation).then_some(Window {
                start: window.start,
                end: window.end,
            });
            (full, None)
        }
        (rising, setting) => (
            sub_window(rising, window.start, peak.unwrap_or(window.end)),
            sub_window(setting, peak.unwrap_or(window.start), window.end),
        ),
    };

    debug!(%date, ?band, ?morning, ?evening, "computed band hours");
    Ok(BandHours {
        band,
        morning,
        evening,
    })
}

// ── Day and night lengths ───────────────────────────────────────────────────

/// Durations of light and darkness per threshold, indexed like
/// [`THRESHOLDS`].
///
/// `day[i]` is the time the sun spends above `THRESHOLDS[i]` today;
/// `night[i]` is the time from today's dusk at that threshold to
/// tomorrow's dawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayNightLengths {
    pub day: [TimeDelta; 4],
    pub night: [TimeDelta; 4],
}

impl DayNightLengths {
    /// Astronomical, nautical and civil day, the day proper, then the night
    /// proper, civil, nautical and astronomical night. With
    /// `noon_placeholder`, an empty slot sits between the two halves so the
    /// row lines up with [`SolarDay::as_array`].
    pub fn as_row(&self, noon_placeholder: bool) -> Vec<Option<TimeDelta>> {
        let mut row: Vec<Option<TimeDelta>> = self.day.iter().copied().map(Some).collect();
        if noon_placeholder {
            row.push(None);
        }
        row.extend(self.night.iter().rev().copied().map(Some));
        row
    }
}

/// Day and night lengths from two consecutive [`SolarDay`]s.
///
/// A missing dawn counts from the start of its day and a missing dusk until
/// the end of its day. When the sun crosses a threshold neither way, today's
/// noon elevation decides whether the whole day is light or dark.
pub fn lengths(today: &SolarDay, tomorrow: &SolarDay) -> DayNightLengths {
    let full = today.window_end - today.window_start;
    let mut day = [TimeDelta::zero(); 4];
    let mut night = [TimeDelta::zero(); 4];

    for (i, threshold) in THRESHOLDS.iter().enumerate() {
        let light_all_day = today.noon_elevation > *threshold;
        let dusk = today.dusks[i];

        day[i] = match (today.dawns[i], dusk) {
            (None, None) if light_all_day => full,
            (None, None) => TimeDelta::zero(),
            (dawn, dusk) => {
                dusk.unwrap_or(today.window_end) - dawn.unwrap_or(today.window_start)
            }
        };
        night[i] = match (dusk, tomorrow.dawns[i]) {
            (None, None) if light_all_day => TimeDelta::zero(),
            (None, None) => full,
            (dusk, dawn) => {
                dawn.unwrap_or(tomorrow.window_start) - dusk.unwrap_or(today.window_end)
            }
        };
    }

    DayNightLengths {
        day: day.map(|d| d.max(TimeDelta::zero())),
        night: night.map(|n| n.max(TimeDelta::zero())),
    }
}

/// `HH:MM` rendering of a duration, rounded down to the minute.
pub fn format_duration(duration: TimeDelta) -> String {
    let minutes = duration.num_minutes();
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

// ── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::f64::consts::TAU;

    use super::*;
    use crate::zone::FixedClock;
    use chrono::{TimeZone, Timelike};

    /// Elevation as a cosine peaking at 12:00 UTC, in Unix seconds.
    struct Sinusoid {
        mean: f64,
        amplitude: f64,
    }

    impl ElevationModel for Sinusoid {
        fn elevation(&self, _: &Location, t: f64) -> f64 {
            let phase = (t - 43_200.0).rem_euclid(86_400.0) / 86_400.0 * TAU;
            self.mean + self.amplitude * phase.cos()
        }

        fn to_epoch(&self, t: f64) -> f64 {
            t
        }

        fn from_epoch(&self, seconds: f64) -> f64 {
            seconds
        }
    }

    const TEMPERATE: Sinusoid = Sinusoid {
        mean: -10.0,
        amplitude: 50.0,
    };

    fn here() -> Location {
        Location::new(59.33, 18.07).unwrap()
    }

    fn utc() -> LocalZone {
        LocalZone::parse("UTC").unwrap()
    }

    fn clock(y: i32, m: u32, d: u32) -> FixedClock {
        FixedClock(Utc.with_ymd_and_hms(y, m, d, 8, 0, 0).unwrap())
    }

    /// Seconds after midnight at which the sinusoid rises through `target`.
    fn rise(model: &Sinusoid, target: f64) -> f64 {
        let x = ((target - model.mean) / model.amplitude).acos();
        43_200.0 - x / TAU * 86_400.0
    }

    fn seconds_of_day(t: &DateTime<Tz>) -> f64 {
        f64::from(t.num_seconds_from_midnight())
    }

    fn assert_near(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= 2.0,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_crossings_of_synthetic_day() {
        let day = elevations(&TEMPERATE, &here(), &utc(), &clock(2024, 3, 20), 0).unwrap();
        for (i, threshold) in THRESHOLDS.iter().enumerate() {
            let dawn = day.dawns[i].unwrap();
            let dusk = day.dusks[i].unwrap();
            assert_near(seconds_of_day(&dawn), rise(&TEMPERATE, *threshold));
            assert_near(seconds_of_day(&dusk), 86_400.0 - rise(&TEMPERATE, *threshold));
        }
        assert_near(seconds_of_day(&day.solar_noon), 43_200.0);
        assert!((day.noon_elevation - 40.0).abs() < 1e-6);
    }

    #[test]
    fn test_array_is_chronological() {
        let day = elevations(&TEMPERATE, &here(), &utc(), &clock(2024, 3, 20), 0).unwrap();
        let times: Vec<_> = day.as_array().into_iter().flatten().collect();
        assert_eq!(times.len(), 9);
        assert!(times.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(day.to_local_strings()[4].as_deref(), Some("2024-03-20 12:00:00"));
    }

    #[test]
    fn test_day_offset_moves_window() {
        let day = elevations(&TEMPERATE, &here(), &utc(), &clock(2024, 12, 31), 1).unwrap();
        assert_eq!(day.window_start.to_rfc3339(), "2025-01-01T00:00:00+00:00");
        assert_eq!(day.window_end.to_rfc3339(), "2025-01-02T00:00:00+00:00");
    }

    #[test]
    fn test_huge_day_offset_is_rejected() {
        let now = clock(2024, 3, 20);
        let err = elevations(&TEMPERATE, &here(), &utc(), &now, i64::MAX).unwrap_err();
        assert!(matches!(err, AlmanacError::InvalidDate(_)), "{err}");
        let err = hours(&TEMPERATE, &here(), &utc(), &now, Band::Blue, i64::MIN).unwrap_err();
        assert!(matches!(err, AlmanacError::InvalidDate(_)), "{err}");
    }

    #[test]
    fn test_polar_day() {
        let polar = Sinusoid {
            mean: 30.0,
            amplitude: 10.0,
        };
        let now = clock(2024, 6, 21);
        let today = elevations(&polar, &here(), &utc(), &now, 0).unwrap();
        let tomorrow = elevations(&polar, &here(), &utc(), &now, 1).unwrap();
        assert!(today.dawns.iter().chain(today.dusks.iter()).all(Option::is_none));

        let lengths = lengths(&today, &tomorrow);
        assert_eq!(lengths.day, [TimeDelta::hours(24); 4]);
        assert_eq!(lengths.night, [TimeDelta::zero(); 4]);
    }

    #[test]
    fn test_polar_night() {
        let polar = Sinusoid {
            mean: -40.0,
            amplitude: 10.0,
        };
        let now = clock(2024, 12, 21);
        let today = elevations(&polar, &here(), &utc(), &now, 0).unwrap();
        let tomorrow = elevations(&polar, &here(), &utc(), &now, 1).unwrap();
        let lengths = lengths(&today, &tomorrow);
        assert_eq!(lengths.day, [TimeDelta::zero(); 4]);
        assert_eq!(lengths.night, [TimeDelta::hours(24); 4]);
    }

    #[test]
    fn test_day_and_night_fill_the_clock() {
        let now = clock(2024, 3, 20);
        let today = elevations(&TEMPERATE, &here(), &utc(), &now, 0).unwrap();
        let tomorrow = elevations(&TEMPERATE, &here(), &utc(), &now, 1).unwrap();
        let lengths = lengths(&today, &tomorrow);
        for i in 0..4 {
            let total = (lengths.day[i] + lengths.night[i]).num_seconds();
            assert!((total - 86_400).abs() <= 2, "threshold {i}: {total}");
        }
        // Brighter thresholds give shorter days.
        assert!(lengths.day.windows(2).all(|w| w[0] > w[1]));
    }

    #[test]
    fn test_row_layout() {
        let lengths = DayNightLengths {
            day: [1, 2, 3, 4].map(TimeDelta::hours),
            night: [5, 6, 7, 8].map(TimeDelta::hours),
        };
        let hours = |row: Vec<Option<TimeDelta>>| {
            row.into_iter()
                .map(|d| d.map(|d| d.num_hours()))
                .collect::<Vec<_>>()
        };
        assert_eq!(
            hours(lengths.as_row(false)),
            [1, 2, 3, 4, 8, 7, 6, 5].map(Some).to_vec()
        );
        let with_noon = hours(lengths.as_row(true));
        assert_eq!(with_noon.len(), 9);
        assert_eq!(with_noon[4], None);
    }

    #[test]
    fn test_golden_hour_on_synthetic_day() {
        let hours = hours(
            &TEMPERATE,
            &here(),
            &utc(),
            &clock(2024, 3, 20),
            Band::Golden,
            0,
        )
        .unwrap();
        let morning = hours.morning.unwrap();
        let evening = hours.evening.unwrap();
        assert_near(seconds_of_day(&morning.start), rise(&TEMPERATE, -4.0));
        assert_near(seconds_of_day(&morning.end), rise(&TEMPERATE, 6.0));
        assert_near(seconds_of_day(&evening.start), 86_400.0 - rise(&TEMPERATE, 6.0));
        assert_near(seconds_of_day(&evening.end), 86_400.0 - rise(&TEMPERATE, -4.0));

        let expected = 2.0 * (rise(&TEMPERATE, 6.0) - rise(&TEMPERATE, -4.0));
        assert_near(hours.total().num_seconds() as f64, expected);
    }

    #[test]
    fn test_blue_hour_precedes_golden_hour() {
        let now = clock(2024, 3, 20);
        let blue = hours(&TEMPERATE, &here(), &utc(), &now, Band::Blue, 0).unwrap();
        let golden = hours(&TEMPERATE, &here(), &utc(), &now, Band::Golden, 0).unwrap();
        let (blue, golden) = (blue.morning.unwrap(), golden.morning.unwrap());
        assert!((blue.end - golden.start).num_seconds().abs() <= 2);
    }

    #[test]
    fn test_golden_hour_when_sun_peaks_inside_band() {
        let low_sun = Sinusoid {
            mean: -10.0,
            amplitude: 12.0,
        };
        let hours = hours(
            &low_sun,
            &here(),
            &utc(),
            &clock(2024, 12, 21),
            Band::Golden,
            0,
        )
        .unwrap();
        let morning = hours.morning.unwrap();
        let evening = hours.evening.unwrap();
        assert!(morning.end <= evening.start, "{morning:?} overlaps {evening:?}");
        assert_near(seconds_of_day(&morning.start), rise(&low_sun, -4.0));
        assert_near(seconds_of_day(&morning.end), 43_200.0);
        assert_near(seconds_of_day(&evening.end), 86_400.0 - rise(&low_sun, -4.0));
        assert!(hours.total() <= TimeDelta::hours(24));
        assert_near(
            hours.total().num_seconds() as f64,
            86_400.0 - 2.0 * rise(&low_sun, -4.0),
        );
    }

    #[test]
    fn test_band_covering_whole_day() {
        let flat = Sinusoid {
            mean: 0.0,
            amplitude: 1.0,
        };
        let now = clock(2024, 3, 20);
        let golden = hours(&flat, &here(), &utc(), &now, Band::Golden, 0).unwrap();
        assert_eq!(golden.total(), TimeDelta::hours(24));
        assert_eq!(golden.evening, None);

        let blue = hours(&flat, &here(), &utc(), &now, Band::Blue, 0).unwrap();
        assert_eq!(blue.morning, None);
        assert_eq!(blue.total(), TimeDelta::zero());
    }

    #[test]
    fn test_noaa_midsummer_stockholm() {
        let zone = LocalZone::parse("Europe/Stockholm").unwrap();
        let date = CalendarDate::new(2024, 6, 21).unwrap();
        let day = solar_day(&NoaaModel, &here(), &zone, date).unwrap();

        assert!((53.0..55.0).contains(&day.noon_elevation), "{}", day.noon_elevation);
        assert_eq!(day.solar_noon.hour(), 12);
        assert!((40..60).contains(&day.solar_noon.minute()));

        let [astronomical, nautical, civil, sunrise] = day.dawns;
        assert_eq!(astronomical, None);
        assert_eq!(nautical, None);
        assert!(civil.is_some());
        let sunrise = sunrise.unwrap();
        assert_eq!(sunrise.hour(), 3);
        let sunset = day.dusks[3].unwrap();
        assert!((21..=22).contains(&sunset.hour()));
    }

    #[test]
    fn test_noaa_equator_equinox() {
        let equator = Location::new(0.0, 0.0).unwrap();
        let date = CalendarDate::new(2024, 3, 20).unwrap();
        let day = solar_day(&NoaaModel, &equator, &utc(), date).unwrap();
        assert!(day.noon_elevation > 88.0, "{}", day.noon_elevation);

        let length = day.dusks[3].unwrap() - day.dawns[3].unwrap();
        assert!((length.num_minutes() - 12 * 60).abs() <= 5, "{length}");
    }

    #[test]
    fn test_noaa_declination_at_solstice() {
        let model = NoaaModel;
        let june = Utc.with_ymd_and_hms(2024, 6, 20, 21, 0, 0).unwrap();
        let declination = model.declination(model.from_epoch(epoch_seconds(&june)));
        assert!((declination - 23.44).abs() < 0.05, "{declination}");
    }

    #[test]
    fn test_next_equinox_and_solstice() {
        let model = NoaaModel;
        let new_year = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

        let equinox = model.next_equinox(new_year).unwrap();
        let expected = Utc.with_ymd_and_hms(2024, 3, 20, 3, 6, 0).unwrap();
        assert!((equinox - expected).num_minutes().abs() <= 60, "{equinox}");

        let solstice = model.next_solstice(new_year).unwrap();
        let expected = Utc.with_ymd_and_hms(2024, 6, 20, 20, 51, 0).unwrap();
        assert!((solstice - expected).num_hours().abs() <= 6, "{solstice}");
    }

    #[test]
    fn test_season_and_polar_conditions() {
        let model = NoaaModel;
        let july = Utc.with_ymd_and_hms(2024, 7, 1, 12, 0, 0).unwrap();
        let sydney = Location::new(-33.87, 151.21).unwrap();
        assert_eq!(model.season(&here(), july), Season::Summer);
        assert_eq!(model.season(&sydney, july), Season::Winter);

        let svalbard = Location::new(78.22, 15.65).unwrap();
        assert!(model.has_sunrise_and_sunset(&here(), july));
        assert!(!model.has_sunrise_and_sunset(&svalbard, july));
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(TimeDelta::minutes(125)), "02:05");
        assert_eq!(format_duration(TimeDelta::hours(24)), "24:00");
        assert_eq!(format_duration(TimeDelta::seconds(59)), "00:00");
    }

    #[test]
    fn test_crossing_searches_backwards() {
        let f = |s: f64| s - 1000.0;
        let found = crossing(f, 5000.0, -SCAN_STEP, SEARCH_SPAN).unwrap();
        assert!((found - 1000.0).abs() <= TOLERANCE);
        assert_eq!(crossing(f, 5000.0, SCAN_STEP, SEARCH_SPAN), None);
    }
}
