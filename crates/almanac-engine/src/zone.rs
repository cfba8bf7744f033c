//! Clock and local-timezone capabilities.
//!
//! Nothing in the engine reads the system clock or the process timezone
//! directly. Callers pass a [`Clock`] for "now" and a [`LocalZone`] for
//! wall-clock conversion, so every query is reproducible in tests.
//!
//! [`LocalZone::probe`] mirrors how a C library resolves a wall-clock time
//! when told explicitly which zone abbreviation applies: the wall clock is
//! converted once letting the zone decide ("guessed"), then once per fixed
//! variant (standard, daylight), and the variant that reproduces the guess
//! is the one in effect.

use chrono::{
    DateTime, Datelike, FixedOffset, NaiveDateTime, NaiveTime, Offset, TimeDelta, TimeZone, Utc,
};
use chrono_tz::{OffsetComponents, Tz};
use serde::Serialize;

use crate::date_math::CalendarDate;
use crate::error::AlmanacError;

// ── Clock ───────────────────────────────────────────────────────────────────

/// Source of the current instant.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// The operating system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock frozen at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

// ── LocalZone ───────────────────────────────────────────────────────────────

/// Which of a zone's two offsets applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneVariant {
    Standard,
    Daylight,
}

/// A zone's standard offset and, if it observes one, its daylight offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoneOffsets {
    pub standard: FixedOffset,
    pub daylight: Option<FixedOffset>,
}

impl ZoneOffsets {
    pub fn offset(&self, variant: ZoneVariant) -> FixedOffset {
        match variant {
            ZoneVariant::Standard => self.standard,
            ZoneVariant::Daylight => self.daylight.unwrap_or(self.standard),
        }
    }
}

/// The caller's local timezone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalZone {
    tz: Tz,
}

impl LocalZone {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }

    /// Parse an IANA timezone name.
    ///
    /// # Errors
    ///
    /// Returns [`AlmanacError::InvalidTimezone`] for unknown names.
    pub fn parse(name: &str) -> Result<Self, AlmanacError> {
        name.trim()
            .parse::<Tz>()
            .map(Self::new)
            .map_err(|_| AlmanacError::InvalidTimezone(format!("'{name}'")))
    }

    pub fn tz(&self) -> Tz {
        self.tz
    }

    pub fn name(&self) -> &'static str {
        self.tz.name()
    }

    /// The current instant in this zone.
    pub fn now(&self, clock: &(impl Clock + ?Sized)) -> DateTime<Tz> {
        clock.now().with_timezone(&self.tz)
    }

    /// Today's local calendar date.
    pub fn today(&self, clock: &(impl Clock + ?Sized)) -> CalendarDate {
        self.now(clock).date_naive().into()
    }

    /// Standard and daylight offsets in effect during `year`.
    ///
    /// Samples January and July so that both hemispheres' summers are seen.
    pub fn offsets(&self, year: i32) -> ZoneOffsets {
        let samples = [1, 7].map(|month| {
            let instant = Utc
                .with_ymd_and_hms(year, month, 1, 12, 0, 0)
                .single()
                .unwrap_or_else(Utc::now);
            self.tz.offset_from_utc_datetime(&instant.naive_utc())
        });
        let standard = to_fixed(samples[0].base_utc_offset());
        let daylight = samples
            .iter()
            .find(|offset| offset.dst_offset() != TimeDelta::zero())
            .map(|offset| to_fixed(offset.base_utc_offset() + offset.dst_offset()));
        ZoneOffsets { standard, daylight }
    }

    /// Convert a wall-clock time letting the zone choose the offset.
    ///
    /// Ambiguous times resolve to the earlier instant; times inside a
    /// spring-forward gap do not exist and yield `None`.
    pub fn guess(&self, local: NaiveDateTime) -> Option<DateTime<Utc>> {
        self.tz
            .from_local_datetime(&local)
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
    }

    /// Which variant reproduces the zone's own interpretation of `local`.
    pub fn probe(&self, local: NaiveDateTime) -> Option<ZoneVariant> {
        let guessed = self.guess(local)?;
        let offsets = self.offsets(local.year());
        let reproduces = |offset: FixedOffset| {
            let utc = local - TimeDelta::seconds(i64::from(offset.local_minus_utc()));
            utc.and_utc() == guessed
        };
        if reproduces(offsets.standard) {
            Some(ZoneVariant::Standard)
        } else if offsets.daylight.is_some_and(reproduces) {
            Some(ZoneVariant::Daylight)
        } else {
            None
        }
    }

    /// The UTC offset in effect at local midnight of `date`.
    ///
    /// Falls back to the standard offset when the probe is inconclusive.
    pub fn offset_on(&self, date: CalendarDate) -> Result<FixedOffset, AlmanacError> {
        let midnight = naive_midnight(date)?;
        let offsets = self.offsets(date.year());
        let variant = self.probe(midnight).unwrap_or(ZoneVariant::Standard);
        Ok(offsets.offset(variant))
    }

    /// The first instant of `date` in this zone.
    ///
    /// If midnight itself is skipped by a transition, the instant the
    /// standard offset would give is used instead.
    pub fn start_of_day(&self, date: CalendarDate) -> Result<DateTime<Tz>, AlmanacError> {
        let midnight = naive_midnight(date)?;
        Ok(match self.tz.from_local_datetime(&midnight).earliest() {
            Some(dt) => dt,
            None => {
                let standard = self.offsets(date.year()).standard;
                let utc = midnight - TimeDelta::seconds(i64::from(standard.local_minus_utc()));
                self.tz.from_utc_datetime(&utc)
            }
        })
    }
}

fn to_fixed(delta: TimeDelta) -> FixedOffset {
    i32::try_from(delta.num_seconds())
        .ok()
        .and_then(FixedOffset::east_opt)
        .unwrap_or_else(|| Utc.fix())
}

fn naive_midnight(date: CalendarDate) -> Result<NaiveDateTime, AlmanacError> {
    date.to_naive()
        .map(|d| d.and_time(NaiveTime::MIN))
        .ok_or_else(|| AlmanacError::InvalidDate(format!("{date} is outside the supported range")))
}

// ── Tests ───────────────────────────────────────────────────────────────────
