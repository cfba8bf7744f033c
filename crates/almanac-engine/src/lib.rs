//! # almanac-engine
//!
//! Calendar and solar-time computation for a personal daily almanac.
//!
//! The engine answers the date questions a morning digest needs: which
//! holidays and personal events are coming up, when the next leap second
//! falls, whether daylight saving time is in effect, and when the sun
//! crosses the twilight thresholds today. Every query takes "now", the local
//! timezone and the observer location as explicit parameters.
//!
//! ## Modules
//!
//! - [`date_math`]: Gregorian dates, overflow normalization, weekday rules
//! - [`easter`]: Western Easter Sunday
//! - [`observances`]: Rule-based holiday and observance catalog
//! - [`events`]: Lookahead filtering of dated events
//! - [`zone`]: Clock and local-timezone capabilities
//! - [`leapsec`]: Leap-second table parsing and display
//! - [`summertime`]: Daylight-saving probe
//! - [`location`]: Observer location and geolocation files
//! - [`solar`]: Dawn, dusk, noon, golden/blue hours, day and night lengths
//! - [`error`]: Error types

pub mod date_math;
pub mod easter;
pub mod error;
pub mod events;
pub mod leapsec;
pub mod location;
pub mod observances;
pub mod solar;
pub mod summertime;
pub mod zone;

pub use date_math::{nth_weekday_of_month, normalize, weekday_on_or_after, CalendarDate};
pub use easter::{easter, easter_date};
pub use error::{AlmanacError, Result};
pub use events::{filter_observances, filter_soon, DateSpec, ResolvedEvent};
pub use leapsec::{
    leap_seconds, parse_table, read_table, to_display_strings, LeapSecondAnnouncement, Slot,
    Timestamp,
};
pub use location::Location;
pub use observances::{Catalog, CatalogEntry, Observance, Rule};
pub use solar::{
    band_hours, elevations, hours, lengths, solar_day, Band, BandHours, DayNightLengths,
    ElevationModel, NoaaModel, Season, SolarDay,
};
pub use summertime::{is_summer_time, DstResult};
pub use zone::{Clock, FixedClock, LocalZone, SystemClock};
