//! Everything a command needs besides its own arguments: configuration,
//! the local timezone and the clock.

use almanac_engine::zone::{Clock, FixedClock, LocalZone, SystemClock};
use almanac_engine::Location;
use anyhow::{Context as _, Result};
use tracing::{debug, info, warn};

use crate::cli::{Cli, DayArgs};
use crate::config::AlmanacConfig;

pub struct Context {
    pub config: AlmanacConfig,
    pub zone: LocalZone,
    clock: Box<dyn Clock>,
}

impl Context {
    pub fn load(cli: &Cli) -> Result<Self> {
        let config = AlmanacConfig::load(cli.config.as_deref())?;
        let zone = resolve_zone(cli.timezone.as_deref(), config.timezone.as_deref())?;
        info!(zone = zone.name(), "timezone resolved");
        let clock: Box<dyn Clock> = match cli.now {
            Some(now) => Box::new(FixedClock(now)),
            None => Box::new(SystemClock),
        };
        Ok(Self {
            config,
            zone,
            clock,
        })
    }

    pub fn clock(&self) -> &dyn Clock {
        &*self.clock
    }

    /// Observer location: command-line flags, then config, then the
    /// geolocation files.
    pub fn location(&self, args: &DayArgs) -> Result<Location> {
        if let (Some(latitude), Some(longitude)) = (args.latitude, args.longitude) {
            return Location::new(latitude, longitude).context("invalid --latitude/--longitude");
        }
        if let Some(loc) = self.config.location {
            return Location::new(loc.latitude, loc.longitude).context("invalid [location]");
        }
        Location::discover().context("set [location] in config or pass --latitude/--longitude")
    }
}

/// Timezone precedence: `--timezone`, config `timezone`, `TZ`, then the
/// system zone.
fn resolve_zone(flag: Option<&str>, config: Option<&str>) -> Result<LocalZone> {
    if let Some(name) = flag {
        return LocalZone::parse(name).context("invalid --timezone");
    }
    if let Some(name) = config {
        return LocalZone::parse(name).context("invalid timezone in config");
    }
    if let Some(name) = std::env::var("TZ").ok().filter(|v| !v.is_empty()) {
        // POSIX allows a leading colon before a zone name.
        match LocalZone::parse(name.trim_start_matches(':')) {
            Ok(zone) => return Ok(zone),
            Err(e) => warn!(tz = %name, error = %e, "ignoring TZ"),
        }
    }
    let name = iana_time_zone::get_timezone().context("cannot determine the system timezone")?;
    debug!(%name, "using system timezone");
    LocalZone::parse(&name).context("invalid system timezone")
}
