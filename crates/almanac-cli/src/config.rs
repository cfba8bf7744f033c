use std::path::{Path, PathBuf};

use almanac_engine::events::DateSpec;
use almanac_engine::observances::{Catalog, CatalogEntry};
use almanac_engine::Location;
use anyhow::{bail, Context, Result};
use serde::Deserialize;
use tracing::{debug, info};

/// Top-level almanac configuration.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AlmanacConfig {
    /// IANA timezone name.
    #[serde(default)]
    pub timezone: Option<String>,

    /// Lookahead window for upcoming events, in days.
    #[serde(default = "default_window_days")]
    pub window_days: i64,

    /// Only list commonly celebrated observances.
    #[serde(default)]
    pub only_common: bool,

    /// Observer location; geolocation files are read when absent.
    #[serde(default)]
    pub location: Option<LocationToml>,

    /// Path to a local copy of `leapsec.dat`.
    #[serde(default)]
    pub leap_second_table: Option<PathBuf>,

    /// Personal events.
    #[serde(default, rename = "event")]
    pub events: Vec<EventToml>,

    /// Extra catalog entries, merged into the built-in observances.
    #[serde(default, rename = "observance")]
    pub observances: Vec<CatalogEntry>,
}

impl Default for AlmanacConfig {
    fn default() -> Self {
        Self {
            timezone: None,
            window_days: default_window_days(),
            only_common: false,
            location: None,
            leap_second_table: None,
            events: Vec::new(),
            observances: Vec::new(),
        }
    }
}

fn default_window_days() -> i64 {
    10
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LocationToml {
    pub latitude: f64,
    pub longitude: f64,
}

/// A personal event: `date` is `YYYY-MM-DD` or a yearly `MM-DD`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EventToml {
    pub label: String,
    pub date: String,
}

impl AlmanacConfig {
    /// Load from `explicit`, or from the default path if it exists.
    ///
    /// An explicitly named file must exist; a missing default file yields the
    /// default configuration.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => match default_path() {
                Some(path) if path.is_file() => path,
                _ => {
                    debug!("no config file, using defaults");
                    return Ok(Self::default());
                }
            },
        };

        let toml_str = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        let config: Self = toml::from_str(&toml_str)
            .with_context(|| format!("failed to parse TOML config: {}", path.display()))?;
        config.validate()?;
        info!(path = %path.display(), "config loaded");
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.window_days < 0 {
            bail!("window_days must not be negative, got {}", self.window_days);
        }
        if let Some(loc) = self.location {
            Location::new(loc.latitude, loc.longitude).context("invalid [location]")?;
        }
        for event in &self.events {
            DateSpec::parse(&event.date)
                .with_context(|| format!("invalid date for event '{}'", event.label))?;
        }
        Catalog::new(self.observances.clone())
            .validate()
            .context("invalid [[observance]] entry")?;
        Ok(())
    }
}

/// `$XDG_CONFIG_HOME/almanac/almanac.toml`, else `$HOME/.config/almanac/almanac.toml`.
fn default_path() -> Option<PathBuf> {
    let base = std::env::var_os("XDG_CONFIG_HOME")
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))?;
    Some(base.join("almanac").join("almanac.toml"))
}
