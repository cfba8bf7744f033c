//! Observer location for the solar queries.
//!
//! A location is either supplied directly or read from a geolocation file
//! whose first line is `"<latitude> <longitude>"` in decimal degrees.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::AlmanacError;

/// Latitude and longitude in decimal degrees, north and east positive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    /// # Errors
    ///
    /// Returns [`AlmanacError::InvalidLocation`] if either coordinate is not
    /// finite or out of range.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, AlmanacError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(AlmanacError::InvalidLocation(format!(
                "latitude {latitude} outside [-90, 90]"
            )));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(AlmanacError::InvalidLocation(format!(
                "longitude {longitude} outside [-180, 180]"
            )));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Parse `"<latitude> <longitude>"`.
    ///
    /// # Errors
    ///
    /// Returns [`AlmanacError::InvalidLocation`] unless the line holds exactly
    /// two valid coordinates.
    pub fn parse(line: &str) -> Result<Self, AlmanacError> {
        let fields: Vec<&str> = line.split_whitespace().collect();
        let [lat, lon] = fields.as_slice() else {
            return Err(AlmanacError::InvalidLocation(format!(
                "'{}': expected two numbers",
                line.trim()
            )));
        };
        let number = |s: &str| {
            s.parse::<f64>()
                .map_err(|_| AlmanacError::InvalidLocation(format!("'{s}' is not a number")))
        };
        Self::new(number(lat)?, number(lon)?)
    }

    /// The first usable location among `paths`, in order.
    ///
    /// Missing, unreadable and malformed files are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`AlmanacError::NoLocation`] if no file yields a location.
    pub fn from_paths(paths: &[PathBuf]) -> Result<Self, AlmanacError> {
        for path in paths {
            match read_first_line(path) {
                Ok(location) => {
                    debug!(path = %path.display(), ?location, "location read");
                    return Ok(location);
                }
                Err(e) => debug!(path = %path.display(), error = %e, "skipping geolocation file"),
            }
        }
        let tried = paths
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(", ");
        Err(AlmanacError::NoLocation(tried))
    }

    /// Geolocation files in lookup order: `$HOME/.config/geolocation`, then
    /// `/etc/geolocation`.
    pub fn default_paths() -> Vec<PathBuf> {
        let mut paths = Vec::with_capacity(2);
        if let Some(home) = std::env::var_os("HOME") {
            paths.push(PathBuf::from(home).join(".config").join("geolocation"));
        }
        paths.push(PathBuf::from("/etc/geolocation"));
        paths
    }

    /// [`Location::from_paths`] over [`Location::default_paths`].
    ///
    /// # Errors
    ///
    /// Returns [`AlmanacError::NoLocation`] if neither file yields a location.
    pub fn discover() -> Result<Self, AlmanacError> {
        Self::from_paths(&Self::default_paths())
    }
}

fn read_first_line(path: &Path) -> Result<Location, AlmanacError> {
    let text = std::fs::read_to_string(path)?;
    Location::parse(text.lines().next().unwrap_or_default())
}
