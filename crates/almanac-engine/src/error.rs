//! Error types for almanac-engine operations.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AlmanacError {
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Invalid time of day: {0}")]
    InvalidTime(String),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Nonexistent local time: {0}")]
    NonexistentLocalTime(String),

    #[error("Malformed leap-second table: {0}")]
    LeapSecondTable(String),

    #[error("No location set (tried {0})")]
    NoLocation(String),

    #[error("Invalid location: {0}")]
    InvalidLocation(String),

    #[error("Solar computation failed: {0}")]
    Solar(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AlmanacError>;
