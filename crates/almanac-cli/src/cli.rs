use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand, ValueEnum};

/// Largest `--day-offset` accepted, about a century either way.
const MAX_DAY_OFFSET: i64 = 36_500;

/// Calendar and solar-time sections of a personal daily almanac.
#[derive(Parser)]
#[command(
    name = "almanac",
    version,
    about = "Calendar and solar-time sections of a personal daily almanac"
)]
pub struct Cli {
    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Path to TOML configuration file [default: ~/.config/almanac/almanac.toml].
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// IANA timezone, overriding the config file, TZ and the system zone.
    #[arg(long, global = true)]
    pub timezone: Option<String>,

    /// Pretend the current time is this RFC 3339 instant.
    #[arg(long, global = true, value_parser = parse_instant)]
    pub now: Option<DateTime<Utc>>,

    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand)]
pub enum Command {
    /// Observances and personal events coming up soon.
    Events(WindowArgs),
    /// Public holidays coming up soon.
    Holidays(WindowArgs),
    /// Leap seconds from a local leap-second table.
    LeapSeconds(LeapSecondArgs),
    /// Whether daylight saving time is in effect.
    SummerTime(SummerTimeArgs),
    /// Dawn, dusk, sunrise, sunset and solar noon.
    Solar(DayArgs),
    /// Golden or blue hour windows.
    Hours(HoursArgs),
    /// Day and night lengths at each twilight threshold.
    Lengths(DayArgs),
    /// Every section at once; unavailable sections are left out.
    Summary(DayArgs),
}

/// Arguments for the `events` and `holidays` subcommands.
#[derive(clap::Args)]
pub struct WindowArgs {
    /// Lookahead window in days, overriding `window_days` from config.
    #[arg(short, long)]
    pub days: Option<i64>,

    /// Only commonly celebrated observances.
    #[arg(long)]
    pub only_common: bool,
}

/// Arguments for the `leap-seconds` subcommand.
#[derive(clap::Args)]
pub struct LeapSecondArgs {
    /// Path to `leapsec.dat`, overriding `leap_second_table` from config.
    #[arg(short, long)]
    pub table: Option<PathBuf>,

    /// List every announcement instead of the upcoming ones.
    #[arg(long)]
    pub all: bool,

    /// Show clock times in UTC rather than local time.
    #[arg(long)]
    pub utc: bool,

    /// Include the date in the rendered text.
    #[arg(long)]
    pub with_date: bool,

    /// Lookahead window in days, overriding `window_days` from config.
    #[arg(short, long)]
    pub days: Option<i64>,
}

/// Arguments for the `summer-time` subcommand.
#[derive(clap::Args)]
pub struct SummerTimeArgs {
    /// Days from today; 0 is today.
    #[arg(
        long,
        default_value_t = 0,
        allow_hyphen_values = true,
        value_parser = clap::value_parser!(i64).range(-MAX_DAY_OFFSET..=MAX_DAY_OFFSET)
    )]
    pub day_offset: i64,

    /// Local wall-clock time to check, HH:MM or HH:MM:SS.
    #[arg(long, default_value = "12:00:00")]
    pub time: String,
}

/// Arguments for the solar subcommands.
#[derive(clap::Args)]
pub struct DayArgs {
    /// Days from today; 0 is today.
    #[arg(
        long,
        default_value_t = 0,
        allow_hyphen_values = true,
        value_parser = clap::value_parser!(i64).range(-MAX_DAY_OFFSET..=MAX_DAY_OFFSET)
    )]
    pub day_offset: i64,

    /// Observer latitude, overriding config and geolocation files.
    #[arg(long, requires = "longitude", allow_hyphen_values = true)]
    pub latitude: Option<f64>,

    /// Observer longitude, overriding config and geolocation files.
    #[arg(long, requires = "latitude", allow_hyphen_values = true)]
    pub longitude: Option<f64>,
}

/// Arguments for the `hours` subcommand.
#[derive(clap::Args)]
pub struct HoursArgs {
    #[command(flatten)]
    pub day: DayArgs,

    /// Elevation band.
    #[arg(long, value_enum, default_value_t = BandArg::Golden)]
    pub band: BandArg,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum BandArg {
    Golden,
    Blue,
}

fn parse_instant(s: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| format!("expected an RFC 3339 timestamp: {e}"))
}
