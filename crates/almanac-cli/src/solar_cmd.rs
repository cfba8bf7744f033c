//! `solar`, `hours` and `lengths` commands.

use almanac_engine::solar::{
    band_hours, format_duration, lengths, solar_day, Band, BandHours, NoaaModel, Window,
};
use almanac_engine::{CalendarDate, Location};
use anyhow::Result;
use serde_json::{json, Map, Value};
use tracing::info_span;

use crate::cli::{BandArg, DayArgs, HoursArgs};
use crate::context::Context;
use crate::output::{local_time, print_json};

const BOUNDARIES: [&str; 9] = [
    "astronomical_dawn",
    "nautical_dawn",
    "civil_dawn",
    "sunrise",
    "solar_noon",
    "sunset",
    "civil_dusk",
    "nautical_dusk",
    "astronomical_dusk",
];

const LENGTHS: [&str; 8] = [
    "astronomical_day",
    "nautical_day",
    "civil_day",
    "day",
    "night",
    "civil_night",
    "nautical_night",
    "astronomical_night",
];

pub fn run_solar(ctx: &Context, args: &DayArgs) -> Result<()> {
    let _cmd = info_span!("solar").entered();
    let location = ctx.location(args)?;
    print_json(&solar_section(ctx, &location, args.day_offset)?)
}

pub fn run_hours(ctx: &Context, args: &HoursArgs) -> Result<()> {
    let _cmd = info_span!("hours").entered();
    let location = ctx.location(&args.day)?;
    let band = match args.band {
        BandArg::Golden => Band::Golden,
        BandArg::Blue => Band::Blue,
    };
    print_json(&hours_section(ctx, &location, band, args.day.day_offset)?)
}

pub fn run_lengths(ctx: &Context, args: &DayArgs) -> Result<()> {
    let _cmd = info_span!("lengths").entered();
    let location = ctx.location(args)?;
    print_json(&lengths_section(ctx, &location, args.day_offset)?)
}

fn target_date(ctx: &Context, day_offset: i64) -> Result<CalendarDate> {
    Ok(ctx.zone.today(ctx.clock()).checked_add_days(day_offset)?)
}

/// Boundary times plus the season and the next equinox and solstice.
pub fn solar_section(ctx: &Context, location: &Location, day_offset: i64) -> Result<Value> {
    let date = target_date(ctx, day_offset)?;
    let day = solar_day(&NoaaModel, location, &ctx.zone, date)?;

    let times: Map<String, Value> = BOUNDARIES
        .iter()
        .zip(day.to_local_strings())
        .map(|(name, time)| (name.to_string(), json!(time)))
        .collect();

    let now = ctx.clock().now();
    let local = |t: Option<chrono::DateTime<chrono::Utc>>| {
        t.map(|t| local_time(&t.with_timezone(&ctx.zone.tz())))
    };
    Ok(json!({
        "date": date,
        "latitude": location.latitude,
        "longitude": location.longitude,
        "noon_elevation": day.noon_elevation,
        "times": times,
        "season": NoaaModel.season(location, now),
        "has_sunrise_and_sunset": NoaaModel.has_sunrise_and_sunset(location, now),
        "next_equinox": local(NoaaModel.next_equinox(now)),
        "next_solstice": local(NoaaModel.next_solstice(now)),
    }))
}

pub fn hours_section(
    ctx: &Context,
    location: &Location,
    band: Band,
    day_offset: i64,
) -> Result<Value> {
    let date = target_date(ctx, day_offset)?;
    let hours: BandHours = band_hours(&NoaaModel, location, &ctx.zone, band, date)?;
    let window = |w: Option<Window>| {
        w.map(|w| {
            json!({
                "start": local_time(&w.start),
                "end": local_time(&w.end),
                "duration": format_duration(w.duration()),
            })
        })
    };
    Ok(json!({
        "date": date,
        "band": hours.band,
        "morning": window(hours.morning),
        "evening": window(hours.evening),
        "total": format_duration(hours.total()),
    }))
}

/// Lengths of today's light and of the following night.
pub fn lengths_section(ctx: &Context, location: &Location, day_offset: i64) -> Result<Value> {
    let date = target_date(ctx, day_offset)?;
    let today = solar_day(&NoaaModel, location, &ctx.zone, date)?;
    let tomorrow = solar_day(&NoaaModel, location, &ctx.zone, date.add_days(1))?;
    let row = lengths(&today, &tomorrow).as_row(false);

    let mut section: Map<String, Value> = Map::new();
    section.insert("date".to_string(), json!(date));
    for (name, duration) in LENGTHS.iter().zip(row) {
        section.insert(name.to_string(), json!(duration.map(format_duration)));
    }
    Ok(Value::Object(section))
}
