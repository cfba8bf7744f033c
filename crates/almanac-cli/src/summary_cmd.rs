//! `summary` command: every section in one JSON object.

use almanac_engine::solar::Band;
use almanac_engine::summertime::is_summer_time;
use anyhow::Result;
use serde_json::{json, Map, Value};
use tracing::{info_span, warn};

use crate::cli::DayArgs;
use crate::context::Context;
use crate::events_cmd::{upcoming_events, upcoming_holidays};
use crate::leapsec_cmd;
use crate::output::print_json;
use crate::solar_cmd::{hours_section, lengths_section, solar_section};

pub fn run(ctx: &Context, args: &DayArgs) -> Result<()> {
    let _cmd = info_span!("summary").entered();
    print_json(&Value::Object(summary(ctx, args)?))
}

fn summary(ctx: &Context, args: &DayArgs) -> Result<Map<String, Value>> {
    let mut sections = Map::new();
    let date = ctx.zone.today(ctx.clock()).checked_add_days(args.day_offset)?;
    sections.insert("date".to_string(), json!(date));
    sections.insert("timezone".to_string(), json!(ctx.zone.name()));
    sections.insert("holidays".to_string(), json!(upcoming_holidays(ctx, None)?));
    sections.insert("events".to_string(), json!(upcoming_events(ctx, None, false)?));

    if let Some(announcements) = leapsec_cmd::load(ctx, None) {
        let rows = leapsec_cmd::upcoming(ctx, &announcements, None, true, false)?;
        sections.insert("leap_seconds".to_string(), json!(rows));
    }

    let today = is_summer_time(ctx.clock(), &ctx.zone, args.day_offset, "12:00:00")?;
    let tomorrow = is_summer_time(ctx.clock(), &ctx.zone, args.day_offset + 1, "12:00:00")?;
    sections.insert(
        "summer_time".to_string(),
        json!({
            "today": today.in_effect,
            "tomorrow": tomorrow.in_effect,
            "clock_change_tomorrow": today.in_effect != tomorrow.in_effect,
        }),
    );

    match ctx.location(args) {
        Ok(location) => {
            let offset = args.day_offset;
            sections.insert("solar".to_string(), solar_section(ctx, &location, offset)?);
            sections.insert(
                "golden_hour".to_string(),
                hours_section(ctx, &location, Band::Golden, offset)?,
            );
            sections.insert(
                "blue_hour".to_string(),
                hours_section(ctx, &location, Band::Blue, offset)?,
            );
            sections.insert("lengths".to_string(), lengths_section(ctx, &location, offset)?);
        }
        Err(e) => warn!("skipping solar sections: {e:#}"),
    }

    Ok(sections)
}
