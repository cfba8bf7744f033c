//! `leap-seconds` command.

use std::path::Path;

use almanac_engine::events::filter_soon;
use almanac_engine::leapsec::{read_table, to_display_strings, LeapSecondAnnouncement, Slot};
use anyhow::Result;
use serde::Serialize;
use tracing::{info_span, warn};

use crate::cli::LeapSecondArgs;
use crate::context::Context;
use crate::events_cmd::window_days;
use crate::output::{print_json, EventRow};

#[derive(Debug, Serialize)]
struct AnnouncementRow {
    utc: String,
    local: String,
    delta_seconds: i64,
    slot: Slot,
    text: String,
}

pub fn run(ctx: &Context, args: &LeapSecondArgs) -> Result<()> {
    let _cmd = info_span!("leap_seconds").entered();
    let Some(announcements) = load(ctx, args.table.as_deref()) else {
        return print_json(&serde_json::Value::Null);
    };

    if args.all {
        let strings = to_display_strings(&announcements, !args.utc, args.with_date, false);
        let rows: Vec<_> = announcements
            .iter()
            .zip(strings)
            .map(|(a, (text, _))| AnnouncementRow {
                utc: a.utc.to_string(),
                local: a.local.to_string(),
                delta_seconds: a.delta_seconds,
                slot: a.slot,
                text,
            })
            .collect();
        return print_json(&rows);
    }

    print_json(&upcoming(
        ctx,
        &announcements,
        args.days,
        !args.utc,
        args.with_date,
    )?)
}

/// The configured table, or `None` (with a warning) if there is none.
pub fn load(ctx: &Context, flag: Option<&Path>) -> Option<Vec<LeapSecondAnnouncement>> {
    let path = flag.or(ctx.config.leap_second_table.as_deref());
    match path {
        Some(path) => read_table(path, &ctx.zone),
        None => {
            warn!("no leap-second table configured");
            None
        }
    }
}

/// Announcements falling within the window, rendered for display.
pub fn upcoming(
    ctx: &Context,
    announcements: &[LeapSecondAnnouncement],
    days: Option<i64>,
    use_local: bool,
    include_date: bool,
) -> Result<Vec<EventRow>> {
    let window = window_days(ctx, days)?;
    let now = ctx.zone.now(ctx.clock());
    let strings = to_display_strings(announcements, use_local, include_date, true);
    let soon = filter_soon(strings, window, &now)?;
    Ok(soon.into_iter().map(EventRow::from).collect())
}
