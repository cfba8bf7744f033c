//! `events` and `holidays` commands.

use almanac_engine::events::{filter_observances, filter_soon};
use almanac_engine::observances::Catalog;
use anyhow::{bail, Result};
use chrono::Datelike;
use tracing::info_span;

use crate::cli::WindowArgs;
use crate::context::Context;
use crate::output::{print_json, EventRow};

pub fn run_events(ctx: &Context, args: &WindowArgs) -> Result<()> {
    let _cmd = info_span!("events").entered();
    print_json(&upcoming_events(ctx, args.days, args.only_common)?)
}

pub fn run_holidays(ctx: &Context, args: &WindowArgs) -> Result<()> {
    let _cmd = info_span!("holidays").entered();
    print_json(&upcoming_holidays(ctx, args.days)?)
}

/// Observances (built-in and configured) and personal events in the window.
pub fn upcoming_events(
    ctx: &Context,
    days: Option<i64>,
    only_common: bool,
) -> Result<Vec<EventRow>> {
    let window = window_days(ctx, days)?;
    let now = ctx.zone.now(ctx.clock());
    let only_common = only_common || ctx.config.only_common;

    let mut catalog = Catalog::swedish_events();
    catalog.extend(ctx.config.observances.iter().cloned());

    let mut dated: Vec<(String, String)> = catalog
        .observances(now.year(), only_common)
        .into_iter()
        .map(|o| (o.label, o.date.to_string()))
        .collect();
    dated.extend(
        ctx.config
            .events
            .iter()
            .map(|e| (e.label.clone(), e.date.clone())),
    );

    let soon = filter_soon(dated, window, &now)?;
    Ok(soon.into_iter().map(EventRow::from).collect())
}

/// Public holidays in the window.
pub fn upcoming_holidays(ctx: &Context, days: Option<i64>) -> Result<Vec<EventRow>> {
    let window = window_days(ctx, days)?;
    let now = ctx.zone.now(ctx.clock());
    let holidays = Catalog::swedish_holidays().observances(now.year(), false);
    Ok(filter_observances(holidays, window, &now)
        .into_iter()
        .map(EventRow::from)
        .collect())
}

pub fn window_days(ctx: &Context, days: Option<i64>) -> Result<i64> {
    let window = days.unwrap_or(ctx.config.window_days);
    if window < 0 {
        bail!("window must not be negative, got {window}");
    }
    Ok(window)
}
