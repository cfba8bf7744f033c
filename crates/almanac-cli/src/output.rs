use almanac_engine::events::ResolvedEvent;
use almanac_engine::CalendarDate;
use anyhow::{Context, Result};
use chrono::DateTime;
use chrono_tz::Tz;
use serde::Serialize;

/// Print `value` to stdout as pretty JSON.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("failed to serialize output")?;
    println!("{json}");
    Ok(())
}

/// One upcoming dated item.
#[derive(Debug, Serialize)]
pub struct EventRow {
    pub label: String,
    pub date: CalendarDate,
    pub days_until: i64,
}

impl From<ResolvedEvent<String>> for EventRow {
    fn from(event: ResolvedEvent<String>) -> Self {
        Self {
            label: event.payload,
            date: event.date,
            days_until: event.days_until,
        }
    }
}

pub fn local_time(t: &DateTime<Tz>) -> String {
    t.format("%Y-%m-%d %H:%M:%S").to_string()
}
