//! `summer-time` command.

use almanac_engine::summertime::is_summer_time;
use anyhow::Result;
use tracing::info_span;

use crate::cli::SummerTimeArgs;
use crate::context::Context;
use crate::output::print_json;

pub fn run(ctx: &Context, args: &SummerTimeArgs) -> Result<()> {
    let _cmd = info_span!("summer_time").entered();
    let result = is_summer_time(ctx.clock(), &ctx.zone, args.day_offset, &args.time)?;
    print_json(&result)
}
