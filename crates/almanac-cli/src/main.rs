mod cli;
mod config;
mod context;
mod events_cmd;
mod leapsec_cmd;
mod logging;
mod output;
mod solar_cmd;
mod summary_cmd;
mod summertime_cmd;

use std::process;

use anyhow::Result;
use clap::Parser;

use crate::cli::{Cli, Command};
use crate::context::Context;

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let ctx = Context::load(&cli)?;
    match &cli.command {
        Command::Events(args) => events_cmd::run_events(&ctx, args),
        Command::Holidays(args) => events_cmd::run_holidays(&ctx, args),
        Command::LeapSeconds(args) => leapsec_cmd::run(&ctx, args),
        Command::SummerTime(args) => summertime_cmd::run(&ctx, args),
        Command::Solar(args) => solar_cmd::run_solar(&ctx, args),
        Command::Hours(args) => solar_cmd::run_hours(&ctx, args),
        Command::Lengths(args) => solar_cmd::run_lengths(&ctx, args),
        Command::Summary(args) => summary_cmd::run(&ctx, args),
    }
}
