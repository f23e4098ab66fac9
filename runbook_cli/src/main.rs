//! Main entry point for the runbook cli tool

mod cli;
mod run;
mod sql;

use crate::cli::Cli;
use clap::Parser;
use env_logger::{Builder, Target};
use log::LevelFilter;
use std::io::Write;

fn main() -> anyhow::Result<()> {
    human_panic::setup_panic!();

    let mut builder = Builder::new();
    builder
        .format(|buf, record| writeln!(buf, "{}", record.args()))
        .filter(None, LevelFilter::Info)
        .parse_default_env()
        .target(Target::Stderr)
        .init();

    match Cli::parse() {
        Cli::Run(args) => {
            let report = run::handle_run_command(args)?;
            if !report.succeeded() {
                std::process::exit(1);
            }
        }
        Cli::Sql => sql::handle_sql_command()?,
    };

    Ok(())
}
