//! Defines the CLI application

use std::path::PathBuf;

use clap::{Args, Parser};

#[derive(Parser)]
#[clap(version)]
pub enum Cli {
    /// Print the migration, try the provider diagnostics and print the manual steps
    Run(RunArgs),

    /// Only print the migration statement and its verification query
    Sql,
}

#[derive(Args)]
pub struct RunArgs {
    /// Config file location, built in Render endpoints are used when omitted
    #[clap(short)]
    pub config: Option<PathBuf>,

    /// Load the API key from the given environment variable [default: RENDER_API_KEY]
    #[clap(short)]
    pub env_var: Option<String>,

    /// Give up on the service listing after this many seconds, it never times out by default
    #[clap(long)]
    pub discovery_timeout: Option<u64>,
}
