use std::env;
use std::io;
use std::time::Duration;

use anyhow::Context;
use log::debug;
use runbook_core::{Config, MigrationStatement, Report, Runbook};

use crate::cli::RunArgs;

pub fn handle_run_command(args: RunArgs) -> anyhow::Result<Report> {
    let mut config = match &args.config {
        Some(location) => Config::from_file_location(location)
            .with_context(|| format!("could not parse the config file {}", location.display()))?,
        None => Config::new(),
    };

    if let Some(env_var) = args.env_var.as_deref() {
        config = config.set_credential_var(env_var);
    }

    if let Some(seconds) = args.discovery_timeout {
        config = config.set_discovery_timeout(Some(Duration::from_secs(seconds)));
    }

    // a missing or non unicode variable just means there is no credential
    let credential = env::var(config.credential_var()).ok();
    debug!(
        "{} is {}",
        config.credential_var(),
        if credential.is_some() { "set" } else { "unset" }
    );
    let config = config.set_credential(credential.as_deref());

    let migration = MigrationStatement::recurring_payments();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    Runbook::new(&migration, &config)
        .run(&mut out)
        .context("could not write the runbook to stdout")
}
