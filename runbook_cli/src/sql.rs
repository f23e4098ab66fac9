use std::io::{self, Write};

use runbook_core::MigrationStatement;

/// Print the statement and the verification query alone, ready to paste in a SQL console
pub fn handle_sql_command() -> anyhow::Result<()> {
    let migration = MigrationStatement::recurring_payments();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    writeln!(
        out,
        "-- adds {} to {}",
        migration.columns().join(", "),
        migration.table()
    )?;
    writeln!(out, "{}", migration.sql())?;
    writeln!(out)?;
    writeln!(out, "-- verify with:")?;
    writeln!(out, "{}", migration.verification_query())?;
    out.flush()?;
    Ok(())
}
