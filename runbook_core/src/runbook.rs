use log::debug;
use std::io::{self, Write};

use crate::config::Config;
use crate::discovery::{discover, Discovery};
use crate::error::Kind;
use crate::migration::MigrationStatement;
use crate::probe::{probe, ProbeResponse};
use crate::Error;

/// Struct that represents the report of a runbook run.
/// A `Report` is returned by [`Runbook::run`] once every section has been written.
#[derive(Debug)]
pub struct Report {
    discovery: Discovery,
    probe: Result<ProbeResponse, Error>,
}

impl Report {
    /// Outcome of the service discovery section
    pub fn discovery(&self) -> &Discovery {
        &self.discovery
    }

    /// Outcome of the reachability probe section
    pub fn probe(&self) -> &Result<ProbeResponse, Error> {
        &self.probe
    }

    /// Whether the migration got applied. The runbook never applies it, so this is always false
    pub fn succeeded(&self) -> bool {
        false
    }
}

/// Struct that represents the entrypoint of the runbook: prints the migration,
/// tries the two optional diagnostics and then tells the operator what to do by hand
pub struct Runbook<'a> {
    migration: &'a MigrationStatement,
    config: &'a Config,
}

impl<'a> Runbook<'a> {
    pub fn new(migration: &'a MigrationStatement, config: &'a Config) -> Runbook<'a> {
        Runbook { migration, config }
    }

    /// Write every section to `out`, in order.
    /// Network failures end up in the output and in the `Report`, only a failing `out` is an error
    pub fn run<W: Write>(&self, out: &mut W) -> io::Result<Report> {
        self.render_migration(out)?;
        let discovery = self.render_discovery(out)?;
        let probe = self.render_probe(out)?;
        self.render_instructions(out)?;
        render_impact(out)?;
        out.flush()?;

        Ok(Report { discovery, probe })
    }

    fn render_migration<W: Write>(&self, out: &mut W) -> io::Result<()> {
        write_header(out, "Render API Database Migration Attempt")?;
        writeln!(out, "Migration SQL to execute:")?;
        writeln!(out, "{}", self.migration.sql())
    }

    fn render_discovery<W: Write>(&self, out: &mut W) -> io::Result<Discovery> {
        write_header(out, "Method 1: Check Environment for API Key")?;

        let credential_var = self.config.credential_var();
        if self.config.credential().is_some() {
            writeln!(out, "[+] Found {} in environment", credential_var)?;
            writeln!(out, "[*] Listing Render services...")?;
        }

        let discovery = discover(self.config);
        match &discovery {
            Discovery::MissingCredential => {
                writeln!(out, "[!] No {} found in environment", credential_var)?;
            }
            Discovery::Listed { total, matches } => {
                writeln!(out, "[+] Found {} services", total)?;
                writeln!(out, "[+] Found {} PostgreSQL databases", matches.len())?;
                for service in matches {
                    writeln!(out, "  - {}", service)?;
                }
            }
            Discovery::Failed(err) => match err.kind() {
                Kind::HttpStatus { status, body } => {
                    writeln!(out, "[-] API request failed: {}", status)?;
                    writeln!(out, "{}", body)?;
                }
                _ => writeln!(out, "[-] Error calling Render API: {}", one_line(err))?,
            },
        }

        Ok(discovery)
    }

    fn render_probe<W: Write>(&self, out: &mut W) -> io::Result<Result<ProbeResponse, Error>> {
        write_header(out, "Method 2: Try MCP Server Direct Connection")?;
        writeln!(out, "[*] Testing MCP server connection...")?;

        let probe = probe(self.config);
        match &probe {
            Ok(response) => {
                writeln!(out, "MCP server response: {}", response.status())?;
                writeln!(out, "[+] MCP server is accessible")?;
                writeln!(out, "[*] Response preview: {}", response.preview())?;
            }
            Err(err) => match err.status() {
                Some(status) => {
                    writeln!(out, "MCP server response: {}", status)?;
                    writeln!(out, "[-] MCP server returned {}", status)?;
                }
                None => {
                    debug!("probe failed: {:?}", err);
                    writeln!(out, "[-] Error connecting to MCP server: {}", one_line(err))?;
                }
            },
        }

        Ok(probe)
    }

    /// The manual steps, repeating the migration statement verbatim
    pub fn render_instructions<W: Write>(&self, out: &mut W) -> io::Result<()> {
        write_header(out, "Method 3: Manual Instructions")?;

        writeln!(
            out,
            "Since automated methods require additional setup, please follow these steps:"
        )?;
        writeln!(out)?;
        writeln!(out, "IMMEDIATE ACTION REQUIRED:")?;
        writeln!(out, "1. Go to {}", self.config.dashboard_url())?;
        writeln!(
            out,
            "2. Find your PostgreSQL database (look for 'colibrrri-db', 'vheer-db', or similar)"
        )?;
        writeln!(out, "3. Click on the database name")?;
        writeln!(out, "4. Look for 'Query' or 'SQL Console' tab")?;
        writeln!(out, "5. Execute this exact SQL:")?;
        writeln!(out)?;
        writeln!(out, "```sql")?;
        writeln!(out, "{}", self.migration.sql())?;
        writeln!(out, "```")?;
        writeln!(out)?;
        writeln!(out, "6. Verify the migration by running:")?;
        for line in self.migration.verification_query().lines() {
            writeln!(out, "   {}", line)?;
        }
        writeln!(out)?;
        writeln!(out, "ALTERNATIVE - Get DATABASE_URL:")?;
        writeln!(out, "1. In your database dashboard, go to 'Connect' tab")?;
        writeln!(out, "2. Copy the 'External Database URL'")?;
        writeln!(
            out,
            "3. Run: node {} \"PASTE_DATABASE_URL_HERE\"",
            self.config.migration_script()
        )
    }
}

/// Why the migration cannot wait
pub fn render_impact<W: Write>(out: &mut W) -> io::Result<()> {
    write_header(out, "Critical Impact")?;
    writeln!(out, "[!] This migration is URGENT because:")?;
    writeln!(out, "- Production site is returning 500 errors")?;
    writeln!(out, "- Payment callbacks are failing without these columns")?;
    writeln!(out, "- Users cannot complete subscriptions")?;
    writeln!(out, "- Revenue is being lost")
}

fn write_header<W: Write>(out: &mut W, title: &str) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "[*] {}", title)?;
    writeln!(out, "{}", "=".repeat(title.chars().count() + 4))
}

// diagnostics must fit on a single output line
fn one_line(err: &Error) -> String {
    err.to_string().split_whitespace().collect::<Vec<_>>().join(" ")
}
