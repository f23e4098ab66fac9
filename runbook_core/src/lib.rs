pub mod config;
pub mod discovery;
pub mod error;
mod migration;
pub mod probe;
mod runbook;

pub use crate::config::Config;
pub use crate::discovery::{discover, Discovery, ServiceRecord};
pub use crate::error::Error;
pub use crate::migration::MigrationStatement;
pub use crate::probe::{probe, ProbeResponse};
pub use crate::runbook::{render_impact, Report, Runbook};
