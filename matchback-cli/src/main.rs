//! matchback - attribution batch driver
//!
//! Two steps around the external vendor round trip:
//! - `matchback sanitize`: client records → vendor file + reconciliation map
//! - `matchback reconcile`: vendor decisions + map → attribution report

use anyhow::Result;
use clap::Parser;
use matchback_cli::commands::{run_reconcile, run_sanitize};
use matchback_cli::{Cli, Command};
use matchback_common::config::TomlConfig;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Config first: its logging section feeds the subscriber
    let config = TomlConfig::load_or_default(cli.config.as_deref())?;

    let filter = match &cli.log_level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    info!("Starting matchback v{}", env!("CARGO_PKG_VERSION"));

    match &cli.command {
        Command::Sanitize(args) => {
            let stats = run_sanitize(args, &config)?;
            info!(
                "Sanitized {} records ({:.1}% missing email)",
                stats.sanitized_records, stats.missing_email_percentage
            );
        }
        Command::Reconcile(args) => {
            let result = run_reconcile(args, &config)?;
            info!(
                run_id = %result.run_id,
                "Reconciled {} records, {} matches",
                result.records.len(),
                result.report.metrics.total_matches
            );
        }
    }

    Ok(())
}
