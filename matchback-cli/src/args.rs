//! Command-line arguments

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Matchback attribution batch driver
#[derive(Parser, Debug)]
#[command(name = "matchback")]
#[command(about = "Sanitize client lists for vendor matching and report campaign attribution")]
#[command(version)]
pub struct Cli {
    /// TOML configuration file
    #[arg(long, global = true, env = "MATCHBACK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error); overrides RUST_LOG and TOML
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build the vendor file and reconciliation map from client records
    Sanitize(SanitizeArgs),
    /// Merge vendor decisions and produce the attribution report
    Reconcile(ReconcileArgs),
}

/// Campaign identity shared by both steps
#[derive(Args, Debug, Clone)]
pub struct CampaignArgs {
    /// Campaign token embedded in tracking ids
    #[arg(long = "campaign")]
    pub campaign_token: String,

    /// Market code embedded in tracking ids
    #[arg(long)]
    pub market: String,
}

#[derive(Args, Debug, Clone)]
pub struct SanitizeArgs {
    #[command(flatten)]
    pub campaign: CampaignArgs,

    /// JSON array of client records
    #[arg(long)]
    pub input: PathBuf,

    /// Directory receiving sanitized.json, reconciliation_map.json and stats.json
    #[arg(long)]
    pub out_dir: PathBuf,

    /// Fixed batch timestamp (defaults to current epoch milliseconds)
    #[arg(long)]
    pub batch_timestamp: Option<i64>,
}

#[derive(Args, Debug, Clone)]
pub struct ReconcileArgs {
    #[command(flatten)]
    pub campaign: CampaignArgs,

    /// JSON array of vendor decisions ({"dcm_id": ..., "matched": ...})
    #[arg(long)]
    pub decisions: PathBuf,

    /// Reconciliation map written by the sanitize step
    #[arg(long)]
    pub map: PathBuf,

    /// Campaign date (YYYY-MM-DD or RFC 3339)
    #[arg(long, value_parser = parse_campaign_date)]
    pub campaign_date: DateTime<Utc>,

    /// Total campaign cost
    #[arg(long)]
    pub cost: f64,

    /// Report destination (stdout when omitted)
    #[arg(long)]
    pub output: Option<PathBuf>,
}

/// Parse `YYYY-MM-DD` (midnight UTC) or a full RFC 3339 timestamp
pub fn parse_campaign_date(value: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|e| format!("Invalid campaign date '{}': {}", value, e))?;
    let midnight = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| format!("Invalid campaign date '{}'", value))?;
    Ok(Utc.from_utc_datetime(&midnight))
}
