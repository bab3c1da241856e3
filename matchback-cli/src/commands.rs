//! Subcommand implementations

use crate::args::{CampaignArgs, ReconcileArgs, SanitizeArgs};
use crate::files::{normalize_decisions, read_json, write_json, RawVendorDecision};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use matchback_common::config::TomlConfig;
use matchback_core::services::{tracking_id, SanitizationStats};
use matchback_core::{
    CampaignContext, ClientRecord, MatchbackPipeline, PipelineResult, ReconciliationMap,
};
use std::fs;
use tracing::{info, warn};

pub const SANITIZED_FILE: &str = "sanitized.json";
pub const MAP_FILE: &str = "reconciliation_map.json";
pub const STATS_FILE: &str = "stats.json";

fn build_pipeline(
    campaign: &CampaignArgs,
    campaign_date: DateTime<Utc>,
    cost: f64,
    config: &TomlConfig,
) -> Result<MatchbackPipeline> {
    let context = CampaignContext::new(
        campaign.campaign_token.clone(),
        campaign.market.clone(),
        campaign_date,
        cost,
    )?;
    Ok(MatchbackPipeline::from_config(context, config))
}

/// Count map ids that were not issued for this campaign and market
///
/// Unparseable ids count as foreign too.
pub fn foreign_map_ids(map: &ReconciliationMap, campaign: &CampaignArgs) -> usize {
    let campaign_token = tracking_id::sanitize_token(&campaign.campaign_token);
    let market_token = tracking_id::sanitize_token(&campaign.market).to_ascii_uppercase();
    map.iter()
        .filter(|(id, _)| {
            let parsed = id.parse();
            !parsed.is_valid
                || parsed.campaign_token != campaign_token
                || parsed.market_token != market_token
        })
        .count()
}

/// Write the vendor file, the reconciliation map and batch statistics
pub fn run_sanitize(args: &SanitizeArgs, config: &TomlConfig) -> Result<SanitizationStats> {
    let records: Vec<ClientRecord> = read_json(&args.input)?;
    info!("Read {} client records from {}", records.len(), args.input.display());

    // Sanitization does not depend on campaign date or cost
    let pipeline = build_pipeline(&args.campaign, Utc::now(), 0.0, config)?;
    let output = match args.batch_timestamp {
        Some(ts) => pipeline.prepare_at(&records, ts)?,
        None => pipeline.prepare(&records)?,
    };

    fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("Failed to create {}", args.out_dir.display()))?;
    write_json(&args.out_dir.join(SANITIZED_FILE), &output.sanitized)?;
    write_json(&args.out_dir.join(MAP_FILE), &output.reconciliation_map)?;
    write_json(&args.out_dir.join(STATS_FILE), &output.stats)?;

    info!(
        "Wrote {} sanitized records to {}",
        output.stats.sanitized_records,
        args.out_dir.display()
    );
    Ok(output.stats)
}

/// Reconcile a vendor response and write the attribution report
pub fn run_reconcile(args: &ReconcileArgs, config: &TomlConfig) -> Result<PipelineResult> {
    let rows: Vec<RawVendorDecision> = read_json(&args.decisions)?;
    let map: ReconciliationMap = read_json(&args.map)?;
    let foreign = foreign_map_ids(&map, &args.campaign);
    if foreign > 0 {
        warn!(
            "{} of {} reconciliation map ids were not issued for campaign {} / market {}",
            foreign,
            map.len(),
            args.campaign.campaign_token,
            args.campaign.market
        );
    }
    let (decisions, skipped) = normalize_decisions(rows);
    if skipped > 0 {
        warn!("{} vendor rows skipped: unrecognized match flag", skipped);
    }

    let pipeline = build_pipeline(&args.campaign, args.campaign_date, args.cost, config)?;
    let result = pipeline.process(&decisions, &map);

    match &args.output {
        Some(path) => {
            write_json(path, &result)?;
            info!("Report written to {}", path.display());
        }
        None => println!("{}", serde_json::to_string_pretty(&result)?),
    }
    Ok(result)
}
