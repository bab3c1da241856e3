//! File-level round trip: sanitize → vendor file → reconcile → report
//!
//! The reconciliation map is written to disk between steps, the way a caller
//! would persist it across a process restart.

use chrono::{TimeZone, Utc};
use matchback_cli::args::{CampaignArgs, ReconcileArgs, SanitizeArgs};
use matchback_cli::commands::{
    foreign_map_ids, run_reconcile, run_sanitize, MAP_FILE, SANITIZED_FILE, STATS_FILE,
};
use matchback_cli::files::read_json;
use matchback_common::config::TomlConfig;
use matchback_core::{CustomerType, ReconciliationMap, SanitizedRecord};
use serde_json::{json, Value};
use std::fs;
use tempfile::TempDir;

fn campaign() -> CampaignArgs {
    CampaignArgs {
        campaign_token: "TIDE-123".to_string(),
        market: "hou".to_string(),
    }
}

#[test]
fn test_sanitize_then_reconcile_from_disk() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let input = temp_dir.path().join("clients.json");
    let out_dir = temp_dir.path().join("batch");

    fs::write(
        &input,
        json!([
            {"firstName": "Ada", "lastName": "Lovelace", "email": "ada@example.com",
             "customerId": "C-1", "signupDate": "2024-09-01T00:00:00Z",
             "visit1Date": "2024-09-05T00:00:00Z", "totalVisits": 3, "totalSales": 100.0},
            {"name": "Grace Hopper", "customerId": "C-2",
             "signupDate": "2019-03-10T00:00:00Z", "firstVisitDate": "2019-06-01T00:00:00Z",
             "totalVisits": 12, "totalSales": 200.0},
            {"name": "Unmatched Person", "email": "u@example.com", "customerId": "C-3",
             "signupDate": "2022-01-01T00:00:00Z", "totalSales": 50.0}
        ])
        .to_string(),
    )
    .unwrap();

    let config = TomlConfig::default();
    let stats = run_sanitize(
        &SanitizeArgs {
            campaign: campaign(),
            input,
            out_dir: out_dir.clone(),
            batch_timestamp: Some(1_700_000_000),
        },
        &config,
    )
    .expect("sanitize should succeed");
    assert_eq!(stats.total_records, 3);
    assert_eq!(stats.missing_emails, 1);

    let sanitized: Vec<SanitizedRecord> = read_json(&out_dir.join(SANITIZED_FILE)).unwrap();
    assert_eq!(sanitized[0].dcm_id.as_str(), "TIDE123-HOU-1700000000-00001");
    assert!(out_dir.join(STATS_FILE).exists());

    let vendor_file = fs::read_to_string(out_dir.join(SANITIZED_FILE)).unwrap();
    assert!(!vendor_file.contains("C-1"));
    assert!(!vendor_file.contains("signup"));

    let decisions_path = temp_dir.path().join("decisions.json");
    fs::write(
        &decisions_path,
        json!([
            {"DCM_ID": sanitized[0].dcm_id.as_str(), "match": "Y"},
            {"dcm_id": sanitized[1].dcm_id.as_str(), "matched": true},
            {"dcm_id": sanitized[2].dcm_id.as_str(), "matched": "N"},
            {"dcm_id": sanitized[1].dcm_id.as_str(), "matched": 1.0},
            {"dcm_id": sanitized[2].dcm_id.as_str(), "matched": null}
        ])
        .to_string(),
    )
    .unwrap();

    let report_path = temp_dir.path().join("report.json");
    let result = run_reconcile(
        &ReconcileArgs {
            campaign: campaign(),
            decisions: decisions_path,
            map: out_dir.join(MAP_FILE),
            campaign_date: Utc.with_ymd_and_hms(2024, 9, 15, 0, 0, 0).unwrap(),
            cost: 1000.0,
            output: Some(report_path.clone()),
        },
        &config,
    )
    .expect("reconcile should succeed");

    assert_eq!(result.records.len(), 3);
    assert_eq!(result.reconciliation.decisions_received, 3);
    assert_eq!(result.reconciliation.duplicate_ids, 0);
    assert_eq!(result.records[0].customer_type, Some(CustomerType::NewSignup));
    assert!(result.records[0].was_corrected());
    assert_eq!(result.report.metrics.total_matches, 2);
    assert_eq!(result.report.metrics.out_of_pattern_revenue, 100.0);
    assert_eq!(result.report.metrics.cac_out_of_pattern, 1000.0);

    let report: Value = read_json(&report_path).unwrap();
    assert_eq!(report["report"]["metrics"]["total_matches"], 2);
    assert_eq!(report["records"][0]["patternOverride"], "NEW_SIGNUP_CORRECTION");
}

#[test]
fn test_sanitize_rejects_unparseable_input() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let input = temp_dir.path().join("clients.json");
    fs::write(&input, "{ not json").unwrap();

    let result = run_sanitize(
        &SanitizeArgs {
            campaign: campaign(),
            input,
            out_dir: temp_dir.path().join("batch"),
            batch_timestamp: None,
        },
        &TomlConfig::default(),
    );
    assert!(result.is_err());
    assert!(!temp_dir.path().join("batch").exists());
}

#[test]
fn test_extra_privacy_pattern_blocks_batch() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let input = temp_dir.path().join("clients.json");
    fs::write(&input, json!([{"name": "A", "phone": "555"}]).to_string()).unwrap();

    let config =
        TomlConfig::from_toml_str("[privacy]\nextra_sensitive_patterns = [\"phone\"]\n")
            .unwrap();
    let result = run_sanitize(
        &SanitizeArgs {
            campaign: campaign(),
            input,
            out_dir: temp_dir.path().join("batch"),
            batch_timestamp: Some(1),
        },
        &config,
    );
    let err = result.expect_err("leak check should reject the batch");
    assert!(err.to_string().contains("Privacy violation"));
    assert!(!temp_dir.path().join("batch").join(SANITIZED_FILE).exists());
}

#[test]
fn test_reconcile_with_other_campaign_map_still_runs() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let input = temp_dir.path().join("clients.json");
    let out_dir = temp_dir.path().join("batch");
    fs::write(&input, json!([{"name": "A", "totalSales": 10.0}]).to_string()).unwrap();

    let config = TomlConfig::default();
    run_sanitize(
        &SanitizeArgs {
            campaign: campaign(),
            input,
            out_dir: out_dir.clone(),
            batch_timestamp: Some(42),
        },
        &config,
    )
    .unwrap();

    let map: ReconciliationMap = read_json(&out_dir.join(MAP_FILE)).unwrap();
    let other = CampaignArgs {
        campaign_token: "SPRING".to_string(),
        market: "dal".to_string(),
    };
    assert_eq!(foreign_map_ids(&map, &campaign()), 0);
    assert_eq!(foreign_map_ids(&map, &other), 1);

    let decisions_path = temp_dir.path().join("decisions.json");
    fs::write(
        &decisions_path,
        json!([{"dcm_id": "TIDE123-HOU-42-00001", "matched": "Y"}]).to_string(),
    )
    .unwrap();

    let result = run_reconcile(
        &ReconcileArgs {
            campaign: other,
            decisions: decisions_path,
            map: out_dir.join(MAP_FILE),
            campaign_date: Utc.with_ymd_and_hms(2024, 9, 15, 0, 0, 0).unwrap(),
            cost: 10.0,
            output: Some(temp_dir.path().join("report.json")),
        },
        &config,
    )
    .expect("token mismatch is a warning, not an error");
    assert_eq!(result.report.metrics.total_matches, 1);
}
