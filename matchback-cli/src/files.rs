//! JSON file I/O and vendor response row shape

use anyhow::{Context, Result};
use matchback_core::services::VendorDecision;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing::warn;

/// Read a JSON document
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Write a pretty-printed JSON document
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let content = serde_json::to_string_pretty(value)?;
    fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
}

/// Match flag as vendors actually send it
///
/// `Other` absorbs anything else (floats, null, objects) so one odd row
/// cannot fail the whole file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawFlag {
    Bool(bool),
    Number(i64),
    Text(String),
    Other(Value),
}

impl Default for RawFlag {
    fn default() -> Self {
        RawFlag::Other(Value::Null)
    }
}

impl RawFlag {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            RawFlag::Bool(b) => Some(*b),
            RawFlag::Number(0) => Some(false),
            RawFlag::Number(1) => Some(true),
            RawFlag::Number(_) => None,
            RawFlag::Text(s) => VendorDecision::parse_flag(s),
            RawFlag::Other(_) => None,
        }
    }
}

/// One row of the vendor's response file
#[derive(Debug, Clone, Deserialize)]
pub struct RawVendorDecision {
    #[serde(alias = "DCM_ID", alias = "DCM-ID", alias = "dcmId")]
    pub dcm_id: String,
    #[serde(default, alias = "match", alias = "MATCH", alias = "Matched")]
    pub matched: RawFlag,
}

/// Convert raw rows, skipping (and counting) rows with unrecognized flags
pub fn normalize_decisions(rows: Vec<RawVendorDecision>) -> (Vec<VendorDecision>, usize) {
    let mut skipped = 0;
    let decisions = rows
        .into_iter()
        .filter_map(|row| match row.matched.as_bool() {
            Some(matched) => Some(VendorDecision::new(
                matchback_core::TrackingId::from_raw(row.dcm_id),
                matched,
            )),
            None => {
                skipped += 1;
                warn!(
                    dcm_id = %row.dcm_id,
                    flag = ?row.matched,
                    "Skipping vendor row with unrecognized match flag"
                );
                None
            }
        })
        .collect();
    (decisions, skipped)
}
