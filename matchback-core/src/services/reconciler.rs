//! Reconciler: vendor match decisions back onto original records
//!
//! Each decision is looked up in the reconciliation map by tracking id.
//! Decisions whose id is unknown are dropped: without the id there is no way
//! to attribute them. Callers detect drops by comparing output length with
//! input length, or through [`ReconciliationStats`].

use crate::models::{MatchRecord, ReconciliationMap};
use crate::services::tracking_id::TrackingId;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// One yes/no decision from the vendor's response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorDecision {
    pub dcm_id: TrackingId,
    pub matched: bool,
}

impl VendorDecision {
    pub fn new(dcm_id: TrackingId, matched: bool) -> Self {
        Self { dcm_id, matched }
    }

    /// Normalize a vendor flag cell
    ///
    /// `Y`, `YES`, `TRUE`, `1`, `MATCH`, `MATCHED` → `Some(true)`;
    /// `N`, `NO`, `FALSE`, `0`, empty, `NO MATCH` → `Some(false)`; anything
    /// else is unrecognized.
    pub fn parse_flag(flag: &str) -> Option<bool> {
        match flag.trim().to_ascii_uppercase().as_str() {
            "Y" | "YES" | "TRUE" | "1" | "MATCH" | "MATCHED" => Some(true),
            "N" | "NO" | "FALSE" | "0" | "" | "NO MATCH" | "NOMATCH" | "UNMATCHED" => Some(false),
            _ => None,
        }
    }

    /// Build a decision from raw text cells; `None` when the flag is unrecognized
    pub fn from_raw(dcm_id: &str, flag: &str) -> Option<Self> {
        Self::parse_flag(flag).map(|matched| Self::new(TrackingId::from_raw(dcm_id), matched))
    }
}

/// Counts from one reconciliation pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationStats {
    pub decisions_received: usize,
    pub reconciled: usize,
    pub matched: usize,
    /// Decisions dropped because their id is not in the map
    pub unknown_ids: usize,
    /// Decisions repeating an id already seen in this response
    pub duplicate_ids: usize,
    /// Map entries that received no decision at all
    pub unanswered: usize,
}

/// Merge vendor decisions onto the original records
pub fn reconcile(decisions: &[VendorDecision], map: &ReconciliationMap) -> Vec<MatchRecord> {
    reconcile_with_stats(decisions, map).0
}

/// [`reconcile`] plus the counts a caller needs to spot dropped decisions
///
/// Output order follows decision order. A repeated id yields one record per
/// decision, exactly like distinct ids; it is counted in `duplicate_ids`.
pub fn reconcile_with_stats(
    decisions: &[VendorDecision],
    map: &ReconciliationMap,
) -> (Vec<MatchRecord>, ReconciliationStats) {
    let mut stats = ReconciliationStats {
        decisions_received: decisions.len(),
        ..ReconciliationStats::default()
    };
    let mut seen: HashSet<&TrackingId> = HashSet::with_capacity(decisions.len());
    let mut records = Vec::with_capacity(decisions.len());

    for decision in decisions {
        let Some(original) = map.get(&decision.dcm_id) else {
            stats.unknown_ids += 1;
            debug!(dcm_id = %decision.dcm_id, "Dropping decision with unknown tracking id");
            continue;
        };

        if !seen.insert(&decision.dcm_id) {
            stats.duplicate_ids += 1;
        }
        if decision.matched {
            stats.matched += 1;
        }
        records.push(MatchRecord::reconciled(original.clone(), decision.matched));
    }

    stats.reconciled = records.len();
    stats.unanswered = map.len() - seen.len();

    if stats.unknown_ids > 0 {
        warn!(
            "{} of {} vendor decisions had unknown tracking ids and were dropped",
            stats.unknown_ids, stats.decisions_received
        );
    }
    if stats.duplicate_ids > 0 {
        warn!("{} vendor decisions repeat a tracking id", stats.duplicate_ids);
    }
    info!(
        reconciled = stats.reconciled,
        matched = stats.matched,
        unanswered = stats.unanswered,
        "Reconciliation complete"
    );

    (records, stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ClientRecord;
    use crate::services::tracking_id::generate;

    fn map_of(n: u64) -> ReconciliationMap {
        (1..=n)
            .map(|seq| {
                (
                    generate("TIDE", "HOU", seq, 1),
                    ClientRecord {
                        customer_id: Some(format!("C{}", seq)),
                        ..ClientRecord::default()
                    },
                )
            })
            .collect()
    }

    fn decision(seq: u64, matched: bool) -> VendorDecision {
        VendorDecision::new(generate("TIDE", "HOU", seq, 1), matched)
    }

    #[test]
    fn test_known_ids_are_merged_in_decision_order() {
        let map = map_of(3);
        let out = reconcile(&[decision(3, true), decision(1, false)], &map);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].record.customer_id.as_deref(), Some("C3"));
        assert!(out[0].matched);
        assert_eq!(out[1].record.customer_id.as_deref(), Some("C1"));
        assert!(!out[1].matched);
        assert_eq!(out[0].in_pattern, None);
    }

    #[test]
    fn test_unknown_ids_are_dropped_and_counted() {
        let map = map_of(2);
        let decisions = vec![
            decision(1, true),
            VendorDecision::new(TrackingId::from_raw("BOGUS-X-1-00001"), true),
            decision(9, true),
        ];
        let (out, stats) = reconcile_with_stats(&decisions, &map);
        assert_eq!(out.len(), 1);
        assert_eq!(stats.decisions_received, 3);
        assert_eq!(stats.unknown_ids, 2);
        assert_eq!(stats.reconciled, 1);
        assert_eq!(stats.unanswered, 1);
    }

    #[test]
    fn test_duplicate_ids_are_counted() {
        let map = map_of(2);
        let (out, stats) =
            reconcile_with_stats(&[decision(1, true), decision(1, true), decision(2, false)], &map);
        assert_eq!(out.len(), 3);
        assert_eq!(stats.duplicate_ids, 1);
        assert_eq!(stats.matched, 2);
        assert_eq!(stats.unanswered, 0);
    }

    #[test]
    fn test_empty_inputs() {
        let (out, stats) = reconcile_with_stats(&[], &ReconciliationMap::new());
        assert!(out.is_empty());
        assert_eq!(stats, ReconciliationStats::default());
    }

    #[test]
    fn test_parse_flag_variants() {
        for flag in ["Y", "yes", " TRUE ", "1", "Match", "matched"] {
            assert_eq!(VendorDecision::parse_flag(flag), Some(true), "{}", flag);
        }
        for flag in ["n", "No", "false", "0", "", "no match", "UNMATCHED"] {
            assert_eq!(VendorDecision::parse_flag(flag), Some(false), "{}", flag);
        }
        assert_eq!(VendorDecision::parse_flag("maybe"), None);
    }

    #[test]
    fn test_from_raw_trims_id() {
        let d = VendorDecision::from_raw(" TIDE-HOU-1-00001 ", "Y").unwrap();
        assert_eq!(d.dcm_id.as_str(), "TIDE-HOU-1-00001");
        assert!(d.matched);
        assert!(VendorDecision::from_raw("TIDE-HOU-1-00001", "?").is_none());
    }
}
