//! Pattern Corrector
//!
//! The pattern analyzer only counts visits, so a brand-new signup who
//! reaches the visit threshold inside their signup month looks like a
//! regular customer. That reverses attribution credit. The corrector
//! overrides such records back to out-of-pattern and marks them with
//! `NEW_SIGNUP_CORRECTION` so the override is auditable.
//!
//! A correction applies only when all hold:
//! - `in_pattern == Some(true)`
//! - first visit present
//! - signup and first visit in the same UTC year and month
//! - visit count at or above the pattern threshold
//!
//! Re-applying is a no-op: a corrected record is no longer in-pattern.

use crate::models::{MatchRecord, NEW_SIGNUP_CORRECTION};
use crate::services::rules::ClassificationRules;
use matchback_common::time;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Counts from one correction pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrectionSummary {
    pub records_examined: usize,
    pub corrections_applied: usize,
}

/// Pattern Corrector
#[derive(Debug, Clone)]
pub struct PatternCorrector {
    min_visits: u32,
}

impl Default for PatternCorrector {
    fn default() -> Self {
        Self::with_rules(&ClassificationRules::default())
    }
}

impl PatternCorrector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rules(rules: &ClassificationRules) -> Self {
        Self {
            min_visits: rules.pattern_min_visits,
        }
    }

    /// True when the record carries the new-signup misclassification
    pub fn needs_correction(&self, record: &MatchRecord) -> bool {
        if record.in_pattern != Some(true) || record.record.total_visits < self.min_visits {
            return false;
        }
        match (&record.record.signup_date, &record.record.first_visit_date) {
            (Some(signup), Some(visit)) => time::same_utc_month(signup, visit),
            _ => false,
        }
    }

    /// Apply the override when needed; otherwise return the record unchanged
    pub fn correct(&self, mut record: MatchRecord) -> MatchRecord {
        if self.needs_correction(&record) {
            record.in_pattern = Some(false);
            record.pattern_override = Some(NEW_SIGNUP_CORRECTION.to_string());
        }
        record
    }

    /// Correct a batch, preserving order
    pub fn correct_all(&self, records: Vec<MatchRecord>) -> (Vec<MatchRecord>, CorrectionSummary) {
        let mut summary = CorrectionSummary {
            records_examined: records.len(),
            ..CorrectionSummary::default()
        };

        let corrected = records
            .into_iter()
            .enumerate()
            .map(|(index, record)| {
                if self.needs_correction(&record) {
                    summary.corrections_applied += 1;
                    debug!(index, "Reclassifying same-month signup as out-of-pattern");
                }
                self.correct(record)
            })
            .collect();

        if summary.corrections_applied > 0 {
            info!(
                corrections = summary.corrections_applied,
                examined = summary.records_examined,
                "Applied {} corrections",
                NEW_SIGNUP_CORRECTION
            );
        }
        (corrected, summary)
    }
}

/// Correct one record with the default thresholds
pub fn correct_pattern_flaws(record: MatchRecord) -> MatchRecord {
    PatternCorrector::new().correct(record)
}
