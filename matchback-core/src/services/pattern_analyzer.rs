//! Pattern Analyzer
//!
//! Flags records showing a "regular customer" visiting pattern: enough
//! visits AND a recorded first visit. Missing visit data means "not a
//! regular customer", never "unknown".

use crate::models::{ClientRecord, MatchRecord};
use crate::services::rules::ClassificationRules;
use tracing::debug;

/// Pattern Analyzer
#[derive(Debug, Clone)]
pub struct PatternAnalyzer {
    min_visits: u32,
}

impl Default for PatternAnalyzer {
    fn default() -> Self {
        Self::with_rules(&ClassificationRules::default())
    }
}

impl PatternAnalyzer {
    /// Create analyzer with the default 3-visit threshold
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rules(rules: &ClassificationRules) -> Self {
        Self {
            min_visits: rules.pattern_min_visits,
        }
    }

    /// Regular-customer test on the raw client attributes
    pub fn is_in_pattern(&self, record: &ClientRecord) -> bool {
        record.total_visits >= self.min_visits && record.first_visit_date.is_some()
    }

    /// Set `in_pattern`; no other field is touched
    pub fn analyze(&self, mut record: MatchRecord) -> MatchRecord {
        record.in_pattern = Some(self.is_in_pattern(&record.record));
        record
    }

    /// Analyze a batch, preserving order
    pub fn analyze_all(&self, records: Vec<MatchRecord>) -> Vec<MatchRecord> {
        let analyzed: Vec<MatchRecord> = records.into_iter().map(|r| self.analyze(r)).collect();
        debug!(
            records = analyzed.len(),
            in_pattern = analyzed.iter().filter(|r| r.is_in_pattern()).count(),
            "Pattern analysis complete"
        );
        analyzed
    }
}

/// Analyze one record with the default thresholds
pub fn analyze_pattern(record: MatchRecord) -> MatchRecord {
    PatternAnalyzer::new().analyze(record)
}
