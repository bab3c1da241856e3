//! Pivot summaries for reporting
//!
//! Cross-tabulates `{matched, in_pattern}` into four buckets with row,
//! column and grand totals, plus the missing-email rate summary.

use crate::models::{ClientRecord, MatchRecord};
use crate::services::customer_classifier::signed_up_in_month_of;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Record count and summed sales for one bucket
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SegmentTotals {
    pub count: usize,
    pub sales: f64,
}

impl SegmentTotals {
    pub fn add(&mut self, record: &MatchRecord) {
        self.count += 1;
        self.sales += record.record.sales_amount();
    }

    fn combine(a: SegmentTotals, b: SegmentTotals) -> SegmentTotals {
        SegmentTotals {
            count: a.count + b.count,
            sales: a.sales + b.sales,
        }
    }
}

/// Matched/unmatched rows × in/out-of-pattern columns
///
/// Unset `in_pattern` is counted in the out-of-pattern column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PatternPivot {
    pub matched_in_pattern: SegmentTotals,
    pub matched_out_of_pattern: SegmentTotals,
    pub unmatched_in_pattern: SegmentTotals,
    pub unmatched_out_of_pattern: SegmentTotals,

    // Row totals
    pub matched_total: SegmentTotals,
    pub unmatched_total: SegmentTotals,

    // Column totals
    pub in_pattern_total: SegmentTotals,
    pub out_of_pattern_total: SegmentTotals,

    pub grand_total: SegmentTotals,
}

/// Row filter applied before pivoting
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum PivotFilter {
    #[default]
    All,
    /// Only records whose signup falls in the UTC month of `as_of`
    RecentSignups { as_of: DateTime<Utc> },
}

impl PivotFilter {
    pub fn accepts(&self, record: &MatchRecord) -> bool {
        match self {
            PivotFilter::All => true,
            PivotFilter::RecentSignups { as_of } => signed_up_in_month_of(&record.record, as_of),
        }
    }
}

/// Pivot every record
pub fn pivot_by_pattern(records: &[MatchRecord]) -> PatternPivot {
    pivot_by_pattern_filtered(records, PivotFilter::All)
}

/// Pivot only the records accepted by `filter`
pub fn pivot_by_pattern_filtered(records: &[MatchRecord], filter: PivotFilter) -> PatternPivot {
    let mut pivot = PatternPivot::default();

    for record in records.iter().filter(|r| filter.accepts(r)) {
        let cell = match (record.matched, record.is_in_pattern()) {
            (true, true) => &mut pivot.matched_in_pattern,
            (true, false) => &mut pivot.matched_out_of_pattern,
            (false, true) => &mut pivot.unmatched_in_pattern,
            (false, false) => &mut pivot.unmatched_out_of_pattern,
        };
        cell.add(record);
    }

    pivot.matched_total =
        SegmentTotals::combine(pivot.matched_in_pattern, pivot.matched_out_of_pattern);
    pivot.unmatched_total =
        SegmentTotals::combine(pivot.unmatched_in_pattern, pivot.unmatched_out_of_pattern);
    pivot.in_pattern_total =
        SegmentTotals::combine(pivot.matched_in_pattern, pivot.unmatched_in_pattern);
    pivot.out_of_pattern_total =
        SegmentTotals::combine(pivot.matched_out_of_pattern, pivot.unmatched_out_of_pattern);
    pivot.grand_total = SegmentTotals::combine(pivot.matched_total, pivot.unmatched_total);
    pivot
}

/// Share of client records without a usable email address
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MissingEmailSummary {
    pub total_records: usize,
    pub missing_count: usize,
    pub missing_percentage: f64,
}

pub fn missing_email_summary(records: &[ClientRecord]) -> MissingEmailSummary {
    let missing_count = records
        .iter()
        .filter(|r| r.contact_email().is_none())
        .count();
    let missing_percentage = if records.is_empty() {
        0.0
    } else {
        missing_count as f64 / records.len() as f64 * 100.0
    };
    MissingEmailSummary {
        total_records: records.len(),
        missing_count,
        missing_percentage,
    }
}
