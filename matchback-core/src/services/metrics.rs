//! Attribution Metrics Aggregator
//!
//! Read-only aggregates over classified match records for a given campaign
//! cost. Everything is recomputed from scratch on each call.
//!
//! Only matched records are credited. Out-of-pattern matches (including
//! records whose pattern was never set) are the population attributed to
//! the campaign. Every ratio with a zero denominator is defined as 0.

use crate::models::{CustomerType, MatchRecord};
use crate::services::customer_classifier::signed_up_in_month_of;
use crate::services::pattern_corrector::CorrectionSummary;
use crate::services::pivot::{
    pivot_by_pattern, pivot_by_pattern_filtered, PatternPivot, PivotFilter, SegmentTotals,
};
use chrono::{DateTime, Utc};
use matchback_common::time;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Breakdown key for records the type classifier has not seen
pub const UNCLASSIFIED: &str = "UNCLASSIFIED";

/// Campaign attribution aggregate
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttributionMetrics {
    pub campaign_cost: f64,

    pub total_matches: usize,
    pub out_of_pattern_matches: usize,
    pub in_pattern_matches: usize,

    pub total_revenue: f64,
    pub out_of_pattern_revenue: f64,
    pub in_pattern_revenue: f64,

    /// Cost per acquisition over all matches
    pub cac_all_matches: f64,
    /// Cost per acquisition over out-of-pattern matches
    pub cac_out_of_pattern: f64,
    /// Return on ad spend over all matched revenue
    pub roas_overall: f64,
    /// Return on ad spend over out-of-pattern revenue
    pub roas_out_of_pattern: f64,

    pub new_signup_matches: usize,
    pub new_signup_revenue: f64,
    pub cac_new_signups: f64,
}

/// Compute attribution metrics for matched records
pub fn calculate_metrics(records: &[MatchRecord], campaign_cost: f64) -> AttributionMetrics {
    let mut m = AttributionMetrics {
        campaign_cost,
        ..AttributionMetrics::default()
    };

    for record in records.iter().filter(|r| r.matched) {
        let sales = record.record.sales_amount();
        m.total_matches += 1;
        m.total_revenue += sales;

        if record.is_in_pattern() {
            m.in_pattern_matches += 1;
            m.in_pattern_revenue += sales;
        } else {
            m.out_of_pattern_matches += 1;
            m.out_of_pattern_revenue += sales;
        }

        if record.is_new_signup() {
            m.new_signup_matches += 1;
            m.new_signup_revenue += sales;
        }
    }

    m.cac_all_matches = ratio(campaign_cost, m.total_matches as f64);
    m.cac_out_of_pattern = ratio(campaign_cost, m.out_of_pattern_matches as f64);
    m.cac_new_signups = ratio(campaign_cost, m.new_signup_matches as f64);
    m.roas_overall = ratio(m.total_revenue, campaign_cost);
    m.roas_out_of_pattern = ratio(m.out_of_pattern_revenue, campaign_cost);

    debug!(
        matches = m.total_matches,
        out_of_pattern = m.out_of_pattern_matches,
        cac_out_of_pattern = m.cac_out_of_pattern,
        roas_out_of_pattern = m.roas_out_of_pattern,
        "Attribution metrics computed"
    );
    m
}

/// Count and revenue per customer type among matched records
pub fn customer_type_breakdown(records: &[MatchRecord]) -> BTreeMap<String, SegmentTotals> {
    let mut breakdown: BTreeMap<String, SegmentTotals> = BTreeMap::new();
    for record in records.iter().filter(|r| r.matched) {
        let key = record
            .customer_type
            .map(|t| t.as_str())
            .unwrap_or(UNCLASSIFIED);
        breakdown.entry(key.to_string()).or_default().add(record);
    }
    breakdown
}

/// Matched records whose signup falls in the reference month
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RecentSignupSummary {
    pub as_of: DateTime<Utc>,
    pub matches: usize,
    pub revenue: f64,
}

/// Recent-signup matches relative to an explicit reference instant
///
/// Uses the same month predicate as the customer-type classifier, so with
/// `as_of` equal to the campaign date this agrees with the `NEW_SIGNUP`
/// counts in [`AttributionMetrics`].
pub fn recent_signup_summary(records: &[MatchRecord], as_of: DateTime<Utc>) -> RecentSignupSummary {
    let mut totals = SegmentTotals::default();
    for record in records
        .iter()
        .filter(|r| r.matched && signed_up_in_month_of(&r.record, &as_of))
    {
        totals.add(record);
    }
    RecentSignupSummary {
        as_of,
        matches: totals.count,
        revenue: totals.sales,
    }
}

/// Recent-signup matches relative to the wall clock
///
/// Unlike the classifier, this uses "now" rather than the campaign date.
/// Results drift as time passes; prefer [`recent_signup_summary`] with an
/// explicit reference when reproducibility matters.
pub fn recent_signup_summary_now(records: &[MatchRecord]) -> RecentSignupSummary {
    recent_signup_summary(records, time::now())
}

/// Everything the report/export layer needs for one processed batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsReport {
    pub metrics: AttributionMetrics,
    pub pattern_pivot: PatternPivot,
    pub recent_signup_pivot: PatternPivot,
    pub customer_types: BTreeMap<String, SegmentTotals>,
    pub recent_signups: RecentSignupSummary,
    pub pattern_corrections: usize,
}

impl MetricsReport {
    /// Assemble a report with recent-signup figures relative to `as_of`
    pub fn build(
        records: &[MatchRecord],
        campaign_cost: f64,
        as_of: DateTime<Utc>,
        corrections: &CorrectionSummary,
    ) -> Self {
        Self {
            metrics: calculate_metrics(records, campaign_cost),
            pattern_pivot: pivot_by_pattern(records),
            recent_signup_pivot: pivot_by_pattern_filtered(
                records,
                PivotFilter::RecentSignups { as_of },
            ),
            customer_types: customer_type_breakdown(records),
            recent_signups: recent_signup_summary(records, as_of),
            pattern_corrections: corrections.corrections_applied,
        }
    }

    /// Number of matched records in a given customer type
    pub fn matches_of_type(&self, customer_type: CustomerType) -> usize {
        self.customer_types
            .get(customer_type.as_str())
            .map(|t| t.count)
            .unwrap_or(0)
    }
}

fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}
