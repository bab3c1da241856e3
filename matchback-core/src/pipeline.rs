//! Pipeline driver
//!
//! Composes the stages for one campaign batch:
//!
//! 1. `prepare`: sanitize client records for the vendor (+ reconciliation map)
//! 2. [vendor round trip happens outside the core]
//! 3. `process`: reconcile → pattern analysis → customer typing → pattern
//!    correction → metrics report
//!
//! Customer typing reads only signup/visit dates, never `in_pattern`, so its
//! position relative to the corrector does not affect the output.

use crate::models::{ClientRecord, MatchRecord, ReconciliationMap};
use crate::services::customer_classifier::CustomerClassifier;
use crate::services::metrics::MetricsReport;
use crate::services::pattern_analyzer::PatternAnalyzer;
use crate::services::pattern_corrector::{CorrectionSummary, PatternCorrector};
use crate::services::reconciler::{reconcile_with_stats, ReconciliationStats, VendorDecision};
use crate::services::rules::ClassificationRules;
use crate::services::sanitizer::{SanitizationOutput, Sanitizer};
use crate::services::tracking_id;
use chrono::{DateTime, Utc};
use matchback_common::config::TomlConfig;
use matchback_common::{Error, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, info_span};
use uuid::Uuid;

/// Campaign parameters supplied by the external campaign lifecycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignContext {
    pub campaign_token: String,
    pub market: String,
    pub campaign_date: DateTime<Utc>,
    pub campaign_cost: f64,
}

impl CampaignContext {
    /// Validate and build a campaign context
    ///
    /// # Errors
    /// `Error::InvalidInput` when a token has no alphanumeric characters or
    /// the cost is negative or not finite.
    pub fn new(
        campaign_token: impl Into<String>,
        market: impl Into<String>,
        campaign_date: DateTime<Utc>,
        campaign_cost: f64,
    ) -> Result<Self> {
        let context = Self {
            campaign_token: campaign_token.into(),
            market: market.into(),
            campaign_date,
            campaign_cost,
        };
        if tracking_id::sanitize_token(&context.campaign_token).is_empty() {
            return Err(Error::InvalidInput(format!(
                "Campaign token '{}' has no alphanumeric characters",
                context.campaign_token
            )));
        }
        if tracking_id::sanitize_token(&context.market).is_empty() {
            return Err(Error::InvalidInput(format!(
                "Market '{}' has no alphanumeric characters",
                context.market
            )));
        }
        if !campaign_cost.is_finite() || campaign_cost < 0.0 {
            return Err(Error::InvalidInput(format!(
                "Campaign cost must be a non-negative number, got {}",
                campaign_cost
            )));
        }
        Ok(context)
    }
}

/// Output of [`MatchbackPipeline::process`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineResult {
    /// Identifies this run in logs
    pub run_id: Uuid,
    /// Classified and corrected records, in decision order
    pub records: Vec<MatchRecord>,
    pub reconciliation: ReconciliationStats,
    pub corrections: CorrectionSummary,
    pub report: MetricsReport,
}

/// Stage composition for one campaign
#[derive(Debug, Clone)]
pub struct MatchbackPipeline {
    context: CampaignContext,
    sanitizer: Sanitizer,
    analyzer: PatternAnalyzer,
    classifier: CustomerClassifier,
    corrector: PatternCorrector,
}

impl MatchbackPipeline {
    /// Pipeline with default thresholds and leak-check patterns
    pub fn new(context: CampaignContext) -> Self {
        Self::with_rules(context, &ClassificationRules::default(), Sanitizer::new())
    }

    /// Pipeline configured from the TOML `[rules]` and `[privacy]` sections
    pub fn from_config(context: CampaignContext, config: &TomlConfig) -> Self {
        Self::with_rules(
            context,
            &ClassificationRules::from(&config.rules),
            Sanitizer::with_extra_patterns(&config.privacy.extra_sensitive_patterns),
        )
    }

    pub fn with_rules(
        context: CampaignContext,
        rules: &ClassificationRules,
        sanitizer: Sanitizer,
    ) -> Self {
        Self {
            context,
            sanitizer,
            analyzer: PatternAnalyzer::with_rules(rules),
            classifier: CustomerClassifier::with_rules(rules),
            corrector: PatternCorrector::with_rules(rules),
        }
    }

    pub fn context(&self) -> &CampaignContext {
        &self.context
    }

    /// Sanitize client records for the vendor with a fresh batch timestamp
    pub fn prepare(&self, records: &[ClientRecord]) -> Result<SanitizationOutput> {
        self.sanitizer.sanitize_for_vendor(
            records,
            &self.context.campaign_token,
            &self.context.market,
        )
    }

    /// Sanitize with an explicit batch timestamp (retries of a known batch)
    pub fn prepare_at(
        &self,
        records: &[ClientRecord],
        batch_timestamp: i64,
    ) -> Result<SanitizationOutput> {
        self.sanitizer.sanitize_for_vendor_at(
            records,
            &self.context.campaign_token,
            &self.context.market,
            batch_timestamp,
        )
    }

    /// Run reconciliation through metrics for one vendor response
    ///
    /// Recent-signup figures in the report are taken relative to the
    /// campaign date, not the wall clock.
    pub fn process(&self, decisions: &[VendorDecision], map: &ReconciliationMap) -> PipelineResult {
        let run_id = Uuid::new_v4();
        let span = info_span!(
            "matchback_run",
            run_id = %run_id,
            campaign = %self.context.campaign_token
        );
        let _guard = span.enter();

        let (reconciled, reconciliation) = reconcile_with_stats(decisions, map);
        let analyzed = self.analyzer.analyze_all(reconciled);
        let classified = self
            .classifier
            .classify_all(analyzed, &self.context.campaign_date);
        let (records, corrections) = self.corrector.correct_all(classified);

        let report = MetricsReport::build(
            &records,
            self.context.campaign_cost,
            self.context.campaign_date,
            &corrections,
        );

        info!(
            records = records.len(),
            matches = report.metrics.total_matches,
            cac_out_of_pattern = report.metrics.cac_out_of_pattern,
            "Matchback run complete"
        );

        PipelineResult {
            run_id,
            records,
            reconciliation,
            corrections,
            report,
        }
    }
}
