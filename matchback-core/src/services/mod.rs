//! Pipeline stages
//!
//! Leaf to root:
//! - `tracking_id`: DCM-ID codec
//! - `sanitizer`: vendor-safe projection + reconciliation map + leak check
//! - `reconciler`: vendor decisions back onto original records
//! - `rules`: classification thresholds shared by the classifiers
//! - `pattern_analyzer`: regular-customer visiting pattern
//! - `customer_classifier`: lifecycle category from signup/visit timing
//! - `pattern_corrector`: new-signup misclassification override
//! - `metrics` / `pivot`: attribution aggregates and cross-tabs

pub mod customer_classifier;
pub mod metrics;
pub mod pattern_analyzer;
pub mod pattern_corrector;
pub mod pivot;
pub mod reconciler;
pub mod rules;
pub mod sanitizer;
pub mod tracking_id;

pub use customer_classifier::{classify, CustomerClassifier};
pub use metrics::{calculate_metrics, AttributionMetrics, MetricsReport};
pub use pattern_analyzer::{analyze_pattern, PatternAnalyzer};
pub use pattern_corrector::{correct_pattern_flaws, CorrectionSummary, PatternCorrector};
pub use pivot::{missing_email_summary, pivot_by_pattern, PatternPivot, PivotFilter};
pub use reconciler::{reconcile, reconcile_with_stats, ReconciliationStats, VendorDecision};
pub use rules::ClassificationRules;
pub use sanitizer::{sanitize_for_vendor, SanitizationOutput, SanitizationStats, Sanitizer};
