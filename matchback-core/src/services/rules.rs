//! Classification thresholds shared by the pattern and customer-type stages

use matchback_common::config::RulesConfig;

/// Thresholds for pattern analysis, customer typing and pattern correction
///
/// Defaults: 3 visits for a regular-customer pattern, a 1-30 day
/// signup-to-visit window for new visitors, and 5 years for winbacks.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationRules {
    pub pattern_min_visits: u32,
    pub new_visitor_min_days: f64,
    pub new_visitor_max_days: f64,
    pub winback_min_years: f64,
}

impl Default for ClassificationRules {
    fn default() -> Self {
        Self::from(&RulesConfig::default())
    }
}

impl From<&RulesConfig> for ClassificationRules {
    fn from(config: &RulesConfig) -> Self {
        Self {
            pattern_min_visits: config.pattern_min_visits,
            new_visitor_min_days: config.new_visitor_min_days,
            new_visitor_max_days: config.new_visitor_max_days,
            winback_min_years: config.winback_min_years,
        }
    }
}
