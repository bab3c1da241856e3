//! Customer-Type Classifier
//!
//! Assigns a lifecycle category from signup and first-visit timing. Rules
//! are evaluated in fixed priority order, first match wins:
//!
//! 1. Signup in the campaign's UTC year+month → `NEW_SIGNUP` (checked before
//!    any visit timing, even when visit data exists)
//! 2. No first visit → `EXISTING`
//! 3. First visit 1-30 days after signup → `NEW_VISITOR`
//! 4. First visit 5+ years (of 365 days) after signup → `WINBACK`
//! 5. Otherwise → `EXISTING`
//!
//! A record without a signup date cannot satisfy rules 1, 3 or 4 and is
//! classified `EXISTING`.

use crate::models::{ClientRecord, CustomerType, MatchRecord};
use crate::services::rules::ClassificationRules;
use chrono::{DateTime, Utc};
use matchback_common::time;
use tracing::debug;

const DAYS_PER_YEAR: f64 = 365.0;

/// True when the record's signup falls in the reference instant's UTC month
///
/// This is the single definition of "new signup" used both by rule 1 and by
/// the recent-signup aggregates in the metrics stage.
pub fn signed_up_in_month_of(record: &ClientRecord, reference: &DateTime<Utc>) -> bool {
    record
        .signup_date
        .as_ref()
        .is_some_and(|signup| time::same_utc_month(signup, reference))
}

/// Customer-Type Classifier
#[derive(Debug, Clone, Default)]
pub struct CustomerClassifier {
    rules: ClassificationRules,
}

impl CustomerClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rules(rules: &ClassificationRules) -> Self {
        Self {
            rules: rules.clone(),
        }
    }

    /// Lifecycle category for a client record relative to the campaign date
    pub fn customer_type(
        &self,
        record: &ClientRecord,
        campaign_date: &DateTime<Utc>,
    ) -> CustomerType {
        if signed_up_in_month_of(record, campaign_date) {
            return CustomerType::NewSignup;
        }

        let Some(visit) = record.first_visit_date.as_ref() else {
            return CustomerType::Existing;
        };
        let Some(signup) = record.signup_date.as_ref() else {
            return CustomerType::Existing;
        };

        let days_since_signup = time::days_between(signup, visit);
        if days_since_signup >= self.rules.new_visitor_min_days
            && days_since_signup <= self.rules.new_visitor_max_days
        {
            CustomerType::NewVisitor
        } else if days_since_signup / DAYS_PER_YEAR >= self.rules.winback_min_years {
            CustomerType::Winback
        } else {
            CustomerType::Existing
        }
    }

    /// Set `customer_type`; no other field is touched
    pub fn classify(&self, mut record: MatchRecord, campaign_date: &DateTime<Utc>) -> MatchRecord {
        record.customer_type = Some(self.customer_type(&record.record, campaign_date));
        record
    }

    /// Classify a batch, preserving order
    pub fn classify_all(
        &self,
        records: Vec<MatchRecord>,
        campaign_date: &DateTime<Utc>,
    ) -> Vec<MatchRecord> {
        let classified: Vec<MatchRecord> = records
            .into_iter()
            .map(|r| self.classify(r, campaign_date))
            .collect();
        debug!(
            records = classified.len(),
            new_signups = classified.iter().filter(|r| r.is_new_signup()).count(),
            "Customer-type classification complete"
        );
        classified
    }
}

/// Classify one record with the default thresholds
pub fn classify(record: MatchRecord, campaign_date: &DateTime<Utc>) -> MatchRecord {
    CustomerClassifier::new().classify(record, campaign_date)
}
