//! Sanitizer: vendor-safe projection of client records
//!
//! Every client record is reduced to the fixed five-field [`SanitizedRecord`]
//! shape and keyed by a fresh tracking identifier. The originals are kept in
//! a [`ReconciliationMap`] side-table for the return trip.
//!
//! The fixed shape is the primary privacy mechanism. A key-level leak scan
//! runs over the serialized output as a safety net, because downstream
//! collaborators handle these records as dynamic objects. Any hit aborts the
//! whole batch.

use crate::models::{ClientRecord, ReconciliationMap, SanitizedRecord};
use crate::services::tracking_id;
use matchback_common::{time, Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, info, warn};

/// Key of the tracking identifier in sanitized output (allow-listed)
pub const TRACKING_ID_FIELD: &str = "dcm_id";

/// Built-in sensitive key patterns, in normalized form
///
/// Keys are normalized (lowercase, alphanumerics only) before a substring
/// match, so `signup_date`, `SignupDate` and `signup-date` all hit `signup`.
pub const SENSITIVE_FIELD_PATTERNS: &[&str] = &[
    "customerid",
    "custid",
    "signup",
    "visit",
    "total",
    "sales",
    "revenue",
    "lifetime",
    "ltv",
];

/// Missing-email share above which a batch is logged as a warning
const MISSING_EMAIL_WARN_PERCENT: f64 = 25.0;

/// Counters describing one sanitization batch
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SanitizationStats {
    pub total_records: usize,
    pub sanitized_records: usize,
    pub missing_emails: usize,
    pub missing_email_percentage: f64,
    pub missing_names: usize,
    pub missing_phones: usize,
    /// Timestamp shared by every identifier in the batch
    pub batch_timestamp: i64,
}

/// Result of [`Sanitizer::sanitize_for_vendor`]
#[derive(Debug, Clone)]
pub struct SanitizationOutput {
    /// Vendor-safe rows, in input order
    pub sanitized: Vec<SanitizedRecord>,
    pub reconciliation_map: ReconciliationMap,
    pub stats: SanitizationStats,
}

/// Sanitizer with an optional set of extra leak-check patterns
#[derive(Debug, Clone, Default)]
pub struct Sanitizer {
    extra_patterns: Vec<String>,
}

impl Sanitizer {
    /// Create sanitizer using only the built-in sensitive patterns
    pub fn new() -> Self {
        Self::default()
    }

    /// Add site-specific leak-check patterns (normalized like field keys)
    pub fn with_extra_patterns<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            extra_patterns: patterns
                .into_iter()
                .map(|p| normalize_key(p.as_ref()))
                .filter(|p| !p.is_empty())
                .collect(),
        }
    }

    /// Sanitize a batch using the current epoch milliseconds as batch timestamp
    pub fn sanitize_for_vendor(
        &self,
        records: &[ClientRecord],
        campaign_token: &str,
        market: &str,
    ) -> Result<SanitizationOutput> {
        self.sanitize_for_vendor_at(records, campaign_token, market, time::epoch_millis_now())
    }

    /// Sanitize a batch with an explicit batch timestamp
    ///
    /// Deterministic: identical inputs produce identical output, which is
    /// what makes whole-batch retries safe.
    ///
    /// # Errors
    /// - `Error::InvalidInput` if a token sanitizes to nothing
    /// - `Error::PrivacyViolation` if the leak scan finds a sensitive key
    pub fn sanitize_for_vendor_at(
        &self,
        records: &[ClientRecord],
        campaign_token: &str,
        market: &str,
        batch_timestamp: i64,
    ) -> Result<SanitizationOutput> {
        if tracking_id::sanitize_token(campaign_token).is_empty() {
            return Err(Error::InvalidInput(format!(
                "Campaign token '{}' has no alphanumeric characters",
                campaign_token
            )));
        }
        if tracking_id::sanitize_token(market).is_empty() {
            return Err(Error::InvalidInput(format!(
                "Market '{}' has no alphanumeric characters",
                market
            )));
        }

        debug!(
            records = records.len(),
            batch_timestamp, "Sanitizing client records for vendor"
        );

        let mut stats = SanitizationStats {
            total_records: records.len(),
            batch_timestamp,
            ..SanitizationStats::default()
        };
        let mut sanitized = Vec::with_capacity(records.len());
        let mut reconciliation_map = ReconciliationMap::new();

        for (index, record) in records.iter().enumerate() {
            let dcm_id =
                tracking_id::generate(campaign_token, market, index as u64 + 1, batch_timestamp);

            let name = record.display_name();
            let email = record.contact_email();
            let phone = record.contact_phone();
            if name.is_none() {
                stats.missing_names += 1;
            }
            if email.is_none() {
                stats.missing_emails += 1;
            }
            if phone.is_none() {
                stats.missing_phones += 1;
            }

            sanitized.push(SanitizedRecord {
                dcm_id: dcm_id.clone(),
                name: name.unwrap_or_default(),
                email: email.unwrap_or_default().to_string(),
                address: record.display_address().unwrap_or_default(),
                phone: phone.unwrap_or_default().to_string(),
            });
            reconciliation_map.insert(dcm_id, record.clone());
        }

        self.check_for_leaks(&sanitized)?;

        stats.sanitized_records = sanitized.len();
        stats.missing_email_percentage = percentage(stats.missing_emails, stats.total_records);

        if stats.missing_email_percentage > MISSING_EMAIL_WARN_PERCENT {
            warn!(
                "{:.1}% of records ({} of {}) have no email address",
                stats.missing_email_percentage, stats.missing_emails, stats.total_records
            );
        }
        info!(
            sanitized = stats.sanitized_records,
            missing_emails = stats.missing_emails,
            "Sanitization complete"
        );

        Ok(SanitizationOutput {
            sanitized,
            reconciliation_map,
            stats,
        })
    }

    /// Scan every key of every record for sensitive field names
    ///
    /// # Errors
    /// `Error::PrivacyViolation` naming the first offending key and record.
    pub fn check_for_leaks(&self, records: &[SanitizedRecord]) -> Result<()> {
        for record in records {
            let value = serde_json::to_value(record)?;
            if let Some(field) = self.find_sensitive_keys(&value).into_iter().next() {
                error!(
                    field = %field,
                    dcm_id = %record.dcm_id,
                    "Sensitive field detected in sanitized output, rejecting batch"
                );
                return Err(Error::PrivacyViolation {
                    field,
                    record: record.dcm_id.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Sensitive keys present in a dynamic record object
    ///
    /// Only top-level keys are inspected; sanitized rows are flat. A value
    /// that is not an object has no keys and yields nothing.
    pub fn find_sensitive_keys(&self, value: &Value) -> Vec<String> {
        let Some(object) = value.as_object() else {
            return Vec::new();
        };
        object
            .keys()
            .filter(|key| self.is_sensitive_key(key))
            .cloned()
            .collect()
    }

    /// True when a key matches any sensitive pattern and is not the tracking id
    pub fn is_sensitive_key(&self, key: &str) -> bool {
        let normalized = normalize_key(key);
        if normalized == normalize_key(TRACKING_ID_FIELD) {
            return false;
        }
        SENSITIVE_FIELD_PATTERNS
            .iter()
            .copied()
            .chain(self.extra_patterns.iter().map(String::as_str))
            .any(|pattern| normalized.contains(pattern))
    }
}

/// Sanitize with the default [`Sanitizer`]
pub fn sanitize_for_vendor(
    records: &[ClientRecord],
    campaign_token: &str,
    market: &str,
) -> Result<SanitizationOutput> {
    Sanitizer::new().sanitize_for_vendor(records, campaign_token, market)
}

fn normalize_key(key: &str) -> String {
    key.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}
