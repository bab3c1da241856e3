//! Reconciled record carried through classification and correction

use super::ClientRecord;
use serde::{Deserialize, Serialize};

/// Override marker written by the pattern corrector
pub const NEW_SIGNUP_CORRECTION: &str = "NEW_SIGNUP_CORRECTION";

/// Customer lifecycle category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CustomerType {
    /// Signed up in the campaign month
    NewSignup,
    /// First visit 1-30 days after signup
    NewVisitor,
    /// First visit 5+ years after signup
    Winback,
    /// Everything else
    Existing,
}

impl CustomerType {
    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            CustomerType::NewSignup => "NEW_SIGNUP",
            CustomerType::NewVisitor => "NEW_VISITOR",
            CustomerType::Winback => "WINBACK",
            CustomerType::Existing => "EXISTING",
        }
    }
}

impl std::fmt::Display for CustomerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Client record plus the fields owned by each downstream stage
///
/// Field ownership:
/// - `matched`: reconciler
/// - `in_pattern`: pattern analyzer, then pattern corrector
/// - `customer_type`: customer-type classifier
/// - `pattern_override`: pattern corrector only
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRecord {
    #[serde(flatten)]
    pub record: ClientRecord,

    pub matched: bool,

    pub in_pattern: Option<bool>,

    pub customer_type: Option<CustomerType>,

    pub pattern_override: Option<String>,
}

impl MatchRecord {
    /// Wrap an original record with the vendor's match decision
    pub fn reconciled(record: ClientRecord, matched: bool) -> Self {
        Self {
            record,
            matched,
            in_pattern: None,
            customer_type: None,
            pattern_override: None,
        }
    }

    /// True only when the pattern stage has positively flagged the record
    ///
    /// Unset counts as out-of-pattern for attribution.
    pub fn is_in_pattern(&self) -> bool {
        self.in_pattern == Some(true)
    }

    pub fn is_new_signup(&self) -> bool {
        self.customer_type == Some(CustomerType::NewSignup)
    }

    pub fn was_corrected(&self) -> bool {
        self.pattern_override.as_deref() == Some(NEW_SIGNUP_CORRECTION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_customer_type_serializes_screaming_snake() {
        let json = serde_json::to_string(&CustomerType::NewSignup).unwrap();
        assert_eq!(json, "\"NEW_SIGNUP\"");
        assert_eq!(CustomerType::Winback.to_string(), "WINBACK");
    }

    #[test]
    fn test_reconciled_leaves_stage_fields_unset() {
        let m = MatchRecord::reconciled(ClientRecord::default(), true);
        assert!(m.matched);
        assert_eq!(m.in_pattern, None);
        assert_eq!(m.customer_type, None);
        assert_eq!(m.pattern_override, None);
        assert!(!m.is_in_pattern());
    }

    #[test]
    fn test_flattened_serialization_keeps_original_fields() {
        let m = MatchRecord::reconciled(
            ClientRecord {
                email: Some("a@example.com".to_string()),
                total_visits: 2,
                ..ClientRecord::default()
            },
            false,
        );
        let value = serde_json::to_value(&m).unwrap();
        assert_eq!(value["email"], "a@example.com");
        assert_eq!(value["totalVisits"], 2);
        assert_eq!(value["matched"], false);

        let back: MatchRecord = serde_json::from_value(value).unwrap();
        assert_eq!(back, m);
    }
}
