//! Tracking Identifier Codec (DCM-ID)
//!
//! Format: `{campaignToken}-{marketToken}-{batchTimestamp}-{sequence}`
//!
//! - Tokens are stripped to ASCII alphanumerics; the market token is upper-cased
//! - `batchTimestamp` is any integer the caller picks (epoch millis by default)
//! - `sequence` is 1-indexed, zero-padded to 5 digits; wider values render wider
//!
//! The identifier is the only key correlating a vendor row with its original
//! record, and carries nothing derived from client data.

use matchback_common::time;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Minimum rendered width of the sequence component
pub const SEQUENCE_WIDTH: usize = 5;

const SEPARATOR: char = '-';

/// Opaque per-record tracking identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackingId(String);

impl TrackingId {
    /// Wrap an identifier received from outside (e.g. a vendor response)
    ///
    /// No validation happens here; use [`TrackingId::parse`] to inspect it.
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Split into components (never fails; see [`parse`])
    pub fn parse(&self) -> ParsedTrackingId {
        parse(&self.0)
    }
}

impl fmt::Display for TrackingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for TrackingId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Components of a tracking identifier
///
/// When `is_valid` is false every other field is zero/empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedTrackingId {
    pub campaign_token: String,
    pub market_token: String,
    pub timestamp: i64,
    pub sequence: u64,
    pub is_valid: bool,
}

/// Strip everything except ASCII letters and digits
pub fn sanitize_token(token: &str) -> String {
    token.chars().filter(|c| c.is_ascii_alphanumeric()).collect()
}

/// Build one identifier
///
/// # Examples
///
/// ```
/// use matchback_core::services::tracking_id::generate;
///
/// let id = generate("TIDE-123", "hou", 1, 1700000000);
/// assert_eq!(id.as_str(), "TIDE123-HOU-1700000000-00001");
/// ```
pub fn generate(
    campaign_token: &str,
    market_token: &str,
    sequence: u64,
    batch_timestamp: i64,
) -> TrackingId {
    TrackingId(format!(
        "{}{sep}{}{sep}{}{sep}{:0width$}",
        sanitize_token(campaign_token),
        sanitize_token(market_token).to_ascii_uppercase(),
        batch_timestamp,
        sequence,
        sep = SEPARATOR,
        width = SEQUENCE_WIDTH,
    ))
}

/// Build `count` identifiers sharing one batch timestamp, sequences `1..=count`
///
/// Uses the current epoch milliseconds when no timestamp is supplied. Callers
/// must use a fresh timestamp per batch to avoid sequence collisions.
pub fn generate_batch(
    campaign_token: &str,
    market_token: &str,
    count: usize,
    batch_timestamp: Option<i64>,
) -> Vec<TrackingId> {
    let timestamp = batch_timestamp.unwrap_or_else(time::epoch_millis_now);
    (1..=count as u64)
        .map(|sequence| generate(campaign_token, market_token, sequence, timestamp))
        .collect()
}

/// Split an identifier into its components
///
/// Malformed input is a data condition, not a programming error: the result
/// is simply marked invalid.
pub fn parse(id: &str) -> ParsedTrackingId {
    let parts: Vec<&str> = id.split(SEPARATOR).collect();
    if parts.len() != 4 {
        return ParsedTrackingId::default();
    }

    let (campaign, market) = (parts[0], parts[1]);
    if !is_ascii_digits(parts[2]) || !is_ascii_digits(parts[3]) {
        return ParsedTrackingId::default();
    }
    let timestamp = parts[2].parse::<i64>();
    let sequence = parts[3].parse::<u64>();

    match (timestamp, sequence) {
        (Ok(timestamp), Ok(sequence)) if !campaign.is_empty() && !market.is_empty() => {
            ParsedTrackingId {
                campaign_token: campaign.to_string(),
                market_token: market.to_string(),
                timestamp,
                sequence,
                is_valid: true,
            }
        }
        _ => ParsedTrackingId::default(),
    }
}

// `str::parse` also takes a leading `+`, which `generate` never emits
fn is_ascii_digits(part: &str) -> bool {
    !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_known_value() {
        let id = generate("TIDE-123", "hou", 1, 1700000000);
        assert_eq!(id.as_str(), "TIDE123-HOU-1700000000-00001");
    }

    #[test]
    fn test_generate_strips_non_alphanumerics() {
        let id = generate("Spring Sale!", "n.y.c", 42, 7);
        assert_eq!(id.as_str(), "SpringSale-NYC-7-00042");
    }

    #[test]
    fn test_sequence_wider_than_five_digits_renders_wider() {
        let id = generate("C", "M", 123_456, 1);
        assert_eq!(id.as_str(), "C-M-1-123456");
        assert_eq!(id.parse().sequence, 123_456);
    }

    #[test]
    fn test_round_trip() {
        let cases = [
            ("TIDE-123", "hou", 1u64, 1_700_000_000i64),
            ("camp", "Dal", 99_999, 0),
            ("a_b c", "x-y", 100_000, 1_726_000_000_000),
        ];
        for (campaign, market, seq, ts) in cases {
            let parsed = generate(campaign, market, seq, ts).parse();
            assert_eq!(
                parsed,
                ParsedTrackingId {
                    campaign_token: sanitize_token(campaign),
                    market_token: sanitize_token(market).to_ascii_uppercase(),
                    timestamp: ts,
                    sequence: seq,
                    is_valid: true,
                }
            );
        }
    }

    #[test]
    fn test_batch_shares_timestamp_and_counts_from_one() {
        let ids = generate_batch("TIDE", "hou", 3, Some(1234));
        assert_eq!(ids.len(), 3);
        for (k, id) in ids.iter().enumerate() {
            let parsed = id.parse();
            assert_eq!(parsed.sequence, k as u64 + 1);
            assert_eq!(parsed.timestamp, 1234);
        }
    }

    #[test]
    fn test_batch_without_timestamp_uses_clock() {
        let ids = generate_batch("TIDE", "hou", 2, None);
        let first = ids[0].parse();
        assert!(first.is_valid);
        assert_eq!(first.timestamp, ids[1].parse().timestamp);
        assert!(first.timestamp > 0);
        assert!(generate_batch("TIDE", "hou", 0, None).is_empty());
    }

    #[test]
    fn test_parse_rejects_wrong_part_count() {
        assert_eq!(parse("A-B-1"), ParsedTrackingId::default());
        assert_eq!(parse("A-B-1-2-3"), ParsedTrackingId::default());
        assert_eq!(parse(""), ParsedTrackingId::default());
    }

    #[test]
    fn test_parse_rejects_non_integer_components() {
        assert!(!parse("A-B-notanumber-00001").is_valid);
        assert!(!parse("A-B-1700000000-abc").is_valid);
    }

    #[test]
    fn test_parse_rejects_signed_or_padded_numbers() {
        assert_eq!(parse("TIDE-HOU-+5-+00001"), ParsedTrackingId::default());
        assert!(!parse("TIDE-HOU-5-+00001").is_valid);
        assert!(!parse("TIDE-HOU- 5-00001").is_valid);
        assert!(!parse("TIDE-HOU-5-00001 ").is_valid);
        assert!(parse("TIDE-HOU-5-00001").is_valid);
    }

    #[test]
    fn test_parse_rejects_empty_tokens() {
        let parsed = parse("-HOU-1-00001");
        assert!(!parsed.is_valid);
        assert_eq!(parsed.sequence, 0);
        assert!(!parse("TIDE--1-00001").is_valid);
    }

    #[test]
    fn test_from_raw_trims_whitespace() {
        let id = TrackingId::from_raw("  TIDE-HOU-1-00001\n");
        assert_eq!(id.as_str(), "TIDE-HOU-1-00001");
        assert!(id.parse().is_valid);
    }
}
