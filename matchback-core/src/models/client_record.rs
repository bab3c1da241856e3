//! Client-supplied customer record

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One customer as supplied by the client
///
/// Parsed upstream from spreadsheet/CSV rows: dates are already real UTC
/// instants and numeric fields already coerced. Every field except the visit
/// count is optional because client files are routinely incomplete.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientRecord {
    /// Single combined name, used when first/last are absent
    pub name: Option<String>,

    #[serde(alias = "first_name")]
    pub first_name: Option<String>,

    #[serde(alias = "last_name")]
    pub last_name: Option<String>,

    pub email: Option<String>,

    /// Street address line
    pub address: Option<String>,

    pub city: Option<String>,

    pub state: Option<String>,

    pub zip: Option<String>,

    pub phone: Option<String>,

    #[serde(alias = "customer_id")]
    pub customer_id: Option<String>,

    #[serde(alias = "signup_date")]
    pub signup_date: Option<DateTime<Utc>>,

    #[serde(alias = "first_visit_date", alias = "visit1Date")]
    pub first_visit_date: Option<DateTime<Utc>>,

    #[serde(default, alias = "total_visits")]
    pub total_visits: u32,

    /// Lifetime sales amount
    #[serde(alias = "total_sales")]
    pub total_sales: Option<f64>,

    /// Market code
    pub market: Option<String>,
}

impl ClientRecord {
    /// Display name: "first last" when either part is present, else `name`
    ///
    /// Returns `None` when no usable name exists.
    pub fn display_name(&self) -> Option<String> {
        let first = non_blank(&self.first_name).unwrap_or("");
        let last = non_blank(&self.last_name).unwrap_or("");
        let combined = format!("{} {}", first, last).trim().to_string();
        if !combined.is_empty() {
            return Some(combined);
        }
        non_blank(&self.name).map(|n| n.to_string())
    }

    /// Display address: present address/city/state/zip parts joined by ", "
    pub fn display_address(&self) -> Option<String> {
        let parts: Vec<&str> = [&self.address, &self.city, &self.state, &self.zip]
            .into_iter()
            .filter_map(non_blank)
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(", "))
        }
    }

    /// Email with surrounding whitespace removed, if any
    pub fn contact_email(&self) -> Option<&str> {
        non_blank(&self.email)
    }

    pub fn contact_phone(&self) -> Option<&str> {
        non_blank(&self.phone)
    }

    /// Lifetime sales, treating absent or non-finite values as zero
    pub fn sales_amount(&self) -> f64 {
        match self.total_sales {
            Some(v) if v.is_finite() => v,
            _ => 0.0,
        }
    }
}

/// Trimmed string slice, or `None` for absent/whitespace-only values
fn non_blank(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
}
