//! Data models flowing through the matchback pipeline
//!
//! - `ClientRecord`: customer row as supplied by the client (caller-owned)
//! - `SanitizedRecord`: the five vendor-safe fields sent out for matching
//! - `ReconciliationMap`: short-lived side-table from tracking id to original
//! - `MatchRecord`: client record plus match/classification fields

pub mod client_record;
pub mod match_record;
pub mod sanitized_record;

pub use client_record::ClientRecord;
pub use match_record::{CustomerType, MatchRecord, NEW_SIGNUP_CORRECTION};
pub use sanitized_record::{ReconciliationMap, SanitizedRecord};
