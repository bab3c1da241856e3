//! matchback-core library
//!
//! The matchback attribution pipeline as pure, order-preserving transforms
//! over in-memory record collections:
//!
//! raw client records → sanitized vendor-safe records (+ reconciliation map)
//! → [vendor round trip, external] → reconciled records → pattern analysis
//! → customer-type classification → pattern correction → attribution metrics
//!
//! Nothing here performs I/O or holds shared mutable state; every call owns
//! its input and may run on any number of workers concurrently.

pub mod models;
pub mod pipeline;
pub mod services;

pub use matchback_common::{Error, Result};
pub use models::{
    ClientRecord, CustomerType, MatchRecord, ReconciliationMap, SanitizedRecord,
};
pub use pipeline::{CampaignContext, MatchbackPipeline, PipelineResult};
pub use services::tracking_id::{ParsedTrackingId, TrackingId};
