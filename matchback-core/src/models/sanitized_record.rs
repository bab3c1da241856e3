//! Vendor-safe record shape and the reverse mapping back to originals

use super::ClientRecord;
use crate::services::tracking_id::TrackingId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The only record shape that leaves the system
///
/// Exactly five keys: `dcm_id`, `name`, `email`, `address`, `phone`. Absent
/// contact values are sent as empty strings so every vendor row has the
/// same columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SanitizedRecord {
    pub dcm_id: TrackingId,
    pub name: String,
    pub email: String,
    pub address: String,
    pub phone: String,
}

/// Side-table from tracking identifier to the original client record
///
/// Built once per sanitization batch and consumed by reconciliation. The
/// core never persists it; a caller that must survive a restart between
/// send and receive serializes it itself.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReconciliationMap {
    entries: BTreeMap<TrackingId, ClientRecord>,
}

impl ReconciliationMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an original record; returns the previous entry on id collision
    pub(crate) fn insert(&mut self, id: TrackingId, record: ClientRecord) -> Option<ClientRecord> {
        self.entries.insert(id, record)
    }

    pub fn get(&self, id: &TrackingId) -> Option<&ClientRecord> {
        self.entries.get(id)
    }

    pub fn contains(&self, id: &TrackingId) -> bool {
        self.entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in tracking-id order (sequence order within one batch)
    pub fn iter(&self) -> impl Iterator<Item = (&TrackingId, &ClientRecord)> {
        self.entries.iter()
    }
}

impl FromIterator<(TrackingId, ClientRecord)> for ReconciliationMap {
    fn from_iter<I: IntoIterator<Item = (TrackingId, ClientRecord)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
