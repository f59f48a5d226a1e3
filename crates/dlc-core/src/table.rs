//! In-flight transfer table: key -> fractional progress.
//!
//! The table itself is plain data. The coordinator keeps it behind its single
//! mutex so every put/remove/snapshot is serialized with aggregate
//! recomputation and observer notification.

use std::collections::HashMap;

use crate::key::TransferKey;

/// Progress of every in-flight transfer. Entry present <=> transfer in flight.
#[derive(Debug, Clone, Default)]
pub struct TransferTable {
    entries: HashMap<TransferKey, f64>,
}

impl TransferTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the fraction for `key`, clamped into `[0.0, 1.0]`.
    pub fn put(&mut self, key: TransferKey, fraction: f64) {
        self.entries.insert(key, fraction.clamp(0.0, 1.0));
    }

    /// Remove `key`; returns its last fraction if it was present.
    pub fn remove(&mut self, key: &TransferKey) -> Option<f64> {
        self.entries.remove(key)
    }

    pub fn get(&self, key: &TransferKey) -> Option<f64> {
        self.entries.get(key).copied()
    }

    pub fn contains(&self, key: &TransferKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Slowest in-flight transfer, or `None` when the table is empty.
    pub fn min_fraction(&self) -> Option<f64> {
        self.entries.values().copied().reduce(f64::min)
    }

    /// Owned copy of the current contents.
    pub fn snapshot(&self) -> HashMap<TransferKey, f64> {
        self.entries.clone()
    }
}
