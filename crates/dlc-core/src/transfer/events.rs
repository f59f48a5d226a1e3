//! Per-transfer event sink handed to `Transfer::begin`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use crate::key::TransferKey;

/// Receiver of transfer events; implemented by the coordinator's shared state.
pub(crate) trait EventSink: Send + Sync {
    fn progress(&self, key: &TransferKey, ticket: u64, fraction: f64);
    fn complete(&self, key: &TransferKey, ticket: u64, success: bool);
}

/// Reports progress and completion for one transfer back to the coordinator.
///
/// Cheap to clone and safe to use from any thread. Only the first `complete`
/// counts; events after it, or after the coordinator is dropped, are ignored.
#[derive(Clone)]
pub struct TransferEvents {
    sink: Weak<dyn EventSink>,
    key: TransferKey,
    ticket: u64,
    finished: Arc<AtomicBool>,
}

impl TransferEvents {
    pub(crate) fn new(sink: Weak<dyn EventSink>, key: TransferKey, ticket: u64) -> Self {
        Self {
            sink,
            key,
            ticket,
            finished: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn is_finished(&self) -> bool {
        self.finished.load(Ordering::Acquire)
    }

    /// Report this transfer's own fraction in `[0.0, 1.0]`.
    pub fn progress(&self, fraction: f64) {
        if self.is_finished() {
            return;
        }
        if let Some(sink) = self.sink.upgrade() {
            sink.progress(&self.key, self.ticket, fraction);
        }
    }

    /// Report that the transfer ended, successfully or not.
    pub fn complete(&self, success: bool) {
        if self.finished.swap(true, Ordering::AcqRel) {
            return;
        }
        if let Some(sink) = self.sink.upgrade() {
            sink.complete(&self.key, self.ticket, success);
        }
    }
}

impl std::fmt::Debug for TransferEvents {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransferEvents")
            .field("key", &self.key)
            .field("ticket", &self.ticket)
            .field("finished", &self.is_finished())
            .finish()
    }
}
