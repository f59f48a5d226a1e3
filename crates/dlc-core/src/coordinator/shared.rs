//! Coordinator state behind the single serialization point.
//!
//! Every table mutation, the aggregate recomputation that follows it, and the
//! observer notification for it happen under one `Mutex` acquisition. Caller
//! callbacks and transfer start/cancel always run after the guard is dropped.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;

use crate::aggregate::{AggregateState, Aggregator};
use crate::key::TransferKey;
use crate::observer::ObserverRegistry;
use crate::table::TransferTable;
use crate::transfer::{EventSink, TransferHandle};

use super::callbacks::{CompletionFn, ProgressFn, RequestCallbacks};

/// Bookkeeping for one in-flight transfer, alongside its table entry.
pub(super) struct InFlight {
    /// Distinguishes this transfer from a later one under the same key.
    pub(super) ticket: u64,
    pub(super) handle: Option<Box<dyn TransferHandle>>,
    /// Highest fraction seen, for per-key clamping.
    pub(super) peak: f64,
    /// Callbacks of the starting call and of every call joined onto it.
    pub(super) callers: Vec<RequestCallbacks>,
}

#[derive(Default)]
pub(super) struct Inner {
    pub(super) table: TransferTable,
    pub(super) aggregator: Aggregator,
    pub(super) observers: ObserverRegistry,
    pub(super) in_flight: HashMap<TransferKey, InFlight>,
    pub(super) next_ticket: u64,
}

impl Inner {
    /// Recompute the aggregate and notify observers. Call once per table mutation.
    pub(super) fn publish(&mut self) -> AggregateState {
        let state = self.aggregator.apply(&self.table);
        self.observers.notify(&state);
        state
    }

    /// Remove `key` if its current ticket is `ticket`; returns the callers to notify.
    pub(super) fn finish(&mut self, key: &TransferKey, ticket: u64) -> Option<Vec<RequestCallbacks>> {
        match self.in_flight.get(key) {
            Some(entry) if entry.ticket == ticket => {}
            _ => return None,
        }
        let entry = self.in_flight.remove(key)?;
        self.table.remove(key);
        let state = self.publish();
        tracing::debug!(%key, ?state, remaining = self.table.len(), "transfer removed");
        Some(entry.callers)
    }
}

pub(super) struct Shared {
    inner: Mutex<Inner>,
    /// `true` while at least one transfer is in flight.
    busy: watch::Sender<bool>,
    clamp_per_key: bool,
}

impl Shared {
    pub(super) fn new(clamp_per_key: bool) -> Self {
        let (busy, _) = watch::channel(false);
        Self {
            inner: Mutex::new(Inner::default()),
            busy,
            clamp_per_key,
        }
    }

    /// Enter the serialization point. A panic in an observer must not wedge
    /// every later transfer, so poisoning is ignored.
    pub(super) fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(super) fn busy(&self) -> &watch::Sender<bool> {
        &self.busy
    }

    /// Mirror table occupancy into the watch channel. Call with the lock held.
    pub(super) fn sync_busy(&self, inner: &Inner) {
        let busy = !inner.table.is_empty();
        self.busy.send_if_modified(|current| {
            let changed = *current != busy;
            *current = busy;
            changed
        });
    }

    /// Completion path shared by transfer events and `Coordinator::cancel`.
    pub(super) fn complete_transfer(&self, key: &TransferKey, ticket: u64, success: bool) -> bool {
        let callers = {
            let mut inner = self.lock();
            let callers = inner.finish(key, ticket);
            self.sync_busy(&inner);
            callers
        };
        let Some(callers) = callers else {
            tracing::debug!(%key, ticket, "ignoring completion for stale transfer");
            return false;
        };
        if success {
            tracing::info!(%key, "transfer succeeded");
        } else {
            tracing::warn!(%key, "transfer failed or canceled");
        }
        let completions: Vec<CompletionFn> =
            callers.into_iter().filter_map(|c| c.on_completion).collect();
        for f in completions {
            f(success);
        }
        true
    }
}

impl EventSink for Shared {
    fn progress(&self, key: &TransferKey, ticket: u64, fraction: f64) {
        if fraction.is_nan() {
            tracing::warn!(%key, "ignoring NaN progress value");
            return;
        }
        let fraction = fraction.clamp(0.0, 1.0);
        let forward = {
            let mut inner = self.lock();
            let Some(entry) = inner.in_flight.get_mut(key).filter(|e| e.ticket == ticket) else {
                tracing::debug!(%key, ticket, "ignoring progress for stale transfer");
                return;
            };
            let applied = if self.clamp_per_key {
                entry.peak.max(fraction)
            } else {
                fraction
            };
            entry.peak = entry.peak.max(fraction);
            let forward: Vec<ProgressFn> = entry
                .callers
                .iter()
                .filter_map(|c| c.on_progress.clone())
                .collect();
            inner.table.put(key.clone(), applied);
            let state = inner.publish();
            tracing::trace!(%key, fraction, applied, ?state, "progress");
            forward
        };
        for f in forward {
            f(fraction);
        }
    }

    fn complete(&self, key: &TransferKey, ticket: u64, success: bool) {
        self.complete_transfer(key, ticket, success);
    }
}
