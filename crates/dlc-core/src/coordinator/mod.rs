//! Download coordinator: de-duplicates concurrent requests per destination and
//! folds every in-flight transfer's progress into one observable state.
//!
//! ```text
//! start(source, dest) -> TransferKey -> [lock] dedup / insert (key, 0.0) -> publish [unlock]
//!                                        -> Transfer::begin (unlocked)
//! TransferEvents::progress -> [lock] table.put -> Aggregator -> observers [unlock] -> on_progress
//! TransferEvents::complete -> [lock] table.remove -> Aggregator -> observers [unlock] -> on_completion
//! ```

mod callbacks;
mod shared;


pub use callbacks::RequestCallbacks;

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use crate::aggregate::AggregateState;
use crate::key::{self, Destination, KeyDerivationError, TransferKey};
use crate::observer::{ObserverId, StateObserver, Subscription};
use crate::transfer::{EventSink, Transfer, TransferEvents, TransferRequest};

use shared::{InFlight, Shared};

/// Options that change coordinator behaviour (see `DlcConfig`).
#[derive(Debug, Clone, Copy, Default)]
pub struct CoordinatorOptions {
    /// Record `max(previous, new)` per key instead of the raw reported fraction.
    pub clamp_per_key: bool,
}

impl From<&crate::config::DlcConfig> for CoordinatorOptions {
    fn from(cfg: &crate::config::DlcConfig) -> Self {
        Self {
            clamp_per_key: cfg.clamp_per_key,
        }
    }
}

/// Result of a successful `start`.
#[derive(Debug, Clone, PartialEq)]
pub enum StartOutcome {
    /// A new underlying transfer was started for `key`.
    Started { key: TransferKey, state: AggregateState },
    /// `key` was already in flight; the request was attached to that transfer.
    Joined { key: TransferKey, state: AggregateState },
}

impl StartOutcome {
    pub fn key(&self) -> &TransferKey {
        match self {
            StartOutcome::Started { key, .. } | StartOutcome::Joined { key, .. } => key,
        }
    }

    /// Aggregate state right after this call.
    pub fn state(&self) -> AggregateState {
        match self {
            StartOutcome::Started { state, .. } | StartOutcome::Joined { state, .. } => *state,
        }
    }

    pub fn is_joined(&self) -> bool {
        matches!(self, StartOutcome::Joined { .. })
    }
}

/// Multiplexes concurrent downloads onto one aggregate progress signal.
///
/// Cheap to clone; clones share the same table and observers.
#[derive(Clone)]
pub struct Coordinator {
    shared: Arc<Shared>,
    transfer: Arc<dyn Transfer>,
}

impl Coordinator {
    pub fn new(transfer: Arc<dyn Transfer>, options: CoordinatorOptions) -> Self {
        Self {
            shared: Arc::new(Shared::new(options.clamp_per_key)),
            transfer,
        }
    }

    /// Request a download of `source` into `destination`.
    ///
    /// If the destination is already being downloaded no second transfer is
    /// started: the callbacks are attached to the running one and the current
    /// aggregate state is returned as `Joined`. Transfer failures are reported
    /// only through `on_completion(false)`, never from this call.
    pub fn start(
        &self,
        source: &str,
        destination: &Destination,
        callbacks: RequestCallbacks,
    ) -> Result<StartOutcome, KeyDerivationError> {
        let (url, key) = key::resolve(source, destination)?;

        let ticket = {
            let mut inner = self.shared.lock();
            if let Some(entry) = inner.in_flight.get_mut(&key) {
                entry.callers.push(callbacks);
                let state = inner.aggregator.state();
                tracing::debug!(%key, "joined in-flight transfer");
                return Ok(StartOutcome::Joined { key, state });
            }

            let ticket = inner.next_ticket;
            inner.next_ticket += 1;
            inner.in_flight.insert(
                key.clone(),
                InFlight {
                    ticket,
                    handle: None,
                    peak: 0.0,
                    callers: vec![callbacks],
                },
            );
            inner.table.put(key.clone(), 0.0);
            inner.publish();
            self.shared.sync_busy(&inner);
            ticket
        };
        tracing::info!(%key, source = %url, "starting transfer");

        let sink: Weak<dyn EventSink> = Arc::downgrade(&self.shared) as Weak<dyn EventSink>;
        let events = TransferEvents::new(sink, key.clone(), ticket);
        let request = TransferRequest {
            source: url,
            path: key.path().to_path_buf(),
            ticket,
        };
        match self.transfer.begin(request, events.clone()) {
            Ok(handle) => {
                let orphan = {
                    let mut inner = self.shared.lock();
                    match inner.in_flight.get_mut(&key) {
                        Some(entry) if entry.ticket == ticket => {
                            entry.handle = Some(handle);
                            None
                        }
                        // Finished or canceled before the handle was recorded.
                        _ => Some(handle),
                    }
                };
                if let Some(handle) = orphan {
                    handle.cancel();
                }
            }
            Err(e) => {
                tracing::warn!(%key, "could not begin transfer: {}", e);
                events.complete(false);
            }
        }

        let state = self.state();
        Ok(StartOutcome::Started { key, state })
    }

    /// Cancel the in-flight transfer for `key`.
    ///
    /// The underlying transfer is asked to stop, then the entry is removed
    /// exactly as on a failed completion. Returns `false` if `key` was not in flight.
    pub fn cancel(&self, key: &TransferKey) -> bool {
        let (ticket, handle) = {
            let mut inner = self.shared.lock();
            match inner.in_flight.get_mut(key) {
                Some(entry) => (entry.ticket, entry.handle.take()),
                None => return false,
            }
        };
        if let Some(handle) = handle {
            handle.cancel();
        }
        tracing::info!(%key, "cancel requested");
        self.shared.complete_transfer(key, ticket, false)
    }

    /// Whether completed data for this destination is already on disk.
    pub fn exists(&self, source: &str, destination: &Destination) -> bool {
        key::exists(source, destination)
    }

    /// Current aggregate state.
    pub fn state(&self) -> AggregateState {
        self.shared.lock().aggregator.state()
    }

    /// Copy of the transfer table.
    pub fn snapshot(&self) -> HashMap<TransferKey, f64> {
        self.shared.lock().table.snapshot()
    }

    pub fn in_flight(&self) -> usize {
        self.shared.lock().table.len()
    }

    pub fn is_in_flight(&self, key: &TransferKey) -> bool {
        self.shared.lock().table.contains(key)
    }

    /// Register a callback observer; it sees every state change from now on.
    pub fn add_observer(&self, observer: Arc<dyn StateObserver>) -> ObserverId {
        self.shared.lock().observers.add(observer)
    }

    pub fn remove_observer(&self, id: ObserverId) -> bool {
        self.shared.lock().observers.remove(id)
    }

    /// Channel subscription to every state change from now on.
    pub fn subscribe(&self) -> Subscription {
        self.shared.lock().observers.subscribe()
    }

    /// Resolves once no transfer is in flight (immediately if none is).
    pub async fn wait_idle(&self) {
        let mut rx = self.shared.busy().subscribe();
        // The sender lives as long as `self`, so this cannot fail.
        let _ = rx.wait_for(|busy| !*busy).await;
    }
}

impl std::fmt::Debug for Coordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.shared.lock();
        f.debug_struct("Coordinator")
            .field("state", &inner.aggregator.state())
            .field("in_flight", &inner.table.len())
            .field("observers", &inner.observers.len())
            .finish()
    }
}
