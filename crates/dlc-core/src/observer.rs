//! Observer registry: push notifications of aggregate state changes.
//!
//! Notifications are delivered while the coordinator holds its mutex, so every
//! observer sees transitions in exactly the order the table was mutated.
//! Observers must return quickly; channel subscribers never block the sender.
//!
//! A `StateObserver` must not call back into the coordinator (`state`,
//! `snapshot`, `start`, `cancel`, ...): the mutex is not reentrant and the call
//! deadlocks. Use the `&AggregateState` passed in, or hand it off to another
//! thread or a `Subscription` and act there.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::aggregate::AggregateState;

/// Callback-style observer. Called on every aggregate state change, with the
/// coordinator's lock held; see the module docs for what it must not do.
pub trait StateObserver: Send + Sync {
    fn on_state(&self, state: &AggregateState);
}

impl<F> StateObserver for F
where
    F: Fn(&AggregateState) + Send + Sync,
{
    fn on_state(&self, state: &AggregateState) {
        self(state)
    }
}

/// Handle returned by `add_observer`, used to unregister.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

/// Receiving side of a channel subscription.
///
/// Unbounded: the coordinator never waits on a slow subscriber and never drops
/// a transition. Dropping the subscription unregisters it on the next change.
#[derive(Debug)]
pub struct Subscription {
    rx: mpsc::UnboundedReceiver<AggregateState>,
}

impl Subscription {
    /// Next state change; `None` once the coordinator is gone.
    pub async fn recv(&mut self) -> Option<AggregateState> {
        self.rx.recv().await
    }

    /// Non-blocking poll of the next queued state.
    pub fn try_recv(&mut self) -> Option<AggregateState> {
        self.rx.try_recv().ok()
    }

    /// Drain everything queued so far.
    pub fn drain(&mut self) -> Vec<AggregateState> {
        std::iter::from_fn(|| self.try_recv()).collect()
    }
}

enum Sink {
    Callback(ObserverId, Arc<dyn StateObserver>),
    Channel(mpsc::UnboundedSender<AggregateState>),
}

#[derive(Default)]
pub(crate) struct ObserverRegistry {
    sinks: Vec<Sink>,
    next_id: u64,
}

impl ObserverRegistry {
    pub(crate) fn add(&mut self, observer: Arc<dyn StateObserver>) -> ObserverId {
        let id = ObserverId(self.next_id);
        self.next_id += 1;
        self.sinks.push(Sink::Callback(id, observer));
        id
    }

    pub(crate) fn remove(&mut self, id: ObserverId) -> bool {
        let before = self.sinks.len();
        self.sinks
            .retain(|s| !matches!(s, Sink::Callback(sid, _) if *sid == id));
        self.sinks.len() != before
    }

    pub(crate) fn subscribe(&mut self) -> Subscription {
        let (tx, rx) = mpsc::unbounded_channel();
        self.sinks.push(Sink::Channel(tx));
        Subscription { rx }
    }

    pub(crate) fn len(&self) -> usize {
        self.sinks.len()
    }

    /// Deliver `state` to every sink; closed channels are pruned.
    pub(crate) fn notify(&mut self, state: &AggregateState) {
        self.sinks.retain(|sink| match sink {
            Sink::Callback(_, obs) => {
                obs.on_state(state);
                true
            }
            Sink::Channel(tx) => tx.send(*state).is_ok(),
        });
    }
}
