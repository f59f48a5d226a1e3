//! DLC core: concurrent download progress coordinator.
//!
//! Many callers start downloads concurrently; the coordinator keys each one by
//! its destination, runs at most one transfer per key, and reduces all
//! in-flight progress to a single `AggregateState` pushed to observers.

pub mod config;
pub mod logging;

pub mod aggregate;
pub mod checksum;
pub mod coordinator;
pub mod key;
pub mod observer;
pub mod table;
pub mod transfer;

pub use aggregate::AggregateState;
pub use coordinator::{Coordinator, CoordinatorOptions, RequestCallbacks, StartOutcome};
pub use key::{Destination, KeyDerivationError, TransferKey};
pub use observer::{ObserverId, StateObserver, Subscription};
