//! Transfer capability consumed by the coordinator.
//!
//! The coordinator does not move bytes itself. A `Transfer` implementation
//! starts the actual download and reports back through the `TransferEvents`
//! sink it is handed; the coordinator funnels those events into its table.

mod curl_transfer;
mod events;

pub use curl_transfer::{CurlHandle, CurlTransfer};
pub(crate) use events::EventSink;
pub use events::TransferEvents;

use std::path::PathBuf;

use thiserror::Error;
use url::Url;

/// What to fetch and where to put it. `path` is the transfer key's path.
#[derive(Debug, Clone)]
pub struct TransferRequest {
    pub source: Url,
    pub path: PathBuf,
    /// Unique per coordinator. A canceled transfer and its restart under the
    /// same key get different tickets, so scratch files can be keyed by it.
    pub ticket: u64,
}

/// A transfer that could not even be started.
///
/// The coordinator never surfaces this from `start`; it is logged and turned
/// into a failed completion.
#[derive(Debug, Error)]
pub enum TransferError {
    #[error("failed to spawn transfer worker: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("transfer rejected: {0}")]
    Rejected(String),
}

/// Starts transfers. Implementations must not block in `begin`; progress and
/// completion are reported asynchronously through `events`, from any thread.
pub trait Transfer: Send + Sync {
    fn begin(
        &self,
        request: TransferRequest,
        events: TransferEvents,
    ) -> Result<Box<dyn TransferHandle>, TransferError>;
}

/// Handle to one running transfer.
pub trait TransferHandle: Send {
    /// Ask the transfer to stop. Must not block.
    fn cancel(&self);
}
