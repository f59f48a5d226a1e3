//! Per-request callbacks supplied to `Coordinator::start`.

use std::sync::Arc;

pub(crate) type ProgressFn = Arc<dyn Fn(f64) + Send + Sync>;
pub(crate) type CompletionFn = Box<dyn FnOnce(bool) + Send>;

/// Optional hooks for one `start` call.
///
/// `on_progress` receives the raw fraction of the transfer behind this request
/// (not the aggregate), even when `clamp_per_key` records a higher value in the
/// table. `on_completion` fires exactly once with the outcome of
/// that transfer. Both run outside the coordinator's lock, so they may call
/// back into the coordinator.
#[derive(Default)]
pub struct RequestCallbacks {
    pub(crate) on_progress: Option<ProgressFn>,
    pub(crate) on_completion: Option<CompletionFn>,
}

impl RequestCallbacks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_progress(mut self, f: impl Fn(f64) + Send + Sync + 'static) -> Self {
        self.on_progress = Some(Arc::new(f));
        self
    }

    pub fn on_completion(mut self, f: impl FnOnce(bool) + Send + 'static) -> Self {
        self.on_completion = Some(Box::new(f));
        self
    }
}

impl std::fmt::Debug for RequestCallbacks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestCallbacks")
            .field("on_progress", &self.on_progress.is_some())
            .field("on_completion", &self.on_completion.is_some())
            .finish()
    }
}
