//! Transfer double that records `begin` calls; tests fire events by hand.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use dlc_core::transfer::{
    Transfer, TransferError, TransferEvents, TransferHandle, TransferRequest,
};

#[derive(Default)]
pub struct ManualTransfer {
    begun: Mutex<Vec<TransferEvents>>,
    cancels: Arc<AtomicUsize>,
}

struct ManualHandle(Arc<AtomicUsize>);

impl TransferHandle for ManualHandle {
    fn cancel(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

impl Transfer for ManualTransfer {
    fn begin(
        &self,
        _request: TransferRequest,
        events: TransferEvents,
    ) -> Result<Box<dyn TransferHandle>, TransferError> {
        self.begun.lock().unwrap().push(events);
        Ok(Box::new(ManualHandle(Arc::clone(&self.cancels))))
    }
}

impl ManualTransfer {
    pub fn begin_count(&self) -> usize {
        self.begun.lock().unwrap().len()
    }

    pub fn cancel_count(&self) -> usize {
        self.cancels.load(Ordering::SeqCst)
    }

    pub fn events(&self, index: usize) -> TransferEvents {
        self.begun.lock().unwrap()[index].clone()
    }

    pub fn all_events(&self) -> Vec<TransferEvents> {
        self.begun.lock().unwrap().clone()
    }
}
