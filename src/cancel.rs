//! Cooperative cancellation token shared by every suspendable operation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::RipError;

/// A cheaply-cloneable flag checked at output-tile and fetch-retry
/// boundaries (§5). Cancelling never aborts a fetch mid-flight instantly —
/// it is observed at the next checkpoint.
#[derive(Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Returns `Err(RipError::Cancelled)` if cancellation has been requested.
    pub fn check(&self) -> Result<(), RipError> {
        if self.is_cancelled() {
            Err(RipError::Cancelled)
        } else {
            Ok(())
        }
    }
}
