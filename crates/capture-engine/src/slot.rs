//! The process-wide acquisition slot.
//!
//! At most one capture session may hold the slot. Acquiring returns a
//! [`SlotGuard`]; dropping the guard frees the slot, so ownership follows the
//! session that acquired it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use snapcrop_common::error::{SnapError, SnapResult};

/// Tracks whether a capture is in progress.
#[derive(Debug, Default)]
pub struct SlotRegistry {
    busy: AtomicBool,
}

impl SlotRegistry {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// The registry shared by every session in this process.
    pub fn global() -> Arc<Self> {
        static GLOBAL: OnceLock<Arc<SlotRegistry>> = OnceLock::new();
        GLOBAL.get_or_init(SlotRegistry::new).clone()
    }

    /// Take the slot, or fail with `CaptureInProgress` if it is held.
    pub fn try_acquire(self: &Arc<Self>) -> SnapResult<SlotGuard> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| SnapError::CaptureInProgress)?;
        tracing::debug!("Acquisition slot taken");
        Ok(SlotGuard {
            registry: Arc::clone(self),
        })
    }

    pub fn is_in_progress(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// Whether any session in this process currently holds the global slot.
pub fn is_capture_in_progress() -> bool {
    SlotRegistry::global().is_in_progress()
}

/// Ownership of the acquisition slot.
#[derive(Debug)]
pub struct SlotGuard {
    registry: Arc<SlotRegistry>,
}

impl SlotGuard {
    /// Give the slot back now instead of at drop.
    pub fn release(self) {}
}

impl Drop for SlotGuard {
    fn drop(&mut self) {
        self.registry.busy.store(false, Ordering::Release);
        tracing::debug!("Acquisition slot released");
    }
}
