use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared in-progress flag that lets at most one sync run at a time.
///
#[derive(Clone, Debug, Default)]
pub struct SyncGuard {
    busy: Arc<AtomicBool>,
}

/// Held for the duration of a sync; releases the guard when dropped.
///
#[derive(Debug)]
pub struct SyncPermit {
    busy: Arc<AtomicBool>,
}

impl SyncGuard {
    pub fn new() -> Self {
        SyncGuard::default()
    }

    /// Claim the guard, or return `None` if a sync is already running.
    ///
    pub fn try_begin(&self) -> Option<SyncPermit> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| SyncPermit {
                busy: Arc::clone(&self.busy),
            })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

impl Drop for SyncPermit {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}
