//! Single-flight guard for update cycles.

use std::sync::atomic::{AtomicBool, Ordering};

/// Process-wide "a cycle is running" bit.
///
/// Acquisition is a non-blocking compare-exchange: contenders get `None`
/// and drop their trigger instead of waiting.
#[derive(Debug, Default)]
pub struct WorkingFlag {
    busy: AtomicBool,
}

/// Proof of holding the flag.
///
/// Dropping a permit does NOT free the flag. Only [`release`](Self::release)
/// does, so a failed cycle leaves the flag busy until the process exits.
#[must_use = "the flag stays busy unless the permit is released"]
#[derive(Debug)]
pub struct WorkingPermit<'a> {
    flag: &'a WorkingFlag,
}

impl WorkingFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn try_acquire(&self) -> Option<WorkingPermit<'_>> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| WorkingPermit { flag: self })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

impl WorkingPermit<'_> {
    /// Free the flag after a successful cycle.
    pub fn release(self) {
        self.flag.busy.store(false, Ordering::Release);
    }

    /// Give up the permit without freeing the flag.
    pub fn abandon(self) {}
}
