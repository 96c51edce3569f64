use std::sync::atomic::{AtomicU64, Ordering};

use shared_types::{BlockCursor, BlockNumber};

/// Shared [`BlockCursor`].
///
/// Only the cycle holding the working flag writes it, so plain atomic
/// loads and stores are enough. Nothing prevents either value from going
/// backwards.
#[derive(Debug, Default)]
pub struct AtomicCursor {
    current_block: AtomicU64,
    last_full_update: AtomicU64,
}

impl AtomicCursor {
    pub fn snapshot(&self) -> BlockCursor {
        BlockCursor {
            current_block: self.current_block.load(Ordering::Acquire),
            last_full_update: self.last_full_update.load(Ordering::Acquire),
        }
    }

    pub fn current_block(&self) -> BlockNumber {
        self.current_block.load(Ordering::Acquire)
    }

    pub fn last_full_update(&self) -> BlockNumber {
        self.last_full_update.load(Ordering::Acquire)
    }

    pub fn set_current_block(&self, block: BlockNumber) {
        self.current_block.store(block, Ordering::Release);
    }

    pub fn set_last_full_update(&self, block: BlockNumber) {
        self.last_full_update.store(block, Ordering::Release);
    }
}
