//! Manually advanced clock.

use rollcall_types::Timestamp;
use rollcall_utils::Clock;
use std::sync::atomic::{AtomicU64, Ordering};

/// A clock that only moves when told to.
pub struct NullClock {
    now_ms: AtomicU64,
}

impl NullClock {
    pub fn new(now_ms: u64) -> Self {
        Self {
            now_ms: AtomicU64::new(now_ms),
        }
    }

    pub fn advance(&self, ms: u64) {
        self.now_ms.fetch_add(ms, Ordering::SeqCst);
    }

    pub fn set(&self, ms: u64) {
        self.now_ms.store(ms, Ordering::SeqCst);
    }
}

impl Clock for NullClock {
    fn now(&self) -> Timestamp {
        Timestamp::from_millis(self.now_ms.load(Ordering::SeqCst))
    }
}
