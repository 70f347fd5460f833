//! Clock abstraction so TTL expiry and response timing are testable.

use rollcall_types::Timestamp;

/// Source of the current time.
///
/// Production code uses [`SystemClock`]; tests swap in a deterministic
/// implementation (see `rollcall-nullables`).
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// The real system clock.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}
