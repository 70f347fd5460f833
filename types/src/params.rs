//! Session parameters — the host-tunable knobs for one attendance session.

use serde::{Deserialize, Serialize};

/// Parameters governing one attendance session.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionParams {
    /// Number of challenge rounds a student must pass to complete attendance.
    pub max_rounds: u32,

    /// Attempts (full restarts of the round sequence) before a student
    /// fails permanently.
    pub max_attempts: u32,

    /// Minimum number of QR entries visible on the display at any time.
    /// Decoys fill the gap when fewer real entries exist.
    pub min_pool_size: usize,

    /// QR record time-to-live in seconds. An expired record reads as
    /// missing, which the pipeline reports as `PAYLOAD_EXPIRED`.
    pub qr_ttl_secs: u64,

    /// Pre-session countdown duration in seconds.
    pub countdown_secs: u64,

    /// Interval between pool emissions to the display, milliseconds.
    pub emit_interval_ms: u64,
}

impl Default for SessionParams {
    fn default() -> Self {
        Self {
            max_rounds: 3,
            max_attempts: 2,
            min_pool_size: 8,
            qr_ttl_secs: 120,
            countdown_secs: 10,
            emit_interval_ms: 1_000,
        }
    }
}
