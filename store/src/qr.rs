//! TTL-bound QR record storage trait.

use crate::StoreError;
use rollcall_types::{QrPayload, StudentId, Timestamp};
use serde::{Deserialize, Serialize};

/// A stored QR record, keyed by its nonce.
///
/// Created when a QR is generated, mutated exactly once when consumed, and
/// destroyed by TTL expiry or explicit removal.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StoredPayload {
    pub payload: QrPayload,
    /// The envelope wire form as emitted to the display.
    pub encrypted: String,
    pub created_at: Timestamp,
    pub consumed: bool,
    pub consumed_by: Option<StudentId>,
    pub consumed_at: Option<Timestamp>,
}

impl StoredPayload {
    pub fn new(payload: QrPayload, encrypted: String, created_at: Timestamp) -> Self {
        Self {
            payload,
            encrypted,
            created_at,
            consumed: false,
            consumed_by: None,
            consumed_at: None,
        }
    }

    /// The record's key.
    pub fn nonce(&self) -> &str {
        &self.payload.nonce
    }
}

/// Trait for TTL-bound QR records.
///
/// An expired record must read as absent from `get` — the pipeline treats
/// absence as `PAYLOAD_EXPIRED`, never as a timeout.
pub trait QrStore: Send + Sync {
    /// Store a record under its nonce with the given time-to-live.
    fn put(&self, record: StoredPayload, ttl_secs: u64) -> Result<(), StoreError>;

    /// Fetch by nonce. `None` for unknown or expired nonces.
    fn get(&self, nonce: &str) -> Result<Option<StoredPayload>, StoreError>;

    /// Atomically flip `consumed` for a live, unconsumed record.
    ///
    /// Fails with [`StoreError::AlreadyConsumed`] on a second consumption
    /// and [`StoreError::NotFound`] for unknown/expired nonces. Atomicity
    /// here is what makes double-crediting a round impossible under
    /// concurrent submissions.
    fn mark_consumed(
        &self,
        nonce: &str,
        by: StudentId,
        at: Timestamp,
    ) -> Result<(), StoreError>;

    /// Drop a record before its TTL runs out.
    fn remove(&self, nonce: &str) -> Result<(), StoreError>;

    /// Remaining lifetime in milliseconds, `None` if unknown/expired.
    fn ttl_ms(&self, nonce: &str) -> Result<Option<u64>, StoreError>;
}
