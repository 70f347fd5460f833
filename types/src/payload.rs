//! QR payload — the plaintext structure encoded into a scannable code.
//!
//! The wire schema uses short field names to keep the QR image small:
//! `{v, sid, uid, r, ts, n}`.

use crate::{SessionId, StudentId, Timestamp};
use serde::{Deserialize, Serialize};

/// Current payload schema version. The only accepted value.
pub const PAYLOAD_VERSION: u8 = 1;

/// A nonce is exactly 32 lowercase hex characters (16 random bytes).
pub const NONCE_HEX_LEN: usize = 32;

/// Plaintext QR payload identifying session, student, round, issue time
/// and a single-use random nonce.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QrPayload {
    /// Schema version, always 1.
    #[serde(rename = "v")]
    pub version: u8,
    #[serde(rename = "sid")]
    pub session_id: SessionId,
    #[serde(rename = "uid")]
    pub student_id: StudentId,
    /// Challenge round this QR belongs to (1-based).
    #[serde(rename = "r")]
    pub round: u32,
    /// Issue time, epoch milliseconds.
    #[serde(rename = "ts")]
    pub issued_at: Timestamp,
    /// Single-use random token, 32 hex chars.
    #[serde(rename = "n")]
    pub nonce: String,
}

impl QrPayload {
    /// Serialize to the compact JSON wire form.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).expect("QrPayload is always serializable")
    }

    /// Parse from the JSON wire form.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }

    /// Structural validity: version, nonce shape, round bounds.
    pub fn is_wellformed(&self, max_rounds: u32) -> bool {
        self.version == PAYLOAD_VERSION
            && is_valid_nonce(&self.nonce)
            && self.round >= 1
            && self.round <= max_rounds
    }
}

/// Whether a string has the exact nonce shape: 32 lowercase hex characters.
pub fn is_valid_nonce(s: &str) -> bool {
    s.len() == NONCE_HEX_LEN
        && s.bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}
