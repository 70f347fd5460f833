//! Nonce generation.
//!
//! A nonce is 16 cryptographically random bytes rendered as 32 lowercase
//! hex characters. It is the primary key for QR consumption tracking.

use rollcall_types::NONCE_HEX_LEN;

/// Generate a fresh nonce: 32 lowercase hex characters.
pub fn generate_nonce() -> String {
    let mut bytes = [0u8; NONCE_HEX_LEN / 2];
    getrandom::getrandom(&mut bytes).expect("OS random source unavailable");
    hex::encode(bytes)
}
