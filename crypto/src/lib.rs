//! Payload codec for the rollcall protocol.
//!
//! - **AES-256-GCM** authenticated encryption of QR payloads, keyed per student
//! - Dot-separated base64 envelope wire format (`iv.ciphertext.tag`)
//! - Ephemeral-key encryption for permanently undecryptable decoys
//! - Nonce generation (32 hex chars, cryptographically random)
//! - RFC-6238 TOTP over HMAC-SHA256 for the completion flow

pub mod codec;
pub mod envelope;
pub mod nonce;
pub mod totp;

pub use codec::{decrypt, encrypt, encrypt_with_ephemeral_key, CodecError, SESSION_KEY_LEN};
pub use envelope::{EncryptedEnvelope, IV_LEN, TAG_LEN};
pub use nonce::generate_nonce;
pub use totp::{generate_code, validate_code, TOTP_DIGITS, TOTP_STEP_SECS};
