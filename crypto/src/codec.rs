//! Symmetric authenticated encryption of QR payloads.
//!
//! AES-256-GCM with a per-student 32-byte session key, 12-byte random IV
//! and 16-byte authentication tag. Format errors and cipher failures are
//! distinct variants so callers can separate "garbage input" from
//! "wrong key or tampering" in their failure metrics.

use crate::envelope::{EncryptedEnvelope, IV_LEN, TAG_LEN};
use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::Aes256Gcm;
use thiserror::Error;
use zeroize::Zeroize;

/// Session keys are 32 bytes (AES-256).
pub const SESSION_KEY_LEN: usize = 32;

#[derive(Debug, Error)]
pub enum CodecError {
    /// The wire string does not have the envelope shape. Raised before any
    /// decryption is attempted.
    #[error("invalid envelope format: {0}")]
    InvalidFormat(&'static str),

    /// Authentication failed: wrong key or tampered ciphertext.
    #[error("decryption failed: authentication check failed")]
    DecryptionFailed,
}

/// Encrypt a plaintext under a session key, producing a full envelope.
///
/// The IV is freshly random per call.
pub fn encrypt(key: &[u8; SESSION_KEY_LEN], plaintext: &[u8]) -> EncryptedEnvelope {
    let cipher = Aes256Gcm::new_from_slice(key).expect("valid key length");

    let mut iv = [0u8; IV_LEN];
    getrandom::getrandom(&mut iv).expect("OS random source unavailable");

    // aes-gcm appends the tag to the ciphertext; the envelope carries it
    // as a separate segment.
    let mut combined = cipher
        .encrypt(aes_gcm::Nonce::from_slice(&iv), plaintext)
        .expect("encryption should not fail");

    let tag_start = combined.len() - TAG_LEN;
    let mut tag = [0u8; TAG_LEN];
    tag.copy_from_slice(&combined[tag_start..]);
    combined.truncate(tag_start);

    EncryptedEnvelope {
        iv,
        ciphertext: combined,
        tag,
    }
}

/// Decrypt an envelope under a session key.
pub fn decrypt(
    key: &[u8; SESSION_KEY_LEN],
    envelope: &EncryptedEnvelope,
) -> Result<Vec<u8>, CodecError> {
    let cipher = Aes256Gcm::new_from_slice(key).expect("valid key length");

    let mut combined = envelope.ciphertext.clone();
    combined.extend_from_slice(&envelope.tag);

    cipher
        .decrypt(aes_gcm::Nonce::from_slice(&envelope.iv), combined.as_ref())
        .map_err(|_| CodecError::DecryptionFailed)
}

/// Encrypt under a freshly generated key that is immediately discarded.
///
/// The result is a shape-valid envelope that no party can ever decrypt —
/// the decoy primitive. The key is zeroized before returning.
pub fn encrypt_with_ephemeral_key(plaintext: &[u8]) -> EncryptedEnvelope {
    let mut key = [0u8; SESSION_KEY_LEN];
    getrandom::getrandom(&mut key).expect("OS random source unavailable");
    let envelope = encrypt(&key, plaintext);
    key.zeroize();
    envelope
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: [u8; SESSION_KEY_LEN] = [42u8; SESSION_KEY_LEN];

    #[test]
    fn encrypt_decrypt_roundtrip() {
        let plaintext = br#"{"v":1,"sid":"s","uid":7,"r":1,"ts":0,"n":"00"}"#;
        let envelope = encrypt(&KEY, plaintext);

        assert_eq!(envelope.ciphertext.len(), plaintext.len());
        assert_ne!(envelope.ciphertext.as_slice(), plaintext.as_slice());

        let decrypted = decrypt(&KEY, &envelope).unwrap();
        assert_eq!(decrypted, plaintext);
    }

    #[test]
    fn roundtrip_through_wire_form() {
        let envelope = encrypt(&KEY, b"payload bytes");
        let wire = envelope.to_string();
        let parsed = EncryptedEnvelope::parse(&wire).unwrap();
        assert_eq!(decrypt(&KEY, &parsed).unwrap(), b"payload bytes");
    }

    #[test]
    fn wrong_key_fails_authentication() {
        let envelope = encrypt(&KEY, b"secret");
        let wrong_key = [7u8; SESSION_KEY_LEN];
        let result = decrypt(&wrong_key, &envelope);
        assert!(
            matches!(result, Err(CodecError::DecryptionFailed)),
            "AEAD should reject decryption with wrong key"
        );
    }

    #[test]
    fn tampered_ciphertext_fails_authentication() {
        let mut envelope = encrypt(&KEY, b"secret");
        envelope.ciphertext[0] ^= 0xFF;
        let result = decrypt(&KEY, &envelope);
        assert!(
            matches!(result, Err(CodecError::DecryptionFailed)),
            "AEAD should detect tampered ciphertext"
        );
    }

    #[test]
    fn tampered_tag_fails_authentication() {
        let mut envelope = encrypt(&KEY, b"secret");
        envelope.tag[0] ^= 0xFF;
        assert!(decrypt(&KEY, &envelope).is_err());
    }

    #[test]
    fn iv_is_fresh_per_call() {
        let a = encrypt(&KEY, b"same plaintext");
        let b = encrypt(&KEY, b"same plaintext");
        assert_ne!(a.iv, b.iv);
        assert_ne!(a.ciphertext, b.ciphertext);
    }

    #[test]
    fn ephemeral_ciphertext_is_shape_valid_but_undecryptable() {
        let envelope = encrypt_with_ephemeral_key(b"decoy payload");

        // Shape-valid: parses back from wire form.
        let wire = envelope.to_string();
        assert!(EncryptedEnvelope::parse(&wire).is_ok());

        // Undecryptable under arbitrary session keys.
        for seed in 0..8u8 {
            let key = [seed; SESSION_KEY_LEN];
            assert!(decrypt(&key, &envelope).is_err());
        }
    }
}
