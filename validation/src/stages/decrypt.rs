//! Stage 1: decrypt the submitted envelope.

use crate::context::ValidationContext;
use crate::error::ValidationCode;
use crate::stages::Stage;
use rollcall_crypto::{decrypt, CodecError, EncryptedEnvelope};
use rollcall_store::SessionKeyLookup;
use std::sync::Arc;

/// Decrypts the envelope with the student's session key.
///
/// Wire-format validation happens first and fails as `INVALID_FORMAT`
/// without invoking the cipher. When no key is enrolled for the student a
/// configured fallback key may be used instead — a non-production path for
/// development fixtures.
pub struct Decrypt {
    keys: Arc<dyn SessionKeyLookup>,
    fallback_key: Option<[u8; 32]>,
}

impl Decrypt {
    pub fn new(keys: Arc<dyn SessionKeyLookup>, fallback_key: Option<[u8; 32]>) -> Self {
        Self { keys, fallback_key }
    }
}

impl Stage for Decrypt {
    fn name(&self) -> &'static str {
        "decrypt"
    }

    fn run(&self, ctx: &mut ValidationContext) -> anyhow::Result<bool> {
        let envelope = match EncryptedEnvelope::parse(&ctx.request.encrypted_payload) {
            Ok(e) => e,
            Err(CodecError::InvalidFormat(reason)) => {
                return Ok(ctx.fail(ValidationCode::InvalidFormat, reason));
            }
            Err(CodecError::DecryptionFailed) => unreachable!("parse never authenticates"),
        };

        let key = match self.keys.find_by_user_id(ctx.request.claimed_student_id)? {
            Some(key) => key,
            None => match self.fallback_key {
                Some(key) => key,
                None => {
                    return Ok(ctx.fail(
                        ValidationCode::DecryptionFailed,
                        "no session key enrolled for student",
                    ));
                }
            },
        };

        let plaintext = match decrypt(&key, &envelope) {
            Ok(p) => p,
            Err(_) => {
                return Ok(ctx.fail(
                    ValidationCode::DecryptionFailed,
                    "envelope failed authentication",
                ));
            }
        };

        match serde_json::from_slice::<serde_json::Value>(&plaintext) {
            Ok(value) => {
                ctx.decrypted_json = Some(value);
                Ok(true)
            }
            Err(_) => Ok(ctx.fail(
                ValidationCode::DecryptionFailed,
                "decrypted payload is not valid JSON",
            )),
        }
    }
}
