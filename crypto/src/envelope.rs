//! Encrypted envelope wire format.
//!
//! Wire form is `"<iv-b64>.<ciphertext-b64>.<tag-b64>"` with standard base64
//! segments. Shape validation happens here, before any decryption attempt,
//! so malformed input never reaches the cipher.

use crate::codec::CodecError;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::fmt;

/// AES-GCM initialization vector length in bytes.
pub const IV_LEN: usize = 12;

/// AES-GCM authentication tag length in bytes.
pub const TAG_LEN: usize = 16;

/// A parsed encrypted envelope: IV, ciphertext, and authentication tag.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncryptedEnvelope {
    pub iv: [u8; IV_LEN],
    pub ciphertext: Vec<u8>,
    pub tag: [u8; TAG_LEN],
}

impl EncryptedEnvelope {
    /// Parse the wire form, enforcing segment count, base64 validity and
    /// exact IV/tag lengths. Any violation is `CodecError::InvalidFormat`.
    pub fn parse(wire: &str) -> Result<Self, CodecError> {
        let mut parts = wire.split('.');
        let (iv_b64, ct_b64, tag_b64) = match (parts.next(), parts.next(), parts.next(), parts.next())
        {
            (Some(iv), Some(ct), Some(tag), None) => (iv, ct, tag),
            _ => return Err(CodecError::InvalidFormat("expected 3 dot-separated segments")),
        };

        let iv_bytes = STANDARD
            .decode(iv_b64)
            .map_err(|_| CodecError::InvalidFormat("iv segment is not valid base64"))?;
        let ciphertext = STANDARD
            .decode(ct_b64)
            .map_err(|_| CodecError::InvalidFormat("ciphertext segment is not valid base64"))?;
        let tag_bytes = STANDARD
            .decode(tag_b64)
            .map_err(|_| CodecError::InvalidFormat("tag segment is not valid base64"))?;

        let iv: [u8; IV_LEN] = iv_bytes
            .try_into()
            .map_err(|_| CodecError::InvalidFormat("iv must be exactly 12 bytes"))?;
        let tag: [u8; TAG_LEN] = tag_bytes
            .try_into()
            .map_err(|_| CodecError::InvalidFormat("tag must be exactly 16 bytes"))?;

        Ok(Self {
            iv,
            ciphertext,
            tag,
        })
    }
}

impl fmt::Display for EncryptedEnvelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}",
            STANDARD.encode(self.iv),
            STANDARD.encode(&self.ciphertext),
            STANDARD.encode(self.tag)
        )
    }
}
