//! Top-level error type shared across crates.

use thiserror::Error;

/// Common error type for the rollcall protocol.
#[derive(Debug, Error)]
pub enum RollcallError {
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    #[error("unknown session: {0}")]
    UnknownSession(String),

    #[error("student {0} is not registered")]
    NotRegistered(u64),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("crypto error: {0}")]
    Crypto(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("{0}")]
    Other(String),
}
