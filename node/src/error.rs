//! Node-level error type.

use rollcall_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NodeError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("student {0} is already registered in session {1}")]
    AlreadyRegistered(u64, String),

    #[error("student {0} is not registered in session {1}")]
    NotRegistered(u64, String),

    #[error("student {0} is not in an active state")]
    NotActive(u64),

    #[error("no session key enrolled for student {0}")]
    NoSessionKey(u64),

    #[error(transparent)]
    Store(#[from] StoreError),
}
