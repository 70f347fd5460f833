//! Fundamental types for the rollcall presence protocol.

pub mod error;
pub mod ids;
pub mod params;
pub mod payload;
pub mod time;
pub mod verdict;

pub use error::RollcallError;
pub use ids::{SessionId, StudentId};
pub use params::SessionParams;
pub use payload::{QrPayload, NONCE_HEX_LEN, PAYLOAD_VERSION};
pub use time::Timestamp;
pub use verdict::Verdict;
