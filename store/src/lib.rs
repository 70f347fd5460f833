//! Abstract storage traits for the rollcall protocol.
//!
//! Every backend (the in-tree memory store, Redis, anything else) implements
//! these traits. The rest of the codebase depends only on the traits, which
//! is also the seam where tests inject deterministic doubles.

pub mod audit;
pub mod display;
pub mod error;
pub mod keys;
pub mod pool;
pub mod qr;
pub mod student;
pub mod totp;

pub use audit::{AuditRecord, AuditSink};
pub use display::DisplaySink;
pub use error::StoreError;
pub use keys::SessionKeyLookup;
pub use pool::{PoolEntry, PoolStats, PoolStore};
pub use qr::{QrStore, StoredPayload};
pub use student::{StudentStateStore, Versioned};
pub use totp::TotpValidator;
