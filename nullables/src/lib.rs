//! Nulled collaborators for tests.
//!
//! Each double implements one of the workspace's boundary traits with
//! deterministic, configurable behavior and no real I/O. Production code
//! never links this crate; it appears only in dev-dependencies.

pub mod audit;
pub mod clock;
pub mod display;
pub mod keys;
pub mod totp;

pub use audit::RecordingAudit;
pub use clock::NullClock;
pub use display::RecordingDisplay;
pub use keys::NullKeyLookup;
pub use totp::NullTotp;
