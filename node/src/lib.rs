//! The rollcall node: ties the stores, validation pipeline, pool and
//! projection together behind one attendance service.

pub mod config;
pub mod error;
pub mod logging;
pub mod service;
pub mod totp;

pub use config::NodeConfig;
pub use error::NodeError;
pub use logging::{init_logging, LogFormat};
pub use service::{AttendanceService, FailOutcome, IssuedQr, ScanOutcome, ServiceDeps};
pub use totp::EnrolledTotpValidator;
