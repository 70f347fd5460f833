//! Validation failure codes — the structured, user-facing error catalog.
//!
//! These are expected outcomes, returned to the caller for feedback and
//! counted in fraud metrics. They are never logged as bugs; infrastructure
//! problems are normalized to `InternalError` instead.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Machine-readable failure code for a rejected scan.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationCode {
    /// Wire shape or payload structure is wrong (garbage input).
    InvalidFormat,
    /// Envelope is well-formed but the key is wrong or the data tampered.
    DecryptionFailed,
    /// Payload's student id does not match the submitting caller.
    UserMismatch,
    /// QR record is unknown or past its TTL.
    PayloadExpired,
    /// QR was already consumed by a successful validation.
    PayloadAlreadyConsumed,
    StudentNotRegistered,
    AlreadyCompleted,
    NoAttemptsLeft,
    /// Payload nonce is not the student's currently active QR.
    WrongQr,
    RoundAlreadyCompleted,
    RoundNotReached,
    TotpMissing,
    TotpInvalid,
    /// Infrastructure failure; details are in the logs, not here.
    InternalError,
}

impl ValidationCode {
    /// Every code, for registering per-code counters.
    pub const ALL: [ValidationCode; 14] = [
        ValidationCode::InvalidFormat,
        ValidationCode::DecryptionFailed,
        ValidationCode::UserMismatch,
        ValidationCode::PayloadExpired,
        ValidationCode::PayloadAlreadyConsumed,
        ValidationCode::StudentNotRegistered,
        ValidationCode::AlreadyCompleted,
        ValidationCode::NoAttemptsLeft,
        ValidationCode::WrongQr,
        ValidationCode::RoundAlreadyCompleted,
        ValidationCode::RoundNotReached,
        ValidationCode::TotpMissing,
        ValidationCode::TotpInvalid,
        ValidationCode::InternalError,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationCode::InvalidFormat => "INVALID_FORMAT",
            ValidationCode::DecryptionFailed => "DECRYPTION_FAILED",
            ValidationCode::UserMismatch => "USER_MISMATCH",
            ValidationCode::PayloadExpired => "PAYLOAD_EXPIRED",
            ValidationCode::PayloadAlreadyConsumed => "PAYLOAD_ALREADY_CONSUMED",
            ValidationCode::StudentNotRegistered => "STUDENT_NOT_REGISTERED",
            ValidationCode::AlreadyCompleted => "ALREADY_COMPLETED",
            ValidationCode::NoAttemptsLeft => "NO_ATTEMPTS_LEFT",
            ValidationCode::WrongQr => "WRONG_QR",
            ValidationCode::RoundAlreadyCompleted => "ROUND_ALREADY_COMPLETED",
            ValidationCode::RoundNotReached => "ROUND_NOT_REACHED",
            ValidationCode::TotpMissing => "TOTP_MISSING",
            ValidationCode::TotpInvalid => "TOTP_INVALID",
            ValidationCode::InternalError => "INTERNAL_ERROR",
        }
    }
}

impl fmt::Display for ValidationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A structured validation failure: code plus human-readable message.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationFailure {
    pub code: ValidationCode,
    pub message: String,
}

impl ValidationFailure {
    pub fn new(code: ValidationCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}
