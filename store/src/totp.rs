//! TOTP validator collaborator.

use rollcall_types::StudentId;

/// Validates a time-based one-time code against a per-device secret.
///
/// "Device not found" and "code incorrect" are deliberately merged into a
/// single `false` so callers cannot leak enrollment status to an attacker.
pub trait TotpValidator: Send + Sync {
    fn validate(&self, student: StudentId, code: &str) -> bool;
}
