//! The validation context — a mutable accumulator threaded through stages.

use crate::error::{ValidationCode, ValidationFailure};
use rollcall_session::StudentSessionState;
use rollcall_store::{StoredPayload, Versioned};
use rollcall_types::{QrPayload, SessionId, StudentId, Timestamp};
use std::time::Duration;

/// One scan submission as received from the transport layer.
#[derive(Clone, Debug)]
pub struct ScanRequest {
    pub session_id: SessionId,
    /// The id the submitting caller claims to be.
    pub claimed_student_id: StudentId,
    /// Envelope wire form.
    pub encrypted_payload: String,
    /// One-time code, required by the completion flow only.
    pub totp_code: Option<String>,
}

/// Result of the QR record lookup. Absence is a normal outcome here, not
/// an error — the expiry stage turns it into `PAYLOAD_EXPIRED`.
#[derive(Clone, Debug)]
pub enum QrLookup {
    Missing,
    Found(StoredPayload),
}

/// Result of the student state lookup, same normalization.
#[derive(Clone, Debug)]
pub enum StudentLookup {
    Unregistered,
    Registered(Versioned<StudentSessionState>),
}

/// Trace entry for one executed stage.
#[derive(Clone, Debug)]
pub struct StageTrace {
    pub stage: &'static str,
    pub passed: bool,
    pub duration: Duration,
}

/// The accumulator threaded through the pipeline.
///
/// Stages populate the middle section; the runner owns the outcome fields.
#[derive(Debug)]
pub struct ValidationContext {
    pub request: ScanRequest,
    pub started_at: Timestamp,

    /// Parsed JSON plaintext, set by the decrypt stage.
    pub decrypted_json: Option<serde_json::Value>,
    /// Typed payload, set by the structure stage.
    pub payload: Option<QrPayload>,
    pub qr_state: Option<QrLookup>,
    pub student_state: Option<StudentLookup>,

    pub failure: Option<ValidationFailure>,
    pub failed_at_stage: Option<&'static str>,
    pub trace: Vec<StageTrace>,
}

impl ValidationContext {
    pub fn new(request: ScanRequest, started_at: Timestamp) -> Self {
        Self {
            request,
            started_at,
            decrypted_json: None,
            payload: None,
            qr_state: None,
            student_state: None,
            failure: None,
            failed_at_stage: None,
            trace: Vec::new(),
        }
    }

    /// Record a failure and return `false` for direct use in stage returns.
    pub fn fail(&mut self, code: ValidationCode, message: impl Into<String>) -> bool {
        self.failure = Some(ValidationFailure::new(code, message));
        false
    }

    pub fn passed(&self) -> bool {
        self.failure.is_none()
    }

    /// The typed payload, or an internal-error failure if an upstream stage
    /// forgot to set it (a pipeline wiring bug, distinct from bad input).
    pub fn payload_or_fail(&mut self) -> Option<QrPayload> {
        if self.payload.is_none() {
            self.fail(
                ValidationCode::InternalError,
                "payload missing from context; stage ordering bug",
            );
        }
        self.payload.clone()
    }

    /// The registered student state, if the lookup stage found one.
    pub fn student_versioned(&self) -> Option<Versioned<StudentSessionState>> {
        match &self.student_state {
            Some(StudentLookup::Registered(v)) => Some(v.clone()),
            _ => None,
        }
    }

    /// The registered student state, failing the same way when absent.
    pub fn student_or_fail(&mut self) -> Option<Versioned<StudentSessionState>> {
        match &self.student_state {
            Some(StudentLookup::Registered(v)) => Some(v.clone()),
            _ => {
                self.fail(
                    ValidationCode::InternalError,
                    "student state missing from context; stage ordering bug",
                );
                None
            }
        }
    }
}
