//! The pure validation stages — no I/O, trivially unit-testable.

use crate::context::{QrLookup, StudentLookup, ValidationContext};
use crate::error::ValidationCode;
use crate::stages::Stage;
use rollcall_session::SessionStatus;
use rollcall_types::payload::is_valid_nonce;
use rollcall_types::{QrPayload, PAYLOAD_VERSION};

/// Stage 2: the decrypted JSON must match the payload schema exactly.
pub struct ValidateStructure;

impl Stage for ValidateStructure {
    fn name(&self) -> &'static str {
        "validate_structure"
    }

    fn run(&self, ctx: &mut ValidationContext) -> anyhow::Result<bool> {
        // A missing decrypted response is an upstream bug, not bad input.
        let Some(json) = ctx.decrypted_json.take() else {
            return Ok(ctx.fail(
                ValidationCode::InternalError,
                "no decrypted response in context",
            ));
        };

        let payload: QrPayload = match serde_json::from_value(json) {
            Ok(p) => p,
            Err(e) => {
                return Ok(ctx.fail(
                    ValidationCode::InvalidFormat,
                    format!("payload does not match schema: {e}"),
                ));
            }
        };

        if payload.version != PAYLOAD_VERSION {
            return Ok(ctx.fail(
                ValidationCode::InvalidFormat,
                format!("unsupported payload version {}", payload.version),
            ));
        }
        if !is_valid_nonce(&payload.nonce) {
            return Ok(ctx.fail(
                ValidationCode::InvalidFormat,
                "nonce must be exactly 32 hex characters",
            ));
        }
        if payload.round == 0 {
            return Ok(ctx.fail(ValidationCode::InvalidFormat, "round must be positive"));
        }

        ctx.payload = Some(payload);
        Ok(true)
    }
}

/// Stage 3: the embedded student id must match the claimed id.
pub struct ValidateOwnership;

impl Stage for ValidateOwnership {
    fn name(&self) -> &'static str {
        "validate_ownership"
    }

    fn run(&self, ctx: &mut ValidationContext) -> anyhow::Result<bool> {
        let Some(payload) = ctx.payload_or_fail() else {
            return Ok(false);
        };
        if payload.student_id != ctx.request.claimed_student_id {
            return Ok(ctx.fail(
                ValidationCode::UserMismatch,
                "payload belongs to a different student",
            ));
        }
        Ok(true)
    }
}

/// Stage 5: a missing QR record means the TTL ran out (or it never existed).
pub struct ValidateQrNotExpired;

impl Stage for ValidateQrNotExpired {
    fn name(&self) -> &'static str {
        "validate_qr_not_expired"
    }

    fn run(&self, ctx: &mut ValidationContext) -> anyhow::Result<bool> {
        match &ctx.qr_state {
            Some(QrLookup::Found(_)) => Ok(true),
            Some(QrLookup::Missing) => Ok(ctx.fail(
                ValidationCode::PayloadExpired,
                "QR record not found or expired",
            )),
            None => Ok(ctx.fail(
                ValidationCode::InternalError,
                "QR state missing from context; stage ordering bug",
            )),
        }
    }
}

/// Stage 6: each QR is consumable exactly once.
pub struct ValidateQrNotConsumed;

impl Stage for ValidateQrNotConsumed {
    fn name(&self) -> &'static str {
        "validate_qr_not_consumed"
    }

    fn run(&self, ctx: &mut ValidationContext) -> anyhow::Result<bool> {
        match &ctx.qr_state {
            Some(QrLookup::Found(record)) if record.consumed => Ok(ctx.fail(
                ValidationCode::PayloadAlreadyConsumed,
                "QR was already used",
            )),
            Some(QrLookup::Found(_)) => Ok(true),
            _ => Ok(ctx.fail(
                ValidationCode::InternalError,
                "QR state missing from context; stage ordering bug",
            )),
        }
    }
}

/// Stage 8: the student must be registered in this session.
pub struct ValidateStudentRegistered;

impl Stage for ValidateStudentRegistered {
    fn name(&self) -> &'static str {
        "validate_student_registered"
    }

    fn run(&self, ctx: &mut ValidationContext) -> anyhow::Result<bool> {
        match &ctx.student_state {
            Some(StudentLookup::Registered(_)) => Ok(true),
            Some(StudentLookup::Unregistered) => Ok(ctx.fail(
                ValidationCode::StudentNotRegistered,
                "student is not registered in this session",
            )),
            None => Ok(ctx.fail(
                ValidationCode::InternalError,
                "student state missing from context; stage ordering bug",
            )),
        }
    }
}

/// Stage 9: terminal students cannot submit further scans.
pub struct ValidateStudentActive;

impl Stage for ValidateStudentActive {
    fn name(&self) -> &'static str {
        "validate_student_active"
    }

    fn run(&self, ctx: &mut ValidationContext) -> anyhow::Result<bool> {
        let Some(state) = ctx.student_or_fail() else {
            return Ok(false);
        };
        match state.value.status {
            SessionStatus::Active => Ok(true),
            SessionStatus::Completed => Ok(ctx.fail(
                ValidationCode::AlreadyCompleted,
                "attendance already completed",
            )),
            SessionStatus::Failed => Ok(ctx.fail(
                ValidationCode::NoAttemptsLeft,
                "all attempts exhausted",
            )),
        }
    }
}

/// Stage 10: the scanned nonce must be the student's active QR.
pub struct ValidateStudentOwnsQr;

impl Stage for ValidateStudentOwnsQr {
    fn name(&self) -> &'static str {
        "validate_student_owns_qr"
    }

    fn run(&self, ctx: &mut ValidationContext) -> anyhow::Result<bool> {
        let Some(payload) = ctx.payload_or_fail() else {
            return Ok(false);
        };
        let Some(state) = ctx.student_or_fail() else {
            return Ok(false);
        };
        if state.value.active_nonce.as_deref() != Some(payload.nonce.as_str()) {
            return Ok(ctx.fail(
                ValidationCode::WrongQr,
                "scanned QR is not the student's active challenge",
            ));
        }
        Ok(true)
    }
}

/// Stage 11: the payload round must equal the student's current round.
pub struct ValidateRoundMatch;

impl Stage for ValidateRoundMatch {
    fn name(&self) -> &'static str {
        "validate_round_match"
    }

    fn run(&self, ctx: &mut ValidationContext) -> anyhow::Result<bool> {
        let Some(payload) = ctx.payload_or_fail() else {
            return Ok(false);
        };
        let Some(state) = ctx.student_or_fail() else {
            return Ok(false);
        };
        let current = state.value.current_round;
        if payload.round < current {
            return Ok(ctx.fail(
                ValidationCode::RoundAlreadyCompleted,
                format!("round {} already completed", payload.round),
            ));
        }
        if payload.round > current {
            return Ok(ctx.fail(
                ValidationCode::RoundNotReached,
                format!("round {} not reached yet", payload.round),
            ));
        }
        Ok(true)
    }
}
