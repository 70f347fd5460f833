//! Stage 12: time-based one-time code check, used by the completion flow.

use crate::context::ValidationContext;
use crate::error::ValidationCode;
use crate::stages::Stage;
use rollcall_store::TotpValidator;
use std::sync::Arc;

/// Validates the submitted one-time code against the per-device secret.
///
/// The injected validator returns `false` for both "device not found" and
/// "code incorrect"; both surface as `TOTP_INVALID` so a probing attacker
/// learns nothing about enrollment status.
pub struct TotpValidation {
    validator: Arc<dyn TotpValidator>,
}

impl TotpValidation {
    pub fn new(validator: Arc<dyn TotpValidator>) -> Self {
        Self { validator }
    }
}

impl Stage for TotpValidation {
    fn name(&self) -> &'static str {
        "totp_validation"
    }

    fn run(&self, ctx: &mut ValidationContext) -> anyhow::Result<bool> {
        let Some(code) = ctx.request.totp_code.clone() else {
            return Ok(ctx.fail(
                ValidationCode::TotpMissing,
                "completion requires a one-time code",
            ));
        };
        if !self
            .validator
            .validate(ctx.request.claimed_student_id, &code)
        {
            return Ok(ctx.fail(ValidationCode::TotpInvalid, "one-time code rejected"));
        }
        Ok(true)
    }
}
