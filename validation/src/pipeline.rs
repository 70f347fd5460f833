//! The pipeline runner and the canonical pipeline builders.

use crate::context::{StageTrace, ValidationContext};
use crate::error::{ValidationCode, ValidationFailure};
use crate::stages::{
    Decrypt, LoadQrState, LoadStudentState, Stage, TotpValidation, ValidateOwnership,
    ValidateQrNotConsumed, ValidateQrNotExpired, ValidateRoundMatch, ValidateStructure,
    ValidateStudentActive, ValidateStudentOwnsQr, ValidateStudentRegistered,
};
use rollcall_store::{QrStore, SessionKeyLookup, StudentStateStore, TotpValidator};
use std::sync::Arc;
use std::time::Instant;

/// Collaborators needed by the I/O stages.
#[derive(Clone)]
pub struct PipelineDeps {
    pub keys: Arc<dyn SessionKeyLookup>,
    /// Non-production path: used when no session key is enrolled.
    pub fallback_key: Option<[u8; 32]>,
    pub qr: Arc<dyn QrStore>,
    pub students: Arc<dyn StudentStateStore>,
    pub totp: Arc<dyn TotpValidator>,
}

/// An ordered list of stages executed over a context.
pub struct Pipeline {
    stages: Vec<Box<dyn Stage>>,
}

impl Pipeline {
    pub fn new(stages: Vec<Box<dyn Stage>>) -> Self {
        Self { stages }
    }

    /// Run every stage in order, short-circuiting on the first failure.
    ///
    /// Each attempted stage gets a trace entry. A stage `Err` is normalized
    /// to `INTERNAL_ERROR` — stages can never crash the runner. A pipeline
    /// over zero stages trivially succeeds. Returns whether all stages
    /// passed; on failure `ctx.failure` and `ctx.failed_at_stage` are set.
    pub fn run(&self, ctx: &mut ValidationContext) -> bool {
        let total = Instant::now();

        for stage in &self.stages {
            let started = Instant::now();
            let outcome = stage.run(ctx);
            let duration = started.elapsed();

            let passed = match outcome {
                Ok(passed) => passed,
                Err(e) => {
                    tracing::error!(stage = stage.name(), error = %e, "stage raised an infrastructure error");
                    ctx.failure = Some(ValidationFailure::new(
                        ValidationCode::InternalError,
                        e.to_string(),
                    ));
                    false
                }
            };

            ctx.trace.push(StageTrace {
                stage: stage.name(),
                passed,
                duration,
            });

            if !passed {
                // The stage contract requires a failure to be set; guard
                // against a stage that forgot.
                if ctx.failure.is_none() {
                    ctx.failure = Some(ValidationFailure::new(
                        ValidationCode::InternalError,
                        format!("stage {} failed without setting an error", stage.name()),
                    ));
                }
                ctx.failed_at_stage = Some(stage.name());
                tracing::debug!(
                    stage = stage.name(),
                    code = %ctx.failure.as_ref().map(|f| f.code.as_str()).unwrap_or(""),
                    elapsed_ms = total.elapsed().as_millis() as u64,
                    "validation failed"
                );
                return false;
            }
        }

        tracing::debug!(
            stages = self.stages.len(),
            elapsed_ms = total.elapsed().as_millis() as u64,
            "validation passed"
        );
        true
    }
}

/// Stages 1–11: the per-round scan pipeline.
pub fn scan_pipeline(deps: &PipelineDeps) -> Pipeline {
    Pipeline::new(vec![
        Box::new(Decrypt::new(deps.keys.clone(), deps.fallback_key)),
        Box::new(ValidateStructure),
        Box::new(ValidateOwnership),
        Box::new(LoadQrState::new(deps.qr.clone())),
        Box::new(ValidateQrNotExpired),
        Box::new(ValidateQrNotConsumed),
        Box::new(LoadStudentState::new(deps.students.clone())),
        Box::new(ValidateStudentRegistered),
        Box::new(ValidateStudentActive),
        Box::new(ValidateStudentOwnsQr),
        Box::new(ValidateRoundMatch),
    ])
}

/// Stages 1–12: the final-round pipeline, which additionally demands a
/// valid one-time code.
pub fn completion_pipeline(deps: &PipelineDeps) -> Pipeline {
    let mut stages = scan_pipeline(deps).stages;
    stages.push(Box::new(TotpValidation::new(deps.totp.clone())));
    Pipeline::new(stages)
}
