//! The stage contract and the canonical stage catalog.

use crate::context::ValidationContext;

pub mod checks;
pub mod decrypt;
pub mod lookup;
pub mod totp;

pub use checks::{
    ValidateOwnership, ValidateQrNotConsumed, ValidateQrNotExpired, ValidateRoundMatch,
    ValidateStructure, ValidateStudentActive, ValidateStudentOwnsQr, ValidateStudentRegistered,
};
pub use decrypt::Decrypt;
pub use lookup::{LoadQrState, LoadStudentState};
pub use totp::TotpValidation;

/// One named, independently testable step in the validation sequence.
///
/// A stage returning `Ok(false)` must have set `ctx.failure` first. An
/// `Err` is an infrastructure problem (store unavailable, wiring bug); the
/// runner normalizes it to `INTERNAL_ERROR` and halts, so a stage can use
/// `?` freely without ever crashing the pipeline.
pub trait Stage: Send + Sync {
    fn name(&self) -> &'static str;
    fn run(&self, ctx: &mut ValidationContext) -> anyhow::Result<bool>;
}
