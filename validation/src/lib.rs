//! Scan validation pipeline.
//!
//! One scan submission runs through an ordered list of stages over a
//! mutable [`ValidationContext`] accumulator. The runner short-circuits on
//! the first failure and records a trace entry for every stage attempted.
//! Pure checks (structure, ownership, round matching) work on the context
//! alone; I/O stages (decrypt, state loads, TOTP) take injected
//! collaborators.

pub mod context;
pub mod error;
pub mod pipeline;
pub mod stages;

pub use context::{QrLookup, ScanRequest, StageTrace, StudentLookup, ValidationContext};
pub use error::{ValidationCode, ValidationFailure};
pub use pipeline::{completion_pipeline, scan_pipeline, Pipeline, PipelineDeps};
pub use stages::Stage;
