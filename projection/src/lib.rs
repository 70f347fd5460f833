//! Projection lifecycle for a session's display.
//!
//! Drives the sequence the classroom projector sees: a countdown so
//! students can get their scanners ready, a single pool-balancing pass,
//! then a steady emission loop pushing pool snapshots to the display until
//! the session is stopped.

pub mod orchestrator;

pub use orchestrator::{ProjectionError, ProjectionOrchestrator, ProjectionPhase};
pub use rollcall_store::DisplaySink;
