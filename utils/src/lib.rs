//! Shared utilities for the rollcall workspace.

pub mod clock;
pub mod logging;
pub mod stats;

pub use clock::{Clock, SystemClock};
pub use logging::init_tracing;
pub use stats::StatsCounter;
