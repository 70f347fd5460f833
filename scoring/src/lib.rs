//! Response-time statistics and presence certainty scoring.
//!
//! Converts the response times collected over a session's rounds into a
//! 0–100 confidence score that the timings are human-plausible and
//! consistent. The heuristic is intentionally simple and tunable; it is a
//! supporting signal alongside the pipeline's cryptographic and state
//! checks, not a security boundary by itself.

pub mod stats;

pub use stats::{calculate_stats, ResponseTimeStats};
