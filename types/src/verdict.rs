//! Final presence verdict derived from the certainty score.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Presence verdict for a completed session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    /// Timing is consistent and human-plausible.
    Present,
    /// Mixed signals; flag for manual review.
    Doubtful,
    /// Timing strongly suggests the student was not physically present.
    Absent,
}

impl Verdict {
    /// Map a 0–100 certainty score to a verdict.
    ///
    /// The mapping is owned by the caller of the scorer, not the scorer
    /// itself; the thresholds here are the protocol defaults.
    pub fn from_certainty(certainty: u8) -> Self {
        match certainty {
            70..=100 => Verdict::Present,
            40..=69 => Verdict::Doubtful,
            _ => Verdict::Absent,
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Verdict::Present => "PRESENT",
            Verdict::Doubtful => "DOUBTFUL",
            Verdict::Absent => "ABSENT",
        };
        f.write_str(s)
    }
}
