//! Timing statistics and the certainty heuristic.

use serde::{Deserialize, Serialize};

/// Aggregate statistics over a student's round response times.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResponseTimeStats {
    /// Arithmetic mean, milliseconds.
    pub avg: f64,
    /// Population standard deviation, milliseconds.
    pub std_dev: f64,
    pub min: u64,
    pub max: u64,
    /// 0–100 confidence that the timings came from a present human.
    pub certainty: u8,
}

impl ResponseTimeStats {
    fn zero() -> Self {
        Self {
            avg: 0.0,
            std_dev: 0.0,
            min: 0,
            max: 0,
            certainty: 0,
        }
    }
}

/// Compute stats and certainty for a list of response times (ms).
///
/// Empty input yields all-zero stats with certainty 0.
pub fn calculate_stats(response_times_ms: &[u64]) -> ResponseTimeStats {
    if response_times_ms.is_empty() {
        return ResponseTimeStats::zero();
    }

    let n = response_times_ms.len() as f64;
    let avg = response_times_ms.iter().sum::<u64>() as f64 / n;
    let variance = response_times_ms
        .iter()
        .map(|&t| {
            let d = t as f64 - avg;
            d * d
        })
        .sum::<f64>()
        / n;
    let std_dev = variance.sqrt();
    let min = *response_times_ms.iter().min().expect("non-empty");
    let max = *response_times_ms.iter().max().expect("non-empty");

    ResponseTimeStats {
        avg,
        std_dev,
        min,
        max,
        certainty: certainty(avg, std_dev),
    }
}

/// The certainty heuristic: base 50, adjusted by consistency and plausible
/// reaction-time windows, clamped to [0, 100].
fn certainty(avg: f64, std_dev: f64) -> u8 {
    let mut score: i32 = 50;

    // Consistency bonus. Proxies and scripts tend to produce erratic
    // timings; a tight spread is evidence of one person answering live.
    if std_dev < 500.0 {
        score += 30;
    } else if std_dev < 1_000.0 {
        score += 20;
    } else if std_dev < 2_000.0 {
        score += 10;
    }

    // Reaction-window tiers, first match wins. Implausibly instant or
    // implausibly slow averages are both suspicious.
    if avg > 800.0 && avg < 3_000.0 {
        score += 20;
    } else if avg > 500.0 && avg < 5_000.0 {
        score += 10;
    } else if avg > 300.0 && avg < 8_000.0 {
        score += 5;
    } else if avg < 300.0 || avg > 15_000.0 {
        score -= 20;
    }

    score.clamp(0, 100) as u8
}
