//! Time-axis continuity checking and gap repair for experimental tracks.
//!
//! Tracking software drops frames; a short drop is repairable by inserting
//! interpolated samples, a long one is not. The repair ceiling is five steps:
//! at or beyond that the track is reported unrepairable and the caller
//! decides whether to force the analysis anyway.

use serde::{Deserialize, Serialize};

const ATOL: f64 = 1e-8;

fn gap_is_regular(gap: f64, delta_t: f64, rtol: f64) -> bool {
    (gap - delta_t).abs() <= ATOL + rtol * delta_t.abs()
}

/// Checks that consecutive samples are `delta_t` apart within tolerance.
pub fn is_continuous(times: &[f64], delta_t: f64, rtol: f64) -> bool {
    times
        .windows(2)
        .all(|pair| gap_is_regular(pair[1] - pair[0], delta_t, rtol))
}

/// Result of a gap-repair attempt.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "kebab-case")]
pub enum RepairOutcome {
    /// The axis was already regular; nothing changed.
    Continuous,
    /// Oversized gaps were subdivided by midpoint insertion.
    Repaired {
        /// Number of samples inserted.
        inserted: usize,
    },
    /// At least one gap reaches five steps; the series was left untouched.
    Unrepairable {
        /// Largest irregular gap found, in seconds.
        max_gap: f64,
    },
}

/// Attempts to repair dropped frames by midpoint insertion.
///
/// Every irregular gap must be below `5 * delta_t` for the repair to run;
/// otherwise the series is returned untouched. Oversized gaps are split at
/// their midpoint (time and linearly interpolated value) until no gap exceeds
/// the tolerance ceiling. Sub-gaps can land short of `delta_t`, so a repaired
/// axis is usable but not necessarily regular again.
pub fn repair_gaps(
    times: &mut Vec<f64>,
    values: &mut Vec<f64>,
    delta_t: f64,
    rtol: f64,
) -> RepairOutcome {
    debug_assert_eq!(times.len(), values.len());
    if is_continuous(times, delta_t, rtol) {
        return RepairOutcome::Continuous;
    }

    let mut max_gap = 0.0_f64;
    for pair in times.windows(2) {
        let gap = pair[1] - pair[0];
        if !gap_is_regular(gap, delta_t, rtol) {
            max_gap = max_gap.max(gap);
        }
    }
    if max_gap >= 5.0 * delta_t {
        return RepairOutcome::Unrepairable { max_gap };
    }

    let mut inserted = 0;
    let mut i = 0;
    while i + 1 < times.len() {
        let gap = times[i + 1] - times[i];
        if gap - delta_t > ATOL + rtol * delta_t.abs() {
            times.insert(i + 1, (times[i] + times[i + 1]) / 2.0);
            values.insert(i + 1, (values[i] + values[i + 1]) / 2.0);
            inserted += 1;
            // Re-examine the narrowed left half before advancing.
            continue;
        }
        i += 1;
    }
    RepairOutcome::Repaired { inserted }
}
