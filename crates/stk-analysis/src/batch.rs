//! Batch driver: every track in a table, one result row per track.

use serde::{Deserialize, Serialize};
use stk_core::errors::StkError;
use stk_core::hash::{round_f64, stable_hash_string};
use stk_core::provenance::SchemaVersion;
use stk_core::table::TrackTable;

use crate::pipeline::{single_track_analysis, AnalysisOpts};

/// One row of the results table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResultRow {
    /// Track the row belongs to.
    pub track_id: i64,
    /// Estimated elongation rate in amino acids per second.
    pub elongation_rate: f64,
    /// Estimated initiation rate.
    pub initiation_rate: f64,
    /// One-sigma parameter uncertainties (sentinel or NaN where the method
    /// provides none).
    pub uncertainty: [f64; 2],
    /// Acquisition interval the analysis used.
    pub delta_t: f64,
}

/// The final output artifact: one row per analyzed track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ResultsTable {
    /// Result rows in ascending track order.
    pub rows: Vec<ResultRow>,
    /// Schema of the table.
    pub schema: SchemaVersion,
}

/// A per-track failure that did not halt the batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackFailure {
    /// Track that failed.
    pub track_id: i64,
    /// The distinguishable error (solver non-convergence keeps its own code,
    /// unlike the NaN rows produced by unrepairable time axes).
    pub error: StkError,
}

/// Batch outcome: results, per-track failures, canonical hash of the rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    /// Accumulated results table.
    pub results: ResultsTable,
    /// Tracks whose analysis errored.
    pub failures: Vec<TrackFailure>,
    /// Stable hash of the result rows.
    pub results_hash: String,
}

/// Analyzes every unique track in the table.
///
/// Unanalyzable tracks land in the results as NaN rows and degenerate linear
/// fits as sentinel rows; errors (fit non-convergence, bad low-pass setup)
/// are collected per track and never abort the remaining tracks.
pub fn analyze_tracks(table: &TrackTable, opts: &AnalysisOpts) -> Result<BatchReport, StkError> {
    opts.validate()?;

    let mut rows = Vec::new();
    let mut failures = Vec::new();
    for track_id in table.track_ids() {
        match single_track_analysis(table, track_id, opts) {
            Ok(analysis) => rows.push(ResultRow {
                track_id,
                elongation_rate: round_f64(analysis.rates.elongation),
                initiation_rate: round_f64(analysis.rates.initiation),
                uncertainty: [
                    round_f64(analysis.rates.uncertainty[0]),
                    round_f64(analysis.rates.uncertainty[1]),
                ],
                delta_t: opts.delta_t,
            }),
            Err(error) => failures.push(TrackFailure { track_id, error }),
        }
    }

    let results_hash = stable_hash_string(&rows)?;
    Ok(BatchReport {
        results: ResultsTable {
            rows,
            schema: SchemaVersion::default(),
        },
        failures,
        results_hash,
    })
}
