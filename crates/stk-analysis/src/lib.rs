//! Track Analyzer: recovers elongation and initiation rates from observed or
//! simulated fluorescence tracks via multi-tau autocorrelation and curve
//! fitting.

pub mod batch;
pub mod pipeline;

pub use batch::{analyze_tracks, BatchReport, ResultRow, ResultsTable, TrackFailure};
pub use pipeline::{
    single_track_analysis, single_track_analysis_with_model, AnalysisOpts, FitMethod, LowpassOpts,
    SingleTrackAnalysis,
};
