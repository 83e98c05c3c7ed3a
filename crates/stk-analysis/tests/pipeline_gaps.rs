use stk_analysis::pipeline::{single_track_analysis, AnalysisOpts, FitMethod};
use stk_core::table::TrackTable;
use stk_core::StkError;

fn wavy(i: usize) -> f64 {
    5.0 + (i as f64 * 0.3).sin()
}

fn table_with_frames(frames: &[i64]) -> TrackTable {
    let track_id = vec![0_i64; frames.len()];
    let frame: Vec<f64> = frames.iter().map(|&f| f as f64).collect();
    let intensity: Vec<f64> = (0..frames.len()).map(wavy).collect();
    TrackTable::from_columns(track_id, frame, intensity).unwrap()
}

fn linear_opts() -> AnalysisOpts {
    AnalysisOpts {
        method: FitMethod::Linear,
        ..AnalysisOpts::default()
    }
}

#[test]
fn continuous_track_analyzes_cleanly() {
    let frames: Vec<i64> = (0..60).collect();
    let result = single_track_analysis(&table_with_frames(&frames), 0, &linear_opts()).unwrap();
    assert!(!result.is_nan());
    assert!(!result.forced);
    assert_eq!(result.repaired_gaps, 0);
    assert_eq!(result.times.len(), 60);
    // Frames are scaled by delta_t for experimental data.
    assert!((result.times[1] - 0.5).abs() < 1e-12);
    assert!(!result.lags.is_empty());
    assert_eq!(result.lags.len(), result.correlation.len());
}

#[test]
fn ten_step_gap_yields_the_nan_marker() {
    // Frames jump from 30 to 40: a 10 * delta_t hole, past the repair
    // ceiling.
    let frames: Vec<i64> = (0..=30).chain(40..=70).collect();
    let result = single_track_analysis(&table_with_frames(&frames), 0, &linear_opts()).unwrap();
    assert!(result.is_nan());
    assert!(result.rates.elongation.is_nan());
    assert!(result.rates.initiation.is_nan());
    assert!(result.rates.uncertainty[0].is_nan());
    assert!(result.times.is_empty());
    assert!(result.lags.is_empty());
}

#[test]
fn force_analysis_overrides_the_continuity_gate() {
    let frames: Vec<i64> = (0..=30).chain(40..=70).collect();
    let opts = AnalysisOpts {
        force_analysis: true,
        ..linear_opts()
    };
    let result = single_track_analysis(&table_with_frames(&frames), 0, &opts).unwrap();
    assert!(!result.is_nan());
    assert!(result.forced);
}

#[test]
fn short_gaps_are_repaired_inline() {
    // One dropped frame: a 2 * delta_t gap.
    let frames: Vec<i64> = (0..30).chain(31..62).collect();
    let result = single_track_analysis(&table_with_frames(&frames), 0, &linear_opts()).unwrap();
    assert!(!result.is_nan());
    assert!(!result.forced);
    assert_eq!(result.repaired_gaps, 1);
    assert_eq!(result.times.len(), 62);
}

#[test]
fn unknown_track_is_a_caller_error() {
    let frames: Vec<i64> = (0..60).collect();
    let err = single_track_analysis(&table_with_frames(&frames), 9, &linear_opts()).unwrap_err();
    assert!(matches!(err, StkError::Track(_)));
    assert_eq!(err.info().code, "unknown-track");
}

#[test]
fn simulation_frames_skip_delta_t_scaling() {
    let track_id = vec![0_i64; 60];
    let frame: Vec<f64> = (0..60).map(|i| i as f64 * 0.5).collect();
    let intensity: Vec<f64> = (0..60).map(wavy).collect();
    let table = TrackTable::from_columns(track_id, frame, intensity).unwrap();

    let opts = AnalysisOpts {
        simulation: true,
        ..linear_opts()
    };
    let result = single_track_analysis(&table, 0, &opts).unwrap();
    assert!((result.times[1] - 0.5).abs() < 1e-12);
    assert_eq!(result.times.len(), 60);
}
