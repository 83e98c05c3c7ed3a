use stk_analysis::batch::analyze_tracks;
use stk_analysis::pipeline::{single_track_analysis, AnalysisOpts, FitMethod, LowpassOpts};
use stk_fit::levmar::FitOpts;
use stk_gen::profile::{ProfileParams, TagPosition};
use stk_gen::track::{generate_tracks, TrackParams};

const ELONGATION_TRUTH: f64 = 24.0;
const PROTEIN_SIZE: f64 = 490.0 + 796.0;

fn sim_params() -> TrackParams {
    TrackParams {
        profile: ProfileParams {
            protein_length: 490.0,
            tag_length: 796.0,
            tag_repeats: 32,
            fluo_per_tag: 4.0,
            elongation_rate: ELONGATION_TRUTH,
            retention_time: 0.0,
            tag_position: TagPosition::Begin,
            step: 0.5,
            noise_std: None,
        },
        binding_rate: 0.1,
        track_length: 5200.0,
        warmup: 200.0,
    }
}

fn sim_opts() -> AnalysisOpts {
    AnalysisOpts {
        delta_t: 0.5,
        protein_size: PROTEIN_SIZE,
        simulation: true,
        points_per_level: Some(2000),
        ..AnalysisOpts::default()
    }
}

#[test]
fn model_fit_recovers_the_elongation_rate() {
    let batch = generate_tracks(1, &sim_params(), 7).unwrap();
    let opts = AnalysisOpts {
        method: FitMethod::Original,
        first_dot: true,
        fit: FitOpts {
            initial: [30.0, 1.0],
            max_iters: 500,
            ..FitOpts::default()
        },
        ..sim_opts()
    };

    let result = single_track_analysis(&batch.table, 0, &opts).unwrap();
    assert!(!result.is_nan());

    // Single-track correlation curves carry shot noise and the true event
    // profile is not exactly triangular, so the bound is generous.
    let ratio = result.rates.elongation / ELONGATION_TRUTH;
    assert!(
        (0.55..1.7).contains(&ratio),
        "elongation {} aa/s vs ground truth {}",
        result.rates.elongation,
        ELONGATION_TRUTH
    );
    assert!(result.rates.initiation.is_finite());
    assert!(result.rates.initiation > 0.0);
}

#[test]
fn linear_method_with_lowpass_lands_near_the_truth() {
    let batch = generate_tracks(1, &sim_params(), 11).unwrap();
    let opts = AnalysisOpts {
        method: FitMethod::Linear,
        lowpass: Some(LowpassOpts {
            cutoff_hz: 0.05,
            poles: 4,
        }),
        ..sim_opts()
    };

    let result = single_track_analysis(&batch.table, 0, &opts).unwrap();
    assert!(!result.is_nan());
    // A sentinel would be negative; the crossing should land in the right
    // order of magnitude.
    assert!(
        result.rates.elongation > 0.0,
        "degenerate linear fit: {:?}",
        result.rates
    );
    let ratio = result.rates.elongation / ELONGATION_TRUTH;
    assert!(
        (0.3..3.5).contains(&ratio),
        "elongation {} aa/s vs ground truth {}",
        result.rates.elongation,
        ELONGATION_TRUTH
    );
}

#[test]
fn batch_driver_produces_one_row_per_track() {
    let batch = generate_tracks(2, &sim_params(), 3).unwrap();
    let opts = AnalysisOpts {
        method: FitMethod::Linear,
        ..sim_opts()
    };

    let report = analyze_tracks(&batch.table, &opts).unwrap();
    assert_eq!(report.results.rows.len(), 2);
    assert!(report.failures.is_empty());
    assert_eq!(report.results_hash.len(), 64);

    for (i, row) in report.results.rows.iter().enumerate() {
        assert_eq!(row.track_id, i as i64);
        assert_eq!(row.delta_t, 0.5);
    }
}

#[test]
fn correlogram_lags_cover_the_residence_time() {
    let batch = generate_tracks(1, &sim_params(), 5).unwrap();
    let opts = AnalysisOpts {
        method: FitMethod::Linear,
        ..sim_opts()
    };
    let result = single_track_analysis(&batch.table, 0, &opts).unwrap();

    let residence = PROTEIN_SIZE / ELONGATION_TRUTH;
    let max_lag = result.lags.last().copied().unwrap();
    assert!(max_lag > 2.0 * residence);
    // Fine spacing at the head of the ladder.
    assert!((result.lags[1] - result.lags[0] - 0.5).abs() < 1e-12);
}
