//! Single-track analysis: conditioning, autocorrelation, rate recovery.

use serde::{Deserialize, Serialize};
use stk_core::errors::{ErrorInfo, StkError};
use stk_core::table::TrackTable;
use stk_fit::levmar::FitOpts;
use stk_fit::model::{DecayModel, RampModel};
use stk_fit::report::RateEstimate;
use stk_fit::{fit_linear, fit_original};
use stk_signal::continuity::{repair_gaps, RepairOutcome};
use stk_signal::filter::lowpass;
use stk_signal::multitau::autocorrelate;

fn opts_error(code: &str, message: impl Into<String>) -> StkError {
    StkError::Parameter(ErrorInfo::new(code, message.into()))
}

/// Rate-recovery strategy applied to the autocorrelation curve.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FitMethod {
    /// Nonlinear fit of the closed-form decay model.
    #[default]
    Original,
    /// First-sign-change linear method.
    Linear,
}

fn default_cutoff() -> f64 {
    100.0
}

fn default_poles() -> usize {
    5
}

/// Low-pass conditioning applied to the intensity before correlation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LowpassOpts {
    /// Cutoff frequency in Hz; must stay below the Nyquist frequency implied
    /// by `delta_t`.
    #[serde(default = "default_cutoff")]
    pub cutoff_hz: f64,
    /// Butterworth pole count.
    #[serde(default = "default_poles")]
    pub poles: usize,
}

impl Default for LowpassOpts {
    fn default() -> Self {
        Self {
            cutoff_hz: default_cutoff(),
            poles: default_poles(),
        }
    }
}

fn default_delta_t() -> f64 {
    0.5
}

fn default_protein_size() -> f64 {
    1500.0
}

fn default_normalize_intensity() -> f64 {
    1.0
}

fn default_true() -> bool {
    true
}

fn default_time_tolerance() -> f64 {
    1e-1
}

/// Options for one analysis pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisOpts {
    /// Acquisition interval between frames, in seconds.
    #[serde(default = "default_delta_t")]
    pub delta_t: f64,
    /// Protein size (body plus tag) in amino acids, for converting the
    /// fitted residence time into an elongation rate.
    #[serde(default = "default_protein_size")]
    pub protein_size: f64,
    /// Divisor applied to raw intensities (camera bit depth scaling).
    #[serde(default = "default_normalize_intensity")]
    pub normalize_intensity: f64,
    /// Normalize the correlogram by the squared mean and per-lag counts.
    #[serde(default = "default_true")]
    pub normalize_autocorrelation: bool,
    /// Lags per multi-tau level; `None` derives it from the track length.
    #[serde(default)]
    pub points_per_level: Option<usize>,
    /// Optional zero-phase low-pass conditioning.
    #[serde(default)]
    pub lowpass: Option<LowpassOpts>,
    /// Relative tolerance of the time-axis continuity check.
    #[serde(default = "default_time_tolerance")]
    pub time_tolerance: f64,
    /// Rate-recovery strategy.
    #[serde(default)]
    pub method: FitMethod,
    /// Analyze even when the time axis cannot be repaired.
    #[serde(default)]
    pub force_analysis: bool,
    /// Keep the zero-lag point in the nonlinear fit.
    #[serde(default = "default_true")]
    pub first_dot: bool,
    /// Frames already carry simulation time in seconds (no `delta_t`
    /// scaling).
    #[serde(default)]
    pub simulation: bool,
    /// Nonlinear solver configuration.
    #[serde(default)]
    pub fit: FitOpts,
}

impl Default for AnalysisOpts {
    fn default() -> Self {
        Self {
            delta_t: default_delta_t(),
            protein_size: default_protein_size(),
            normalize_intensity: default_normalize_intensity(),
            normalize_autocorrelation: true,
            points_per_level: None,
            lowpass: None,
            time_tolerance: default_time_tolerance(),
            method: FitMethod::default(),
            force_analysis: false,
            first_dot: true,
            simulation: false,
            fit: FitOpts::default(),
        }
    }
}

impl AnalysisOpts {
    /// Checks the numeric fields for range and finiteness.
    pub fn validate(&self) -> Result<(), StkError> {
        if !self.delta_t.is_finite() || self.delta_t <= 0.0 {
            return Err(opts_error(
                "invalid-delta-t",
                "delta_t must be a positive finite number",
            ));
        }
        if !self.protein_size.is_finite() || self.protein_size <= 0.0 {
            return Err(opts_error(
                "non-positive-parameter",
                "protein_size must be a positive finite number",
            ));
        }
        if !self.normalize_intensity.is_finite() || self.normalize_intensity == 0.0 {
            return Err(opts_error(
                "invalid-normalization",
                "normalize_intensity must be finite and non-zero",
            ));
        }
        if !self.time_tolerance.is_finite() || self.time_tolerance < 0.0 {
            return Err(opts_error(
                "invalid-tolerance",
                "time_tolerance must be non-negative and finite",
            ));
        }
        Ok(())
    }
}

/// Outcome of analyzing one track.
///
/// An unrepairable time axis without `force_analysis` yields the NaN marker
/// (`rates.is_nan()`, empty series) rather than an error, so batch loops keep
/// running; solver failures do surface as [`StkError::Fit`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SingleTrackAnalysis {
    /// Track identifier the result belongs to.
    pub track_id: i64,
    /// Conditioned sample times in seconds.
    pub times: Vec<f64>,
    /// Conditioned intensities.
    pub intensities: Vec<f64>,
    /// Correlogram lag times.
    pub lags: Vec<f64>,
    /// Correlogram values.
    pub correlation: Vec<f64>,
    /// Recovered rates.
    pub rates: RateEstimate,
    /// Whether the continuity gate was overridden by `force_analysis`.
    pub forced: bool,
    /// Samples inserted by gap repair.
    pub repaired_gaps: usize,
}

impl SingleTrackAnalysis {
    fn unanalyzable(track_id: i64) -> Self {
        Self {
            track_id,
            times: Vec::new(),
            intensities: Vec::new(),
            lags: Vec::new(),
            correlation: Vec::new(),
            rates: RateEstimate::nan(),
            forced: false,
            repaired_gaps: 0,
        }
    }

    /// Whether this is the could-not-analyze marker.
    pub fn is_nan(&self) -> bool {
        self.rates.is_nan()
    }
}

/// Analyzes one track with the default closed-form decay model.
pub fn single_track_analysis(
    table: &TrackTable,
    track_id: i64,
    opts: &AnalysisOpts,
) -> Result<SingleTrackAnalysis, StkError> {
    single_track_analysis_with_model(table, track_id, opts, &RampModel)
}

/// Analyzes one track with a caller-supplied decay model.
pub fn single_track_analysis_with_model(
    table: &TrackTable,
    track_id: i64,
    opts: &AnalysisOpts,
    model: &dyn DecayModel,
) -> Result<SingleTrackAnalysis, StkError> {
    opts.validate()?;

    let series = table.select(track_id).ok_or_else(|| {
        StkError::Track(
            ErrorInfo::new("unknown-track", "track identifier not present in the table")
                .with_context("track_id", track_id.to_string()),
        )
    })?;

    let start = series.frames.first().copied().unwrap_or(0.0);
    let scale = if opts.simulation { 1.0 } else { opts.delta_t };
    let mut times: Vec<f64> = series.frames.iter().map(|f| (f - start) * scale).collect();
    let mut intensities: Vec<f64> = series
        .intensities
        .iter()
        .map(|y| y / opts.normalize_intensity)
        .collect();

    let mut forced = false;
    let mut repaired_gaps = 0;
    match repair_gaps(&mut times, &mut intensities, opts.delta_t, opts.time_tolerance) {
        RepairOutcome::Continuous => {}
        RepairOutcome::Repaired { inserted } => repaired_gaps = inserted,
        RepairOutcome::Unrepairable { .. } => {
            if !opts.force_analysis {
                return Ok(SingleTrackAnalysis::unanalyzable(track_id));
            }
            forced = true;
        }
    }

    if let Some(lp) = &opts.lowpass {
        intensities = lowpass(&intensities, lp.cutoff_hz, 1.0 / opts.delta_t, lp.poles)?;
    }

    let correlogram = autocorrelate(
        &intensities,
        opts.delta_t,
        opts.normalize_autocorrelation,
        opts.points_per_level,
    )?;

    let rates = match opts.method {
        FitMethod::Original => {
            fit_original(
                &correlogram.lags,
                &correlogram.values,
                model,
                opts.protein_size,
                opts.first_dot,
                &opts.fit,
            )?
            .rates
        }
        FitMethod::Linear => fit_linear(&correlogram.lags, &correlogram.values, opts.protein_size),
    };

    Ok(SingleTrackAnalysis {
        track_id,
        times,
        intensities,
        lags: correlogram.lags,
        correlation: correlogram.values,
        rates,
        forced,
        repaired_gaps,
    })
}
