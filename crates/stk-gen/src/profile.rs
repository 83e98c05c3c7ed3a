//! Deterministic fluorescence profile of a single translation event.

use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};
use stk_core::errors::{ErrorInfo, StkError};
use stk_core::rng::RngHandle;

fn param_error(code: &str, message: impl Into<String>) -> StkError {
    StkError::Parameter(ErrorInfo::new(code, message.into()))
}

/// Number of samples produced by half-open sampling of `[0, stop)` at `step`.
pub(crate) fn sample_count(stop: f64, step: f64) -> usize {
    (stop / step).ceil() as usize
}

/// Position of the fluorescent tag array relative to the protein body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TagPosition {
    /// Tag synthesized first: fluorescence ramps up early, then plateaus for
    /// the remaining occupancy (including retention).
    #[default]
    Begin,
    /// Tag synthesized last: the signal stays dark until the final ramp.
    End,
}

fn default_step() -> f64 {
    0.1
}

/// Biophysical parameters of one translating ribosome-protein complex.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileParams {
    /// Length of the protein body in amino acids.
    pub protein_length: f64,
    /// Length of the tag array in amino acids.
    pub tag_length: f64,
    /// Number of tag repeats.
    pub tag_repeats: u32,
    /// Fluorescence intensity contributed by one mature tag repeat.
    pub fluo_per_tag: f64,
    /// Ribosome elongation rate in amino acids per second.
    pub elongation_rate: f64,
    /// Extra time the finished protein stays bound to the site, in seconds.
    #[serde(default)]
    pub retention_time: f64,
    /// Tag placement relative to the protein body.
    #[serde(default)]
    pub tag_position: TagPosition,
    /// Sampling step in seconds.
    #[serde(default = "default_step")]
    pub step: f64,
    /// Standard deviation of per-sample Gaussian noise; `None` disables it.
    #[serde(default)]
    pub noise_std: Option<f64>,
}

impl Default for ProfileParams {
    fn default() -> Self {
        Self {
            protein_length: 490.0,
            tag_length: 796.0,
            tag_repeats: 32,
            fluo_per_tag: 4.0,
            elongation_rate: 24.0,
            retention_time: 0.0,
            tag_position: TagPosition::Begin,
            step: default_step(),
            noise_std: None,
        }
    }
}

impl ProfileParams {
    /// Checks every field for range and finiteness.
    pub fn validate(&self) -> Result<(), StkError> {
        let positive = [
            ("protein_length", self.protein_length),
            ("tag_length", self.tag_length),
            ("fluo_per_tag", self.fluo_per_tag),
            ("elongation_rate", self.elongation_rate),
            ("step", self.step),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(param_error(
                    "non-positive-parameter",
                    format!("{name} must be a positive finite number"),
                ));
            }
        }
        if self.tag_repeats == 0 {
            return Err(param_error(
                "non-positive-parameter",
                "tag_repeats must be at least one",
            ));
        }
        if !self.retention_time.is_finite() || self.retention_time < 0.0 {
            return Err(param_error(
                "negative-retention",
                "retention_time must be non-negative and finite",
            ));
        }
        if let Some(std) = self.noise_std {
            if !std.is_finite() || std < 0.0 {
                return Err(param_error(
                    "invalid-noise",
                    "noise_std must be non-negative and finite",
                ));
            }
        }
        Ok(())
    }

    /// Total site occupancy in seconds: synthesis of protein plus tag, then
    /// retention.
    pub fn occupancy(&self) -> f64 {
        (self.protein_length + self.tag_length) / self.elongation_rate + self.retention_time
    }

    /// Duration of the fluorescence ramp (tag synthesis) in seconds.
    pub fn ramp_duration(&self) -> f64 {
        self.tag_length / self.elongation_rate
    }

    /// Intensity of a fully synthesized tag array.
    pub fn plateau(&self) -> f64 {
        f64::from(self.tag_repeats) * self.fluo_per_tag
    }
}

/// Sampled fluorescence contribution of one translation event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    /// Sample times in seconds, starting at zero.
    pub times: Vec<f64>,
    /// Fluorescence intensity at each sample time.
    pub intensities: Vec<f64>,
}

/// Generates the fluorescence profile of one translation event.
///
/// The intensity rises linearly while the tag array is synthesized and is
/// otherwise flat: held at the plateau after an early tag, dark before a late
/// one. The optional Gaussian noise makes this the only non-deterministic
/// path; with `noise_std: None` the result is a pure function of the
/// parameters.
pub fn generate_profile(params: &ProfileParams, rng: &mut RngHandle) -> Result<Profile, StkError> {
    params.validate()?;

    let step = params.step;
    let n_total = sample_count(params.occupancy(), step);
    let n_ramp = sample_count(params.ramp_duration(), step);
    let slope = params.plateau() / params.ramp_duration();

    let ramp: Vec<f64> = (0..n_ramp).map(|i| slope * (i as f64) * step).collect();
    let hold = ramp.last().copied().unwrap_or(0.0);

    let mut intensities = Vec::with_capacity(n_total);
    match params.tag_position {
        TagPosition::Begin => {
            intensities.extend_from_slice(&ramp);
            intensities.resize(n_total, hold);
        }
        TagPosition::End => {
            intensities.resize(n_total - n_ramp, 0.0);
            intensities.extend_from_slice(&ramp);
        }
    }

    if let Some(std) = params.noise_std {
        let normal = Normal::new(0.0, std)
            .map_err(|err| param_error("invalid-noise", err.to_string()))?;
        for value in &mut intensities {
            *value += normal.sample(rng.inner_mut());
        }
    }

    let times = (0..n_total).map(|i| i as f64 * step).collect();
    Ok(Profile { times, intensities })
}
