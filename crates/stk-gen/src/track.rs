//! Stochastic simulation of a translation site's fluorescence track.

use rand::Rng;
use serde::{Deserialize, Serialize};
use stk_core::errors::{ErrorInfo, StkError};
use stk_core::hash::stable_hash_string;
use stk_core::provenance::{RunProvenance, SchemaVersion};
use stk_core::rng::{derive_substream_seed, RngHandle};
use stk_core::table::TrackTable;

use crate::profile::{generate_profile, sample_count, ProfileParams};

fn param_error(code: &str, message: impl Into<String>) -> StkError {
    StkError::Parameter(ErrorInfo::new(code, message.into()))
}

fn default_track_length() -> f64 {
    6000.0
}

fn default_warmup() -> f64 {
    200.0
}

/// Parameters of one simulated track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackParams {
    /// Single-event fluorescence profile parameters.
    pub profile: ProfileParams,
    /// Rate at which new translation events initiate, in events per second.
    /// Each time step starts an event with probability `binding_rate * step`,
    /// which approximates a Poisson process while that product stays well
    /// below one.
    pub binding_rate: f64,
    /// Simulated timeline length in seconds, before warm-up truncation.
    #[serde(default = "default_track_length")]
    pub track_length: f64,
    /// Leading duration discarded as the simulation's startup transient, in
    /// seconds. The default matches a 200 s transient; time is re-based to
    /// zero after the cut.
    #[serde(default = "default_warmup")]
    pub warmup: f64,
}

impl Default for TrackParams {
    fn default() -> Self {
        Self {
            profile: ProfileParams::default(),
            binding_rate: 0.1,
            track_length: default_track_length(),
            warmup: default_warmup(),
        }
    }
}

impl TrackParams {
    /// Checks every field for range and finiteness.
    pub fn validate(&self) -> Result<(), StkError> {
        self.profile.validate()?;
        if !self.binding_rate.is_finite() || self.binding_rate < 0.0 {
            return Err(param_error(
                "invalid-binding-rate",
                "binding_rate must be non-negative and finite",
            ));
        }
        if !self.track_length.is_finite() || self.track_length <= 0.0 {
            return Err(param_error(
                "non-positive-parameter",
                "track_length must be a positive finite number",
            ));
        }
        if !self.warmup.is_finite() || self.warmup < 0.0 {
            return Err(param_error(
                "invalid-warmup",
                "warmup must be non-negative and finite",
            ));
        }
        let total = sample_count(self.track_length, self.profile.step);
        if self.warmup_samples() >= total {
            return Err(StkError::Parameter(
                ErrorInfo::new(
                    "warmup-exceeds-track",
                    "warm-up would discard the entire track",
                )
                .with_hint("shorten warmup or lengthen track_length"),
            ));
        }
        Ok(())
    }

    fn warmup_samples(&self) -> usize {
        (self.warmup / self.profile.step).round() as usize
    }
}

/// One simulated fluorescence track after warm-up truncation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    /// Sample times in seconds, re-based to start at zero.
    pub times: Vec<f64>,
    /// Total fluorescence: the sum of every active event's profile.
    pub intensities: Vec<f64>,
    /// Number of translation events active at each sample.
    pub active_events: Vec<u32>,
}

/// Simulates one track of overlapping translation events.
///
/// The single-event profile is drawn once (noise included) and reused for
/// every event, as the site geometry does not change between initiations.
/// A uniform draw is taken at every step whether or not an event can still
/// fit, so the random stream consumed per track depends only on the timeline
/// length.
pub fn generate_track(params: &TrackParams, rng: &mut RngHandle) -> Result<Track, StkError> {
    params.validate()?;

    let profile = generate_profile(&params.profile, rng)?;
    let step = params.profile.step;
    let total = sample_count(params.track_length, step);
    let skip = params.warmup_samples();
    let start_probability = params.binding_rate * step;

    let mut intensities = vec![0.0_f64; total];
    let mut active_events = vec![0_u32; total];
    for start in 0..total {
        let draw: f64 = rng.inner_mut().gen();
        if draw < start_probability {
            let span = profile.intensities.len().min(total - start);
            for (offset, value) in profile.intensities[..span].iter().enumerate() {
                intensities[start + offset] += value;
                active_events[start + offset] += 1;
            }
        }
    }

    let intensities = intensities.split_off(skip);
    let active_events = active_events.split_off(skip);
    let times = (0..intensities.len()).map(|i| i as f64 * step).collect();
    Ok(Track {
        times,
        intensities,
        active_events,
    })
}

/// A batch of generated tracks plus the provenance needed to regenerate it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackBatch {
    /// Generated rows: frame, intensity, track_id, retention_time.
    pub table: TrackTable,
    /// Master seed and canonical parameter hash.
    pub provenance: RunProvenance,
}

/// Generates `count` independent tracks under the same parameters.
///
/// Track `i` draws from the substream seed `(master_seed, i)`, so tracks are
/// independent of each other and the whole batch is reproducible from the
/// master seed alone.
pub fn generate_tracks(
    count: usize,
    params: &TrackParams,
    master_seed: u64,
) -> Result<TrackBatch, StkError> {
    params.validate()?;

    let mut table = TrackTable::new();
    for index in 0..count {
        let mut rng = RngHandle::from_seed(derive_substream_seed(master_seed, index as u64));
        let track = generate_track(params, &mut rng)?;
        table.push_track(
            index as i64,
            &track.times,
            &track.intensities,
            Some(params.profile.retention_time),
        );
    }

    let provenance = RunProvenance {
        input_hash: stable_hash_string(params)?,
        seed: master_seed,
        schema: Some(SchemaVersion::default()),
    };
    Ok(TrackBatch { table, provenance })
}
