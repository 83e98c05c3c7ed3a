//! Rate estimates and fit reports.

use serde::{Deserialize, Serialize};
use stk_core::hash::round_f64;

/// Recovered kinetic rates for one track.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateEstimate {
    /// Ribosome elongation rate in amino acids per second.
    pub elongation: f64,
    /// Translation initiation rate (normalized inverse of the fitted
    /// initiation parameter).
    pub initiation: f64,
    /// One-sigma uncertainty of the two fitted parameters, where available.
    pub uncertainty: [f64; 2],
}

impl RateEstimate {
    /// All-NaN estimate marking a track that could not be analyzed.
    pub fn nan() -> Self {
        Self {
            elongation: f64::NAN,
            initiation: f64::NAN,
            uncertainty: [f64::NAN, f64::NAN],
        }
    }

    /// Sentinel estimate for a degenerate linear fit: too few points before
    /// the crossing.
    pub fn sentinel() -> Self {
        Self {
            elongation: -1.0,
            initiation: -1.0,
            uncertainty: [-1.0, -1.0],
        }
    }

    /// Whether this estimate is the unanalyzable-track marker.
    pub fn is_nan(&self) -> bool {
        self.elongation.is_nan()
    }
}

/// Full report of the nonlinear model fit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OriginalFit {
    /// Recovered rates.
    pub rates: RateEstimate,
    /// Fitted residence time T in seconds.
    pub residence: f64,
    /// Fitted initiation parameter c.
    pub initiation_param: f64,
    /// Sum of squared residuals at the solution.
    pub residual: f64,
    /// Solver iterations spent.
    pub iterations: usize,
    /// Stable hash of the fit payload.
    pub fit_hash: String,
}

impl OriginalFit {
    pub(crate) fn rounded(mut self) -> Self {
        self.residence = round_f64(self.residence);
        self.initiation_param = round_f64(self.initiation_param);
        self.residual = round_f64(self.residual);
        self
    }
}
