//! Damped least-squares fit of a decay model to an autocorrelation curve.

use nalgebra::{Matrix2, Vector2};
use serde::{Deserialize, Serialize};
use stk_core::errors::{ErrorInfo, StkError};
use stk_core::hash::stable_hash_string;

use crate::model::DecayModel;
use crate::report::{OriginalFit, RateEstimate};

fn fit_error(code: &str, message: impl Into<String>) -> StkError {
    StkError::Fit(ErrorInfo::new(code, message.into()))
}

fn default_initial() -> [f64; 2] {
    [1.0, 1.0]
}

fn default_max_iters() -> usize {
    200
}

fn default_tolerance() -> f64 {
    1e-8
}

/// Solver configuration for the model-fit method.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitOpts {
    /// Starting point `(residence, initiation)`.
    #[serde(default = "default_initial")]
    pub initial: [f64; 2],
    /// Maximum solver iterations.
    #[serde(default = "default_max_iters")]
    pub max_iters: usize,
    /// Relative convergence tolerance on the cost and the step.
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
}

impl Default for FitOpts {
    fn default() -> Self {
        Self {
            initial: default_initial(),
            max_iters: default_max_iters(),
            tolerance: default_tolerance(),
        }
    }
}

struct Evaluation {
    cost: f64,
    gradient: Vector2<f64>,
    normal: Matrix2<f64>,
}

fn evaluate(
    model: &dyn DecayModel,
    lags: &[f64],
    values: &[f64],
    p: [f64; 2],
) -> Evaluation {
    let mut cost = 0.0;
    let mut gradient = Vector2::zeros();
    let mut normal = Matrix2::zeros();
    for (&tau, &observed) in lags.iter().zip(values.iter()) {
        let residual = observed - model.value(tau, p[0], p[1]);
        let jac = model.gradient(tau, p[0], p[1]);
        let jac = Vector2::new(jac[0], jac[1]);
        cost += residual * residual;
        gradient += jac * residual;
        normal += jac * jac.transpose();
    }
    Evaluation {
        cost,
        gradient,
        normal,
    }
}

fn cost_only(model: &dyn DecayModel, lags: &[f64], values: &[f64], p: [f64; 2]) -> f64 {
    lags.iter()
        .zip(values.iter())
        .map(|(&tau, &observed)| {
            let residual = observed - model.value(tau, p[0], p[1]);
            residual * residual
        })
        .sum()
}

/// Fits the decay model to `(lags, values)` and converts the parameters to
/// kinetic rates.
///
/// `first_dot: false` drops the zero-lag point, which carries shot-noise bias
/// rather than decay information. Elongation is `protein_size / T`; the
/// reported initiation rate is `1 / c`. Non-convergence is an error, never a
/// silent default; parameter uncertainties come from the covariance of the
/// solution scaled by the reduced chi-square.
pub fn fit_original(
    lags: &[f64],
    values: &[f64],
    model: &dyn DecayModel,
    protein_size: f64,
    first_dot: bool,
    opts: &FitOpts,
) -> Result<OriginalFit, StkError> {
    if lags.len() != values.len() {
        return Err(StkError::Parameter(ErrorInfo::new(
            "curve-length-mismatch",
            "lag and value series must have equal lengths",
        )));
    }
    if !protein_size.is_finite() || protein_size <= 0.0 {
        return Err(StkError::Parameter(ErrorInfo::new(
            "non-positive-parameter",
            "protein_size must be a positive finite number",
        )));
    }
    let skip = usize::from(!first_dot);
    let (lags, values) = (&lags[skip.min(lags.len())..], &values[skip.min(values.len())..]);
    if lags.len() < 2 {
        return Err(fit_error(
            "insufficient-points",
            "the model fit needs at least two curve points",
        ));
    }

    let mut p = opts.initial;
    let mut damping = 1e-3;
    let mut eval = evaluate(model, lags, values, p);
    let mut iterations = 0;

    while iterations < opts.max_iters {
        iterations += 1;

        let damped = eval.normal
            + Matrix2::from_diagonal(&Vector2::new(
                damping * eval.normal[(0, 0)].max(1e-12),
                damping * eval.normal[(1, 1)].max(1e-12),
            ));
        let Some(inverse) = damped.try_inverse() else {
            damping *= 10.0;
            if damping > 1e12 {
                return Err(fit_error(
                    "no-convergence",
                    "normal equations stayed singular under damping",
                ));
            }
            continue;
        };
        let step = inverse * eval.gradient;
        let candidate = [p[0] + step[0], p[1] + step[1]];
        let candidate_cost = cost_only(model, lags, values, candidate);

        if candidate_cost.is_finite() && candidate_cost < eval.cost {
            let cost_drop = eval.cost - candidate_cost;
            let step_norm = step.norm();
            let param_norm = (p[0] * p[0] + p[1] * p[1]).sqrt();
            p = candidate;
            eval = evaluate(model, lags, values, p);
            damping = (damping * 0.1).max(1e-12);
            let cost_converged = cost_drop <= opts.tolerance * eval.cost.max(opts.tolerance);
            let step_converged = step_norm <= opts.tolerance * (param_norm + opts.tolerance);
            if cost_converged || step_converged || eval.cost <= 1e-30 {
                return finish(lags, values, model, p, eval.cost, iterations, protein_size);
            }
        } else {
            damping *= 10.0;
            if damping > 1e12 {
                return Err(fit_error(
                    "no-convergence",
                    "damping saturated without reducing the residual",
                ));
            }
        }
    }

    Err(StkError::Fit(
        ErrorInfo::new("no-convergence", "iteration budget exhausted")
            .with_context("max_iters", opts.max_iters.to_string()),
    ))
}

fn finish(
    lags: &[f64],
    values: &[f64],
    model: &dyn DecayModel,
    p: [f64; 2],
    cost: f64,
    iterations: usize,
    protein_size: f64,
) -> Result<OriginalFit, StkError> {
    let eval = evaluate(model, lags, values, p);
    let dof = lags.len().saturating_sub(2);
    let scale = if dof > 0 { cost / dof as f64 } else { f64::INFINITY };
    let uncertainty = match eval.normal.try_inverse() {
        Some(covariance) => [
            (covariance[(0, 0)] * scale).sqrt(),
            (covariance[(1, 1)] * scale).sqrt(),
        ],
        None => [f64::INFINITY, f64::INFINITY],
    };

    let rates = RateEstimate {
        elongation: protein_size / p[0],
        initiation: 1.0 / p[1],
        uncertainty,
    };
    let fit_hash = stable_hash_string(&(p[0], p[1], cost, lags.len()))?;
    Ok(OriginalFit {
        rates,
        residence: p[0],
        initiation_param: p[1],
        residual: cost,
        iterations,
        fit_hash,
    }
    .rounded())
}
