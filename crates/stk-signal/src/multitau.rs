//! Multi-tau autocorrelation with logarithmically spaced lag bins.
//!
//! The base level computes `m + 1` linearly spaced lags at full resolution;
//! each further level halves the trace by pairwise averaging and contributes
//! `m / 2` lags at twice the previous spacing. Long signals therefore cost
//! far fewer lag evaluations than a linear-lag autocorrelation while keeping
//! fine resolution where the decay lives. The non-uniform lag ladder is part
//! of the output contract; downstream fits depend on it.

use serde::{Deserialize, Serialize};
use stk_core::errors::{ErrorInfo, StkError};

fn signal_error(code: &str, message: impl Into<String>) -> StkError {
    StkError::Signal(ErrorInfo::new(code, message.into()))
}

/// Autocorrelation curve on the multi-tau lag ladder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Correlogram {
    /// Lag times in seconds, finely spaced early and log-compressed late.
    pub lags: Vec<f64>,
    /// Correlation value at each lag.
    pub values: Vec<f64>,
}

fn dot_lagged(trace: &[f64], n: usize, lag: usize) -> f64 {
    let mut acc = 0.0;
    for i in 0..n - lag {
        acc += trace[i] * trace[i + lag];
    }
    acc
}

fn bin_pairwise(trace: &mut Vec<f64>, n: &mut usize) {
    if *n % 2 == 1 {
        *n -= 1;
    }
    for i in 0..*n / 2 {
        trace[i] = (trace[2 * i] + trace[2 * i + 1]) / 2.0;
    }
    *n /= 2;
    trace.truncate(*n);
}

/// Computes the multi-tau autocorrelation of `signal`.
///
/// `points_per_level` is the number of lags per level (`m`); it defaults to
/// half the signal length minus one and is coerced up to the next even value,
/// which the level-halving scheme requires. With `normalize` the mean is
/// subtracted first and every value is divided by the squared mean and the
/// per-lag sample count, yielding the dimensionless G(tau); without it, raw
/// lagged sums are rescaled to the full-signal sample count.
pub fn autocorrelate(
    signal: &[f64],
    delta_t: f64,
    normalize: bool,
    points_per_level: Option<usize>,
) -> Result<Correlogram, StkError> {
    if !delta_t.is_finite() || delta_t <= 0.0 {
        return Err(signal_error(
            "invalid-delta-t",
            "delta_t must be a positive finite number",
        ));
    }
    let n0 = signal.len();
    if n0 < 4 {
        return Err(signal_error(
            "signal-too-short",
            "autocorrelation needs at least four samples",
        ));
    }

    let mut m = points_per_level.unwrap_or(n0 / 2 - 1);
    if m % 2 == 1 {
        m += 1;
    }
    if m < 2 {
        return Err(signal_error(
            "invalid-points-per-level",
            "points_per_level must be at least two",
        ));
    }
    if n0 < 2 * m {
        return Err(StkError::Signal(
            ErrorInfo::new(
                "points-per-level-too-large",
                "signal must be at least twice points_per_level",
            )
            .with_context("signal_len", n0.to_string())
            .with_context("points_per_level", m.to_string()),
        ));
    }

    let mut trace = signal.to_vec();
    let mean = trace.iter().sum::<f64>() / n0 as f64;
    if normalize {
        if mean == 0.0 {
            return Err(signal_error(
                "zero-mean",
                "cannot normalize a zero-mean signal",
            ));
        }
        for value in &mut trace {
            *value -= mean;
        }
    }

    let levels = ((n0 as f64 / m as f64).log2()).floor() as usize;
    let len_g = m + levels * (m / 2) + 1;
    let mut lags = vec![0.0_f64; len_g];
    let mut values = vec![0.0_f64; len_g];
    let mut lag_samples_count = vec![0.0_f64; len_g];
    let mut level_len = vec![0.0_f64; len_g];

    let mut n = n0;
    for lag in 0..=m {
        lags[lag] = delta_t * lag as f64;
        values[lag] = dot_lagged(&trace, n, lag);
        lag_samples_count[lag] = (n - lag) as f64;
        level_len[lag] = n as f64;
    }
    bin_pairwise(&mut trace, &mut n);

    let mut truncate_at = None;
    'levels: for level in 1..=levels {
        for j in 1..=m / 2 {
            let lag_samples = j + m / 2;
            let idx = m + j + (level - 1) * (m / 2);
            if n <= lag_samples {
                // The binned trace is exhausted; the ladder ends here.
                truncate_at = Some(idx - 1);
                break 'levels;
            }
            lags[idx] = delta_t * (lag_samples as f64) * (1_u64 << level) as f64;
            values[idx] = dot_lagged(&trace, n, lag_samples);
            lag_samples_count[idx] = (n - lag_samples) as f64;
            level_len[idx] = n as f64;
        }
        bin_pairwise(&mut trace, &mut n);
    }

    if let Some(cut) = truncate_at {
        lags.truncate(cut);
        values.truncate(cut);
        lag_samples_count.truncate(cut);
        level_len.truncate(cut);
    }

    if normalize {
        for (value, samples) in values.iter_mut().zip(lag_samples_count.iter()) {
            *value /= mean * mean * samples;
        }
    } else {
        for (value, len) in values.iter_mut().zip(level_len.iter()) {
            *value *= n0 as f64 / len;
        }
    }

    Ok(Correlogram { lags, values })
}
