//! Butterworth low-pass design and zero-phase application.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use stk_core::errors::{ErrorInfo, StkError};

fn filter_error(code: &str, message: impl Into<String>) -> StkError {
    StkError::Signal(ErrorInfo::new(code, message.into()))
}

/// One second-order filter section, coefficients normalized to `a0 = 1`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sos {
    /// Numerator coefficients `b0, b1, b2`.
    pub b: [f64; 3],
    /// Denominator coefficients `a1, a2`.
    pub a: [f64; 2],
}

impl Sos {
    fn dc_gain(&self) -> f64 {
        (self.b[0] + self.b[1] + self.b[2]) / (1.0 + self.a[0] + self.a[1])
    }
}

/// Maps an analog pole through the bilinear transform (fs = 2 convention).
fn bilinear_pole(re: f64, im: f64) -> (f64, f64) {
    let denom = (4.0 - re) * (4.0 - re) + im * im;
    (
        (16.0 - re * re - im * im) / denom,
        8.0 * im / denom,
    )
}

/// Designs a Butterworth low-pass as a cascade of second-order sections.
///
/// Analog prototype poles are prewarped, mapped through the bilinear
/// transform, and paired into sections (an odd order yields one first-order
/// section). Each section is scaled to unity DC gain, which for a low-pass
/// fixes the overall passband level.
pub fn butter_lowpass(
    poles: usize,
    cutoff_hz: f64,
    sample_rate_hz: f64,
) -> Result<Vec<Sos>, StkError> {
    if poles == 0 {
        return Err(filter_error("invalid-order", "at least one pole is required"));
    }
    if !sample_rate_hz.is_finite() || sample_rate_hz <= 0.0 {
        return Err(filter_error(
            "invalid-sample-rate",
            "sample rate must be a positive finite number",
        ));
    }
    if !cutoff_hz.is_finite() || cutoff_hz <= 0.0 || cutoff_hz >= sample_rate_hz / 2.0 {
        return Err(StkError::Signal(
            ErrorInfo::new(
                "invalid-cutoff",
                "cutoff must lie strictly between zero and the Nyquist frequency",
            )
            .with_context("cutoff_hz", cutoff_hz.to_string())
            .with_context("nyquist_hz", (sample_rate_hz / 2.0).to_string()),
        ));
    }

    let wn = cutoff_hz / (sample_rate_hz / 2.0);
    let warped = 4.0 * (PI * wn / 2.0).tan();

    let order = poles as f64;
    let mut sections = Vec::with_capacity((poles + 1) / 2);
    for k in 0..poles / 2 {
        // Conjugate pair at angle pi*(2k+1)/(2N) past the imaginary axis.
        let theta = PI * (2.0 * k as f64 + 1.0) / (2.0 * order);
        let re = -warped * theta.sin();
        let im = warped * theta.cos();
        let (zr, zi) = bilinear_pole(re, im);
        let a1 = -2.0 * zr;
        let a2 = zr * zr + zi * zi;
        let gain = (1.0 + a1 + a2) / 4.0;
        sections.push(Sos {
            b: [gain, 2.0 * gain, gain],
            a: [a1, a2],
        });
    }
    if poles % 2 == 1 {
        // Real pole on the negative axis.
        let (zr, _) = bilinear_pole(-warped, 0.0);
        let a1 = -zr;
        let gain = (1.0 + a1) / 2.0;
        sections.push(Sos {
            b: [gain, gain, 0.0],
            a: [a1, 0.0],
        });
    }
    Ok(sections)
}

/// Runs one section over `data` in place, starting from the steady state a
/// constant input `scale` would produce.
fn filter_section(section: &Sos, data: &mut [f64], scale: f64) {
    let [b0, b1, b2] = section.b;
    let [a1, a2] = section.a;
    let gain = section.dc_gain();
    let mut z1 = (gain - b0) * scale;
    let mut z2 = (b2 - a2 * gain) * scale;
    for sample in data.iter_mut() {
        let x = *sample;
        let y = b0 * x + z1;
        z1 = b1 * x - a1 * y + z2;
        z2 = b2 * x - a2 * y;
        *sample = y;
    }
}

fn run_cascade(sections: &[Sos], data: &mut [f64]) {
    let scale = data.first().copied().unwrap_or(0.0);
    for section in sections {
        filter_section(section, data, scale);
    }
}

/// Applies the section cascade forward and backward, cancelling phase shift.
///
/// The signal is extended at both ends by an odd reflection so the filter
/// settles before it reaches the real samples.
pub fn sosfiltfilt(sections: &[Sos], signal: &[f64]) -> Result<Vec<f64>, StkError> {
    let pad = 3 * (2 * sections.len() + 1);
    if signal.len() <= pad {
        return Err(StkError::Signal(
            ErrorInfo::new(
                "signal-too-short",
                "signal must be longer than the reflection pad",
            )
            .with_context("signal_len", signal.len().to_string())
            .with_context("pad", pad.to_string()),
        ));
    }

    let n = signal.len();
    let first = signal[0];
    let last = signal[n - 1];
    let mut extended = Vec::with_capacity(n + 2 * pad);
    for i in (1..=pad).rev() {
        extended.push(2.0 * first - signal[i]);
    }
    extended.extend_from_slice(signal);
    for i in 1..=pad {
        extended.push(2.0 * last - signal[n - 1 - i]);
    }

    run_cascade(sections, &mut extended);
    extended.reverse();
    run_cascade(sections, &mut extended);
    extended.reverse();

    Ok(extended[pad..pad + n].to_vec())
}

/// Zero-phase Butterworth low-pass of `signal`.
pub fn lowpass(
    signal: &[f64],
    cutoff_hz: f64,
    sample_rate_hz: f64,
    poles: usize,
) -> Result<Vec<f64>, StkError> {
    let sections = butter_lowpass(poles, cutoff_hz, sample_rate_hz)?;
    sosfiltfilt(&sections, signal)
}
