//! Decay models for the autocorrelation fit.

/// Model of the autocorrelation decay G(tau) in terms of the residence time
/// T and the initiation parameter c.
///
/// The estimator is generic over this trait so a caller can substitute its
/// own decay law; validating a user-supplied expression is the caller's
/// responsibility, not the estimator's.
pub trait DecayModel {
    /// Model value at lag `tau`.
    fn value(&self, tau: f64, residence: f64, initiation: f64) -> f64;

    /// Partial derivatives with respect to `(residence, initiation)`.
    ///
    /// The default uses central finite differences; override with the
    /// analytic form where one exists.
    fn gradient(&self, tau: f64, residence: f64, initiation: f64) -> [f64; 2] {
        let step = |p: f64| 1e-6 * p.abs().max(1.0);
        let ht = step(residence);
        let hc = step(initiation);
        [
            (self.value(tau, residence + ht, initiation) - self.value(tau, residence - ht, initiation))
                / (2.0 * ht),
            (self.value(tau, residence, initiation + hc) - self.value(tau, residence, initiation - hc))
                / (2.0 * hc),
        ]
    }
}

/// Closed-form decay of uncorrelated translation events:
/// G(tau) = ((T - tau) / (c T^2)) * H(T - tau), with H(0) = 0.
#[derive(Debug, Clone, Copy, Default)]
pub struct RampModel;

impl DecayModel for RampModel {
    fn value(&self, tau: f64, residence: f64, initiation: f64) -> f64 {
        if tau < residence {
            (residence - tau) / (initiation * residence * residence)
        } else {
            0.0
        }
    }

    fn gradient(&self, tau: f64, residence: f64, initiation: f64) -> [f64; 2] {
        if tau < residence {
            let t2 = residence * residence;
            [
                (2.0 * tau - residence) / (initiation * t2 * residence),
                -(residence - tau) / (initiation * initiation * t2),
            ]
        } else {
            [0.0, 0.0]
        }
    }
}
