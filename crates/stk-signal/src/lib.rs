//! Signal conditioning for fluorescence tracks: multi-tau autocorrelation,
//! zero-phase Butterworth low-pass, and time-axis continuity repair.

pub mod continuity;
pub mod filter;
pub mod multitau;

pub use continuity::{is_continuous, repair_gaps, RepairOutcome};
pub use filter::{butter_lowpass, lowpass, sosfiltfilt, Sos};
pub use multitau::{autocorrelate, Correlogram};
