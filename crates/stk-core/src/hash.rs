//! Canonical hashing and rounding helpers shared across stk crates.

use std::fmt::Write as _;

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::errors::{ErrorInfo, StkError};

/// Computes a stable hexadecimal hash for the provided serialisable payload.
pub fn stable_hash_string<T: Serialize>(value: &T) -> Result<String, StkError> {
    let bytes = serde_json::to_vec(value)
        .map_err(|err| StkError::Serde(ErrorInfo::new("canonical-json", err.to_string())))?;
    let digest = Sha256::digest(bytes);
    let mut rendered = String::with_capacity(digest.len() * 2);
    for byte in digest {
        let _ = write!(rendered, "{byte:02x}");
    }
    Ok(rendered)
}

/// Rounds a floating point value to the canonical reporting precision.
pub fn round_f64(value: f64) -> f64 {
    let scaled = (value * 1e9).round();
    scaled / 1e9
}
