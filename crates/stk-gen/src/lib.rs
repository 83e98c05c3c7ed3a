//! Track Generator: synthetic fluorescence tracks from translation kinetics.
//!
//! One translation event contributes a deterministic piecewise-linear
//! profile; a track is the additive overlay of events initiated by a
//! discrete-time binding process. All randomness flows through seeded
//! [`stk_core::rng::RngHandle`] streams.

pub mod profile;
pub mod track;

pub use profile::{generate_profile, Profile, ProfileParams, TagPosition};
pub use track::{generate_track, generate_tracks, Track, TrackBatch, TrackParams};
