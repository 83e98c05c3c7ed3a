#![deny(missing_docs)]
#![doc = "Shared error, RNG, provenance and table types for the stk engine."]

pub mod errors;
pub mod hash;
pub mod provenance;
pub mod rng;
pub mod table;

pub use errors::{ErrorInfo, StkError};
pub use hash::{round_f64, stable_hash_string};
pub use provenance::{RunProvenance, SchemaVersion};
pub use rng::{derive_substream_seed, RngHandle};
pub use table::{ColumnMap, TrackSeries, TrackTable};
