//! In-memory track-table contract shared by the generator and the analyzer.
//!
//! Acquisition tools disagree on column naming, so the analyzer never
//! hardcodes source names: a [`ColumnMap`] resolves whatever the caller's
//! table uses onto the canonical `TRACK_ID` / `FRAME` / `MEAN_INTENSITY_CH1`
//! triple before ingestion.

use serde::{Deserialize, Serialize};

use crate::errors::{ErrorInfo, StkError};

/// Canonical name of the track identifier column.
pub const TRACK_ID_COLUMN: &str = "TRACK_ID";
/// Canonical name of the acquisition frame column.
pub const FRAME_COLUMN: &str = "FRAME";
/// Canonical name of the fluorescence intensity column.
pub const INTENSITY_COLUMN: &str = "MEAN_INTENSITY_CH1";

fn table_error(code: &str, message: impl Into<String>) -> StkError {
    StkError::Parameter(ErrorInfo::new(code, message.into()))
}

/// Maps caller-supplied column names onto the canonical track-table columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMap {
    /// Source column holding the track identifier.
    pub track_id: String,
    /// Source column holding the frame index (or elapsed time for simulated
    /// tracks).
    pub frame: String,
    /// Source column holding the fluorescence intensity.
    pub intensity: String,
}

impl Default for ColumnMap {
    fn default() -> Self {
        Self {
            track_id: TRACK_ID_COLUMN.to_string(),
            frame: FRAME_COLUMN.to_string(),
            intensity: INTENSITY_COLUMN.to_string(),
        }
    }
}

impl ColumnMap {
    /// Builds a map from parallel rename lists, the way experimental tables
    /// are re-labelled before analysis.
    ///
    /// Each `old` name becomes the source for the canonical column named by
    /// the matching entry of `new`; entries targeting non-canonical names are
    /// ignored. The lists must have the same length.
    pub fn from_renames(old: &[&str], new: &[&str]) -> Result<Self, StkError> {
        if old.len() != new.len() {
            return Err(StkError::Parameter(
                ErrorInfo::new(
                    "rename-length-mismatch",
                    "old and new column name lists must have the same length",
                )
                .with_context("old_len", old.len().to_string())
                .with_context("new_len", new.len().to_string()),
            ));
        }
        let mut map = Self::default();
        for (source, target) in old.iter().zip(new.iter()) {
            match *target {
                TRACK_ID_COLUMN => map.track_id = (*source).to_string(),
                FRAME_COLUMN => map.frame = (*source).to_string(),
                INTENSITY_COLUMN => map.intensity = (*source).to_string(),
                _ => {}
            }
        }
        Ok(map)
    }
}

/// One track extracted from a [`TrackTable`], sorted by frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackSeries {
    /// Frame values in ascending order.
    pub frames: Vec<f64>,
    /// Intensities matching `frames` element-for-element.
    pub intensities: Vec<f64>,
}

/// Columnar table of fluorescence tracks.
///
/// The generator emits one of these (with the retention-time column
/// populated) and the analyzer consumes one; neither side performs any file
/// I/O on it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackTable {
    track_id: Vec<i64>,
    frame: Vec<f64>,
    intensity: Vec<f64>,
    retention_time: Option<Vec<f64>>,
}

impl TrackTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a table from parallel canonical columns.
    pub fn from_columns(
        track_id: Vec<i64>,
        frame: Vec<f64>,
        intensity: Vec<f64>,
    ) -> Result<Self, StkError> {
        if track_id.len() != frame.len() || frame.len() != intensity.len() {
            return Err(table_error(
                "column-length-mismatch",
                "track_id, frame and intensity columns must have equal lengths",
            ));
        }
        Ok(Self {
            track_id,
            frame,
            intensity,
            retention_time: None,
        })
    }

    /// Builds a table from named columns, resolving names through `map`.
    ///
    /// Track identifiers are truncated from their floating representation,
    /// matching how acquisition exports store them.
    pub fn from_named_columns(
        names: &[&str],
        columns: &[Vec<f64>],
        map: &ColumnMap,
    ) -> Result<Self, StkError> {
        if names.len() != columns.len() {
            return Err(table_error(
                "column-length-mismatch",
                "one name is required per column",
            ));
        }
        let find = |wanted: &str| -> Result<&Vec<f64>, StkError> {
            names
                .iter()
                .position(|name| *name == wanted)
                .map(|idx| &columns[idx])
                .ok_or_else(|| {
                    table_error("missing-column", format!("column {wanted} not found"))
                })
        };
        let track_id = find(&map.track_id)?
            .iter()
            .map(|value| *value as i64)
            .collect();
        let frame = find(&map.frame)?.clone();
        let intensity = find(&map.intensity)?.clone();
        Self::from_columns(track_id, frame, intensity)
    }

    /// Attaches the retention-time column emitted by the generator.
    pub fn with_retention_time(mut self, retention_time: Vec<f64>) -> Result<Self, StkError> {
        if retention_time.len() != self.track_id.len() {
            return Err(table_error(
                "column-length-mismatch",
                "retention_time column must match the table length",
            ));
        }
        self.retention_time = Some(retention_time);
        Ok(self)
    }

    /// Appends one track's samples under the given identifier.
    pub fn push_track(
        &mut self,
        track_id: i64,
        frames: &[f64],
        intensities: &[f64],
        retention_time: Option<f64>,
    ) {
        self.track_id.extend(std::iter::repeat(track_id).take(frames.len()));
        self.frame.extend_from_slice(frames);
        self.intensity.extend_from_slice(intensities);
        if let Some(retention) = retention_time {
            self.retention_time
                .get_or_insert_with(Vec::new)
                .extend(std::iter::repeat(retention).take(frames.len()));
        }
    }

    /// Number of rows in the table.
    pub fn len(&self) -> usize {
        self.track_id.len()
    }

    /// Whether the table holds no rows.
    pub fn is_empty(&self) -> bool {
        self.track_id.is_empty()
    }

    /// Returns the sorted unique track identifiers present in the table.
    pub fn track_ids(&self) -> Vec<i64> {
        let mut ids = self.track_id.clone();
        ids.sort_unstable();
        ids.dedup();
        ids
    }

    /// Extracts one track's samples sorted by frame, or `None` when the
    /// identifier is absent.
    pub fn select(&self, track_id: i64) -> Option<TrackSeries> {
        let mut pairs: Vec<(f64, f64)> = self
            .track_id
            .iter()
            .zip(self.frame.iter().zip(self.intensity.iter()))
            .filter(|(id, _)| **id == track_id)
            .map(|(_, (frame, intensity))| (*frame, *intensity))
            .collect();
        if pairs.is_empty() {
            return None;
        }
        pairs.sort_by(|a, b| a.0.total_cmp(&b.0));
        Some(TrackSeries {
            frames: pairs.iter().map(|(frame, _)| *frame).collect(),
            intensities: pairs.iter().map(|(_, intensity)| *intensity).collect(),
        })
    }

    /// Retention time recorded for a track, when the column is present.
    pub fn retention_time_of(&self, track_id: i64) -> Option<f64> {
        let column = self.retention_time.as_ref()?;
        self.track_id
            .iter()
            .position(|id| *id == track_id)
            .map(|idx| column[idx])
    }
}
