//! Pipeline configuration: numeric constants for every stage.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{Result, VersemapError};

/// Half-open vote range `[min, max)` that groups cross-reference arcs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteBin {
    /// Inclusive lower bound.
    pub min: i64,
    /// Exclusive upper bound.
    pub max: i64,
    /// Display label.
    pub label: String,
}

impl VoteBin {
    /// Create a bin covering `[min, max)`.
    pub fn new(min: i64, max: i64, label: impl Into<String>) -> Self {
        Self {
            min,
            max,
            label: label.into(),
        }
    }

    /// Whether `votes` falls inside this bin.
    #[inline]
    pub fn contains(&self, votes: i64) -> bool {
        self.min <= votes && votes < self.max
    }
}

/// Configuration shared by all pipeline stages.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Embedding model identifier recorded in metadata sidecars.
    pub model: String,
    /// Neighbors kept per verse.
    pub top_k: usize,
    /// Rows per similarity block in the neighbor search.
    pub neighbor_batch_size: usize,
    /// Minimum votes for a cross-reference to be rendered.
    pub min_votes: i64,
    /// Bow height for coincident endpoints.
    pub min_bow: f64,
    /// Bow height for antipodal endpoints.
    pub max_bow: f64,
    /// Interpolation segments per arc (arc has `arc_segments + 1` points).
    pub arc_segments: usize,
    /// Vote bins, ascending.
    pub vote_bins: Vec<VoteBin>,
    /// Decimal places kept for neighbor similarities.
    pub similarity_decimals: u32,
    /// Decimal places kept for sphere point coordinates.
    pub point_decimals: u32,
    /// Decimal places kept for arc polyline coordinates.
    pub arc_decimals: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            model: "odunola/sentence-transformers-bible-reference-final".to_string(),
            top_k: 8,
            neighbor_batch_size: 500,
            min_votes: 20,
            min_bow: 0.003,
            max_bow: 0.02,
            arc_segments: 30,
            vote_bins: vec![
                VoteBin::new(20, 30, "20–29"),
                VoteBin::new(30, 50, "30–49"),
                VoteBin::new(50, 100, "50–99"),
                VoteBin::new(100, 9999, "100+"),
            ],
            similarity_decimals: 4,
            point_decimals: 4,
            arc_decimals: 3,
        }
    }
}

impl PipelineConfig {
    /// Load a config from a JSON file. Missing fields take their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let s = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&s)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings no stage can work with.
    pub fn validate(&self) -> Result<()> {
        if self.top_k == 0 {
            return Err(VersemapError::Config("top_k must be >= 1".into()));
        }
        if self.neighbor_batch_size == 0 {
            return Err(VersemapError::Config(
                "neighbor_batch_size must be >= 1".into(),
            ));
        }
        if self.arc_segments == 0 {
            return Err(VersemapError::Config("arc_segments must be >= 1".into()));
        }
        if !(self.min_bow <= self.max_bow) {
            return Err(VersemapError::Config(format!(
                "min_bow ({}) exceeds max_bow ({})",
                self.min_bow, self.max_bow
            )));
        }
        for bin in &self.vote_bins {
            if bin.min >= bin.max {
                return Err(VersemapError::Config(format!(
                    "vote bin '{}' is empty: [{}, {})",
                    bin.label, bin.min, bin.max
                )));
            }
        }
        for pair in self.vote_bins.windows(2) {
            if pair[1].min < pair[0].max {
                return Err(VersemapError::Config(format!(
                    "vote bins '{}' and '{}' overlap or are out of order",
                    pair[0].label, pair[1].label
                )));
            }
        }
        Ok(())
    }
}
