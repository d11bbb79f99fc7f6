//! Configuration options for the analysis pipeline.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Options for column-name standardization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StandardizerOptions {
    /// Minimum token-sort similarity (percent) for a fuzzy match.
    pub threshold: u8,

    /// Caller-supplied renames. Keys are matched case-insensitively.
    pub overrides: IndexMap<String, String>,
}

impl Default for StandardizerOptions {
    fn default() -> Self {
        Self {
            threshold: 80,
            overrides: IndexMap::new(),
        }
    }
}

impl StandardizerOptions {
    pub fn with_threshold(mut self, threshold: u8) -> Self {
        self.threshold = threshold.min(100);
        self
    }

    pub fn with_override(mut self, original: impl Into<String>, standard: impl Into<String>) -> Self {
        self.overrides.insert(original.into(), standard.into());
        self
    }
}

/// Options for outlier detection and spatial clustering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnomalyOptions {
    /// Fraction of points flagged as outliers.
    pub contamination: f64,

    /// Seed for the isolation forest.
    pub seed: u64,

    /// Number of isolation trees.
    pub estimators: usize,

    /// Upper bound on rows drawn per tree.
    pub max_samples: usize,

    /// Neighborhood radius in standardized units.
    pub eps: f64,

    /// Neighbors (self included) needed for a core point.
    pub min_samples: usize,

    /// Usable rows required before any modeling happens.
    pub min_records: usize,
}

impl Default for AnomalyOptions {
    fn default() -> Self {
        Self {
            contamination: 0.05,
            seed: 42,
            estimators: 100,
            max_samples: 256,
            eps: 0.3,
            min_samples: 5,
            min_records: 10,
        }
    }
}

impl AnomalyOptions {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_contamination(mut self, contamination: f64) -> Self {
        self.contamination = contamination.clamp(0.0, 0.5);
        self
    }
}

/// Options for gap imputation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImputationOptions {
    /// Donors consulted for an unordered gap.
    pub neighbors: usize,
}

impl Default for ImputationOptions {
    fn default() -> Self {
        Self { neighbors: 5 }
    }
}

/// Options controlling the whole pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineOptions {
    /// Maximum preview rows per envelope.
    pub preview_limit: usize,
    pub standardizer: StandardizerOptions,
    pub anomaly: AnomalyOptions,
    pub imputation: ImputationOptions,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            preview_limit: 1000,
            standardizer: StandardizerOptions::default(),
            anomaly: AnomalyOptions::default(),
            imputation: ImputationOptions::default(),
        }
    }
}

impl PipelineOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_preview_limit(mut self, limit: usize) -> Self {
        self.preview_limit = limit.max(1);
        self
    }

    pub fn with_standardizer(mut self, standardizer: StandardizerOptions) -> Self {
        self.standardizer = standardizer;
        self
    }

    pub fn with_anomaly(mut self, anomaly: AnomalyOptions) -> Self {
        self.anomaly = anomaly;
        self
    }
}
