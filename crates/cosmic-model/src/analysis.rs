use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

/// Message carried by an insufficient-data outcome.
pub const INSUFFICIENT_DATA: &str = "Insufficient data for analysis";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnomalyResult {
    /// Ids of flagged records.
    #[serde(rename = "anomalies")]
    pub outlier_ids: BTreeSet<u64>,
    /// Parallel to the analyzed records; `-1` marks noise.
    #[serde(rename = "clusters")]
    pub cluster_labels: Vec<i32>,
    pub insights: Vec<String>,
}

impl AnomalyResult {
    /// Number of distinct non-noise labels.
    pub fn cluster_count(&self) -> usize {
        self.cluster_labels
            .iter()
            .filter(|label| **label >= 0)
            .collect::<HashSet<_>>()
            .len()
    }

    pub fn is_outlier(&self, id: u64) -> bool {
        self.outlier_ids.contains(&id)
    }
}

/// Anomaly stage output.
///
/// Callers must check for `Insufficient` before reading anomalies or clusters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnomalyOutcome {
    Analyzed(AnomalyResult),
    Insufficient { error: String },
}

impl AnomalyOutcome {
    pub fn insufficient(message: impl Into<String>) -> Self {
        AnomalyOutcome::Insufficient {
            error: message.into(),
        }
    }

    pub fn result(&self) -> Option<&AnomalyResult> {
        match self {
            AnomalyOutcome::Analyzed(result) => Some(result),
            AnomalyOutcome::Insufficient { .. } => None,
        }
    }

    pub fn is_insufficient(&self) -> bool {
        matches!(self, AnomalyOutcome::Insufficient { .. })
    }

    pub fn outlier_count(&self) -> usize {
        self.result().map_or(0, |result| result.outlier_ids.len())
    }
}
