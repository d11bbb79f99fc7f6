use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Regime that explains where the gaps sit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GapType {
    #[serde(rename = "none")]
    NoGaps,
    Sequential,
    Unordered,
}

/// One filled cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImputationPrediction {
    pub id: u64,
    pub column: String,
    pub predicted_value: f64,
    /// Percentage in `0..=100`.
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImputationReport {
    pub has_missing: bool,
    pub gap_type: GapType,
    /// Only columns with at least one missing cell.
    pub missing_stats: IndexMap<String, usize>,
    pub predictions: Vec<ImputationPrediction>,
}

impl ImputationReport {
    /// Report for input without gaps.
    pub fn complete() -> Self {
        Self {
            has_missing: false,
            gap_type: GapType::NoGaps,
            missing_stats: IndexMap::new(),
            predictions: Vec::new(),
        }
    }

    pub fn missing_total(&self) -> usize {
        self.missing_stats.values().sum()
    }
}
