use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Pipeline stage names used in error reports and log spans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Normalization,
    Standardization,
    AnomalyDetection,
    Imputation,
    QualityScoring,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Normalization => "normalization",
            Stage::Standardization => "standardization",
            Stage::AnomalyDetection => "anomaly_detection",
            Stage::Imputation => "imputation",
            Stage::QualityScoring => "quality_scoring",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Internal fault inside a stage, with the input shape needed to reproduce it.
#[derive(Debug, Clone, Error)]
#[error("{stage} failed on {rows}x{columns} input: {message}")]
pub struct StageError {
    pub stage: Stage,
    pub rows: usize,
    pub columns: usize,
    pub message: String,
}

impl StageError {
    pub fn new(stage: Stage, rows: usize, columns: usize, message: impl Into<String>) -> Self {
        Self {
            stage,
            rows,
            columns,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, StageError>;
