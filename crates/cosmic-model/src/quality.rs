use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Pass,
    Warn,
    Fail,
}

/// Human-readable finding of one scoring rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityCheck {
    pub label: String,
    pub status: CheckStatus,
}

impl QualityCheck {
    pub fn pass(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            status: CheckStatus::Pass,
        }
    }

    pub fn warn(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            status: CheckStatus::Warn,
        }
    }

    pub fn fail(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            status: CheckStatus::Fail,
        }
    }
}

/// Sub-scores, each in `0.0..=100.0`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct QualityMetrics {
    pub completeness: f64,
    pub consistency: f64,
    pub validity: f64,
    pub stability: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    /// Composite score in `0..=100`.
    pub score: u8,
    pub metrics: QualityMetrics,
    pub checks: Vec<QualityCheck>,
}

impl QualityReport {
    /// All-zero report with a single failing check.
    pub fn zeroed(label: impl Into<String>) -> Self {
        Self {
            score: 0,
            metrics: QualityMetrics::default(),
            checks: vec![QualityCheck::fail(label)],
        }
    }

    pub fn pass_count(&self) -> usize {
        self.count(CheckStatus::Pass)
    }

    pub fn warning_count(&self) -> usize {
        self.count(CheckStatus::Warn)
    }

    pub fn failure_count(&self) -> usize {
        self.count(CheckStatus::Fail)
    }

    pub fn has_failures(&self) -> bool {
        self.failure_count() > 0
    }

    fn count(&self, status: CheckStatus) -> usize {
        self.checks
            .iter()
            .filter(|check| check.status == status)
            .count()
    }
}
