//! Composite data-quality scoring.
//!
//! [`QualityScorer`] rates a preview on four sub-scores:
//!
//! - **Completeness**: share of observed cells
//! - **Validity**: sky coordinates inside their ranges
//! - **Consistency**: whether metadata declares a unit
//! - **Stability**: outlier density reported by anomaly detection
//!
//! The composite is a weighted sum truncated to an integer in `0..=100`.
//!
//! # Example
//!
//! ```
//! use cosmic_model::Record;
//! use cosmic_validate::QualityScorer;
//! use indexmap::IndexMap;
//!
//! let records = vec![
//!     Record::new(0, 10.0, 20.0, 1.5),
//!     Record::new(1, 11.0, 21.0, 1.7),
//! ];
//! let report = QualityScorer::new().score(&records, &IndexMap::new(), None);
//! assert_eq!(report.score, 94);
//! assert_eq!(report.warning_count(), 1);
//! ```

mod checks;

use cosmic_model::{AnomalyOutcome, PreviewFrame, QualityMetrics, QualityReport, Record};
use indexmap::IndexMap;

use crate::checks::{Column, completeness, coordinates, outliers, units};

/// Weights of completeness, validity, consistency and stability.
pub const WEIGHTS: QualityMetrics = QualityMetrics {
    completeness: 0.3,
    validity: 0.3,
    consistency: 0.2,
    stability: 0.2,
};

/// Rates preview records, their metadata and the anomaly outcome.
#[derive(Debug, Clone, Copy, Default)]
pub struct QualityScorer;

impl QualityScorer {
    pub fn new() -> Self {
        Self
    }

    /// Score a preview.
    ///
    /// An insufficient or absent anomaly outcome counts as zero outliers.
    pub fn score(
        &self,
        records: &[Record],
        metadata: &IndexMap<String, String>,
        anomalies: Option<&AnomalyOutcome>,
    ) -> QualityReport {
        if records.is_empty() {
            return QualityReport::zeroed("Empty dataset");
        }

        let frame = PreviewFrame::from_records(records);
        let columns: Vec<Column<'_>> = frame.data_columns().collect();
        let observed = columns
            .iter()
            .any(|(_, cells)| cells.iter().any(Option::is_some));
        if !observed {
            tracing::debug!(rows = records.len(), "preview has no observed values");
            return QualityReport::zeroed("No observed values");
        }

        let completeness = completeness::check(&columns);
        let validity = coordinates::check(&columns);
        let consistency = units::check(metadata);
        let outlier_count = anomalies.map_or(0, AnomalyOutcome::outlier_count);
        let stability = outliers::check(outlier_count, frame.height());

        let metrics = QualityMetrics {
            completeness: completeness.metric,
            consistency: consistency.metric,
            validity: validity.metric,
            stability: stability.metric,
        };
        let score = composite(&metrics);
        tracing::info!(
            score,
            completeness = metrics.completeness,
            validity = metrics.validity,
            consistency = metrics.consistency,
            stability = metrics.stability,
            "quality scored"
        );

        QualityReport {
            score,
            metrics,
            checks: vec![
                completeness.check,
                validity.check,
                consistency.check,
                stability.check,
            ],
        }
    }
}

/// Weighted sum, truncated and clamped to `0..=100`.
pub fn composite(metrics: &QualityMetrics) -> u8 {
    let weighted = metrics.completeness * WEIGHTS.completeness
        + metrics.validity * WEIGHTS.validity
        + metrics.consistency * WEIGHTS.consistency
        + metrics.stability * WEIGHTS.stability;
    if weighted.is_nan() {
        return 0;
    }
    weighted.trunc().clamp(0.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn composite_truncates() {
        let metrics = QualityMetrics {
            completeness: 100.0,
            validity: 100.0,
            consistency: 70.0,
            stability: 95.0,
        };
        // 30 + 30 + 14 + 19 = 93
        assert_eq!(composite(&metrics), 93);
        assert_eq!(composite(&QualityMetrics::default()), 0);
    }

    #[test]
    fn all_null_preview_scores_zero() {
        let records = vec![
            Record::new(0, f64::NAN, f64::NAN, f64::NAN).with_field("flux", None),
            Record::new(1, f64::NAN, f64::NAN, f64::NAN),
        ];
        let report = QualityScorer::new().score(&records, &IndexMap::new(), None);
        assert_eq!(report.score, 0);
        assert_eq!(report.metrics, QualityMetrics::default());
        assert_eq!(report.failure_count(), 1);
    }
}
