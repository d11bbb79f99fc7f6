pub mod analysis;
pub mod enriched;
pub mod envelope;
pub mod error;
pub mod frame;
pub mod imputation;
pub mod mapping;
pub mod missing;
pub mod options;
pub mod quality;
pub mod record;

pub use analysis::{AnomalyOutcome, AnomalyResult, INSUFFICIENT_DATA};
pub use enriched::EnrichedEnvelope;
pub use envelope::{
    ColumnInfo, ColumnSummary, DatasetEnvelope, FileFormat, Statistics, SubUnitKind,
    SubUnitSummary,
};
pub use error::{Result, Stage, StageError};
pub use frame::PreviewFrame;
pub use imputation::{GapType, ImputationPrediction, ImputationReport};
pub use mapping::{ColumnMapping, MappingMethod, StandardizationResult};
pub use missing::{MISSING_SENTINELS, is_missing_sentinel};
pub use options::{AnomalyOptions, ImputationOptions, PipelineOptions, StandardizerOptions};
pub use quality::{CheckStatus, QualityCheck, QualityMetrics, QualityReport};
pub use record::{PROJECTED_FIELDS, Record, RecordStatus};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quality_report_counts() {
        let report = QualityReport {
            score: 72,
            metrics: QualityMetrics::default(),
            checks: vec![
                QualityCheck::pass("No missing values"),
                QualityCheck::warn("Units not explicitly defined"),
                QualityCheck::warn("2 potential outliers detected"),
                QualityCheck::fail("3 missing values detected"),
            ],
        };
        assert_eq!(report.pass_count(), 1);
        assert_eq!(report.warning_count(), 2);
        assert_eq!(report.failure_count(), 1);
        assert!(report.has_failures());
    }

    #[test]
    fn enriched_envelope_serializes_flat() {
        let envelope = DatasetEnvelope::new("stars.csv", FileFormat::Tabular);
        let enriched = EnrichedEnvelope::new(envelope);
        let json = serde_json::to_value(&enriched).expect("serialize envelope");
        assert_eq!(json["filename"], "stars.csv");
        assert_eq!(json["format"], "TABULAR");
        assert!(json.get("standardization").is_none());
        assert!(json.get("quality_report").is_none());
    }
}
