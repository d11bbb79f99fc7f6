//! Per-file pipeline with explicit stages.
//!
//! The stages run in this order:
//! 1. **Normalization**: parse the file into a dataset envelope
//! 2. **Standardization**: map column names onto canonical fields
//! 3. **Anomaly detection**: flag outliers, cluster positions, tag records
//! 4. **Imputation**: find gaps in the preview and predict fill values
//! 5. **Quality scoring**: rate the preview using the anomaly outcome
//!
//! Analysis stages see the source column names. The preview and column list
//! are renamed through the standardization mapping only once every stage has
//! run.

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use cosmic_analysis::{AnomalyClusterEngine, GapImputationEngine};
use cosmic_ingest::FormatNormalizer;
use cosmic_map::ColumnStandardizer;
use cosmic_model::{
    AnomalyOutcome, DatasetEnvelope, EnrichedEnvelope, FileFormat, PipelineOptions, RecordStatus,
    Stage, StageError, StandardizationResult,
};
use cosmic_validate::QualityScorer;
use indexmap::IndexSet;
use tracing::{debug, info, info_span};

/// One file handed to the pipeline.
#[derive(Debug, Clone, Copy)]
pub struct PipelineInput<'a> {
    pub filename: &'a str,
    pub bytes: &'a [u8],
    /// Declared format; detected from the file name when `None`.
    pub format: Option<FileFormat>,
}

/// Wall-clock time spent in one stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageTiming {
    pub stage: Stage,
    pub elapsed: Duration,
}

/// Final artifact plus bookkeeping for the run summary.
#[derive(Debug, Clone)]
pub struct PipelineRun {
    pub enriched: EnrichedEnvelope,
    pub timings: Vec<StageTiming>,
}

impl PipelineRun {
    pub fn elapsed(&self) -> Duration {
        self.timings.iter().map(|timing| timing.elapsed).sum()
    }
}

/// Run every stage over one file.
///
/// # Errors
///
/// Parse failures surface as [`cosmic_ingest::IngestError`]; invalid engine
/// options surface as [`StageError`] naming the stage and input shape.
pub fn run_pipeline(input: &PipelineInput<'_>, options: &PipelineOptions) -> Result<PipelineRun> {
    let span = info_span!("pipeline", filename = input.filename);
    let _guard = span.enter();
    let mut timings = Vec::with_capacity(5);

    let envelope = timed(&mut timings, Stage::Normalization, || normalize(input, options))?;
    let rows = envelope.preview.len();
    let columns = envelope.columns.len();

    let standardization = timed(&mut timings, Stage::Standardization, || {
        ColumnStandardizer::new(&options.standardizer).standardize(&envelope.source_columns)
    });
    info!(
        mapped = standardization.matched_count(),
        columns, "standardized column names"
    );

    let mut envelope = envelope;
    let outcome = timed(&mut timings, Stage::AnomalyDetection, || {
        let engine = AnomalyClusterEngine::new(&options.anomaly).map_err(|error| {
            StageError::new(Stage::AnomalyDetection, rows, columns, error.to_string())
        })?;
        Ok::<_, StageError>(engine.analyze(&envelope.preview))
    })?;
    tag_records(&mut envelope, &outcome);

    let imputation = timed(&mut timings, Stage::Imputation, || {
        let engine = GapImputationEngine::new(&options.imputation).map_err(|error| {
            StageError::new(Stage::Imputation, rows, columns, error.to_string())
        })?;
        Ok::<_, StageError>(engine.impute(&envelope.preview))
    })?;

    let quality = timed(&mut timings, Stage::QualityScoring, || {
        QualityScorer::new().score(&envelope.preview, &envelope.metadata, Some(&outcome))
    });

    rename_columns(&mut envelope, &standardization);
    let mut enriched = EnrichedEnvelope::new(envelope);
    enriched.standardization = Some(standardization);
    enriched.ai_analysis = Some(outcome);
    enriched.predictions = imputation.has_missing.then_some(imputation);
    enriched.quality_report = Some(quality);

    Ok(PipelineRun { enriched, timings })
}

fn normalize(input: &PipelineInput<'_>, options: &PipelineOptions) -> Result<DatasetEnvelope> {
    let normalizer = FormatNormalizer::new(options);
    let envelope = match input.format {
        Some(format) => normalizer.normalize(input.filename, input.bytes, format),
        None => normalizer.normalize_detected(input.filename, input.bytes),
    };
    envelope.with_context(|| format!("normalize {}", input.filename))
}

/// Run `stage` inside its own span and record how long it took.
fn timed<T>(timings: &mut Vec<StageTiming>, stage: Stage, run: impl FnOnce() -> T) -> T {
    let span = info_span!("stage", stage = stage.as_str());
    let start = Instant::now();
    let value = span.in_scope(run);
    let elapsed = start.elapsed();
    debug!(stage = stage.as_str(), elapsed_ms = elapsed.as_millis(), "stage finished");
    timings.push(StageTiming { stage, elapsed });
    value
}

/// Label every preview record once an anomaly result exists.
fn tag_records(envelope: &mut DatasetEnvelope, outcome: &AnomalyOutcome) {
    let Some(result) = outcome.result() else {
        return;
    };
    for record in &mut envelope.preview {
        record.status = Some(if result.is_outlier(record.id) {
            RecordStatus::Anomaly
        } else {
            RecordStatus::Valid
        });
    }
}

/// Rename preview fields and the column list through the mapping.
///
/// Columns that land on the same name collapse into the first position.
fn rename_columns(envelope: &mut DatasetEnvelope, standardization: &StandardizationResult) {
    let mapping = &standardization.mapping;
    envelope.preview = envelope
        .preview
        .iter()
        .map(|record| record.renamed(mapping))
        .collect();
    let columns: IndexSet<String> = envelope
        .columns
        .iter()
        .map(|column| standardization.standard_name(column).to_string())
        .collect();
    envelope.columns = columns.into_iter().collect();
}

#[cfg(test)]
mod tests {
    use cosmic_model::Record;

    use super::*;

    fn envelope() -> DatasetEnvelope {
        let mut envelope = DatasetEnvelope::new("stars.csv", FileFormat::Tabular);
        envelope.columns = vec!["RA".into(), "ra_deg".into(), "mag".into()];
        envelope.preview = vec![
            Record::new(0, 1.0, 0.0, 3.0)
                .with_field("RA", Some(1.0))
                .with_field("ra_deg", Some(2.0))
                .with_field("mag", Some(3.0)),
        ];
        envelope
    }

    #[test]
    fn duplicate_targets_collapse() {
        let mut envelope = envelope();
        let standardization = ColumnStandardizer::default().standardize(&envelope.columns);
        rename_columns(&mut envelope, &standardization);
        assert_eq!(envelope.columns, vec!["position_ra", "brightness"]);
        let record = &envelope.preview[0];
        assert_eq!(record.raw_fields.get("position_ra"), Some(&Some(2.0)));
        assert_eq!(record.raw_fields.len(), 2);
    }

    #[test]
    fn insufficient_outcome_leaves_records_untagged() {
        let mut envelope = envelope();
        tag_records(&mut envelope, &AnomalyOutcome::insufficient("too few"));
        assert_eq!(envelope.preview[0].status, None);
    }
}
