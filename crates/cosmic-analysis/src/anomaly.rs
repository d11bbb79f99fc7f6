//! Outlier detection and spatial clustering over preview records.

use std::collections::BTreeSet;

use cosmic_model::{AnomalyOptions, AnomalyOutcome, AnomalyResult, INSUFFICIENT_DATA, Record};
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::dbscan::{NOISE, dbscan, standardize};
use crate::error::{AnalysisError, Result};
use crate::forest::{IsolationForest, top_outliers};
use crate::insights::{Findings, insights};

/// Flags unusual records and groups them spatially.
#[derive(Debug, Clone, PartialEq)]
pub struct AnomalyClusterEngine {
    options: AnomalyOptions,
}

impl AnomalyClusterEngine {
    /// Build an engine, rejecting options no model can run with.
    pub fn new(options: &AnomalyOptions) -> Result<Self> {
        if !(0.0..=0.5).contains(&options.contamination) {
            return Err(AnalysisError::invalid(
                "contamination",
                options.contamination,
                "must be within 0.0..=0.5",
            ));
        }
        if options.estimators == 0 {
            return Err(AnalysisError::invalid("estimators", 0, "must be positive"));
        }
        if options.max_samples == 0 {
            return Err(AnalysisError::invalid("max_samples", 0, "must be positive"));
        }
        if !(options.eps.is_finite() && options.eps > 0.0) {
            return Err(AnalysisError::invalid(
                "eps",
                options.eps,
                "must be a positive number",
            ));
        }
        if options.min_samples == 0 {
            return Err(AnalysisError::invalid("min_samples", 0, "must be positive"));
        }
        Ok(Self {
            options: options.clone(),
        })
    }

    pub fn options(&self) -> &AnomalyOptions {
        &self.options
    }

    /// Analyze `records`; ids in the result refer to `Record::id`.
    pub fn analyze(&self, records: &[Record]) -> AnomalyOutcome {
        let spatial = records
            .iter()
            .any(|record| record.x.is_finite() && record.y.is_finite());
        let usable: Vec<&Record> = records
            .iter()
            .filter(|record| {
                record.value.is_finite()
                    && (!spatial || (record.x.is_finite() && record.y.is_finite()))
            })
            .collect();

        let min_records = self.options.min_records.max(1);
        if usable.len() < min_records {
            tracing::debug!(
                records = records.len(),
                usable = usable.len(),
                min_records,
                "too few usable records for anomaly detection"
            );
            return AnomalyOutcome::insufficient(INSUFFICIENT_DATA);
        }

        let features: Vec<Vec<f64>> = usable
            .iter()
            .map(|record| {
                if spatial {
                    vec![record.value, record.x, record.y]
                } else {
                    vec![record.value]
                }
            })
            .collect();
        let mut rng = StdRng::seed_from_u64(self.options.seed);
        let forest = IsolationForest::fit(
            &features,
            self.options.estimators,
            self.options.max_samples,
            &mut rng,
        );
        let scores: Vec<f64> = features.iter().map(|row| forest.score(row)).collect();
        let flagged = top_outliers(&scores, self.options.contamination);
        let outlier_ids: BTreeSet<u64> = flagged.iter().map(|&index| usable[index].id).collect();

        let cluster_labels = if spatial {
            self.cluster(records)
        } else {
            vec![NOISE; records.len()]
        };

        let values: Vec<f64> = usable.iter().map(|record| record.value).collect();
        let mean_value = values.iter().sum::<f64>() / values.len() as f64;
        let outlier_values: Vec<f64> = flagged.iter().map(|&index| usable[index].value).collect();
        let value_x: Vec<(f64, f64)> = records
            .iter()
            .filter(|record| record.value.is_finite() && record.x.is_finite())
            .map(|record| (record.value, record.x))
            .collect();
        let mut result = AnomalyResult {
            outlier_ids,
            cluster_labels,
            insights: Vec::new(),
        };
        result.insights = insights(&Findings {
            clusters: result.cluster_count(),
            outlier_values: &outlier_values,
            mean_value,
            value_x: &value_x,
            values: &values,
        });

        tracing::info!(
            usable = usable.len(),
            spatial,
            outliers = result.outlier_ids.len(),
            clusters = result.cluster_count(),
            "anomaly detection finished"
        );
        AnomalyOutcome::Analyzed(result)
    }

    /// Labels parallel to `records`; rows without finite coordinates are noise.
    fn cluster(&self, records: &[Record]) -> Vec<i32> {
        let positioned: Vec<usize> = (0..records.len())
            .filter(|&i| records[i].x.is_finite() && records[i].y.is_finite())
            .collect();
        let points: Vec<[f64; 2]> = positioned
            .iter()
            .map(|&i| [records[i].x, records[i].y])
            .collect();
        let labels = dbscan(
            &standardize(&points),
            self.options.eps,
            self.options.min_samples,
        );

        let mut out = vec![NOISE; records.len()];
        for (index, label) in positioned.into_iter().zip(labels) {
            out[index] = label;
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> AnomalyClusterEngine {
        AnomalyClusterEngine::new(&AnomalyOptions::default()).unwrap()
    }

    #[test]
    fn rejects_out_of_range_options() {
        let options = AnomalyOptions {
            contamination: 0.7,
            ..AnomalyOptions::default()
        };
        assert!(AnomalyClusterEngine::new(&options).is_err());
        let options = AnomalyOptions {
            eps: f64::NAN,
            ..AnomalyOptions::default()
        };
        assert!(AnomalyClusterEngine::new(&options).is_err());
    }

    #[test]
    fn too_few_usable_records() {
        let mut records: Vec<Record> = (0..12)
            .map(|i| Record::new(i, i as f64, 1.0, 2.0))
            .collect();
        for record in records.iter_mut().skip(5) {
            record.value = f64::NAN;
        }
        let outcome = engine().analyze(&records);
        assert!(outcome.is_insufficient());
        assert!(engine().analyze(&[]).is_insufficient());
    }

    #[test]
    fn constant_values_have_no_outliers() {
        let records: Vec<Record> = (0..20)
            .map(|i| Record::new(i, f64::NAN, f64::NAN, 3.0))
            .collect();
        let result = engine().analyze(&records);
        let result = result.result().unwrap();
        assert!(result.outlier_ids.is_empty());
        assert_eq!(result.cluster_labels, vec![NOISE; 20]);
        assert!(result.insights.is_empty());
    }

    #[test]
    fn same_seed_same_result() {
        let records: Vec<Record> = (0..60)
            .map(|i| {
                let t = i as f64;
                Record::new(i, (t * 7.3) % 100.0, (t * 3.1) % 50.0, (t * 1.7).sin() * 5.0 + 10.0)
            })
            .collect();
        assert_eq!(engine().analyze(&records), engine().analyze(&records));
    }
}
