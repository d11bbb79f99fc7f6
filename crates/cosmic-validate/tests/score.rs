use std::collections::BTreeSet;

use cosmic_model::{AnomalyOutcome, AnomalyResult, INSUFFICIENT_DATA, Record};
use cosmic_validate::QualityScorer;
use indexmap::IndexMap;
use proptest::prelude::*;

fn catalog() -> Vec<Record> {
    (0..10u64)
        .map(|i| {
            let ra = if i == 4 { 400.0 } else { 10.0 * i as f64 };
            let flux = (i != 7).then_some(1.0 + i as f64);
            Record::new(i, ra, -10.0, flux.unwrap_or(0.0))
                .with_field("ra", Some(ra))
                .with_field("dec", Some(-10.0))
                .with_field("flux", flux)
        })
        .collect()
}

fn one_outlier() -> AnomalyOutcome {
    AnomalyOutcome::Analyzed(AnomalyResult {
        outlier_ids: BTreeSet::from([4]),
        cluster_labels: vec![0; 10],
        insights: Vec::new(),
    })
}

#[test]
fn catalog_checks() {
    let metadata = IndexMap::from([("BUNIT".to_string(), "Jy".to_string())]);
    let report = QualityScorer::new().score(&catalog(), &metadata, Some(&one_outlier()));

    // 0.3 * 59/60 * 100 + 0.3 * 50 + 0.2 * 100 + 0.2 * 50
    assert_eq!(report.score, 74);
    assert_eq!(report.metrics.validity, 50.0);
    assert_eq!(report.metrics.consistency, 100.0);
    assert_eq!(report.metrics.stability, 50.0);
    insta::assert_json_snapshot!(report.checks, @r#"
    [
      {
        "label": "1 missing values detected",
        "status": "fail"
      },
      {
        "label": "Coordinates out of bounds",
        "status": "warn"
      },
      {
        "label": "All units consistent",
        "status": "pass"
      },
      {
        "label": "1 potential outliers detected",
        "status": "warn"
      }
    ]
    "#);
}

#[test]
fn insufficient_anomaly_result_counts_as_stable() {
    let insufficient = AnomalyOutcome::insufficient(INSUFFICIENT_DATA);
    let report = QualityScorer::new().score(&catalog(), &IndexMap::new(), Some(&insufficient));
    assert_eq!(report.metrics.stability, 100.0);
    assert_eq!(report.checks[3].label, "No significant outliers");
}

#[test]
fn empty_preview() {
    let report = QualityScorer::new().score(&[], &IndexMap::new(), None);
    assert_eq!(report.score, 0);
    assert_eq!(report.checks.len(), 1);
    assert_eq!(report.checks[0].label, "Empty dataset");
}

proptest! {
    #[test]
    fn score_stays_in_range(
        cells in prop::collection::vec(
            (prop::option::of(-500.0f64..500.0), prop::option::of(-500.0f64..500.0)),
            0..30,
        ),
        outliers in 0usize..40,
        unit in any::<bool>(),
    ) {
        let records: Vec<Record> = cells
            .iter()
            .enumerate()
            .map(|(i, (ra, mag))| {
                Record::new(i as u64, ra.unwrap_or(f64::NAN), f64::NAN, mag.unwrap_or(f64::NAN))
                    .with_field("ra", *ra)
                    .with_field("mag", *mag)
            })
            .collect();
        let outcome = AnomalyOutcome::Analyzed(AnomalyResult {
            outlier_ids: (0..outliers as u64).collect(),
            ..AnomalyResult::default()
        });
        let mut metadata = IndexMap::new();
        if unit {
            metadata.insert("flux_unit".to_string(), "mag".to_string());
        }

        let report = QualityScorer::new().score(&records, &metadata, Some(&outcome));
        prop_assert!(report.score <= 100);
        for metric in [
            report.metrics.completeness,
            report.metrics.validity,
            report.metrics.consistency,
            report.metrics.stability,
        ] {
            prop_assert!((0.0..=100.0).contains(&metric));
        }
    }
}
