//! Analysis engines for preview records.
//!
//! - [`AnomalyClusterEngine`] flags unusual records with an isolation forest,
//!   groups positioned records with DBSCAN and summarizes both as insights.
//! - [`GapImputationEngine`] finds missing cells and predicts fill values,
//!   either by interpolating along a time-like column or from nearest
//!   neighbours.
//!
//! Both engines validate their options on construction and never fail once
//! built; degenerate input yields an insufficient-data outcome or an empty
//! report instead of an error.
//!
//! ```
//! use cosmic_analysis::GapImputationEngine;
//! use cosmic_model::{GapType, ImputationOptions, Record};
//!
//! let records: Vec<Record> = [Some(1.0), None, Some(3.0)]
//!     .into_iter()
//!     .enumerate()
//!     .map(|(i, flux)| {
//!         Record::new(i as u64, 0.0, 0.0, 1.0)
//!             .with_field("mjd", Some(50_000.0 + i as f64))
//!             .with_field("flux", flux)
//!     })
//!     .collect();
//! let engine = GapImputationEngine::new(&ImputationOptions::default()).unwrap();
//! let report = engine.impute(&records);
//! assert_eq!(report.gap_type, GapType::Sequential);
//! assert_eq!(report.predictions[0].predicted_value, 2.0);
//! ```

pub mod anomaly;
pub mod dbscan;
pub mod error;
mod forest;
pub mod imputation;
mod insights;

pub use anomaly::AnomalyClusterEngine;
pub use dbscan::NOISE;
pub use error::{AnalysisError, Result};
pub use imputation::{GapImputationEngine, SEQUENTIAL_CONFIDENCE, UNORDERED_CONFIDENCE, is_time_like};
pub use insights::{SKEW_THRESHOLD, TREND_THRESHOLD};
