//! Scoring rules.
//!
//! Each rule yields its sub-score together with the check shown to users.

pub(crate) mod completeness;
pub(crate) mod coordinates;
pub(crate) mod outliers;
pub(crate) mod units;

use cosmic_model::QualityCheck;

/// A named column of the preview frame.
pub(crate) type Column<'a> = (&'a str, &'a [Option<f64>]);

/// Sub-score and check produced by one rule.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Finding {
    pub metric: f64,
    pub check: QualityCheck,
}
