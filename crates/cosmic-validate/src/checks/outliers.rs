//! Stability: penalizes outlier density.

use cosmic_model::QualityCheck;

use super::Finding;

/// Stability lost per unit of outlier density.
const DENSITY_PENALTY: f64 = 500.0;

pub(crate) fn check(outliers: usize, rows: usize) -> Finding {
    if outliers == 0 || rows == 0 {
        return Finding {
            metric: 100.0,
            check: QualityCheck::pass("No significant outliers"),
        };
    }
    let density = outliers as f64 / rows as f64;
    Finding {
        metric: f64::max(100.0 - density * DENSITY_PENALTY, 0.0),
        check: QualityCheck::warn(format!("{outliers} potential outliers detected")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn density_penalty() {
        assert_eq!(check(1, 100).metric, 95.0);
        assert_eq!(check(30, 100).metric, 0.0);
        assert_eq!(check(0, 100).check, QualityCheck::pass("No significant outliers"));
    }
}
