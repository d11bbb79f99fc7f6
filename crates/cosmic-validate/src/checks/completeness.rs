//! Share of observed cells.

use cosmic_model::QualityCheck;

use super::{Column, Finding};

pub(crate) fn check(columns: &[Column<'_>]) -> Finding {
    let total: usize = columns.iter().map(|(_, cells)| cells.len()).sum();
    let missing: usize = columns
        .iter()
        .map(|(_, cells)| cells.iter().filter(|cell| cell.is_none()).count())
        .sum();

    let metric = if total == 0 {
        0.0
    } else {
        100.0 * (total - missing) as f64 / total as f64
    };
    let check = if missing == 0 {
        QualityCheck::pass("No missing values")
    } else {
        QualityCheck::fail(format!("{missing} missing values detected"))
    };
    Finding { metric, check }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_missing_cells() {
        let flux: &[Option<f64>] = &[Some(1.0), None, Some(3.0), None];
        let dec: &[Option<f64>] = &[Some(1.0), Some(2.0), Some(3.0), Some(4.0)];
        let finding = check(&[("flux", flux), ("dec", dec)]);
        assert_eq!(finding.metric, 75.0);
        assert_eq!(finding.check, QualityCheck::fail("2 missing values detected"));
    }
}
