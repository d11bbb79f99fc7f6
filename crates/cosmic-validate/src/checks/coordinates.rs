//! Sky-coordinate range validity.

use cosmic_model::QualityCheck;

use super::{Column, Finding};

pub(crate) const RA_RANGE: (f64, f64) = (0.0, 360.0);
pub(crate) const DEC_RANGE: (f64, f64) = (-90.0, 90.0);

/// Penalty per coordinate axis found out of range.
const AXIS_PENALTY: f64 = 50.0;

/// First column whose lowercase name contains any of `fragments`.
fn find<'c, 'a>(columns: &'c [Column<'a>], fragments: &[&str]) -> Option<&'c Column<'a>> {
    columns.iter().find(|(name, _)| {
        let lower = name.to_lowercase();
        fragments.iter().any(|fragment| lower.contains(fragment))
    })
}

fn out_of_range(cells: &[Option<f64>], (lo, hi): (f64, f64)) -> bool {
    cells.iter().flatten().any(|value| *value < lo || *value > hi)
}

pub(crate) fn check(columns: &[Column<'_>]) -> Finding {
    let mut metric = 100.0;
    let mut valid = true;

    if let Some((name, cells)) = find(columns, &["ra", "x"])
        && out_of_range(cells, RA_RANGE)
    {
        tracing::debug!(column = name, "right ascension outside 0..=360");
        metric -= AXIS_PENALTY;
        valid = false;
    }
    if let Some((name, cells)) = find(columns, &["dec", "y"])
        && out_of_range(cells, DEC_RANGE)
    {
        tracing::debug!(column = name, "declination outside -90..=90");
        metric -= AXIS_PENALTY;
        valid = false;
    }

    let check = if valid {
        QualityCheck::pass("Coordinate ranges valid")
    } else {
        QualityCheck::warn("Coordinates out of bounds")
    };
    Finding {
        metric: f64::max(metric, 0.0),
        check,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_axis_costs_half() {
        let ra: &[Option<f64>] = &[Some(10.0), Some(400.0)];
        let dec: &[Option<f64>] = &[Some(-95.0), None];
        let edges: &[Option<f64>] = &[Some(0.0), Some(360.0)];
        assert_eq!(check(&[("RA", ra)]).metric, 50.0);
        assert_eq!(check(&[("RA", ra), ("DEC", dec)]).metric, 0.0);
        assert_eq!(check(&[("ra", edges)]).metric, 100.0);
    }

    #[test]
    fn first_matching_column_decides() {
        let flux: &[Option<f64>] = &[Some(-5.0)];
        let ra: &[Option<f64>] = &[Some(10.0)];
        let finding = check(&[("flux", flux), ("ra", ra)]);
        assert_eq!(finding.check, QualityCheck::warn("Coordinates out of bounds"));
    }
}
