//! Gap detection and fill-value prediction.
//!
//! Two regimes:
//!
//! - **sequential**: a complete, non-decreasing time-like column orders the
//!   rows, and gaps are interpolated along that order.
//! - **unordered**: no usable ordering exists, so each gap takes a
//!   distance-weighted mean of its nearest complete neighbours.

use cosmic_model::{
    GapType, ImputationOptions, ImputationPrediction, ImputationReport, PreviewFrame, Record,
};
use indexmap::IndexMap;

use crate::error::{AnalysisError, Result};

/// Lowercase fragments that mark a column as time-like.
pub const TIME_TOKENS: [&str; 4] = ["time", "date", "mjd", "jd"];

/// Confidence attached to interpolated values.
pub const SEQUENTIAL_CONFIDENCE: f64 = 85.0;

/// Confidence attached to neighbour estimates.
pub const UNORDERED_CONFIDENCE: f64 = 70.0;

pub fn is_time_like(name: &str) -> bool {
    let lower = name.to_lowercase();
    TIME_TOKENS.iter().any(|token| lower.contains(token))
}

/// Detects gaps in preview records and predicts their values.
#[derive(Debug, Clone, PartialEq)]
pub struct GapImputationEngine {
    neighbors: usize,
}

/// Data columns of a frame, `id` excluded.
struct Columns<'a> {
    names: Vec<&'a str>,
    cells: Vec<&'a [Option<f64>]>,
}

impl GapImputationEngine {
    pub fn new(options: &ImputationOptions) -> Result<Self> {
        if options.neighbors == 0 {
            return Err(AnalysisError::invalid("neighbors", 0, "must be positive"));
        }
        Ok(Self {
            neighbors: options.neighbors,
        })
    }

    pub fn neighbors(&self) -> usize {
        self.neighbors
    }

    pub fn impute(&self, records: &[Record]) -> ImputationReport {
        let frame = PreviewFrame::from_records(records);
        let (names, cells): (Vec<&str>, Vec<&[Option<f64>]>) = frame.data_columns().unzip();
        let columns = Columns { names, cells };

        let missing_stats: IndexMap<String, usize> = columns
            .names
            .iter()
            .zip(&columns.cells)
            .filter_map(|(name, cells)| {
                let missing = cells.iter().filter(|cell| cell.is_none()).count();
                (missing > 0).then(|| (name.to_string(), missing))
            })
            .collect();
        if missing_stats.is_empty() {
            return ImputationReport::complete();
        }

        let order = sequential_order(&columns);
        let (gap_type, predictions) = match order {
            Some((time_column, order)) => {
                tracing::debug!(time_column, "gaps follow a time-like ordering");
                (
                    GapType::Sequential,
                    interpolate(&columns, frame.ids(), &order),
                )
            }
            None => (
                GapType::Unordered,
                self.nearest_neighbours(&columns, frame.ids()),
            ),
        };

        tracing::info!(
            gap_type = ?gap_type,
            missing = missing_stats.values().sum::<usize>(),
            predictions = predictions.len(),
            "gap imputation finished"
        );
        ImputationReport {
            has_missing: true,
            gap_type,
            missing_stats,
            predictions,
        }
    }

    fn nearest_neighbours(&self, columns: &Columns<'_>, ids: &[u64]) -> Vec<ImputationPrediction> {
        let width = columns.names.len();
        let rows = ids.len();
        let mut predictions = Vec::new();

        for (target, cells) in columns.cells.iter().enumerate() {
            let donors: Vec<usize> = (0..rows).filter(|&row| cells[row].is_some()).collect();
            let donor_mean = if donors.is_empty() {
                0.0
            } else {
                donors.iter().filter_map(|&row| cells[row]).sum::<f64>() / donors.len() as f64
            };

            for row in (0..rows).filter(|&row| cells[row].is_none()) {
                let mut near: Vec<(f64, f64)> = donors
                    .iter()
                    .filter_map(|&donor| {
                        let distance = distance(columns, width, target, row, donor)?;
                        Some((distance, cells[donor]?))
                    })
                    .collect();
                near.sort_by(|a, b| a.0.total_cmp(&b.0));
                near.truncate(self.neighbors);

                predictions.push(ImputationPrediction {
                    id: ids[row],
                    column: columns.names[target].to_string(),
                    predicted_value: weighted_mean(&near).unwrap_or(donor_mean),
                    confidence: UNORDERED_CONFIDENCE,
                });
            }
        }
        predictions
    }
}

/// First complete, non-decreasing time-like column, with the stable row order
/// it implies.
fn sequential_order<'a>(columns: &Columns<'a>) -> Option<(&'a str, Vec<usize>)> {
    columns
        .names
        .iter()
        .zip(&columns.cells)
        .find_map(|(name, cells)| {
            if !is_time_like(name) {
                return None;
            }
            let values: Vec<f64> = cells.iter().copied().collect::<Option<_>>()?;
            if values.windows(2).any(|pair| pair[1] < pair[0]) {
                return None;
            }
            let mut order: Vec<usize> = (0..values.len()).collect();
            order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));
            Some((*name, order))
        })
}

fn interpolate(columns: &Columns<'_>, ids: &[u64], order: &[usize]) -> Vec<ImputationPrediction> {
    let mut predictions = Vec::new();
    for (name, cells) in columns.names.iter().zip(&columns.cells) {
        let sorted: Vec<Option<f64>> = order.iter().map(|&row| cells[row]).collect();
        let known: Vec<usize> = (0..sorted.len()).filter(|&i| sorted[i].is_some()).collect();

        for (position, cell) in sorted.iter().enumerate() {
            if cell.is_some() {
                continue;
            }
            let before = known.iter().rev().find(|&&k| k < position).copied();
            let after = known.iter().find(|&&k| k > position).copied();
            let value = match (before, after) {
                (Some(lo), Some(hi)) => {
                    let (a, b) = (sorted[lo].unwrap_or(0.0), sorted[hi].unwrap_or(0.0));
                    let t = (position - lo) as f64 / (hi - lo) as f64;
                    a + (b - a) * t
                }
                // Interpolation only runs forward: trailing gaps hold the last
                // known value, leading gaps have nothing to carry and fall to 0.
                (Some(last), None) => sorted[last].unwrap_or(0.0),
                (None, _) => 0.0,
            };
            predictions.push(ImputationPrediction {
                id: ids[order[position]],
                column: name.to_string(),
                predicted_value: value,
                confidence: SEQUENTIAL_CONFIDENCE,
            });
        }
    }
    predictions
}

/// Euclidean distance over features observed in both rows, scaled up for the
/// features that could not be compared. `None` when nothing is shared.
fn distance(
    columns: &Columns<'_>,
    width: usize,
    target: usize,
    row: usize,
    donor: usize,
) -> Option<f64> {
    let mut sum = 0.0;
    let mut shared = 0usize;
    for (feature, cells) in columns.cells.iter().enumerate() {
        if feature == target {
            continue;
        }
        if let (Some(a), Some(b)) = (cells[row], cells[donor]) {
            sum += (a - b).powi(2);
            shared += 1;
        }
    }
    if shared == 0 {
        return None;
    }
    Some((sum * width as f64 / shared as f64).sqrt())
}

/// Inverse-distance weighted mean; exact matches take precedence.
fn weighted_mean(near: &[(f64, f64)]) -> Option<f64> {
    if near.is_empty() {
        return None;
    }
    let exact: Vec<f64> = near
        .iter()
        .filter(|(distance, _)| *distance == 0.0)
        .map(|(_, value)| *value)
        .collect();
    if !exact.is_empty() {
        return Some(exact.iter().sum::<f64>() / exact.len() as f64);
    }
    let (weighted, weights) = near
        .iter()
        .fold((0.0, 0.0), |(sum, total), (distance, value)| {
            (sum + value / distance, total + 1.0 / distance)
        });
    Some(weighted / weights)
}
