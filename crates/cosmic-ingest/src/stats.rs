//! Descriptive statistics over numeric samples.
//!
//! Non-finite values are ignored everywhere; a sample with no finite value has
//! no summary.

use cosmic_model::ColumnSummary;

/// Basic moments of the finite values in a sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Moments {
    pub count: usize,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    /// Sum of squared deviations from the mean.
    sum_sq: f64,
}

impl Moments {
    pub fn of(values: impl IntoIterator<Item = f64>) -> Option<Self> {
        let finite: Vec<f64> = values.into_iter().filter(|v| v.is_finite()).collect();
        if finite.is_empty() {
            return None;
        }
        let count = finite.len();
        let mean = finite.iter().sum::<f64>() / count as f64;
        let (min, max) = finite
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });
        let sum_sq = finite.iter().map(|v| (v - mean).powi(2)).sum();
        Some(Self {
            count,
            mean,
            min,
            max,
            sum_sq,
        })
    }

    /// Standard deviation with `n` in the denominator.
    pub fn population_std(&self) -> f64 {
        (self.sum_sq / self.count as f64).sqrt()
    }

    /// Standard deviation with `n - 1` in the denominator; NaN for one value.
    pub fn sample_std(&self) -> f64 {
        if self.count < 2 {
            return f64::NAN;
        }
        (self.sum_sq / (self.count - 1) as f64).sqrt()
    }
}

/// Linear-interpolated quantile of an ascending slice.
pub(crate) fn quantile(sorted: &[f64], q: f64) -> f64 {
    match sorted.len() {
        0 => f64::NAN,
        1 => sorted[0],
        n => {
            let pos = q.clamp(0.0, 1.0) * (n - 1) as f64;
            let lower = pos.floor() as usize;
            let upper = pos.ceil() as usize;
            sorted[lower] + (sorted[upper] - sorted[lower]) * (pos - lower as f64)
        }
    }
}

fn sorted_finite(values: &[f64]) -> Vec<f64> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    sorted.sort_by(f64::total_cmp);
    sorted
}

/// Column summary with sample standard deviation and all three quartiles.
pub(crate) fn describe(values: &[f64]) -> Option<ColumnSummary> {
    let moments = Moments::of(values.iter().copied())?;
    let sorted = sorted_finite(values);
    Some(ColumnSummary {
        count: moments.count,
        mean: moments.mean,
        std: moments.sample_std(),
        min: moments.min,
        p25: Some(quantile(&sorted, 0.25)),
        p50: quantile(&sorted, 0.5),
        p75: Some(quantile(&sorted, 0.75)),
        max: moments.max,
    })
}

/// Pixel summary: population standard deviation and the median only.
pub(crate) fn describe_grid(values: &[f64]) -> Option<ColumnSummary> {
    let moments = Moments::of(values.iter().copied())?;
    let sorted = sorted_finite(values);
    Some(ColumnSummary {
        count: moments.count,
        mean: moments.mean,
        std: moments.population_std(),
        min: moments.min,
        p25: None,
        p50: quantile(&sorted, 0.5),
        p75: None,
        max: moments.max,
    })
}

/// Mean of the per-column means.
pub(crate) fn mean_of_means<'a>(summaries: impl IntoIterator<Item = &'a ColumnSummary>) -> Option<f64> {
    let means: Vec<f64> = summaries.into_iter().map(|summary| summary.mean).collect();
    if means.is_empty() {
        None
    } else {
        Some(means.iter().sum::<f64>() / means.len() as f64)
    }
}
