//! Plain-language findings derived from an analysis run.

/// Correlation magnitude above which a brightness trend is reported.
pub const TREND_THRESHOLD: f64 = 0.5;

/// Skewness magnitude above which the brightness distribution is reported.
pub const SKEW_THRESHOLD: f64 = 1.0;

/// Inputs for insight generation.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Findings<'a> {
    pub clusters: usize,
    /// `value` of each flagged outlier.
    pub outlier_values: &'a [f64],
    /// Mean `value` over the modeled rows.
    pub mean_value: f64,
    /// `(value, x)` pairs with both finite.
    pub value_x: &'a [(f64, f64)],
    /// Finite `value`s.
    pub values: &'a [f64],
}

pub(crate) fn insights(findings: &Findings<'_>) -> Vec<String> {
    let mut out = Vec::new();
    if findings.clusters > 0 {
        out.push(format!(
            "Detected {} distinct spatial clusters of objects.",
            findings.clusters
        ));
    }

    let bright = findings
        .outlier_values
        .iter()
        .filter(|&&value| value > findings.mean_value)
        .count();
    if bright > 0 {
        out.push(format!(
            "Identified {bright} object(s) with unusually high brightness (potential supernovae or variable stars)."
        ));
    }

    if let Some(r) = pearson(findings.value_x)
        && r.abs() > TREND_THRESHOLD
    {
        let direction = if r > 0.0 { "increases" } else { "decreases" };
        out.push(format!(
            "Strong trend detected: Brightness {direction} significantly along the RA axis."
        ));
    }

    if skewness(findings.values).abs() > SKEW_THRESHOLD {
        out.push(
            "The data is highly skewed, indicating a mix of many faint objects and a few extremely bright sources."
                .to_string(),
        );
    }
    out
}

/// Pearson correlation; `None` when undefined (fewer than two pairs or a
/// constant side).
pub(crate) fn pearson(pairs: &[(f64, f64)]) -> Option<f64> {
    if pairs.len() < 2 {
        return None;
    }
    let n = pairs.len() as f64;
    let mean_a = pairs.iter().map(|(a, _)| a).sum::<f64>() / n;
    let mean_b = pairs.iter().map(|(_, b)| b).sum::<f64>() / n;
    let (mut cov, mut var_a, mut var_b) = (0.0, 0.0, 0.0);
    for (a, b) in pairs {
        let (da, db) = (a - mean_a, b - mean_b);
        cov += da * db;
        var_a += da * da;
        var_b += db * db;
    }
    if var_a == 0.0 || var_b == 0.0 {
        return None;
    }
    Some(cov / (var_a * var_b).sqrt())
}

/// Adjusted Fisher-Pearson skewness; zero for fewer than three values or no
/// spread.
pub(crate) fn skewness(values: &[f64]) -> f64 {
    if values.len() < 3 {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let m2 = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    let m3 = values.iter().map(|v| (v - mean).powi(3)).sum::<f64>() / n;
    if m2 == 0.0 {
        return 0.0;
    }
    (n * (n - 1.0)).sqrt() / (n - 2.0) * m3 / m2.powf(1.5)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn correlation_sign_and_degenerate_cases() {
        let rising = [(1.0, 1.0), (2.0, 2.0), (3.0, 3.5)];
        assert!(pearson(&rising).unwrap() > 0.9);
        assert_eq!(pearson(&[(1.0, 2.0)]), None);
        assert_eq!(pearson(&[(1.0, 2.0), (1.0, 3.0)]), None);
    }

    #[test]
    fn skewness_matches_adjusted_estimator() {
        assert_eq!(skewness(&[1.0, 1.0, 1.0]), 0.0);
        assert_eq!(skewness(&[1.0, 2.0]), 0.0);
        let skew = skewness(&[1.0, 2.0, 3.0, 10.0]);
        assert!((skew - 1.763_632_614_803_888).abs() < 1e-9, "{skew}");
    }

    #[test]
    fn insights_in_fixed_order() {
        let values = [1.0, 1.0, 1.0, 1.0, 50.0];
        let pairs: Vec<(f64, f64)> = values
            .iter()
            .enumerate()
            .map(|(i, v)| (*v, i as f64))
            .collect();
        let lines = insights(&Findings {
            clusters: 2,
            outlier_values: &[50.0],
            mean_value: 10.8,
            value_x: &pairs,
            values: &values,
        });
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "Detected 2 distinct spatial clusters of objects.");
        assert!(lines[1].starts_with("Identified 1 object(s)"));
        assert!(lines[2].contains("increases"));
        assert!(lines[3].starts_with("The data is highly skewed"));
    }
}
