//! Density-based spatial clustering (DBSCAN) on standardized coordinates.

use std::collections::VecDeque;

/// Label for points that belong to no cluster.
pub const NOISE: i32 = -1;

/// Scale each axis to zero mean and unit population variance.
///
/// An axis with zero spread is only centered.
pub(crate) fn standardize(points: &[[f64; 2]]) -> Vec<[f64; 2]> {
    if points.is_empty() {
        return Vec::new();
    }
    let n = points.len() as f64;
    let mut center = [0.0; 2];
    let mut scale = [1.0; 2];
    for axis in 0..2 {
        let mean = points.iter().map(|p| p[axis]).sum::<f64>() / n;
        let var = points.iter().map(|p| (p[axis] - mean).powi(2)).sum::<f64>() / n;
        center[axis] = mean;
        if var > 0.0 {
            scale[axis] = var.sqrt();
        }
    }
    points
        .iter()
        .map(|p| {
            [
                (p[0] - center[0]) / scale[0],
                (p[1] - center[1]) / scale[1],
            ]
        })
        .collect()
}

/// Cluster labels in discovery order; neighborhoods include the point itself.
pub(crate) fn dbscan(points: &[[f64; 2]], eps: f64, min_samples: usize) -> Vec<i32> {
    let eps_sq = eps * eps;
    let neighbors = |index: usize| -> Vec<usize> {
        let p = points[index];
        points
            .iter()
            .enumerate()
            .filter(|(_, q)| (p[0] - q[0]).powi(2) + (p[1] - q[1]).powi(2) <= eps_sq)
            .map(|(j, _)| j)
            .collect()
    };

    let mut labels: Vec<Option<i32>> = vec![None; points.len()];
    let mut next_label = 0;
    for start in 0..points.len() {
        if labels[start].is_some() {
            continue;
        }
        let around = neighbors(start);
        if around.len() < min_samples {
            labels[start] = Some(NOISE);
            continue;
        }

        let label = next_label;
        next_label += 1;
        labels[start] = Some(label);
        let mut queue: VecDeque<usize> = around.into();
        while let Some(point) = queue.pop_front() {
            match labels[point] {
                Some(NOISE) => labels[point] = Some(label),
                Some(_) => continue,
                None => {
                    labels[point] = Some(label);
                    let reach = neighbors(point);
                    if reach.len() >= min_samples {
                        queue.extend(reach);
                    }
                }
            }
        }
    }
    labels.into_iter().map(|label| label.unwrap_or(NOISE)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_blobs_and_noise() {
        let mut points = Vec::new();
        for i in 0..6 {
            points.push([0.0 + f64::from(i) * 0.01, 0.0]);
        }
        for i in 0..6 {
            points.push([10.0 + f64::from(i) * 0.01, 10.0]);
        }
        points.push([5.0, -20.0]);
        let labels = dbscan(&standardize(&points), 0.3, 5);
        assert!(labels[..6].iter().all(|&label| label == 0));
        assert!(labels[6..12].iter().all(|&label| label == 1));
        assert_eq!(labels[12], NOISE);
    }

    #[test]
    fn sparse_points_are_noise() {
        let points: Vec<[f64; 2]> = (0..8).map(|i| [f64::from(i) * 10.0, 0.0]).collect();
        let labels = dbscan(&standardize(&points), 0.3, 5);
        assert!(labels.iter().all(|&label| label == NOISE));
    }

    #[test]
    fn standardize_handles_constant_axis() {
        let scaled = standardize(&[[1.0, 4.0], [3.0, 4.0]]);
        assert_eq!(scaled, vec![[-1.0, 0.0], [1.0, 0.0]]);
    }
}
