//! Isolation forest.
//!
//! Each tree recursively splits a random subsample on a random feature at a
//! uniform threshold. Points that are isolated after few splits are
//! anomalous; the score is `2^(-E[h(x)] / c(psi))` for subsample size `psi`.

use rand::Rng;
use rand::rngs::StdRng;
use rand::seq::index;

/// Euler-Mascheroni constant.
const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;

/// Average path length of an unsuccessful binary search tree lookup over
/// `n` points; normalizes path lengths.
pub(crate) fn average_path_length(n: usize) -> f64 {
    match n {
        0 | 1 => 0.0,
        2 => 1.0,
        _ => {
            let n = n as f64;
            2.0 * ((n - 1.0).ln() + EULER_GAMMA) - 2.0 * (n - 1.0) / n
        }
    }
}

#[derive(Debug, Clone)]
enum Node {
    Leaf {
        size: usize,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

#[derive(Debug, Clone)]
struct Tree {
    root: Node,
}

impl Tree {
    fn grow(rows: &[Vec<f64>], sample: Vec<usize>, depth_limit: usize, rng: &mut StdRng) -> Self {
        Self {
            root: grow_node(rows, sample, 0, depth_limit, rng),
        }
    }

    fn path_length(&self, point: &[f64]) -> f64 {
        let mut node = &self.root;
        let mut depth = 0.0;
        loop {
            match node {
                Node::Leaf { size } => return depth + average_path_length(*size),
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if point[*feature] < *threshold {
                        left
                    } else {
                        right
                    };
                    depth += 1.0;
                }
            }
        }
    }
}

fn grow_node(
    rows: &[Vec<f64>],
    members: Vec<usize>,
    depth: usize,
    depth_limit: usize,
    rng: &mut StdRng,
) -> Node {
    if depth >= depth_limit || members.len() <= 1 {
        return Node::Leaf {
            size: members.len(),
        };
    }

    let features = rows[members[0]].len();
    let spans: Vec<(usize, f64, f64)> = (0..features)
        .filter_map(|feature| {
            let (lo, hi) = members.iter().fold(
                (f64::INFINITY, f64::NEG_INFINITY),
                |(lo, hi), &row| (lo.min(rows[row][feature]), hi.max(rows[row][feature])),
            );
            (lo < hi).then_some((feature, lo, hi))
        })
        .collect();
    if spans.is_empty() {
        return Node::Leaf {
            size: members.len(),
        };
    }

    let (feature, lo, hi) = spans[rng.gen_range(0..spans.len())];
    let threshold = rng.gen_range(lo..hi);
    let (left, right): (Vec<usize>, Vec<usize>) = members
        .into_iter()
        .partition(|&row| rows[row][feature] < threshold);
    Node::Split {
        feature,
        threshold,
        left: Box::new(grow_node(rows, left, depth + 1, depth_limit, rng)),
        right: Box::new(grow_node(rows, right, depth + 1, depth_limit, rng)),
    }
}

/// Fitted forest over a fixed set of rows.
#[derive(Debug, Clone)]
pub(crate) struct IsolationForest {
    trees: Vec<Tree>,
    sample_size: usize,
}

impl IsolationForest {
    /// Fit `estimators` trees, each on `min(max_samples, rows)` rows drawn
    /// without replacement.
    pub fn fit(rows: &[Vec<f64>], estimators: usize, max_samples: usize, rng: &mut StdRng) -> Self {
        let sample_size = max_samples.min(rows.len()).max(1);
        let depth_limit = (sample_size as f64).log2().ceil().max(0.0) as usize;
        let trees = (0..estimators)
            .map(|_| {
                let sample = if rows.is_empty() {
                    Vec::new()
                } else {
                    index::sample(&mut *rng, rows.len(), sample_size).into_vec()
                };
                Tree::grow(rows, sample, depth_limit, &mut *rng)
            })
            .collect();
        Self { trees, sample_size }
    }

    /// Anomaly score in `(0, 1]`; higher is more anomalous.
    pub fn score(&self, point: &[f64]) -> f64 {
        if self.trees.is_empty() {
            return 0.5;
        }
        let mean_path = self
            .trees
            .iter()
            .map(|tree| tree.path_length(point))
            .sum::<f64>()
            / self.trees.len() as f64;
        let norm = average_path_length(self.sample_size);
        if norm == 0.0 {
            return 0.5;
        }
        2f64.powf(-mean_path / norm)
    }
}

/// Indices of the `ceil(n * contamination)` highest scores, keeping only
/// those strictly above the best score left unflagged.
pub(crate) fn top_outliers(scores: &[f64], contamination: f64) -> Vec<usize> {
    let n = scores.len();
    let k = ((n as f64) * contamination).ceil() as usize;
    if k == 0 || n == 0 {
        return Vec::new();
    }
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]).then(a.cmp(&b)));
    let k = k.min(n);
    let Some(&boundary) = order.get(k) else {
        return order;
    };
    let cutoff = scores[boundary];
    order[..k]
        .iter()
        .copied()
        .filter(|&index| scores[index] > cutoff)
        .collect()
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn path_length_normalizer() {
        assert_eq!(average_path_length(1), 0.0);
        assert_eq!(average_path_length(2), 1.0);
        assert!((average_path_length(256) - 10.244_770_920_119_917).abs() < 1e-9);
    }

    #[test]
    fn isolated_point_scores_highest() {
        let mut rows: Vec<Vec<f64>> = (0..40).map(|i| vec![f64::from(i % 5), 1.0]).collect();
        rows.push(vec![500.0, 1.0]);
        let mut rng = StdRng::seed_from_u64(42);
        let forest = IsolationForest::fit(&rows, 100, 256, &mut rng);
        let scores: Vec<f64> = rows.iter().map(|row| forest.score(row)).collect();
        assert_eq!(top_outliers(&scores, 0.02), vec![40]);
    }

    #[test]
    fn ties_at_the_boundary_are_not_flagged() {
        assert_eq!(top_outliers(&[0.5, 0.5, 0.5, 0.5], 0.25), Vec::<usize>::new());
        assert_eq!(top_outliers(&[0.4, 0.9, 0.9, 0.3], 0.25), Vec::<usize>::new());
        assert_eq!(top_outliers(&[0.4, 0.9, 0.8, 0.3], 0.5), vec![1, 2]);
        assert_eq!(top_outliers(&[0.4, 0.9], 0.0), Vec::<usize>::new());
    }

    #[test]
    fn constant_rows_grow_single_leaves() {
        let rows = vec![vec![1.0, 2.0]; 12];
        let mut rng = StdRng::seed_from_u64(7);
        let forest = IsolationForest::fit(&rows, 10, 256, &mut rng);
        let first = forest.score(&rows[0]);
        assert!(rows.iter().all(|row| forest.score(row) == first));
    }
}
