//! Instance clustering for sum-node induction.

use spn_core::config::LearningConfig;

/// Partitions instances (rows of category indices) into `k` groups.
pub trait Clusterer {
    /// `k` lists of row indices. Lists may be empty; every row appears once.
    fn cluster(&self, k: usize, rows: &[Vec<usize>]) -> Vec<Vec<usize>>;
}

/// Lloyd's k-means over category indices with squared Euclidean distance.
///
/// Seeding is deterministic: row 0, then repeatedly the row farthest from
/// every chosen centroid. Distance ties go to the lower centroid index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KMeans {
    pub max_iterations: usize,
}

impl Default for KMeans {
    fn default() -> Self {
        Self::from_config(&LearningConfig::default())
    }
}

impl KMeans {
    pub fn new(max_iterations: usize) -> Self {
        Self { max_iterations }
    }

    pub fn from_config(config: &LearningConfig) -> Self {
        Self::new(config.effective_kmeans_max_iterations())
    }

    fn seed(points: &[Vec<f64>], k: usize) -> Vec<Vec<f64>> {
        let mut centroids = vec![points[0].clone()];
        let mut nearest: Vec<f64> = points.iter().map(|p| distance(p, &points[0])).collect();
        while centroids.len() < k {
            let mut far = (0, f64::NEG_INFINITY);
            for (i, &d) in nearest.iter().enumerate() {
                if d > far.1 {
                    far = (i, d);
                }
            }
            let chosen = points[far.0].clone();
            for (n, p) in nearest.iter_mut().zip(points) {
                *n = n.min(distance(p, &chosen));
            }
            centroids.push(chosen);
        }
        centroids
    }
}

impl Clusterer for KMeans {
    fn cluster(&self, k: usize, rows: &[Vec<usize>]) -> Vec<Vec<usize>> {
        if k == 0 {
            return Vec::new();
        }
        if rows.is_empty() {
            return vec![Vec::new(); k];
        }
        let points: Vec<Vec<f64>> = rows
            .iter()
            .map(|r| r.iter().map(|&v| v as f64).collect())
            .collect();
        let mut centroids = Self::seed(&points, k);
        let mut assignment = vec![usize::MAX; points.len()];

        for _ in 0..self.max_iterations.max(1) {
            let mut changed = false;
            for (i, p) in points.iter().enumerate() {
                let best = closest(p, &centroids);
                if assignment[i] != best {
                    assignment[i] = best;
                    changed = true;
                }
            }
            if !changed {
                break;
            }
            for (c, centroid) in centroids.iter_mut().enumerate() {
                let members: Vec<&Vec<f64>> = points
                    .iter()
                    .zip(&assignment)
                    .filter(|&(_, &a)| a == c)
                    .map(|(p, _)| p)
                    .collect();
                // Empty clusters keep their centroid.
                if members.is_empty() {
                    continue;
                }
                let n = members.len() as f64;
                for (d, value) in centroid.iter_mut().enumerate() {
                    *value = members.iter().map(|m| m[d]).sum::<f64>() / n;
                }
            }
        }

        let mut clusters = vec![Vec::new(); k];
        for (i, &c) in assignment.iter().enumerate() {
            clusters[c].push(i);
        }
        clusters
    }
}

fn distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

fn closest(p: &[f64], centroids: &[Vec<f64>]) -> usize {
    let mut best = (0, f64::INFINITY);
    for (i, c) in centroids.iter().enumerate() {
        let d = distance(p, c);
        if d < best.1 {
            best = (i, d);
        }
    }
    best.0
}
