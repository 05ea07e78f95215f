//! Flat density clustering (DBSCAN) over a precomputed distance matrix.

use super::{check_distances, euclidean_distances, ClusterLabel, NOISE};
use crate::error::ClusteringError;
use ndarray::Array2;

/// A point's neighborhood is every row within `eps`, itself included when its diagonal
/// entry is; a core point has at least `min_samples` neighbors. Clusters grow from core points in index order, so border points
/// join the first cluster that reaches them.
pub fn dbscan_precomputed(
    distances: &Array2<f64>,
    eps: f64,
    min_samples: usize,
) -> Result<Vec<ClusterLabel>, ClusteringError> {
    let n = check_distances(distances, 2)?;
    let neighborhoods: Vec<Vec<usize>> = (0..n)
        .map(|i| (0..n).filter(|&j| distances[[i, j]] <= eps).collect())
        .collect();
    let is_core: Vec<bool> = neighborhoods.iter().map(|nb| nb.len() >= min_samples).collect();

    let mut labels = vec![NOISE; n];
    let mut next: ClusterLabel = 0;
    let mut stack = Vec::new();
    for start in 0..n {
        if labels[start] != NOISE || !is_core[start] {
            continue;
        }
        stack.push(start);
        while let Some(i) = stack.pop() {
            if labels[i] != NOISE {
                continue;
            }
            labels[i] = next;
            if is_core[i] {
                stack.extend(neighborhoods[i].iter().copied().filter(|&j| labels[j] == NOISE));
            }
        }
        next += 1;
    }
    Ok(labels)
}

/// DBSCAN on rows of `data` under the Euclidean metric.
pub fn dbscan(data: &Array2<f64>, eps: f64, min_samples: usize) -> Result<Vec<ClusterLabel>, ClusteringError> {
    dbscan_precomputed(&euclidean_distances(data), eps, min_samples)
}
