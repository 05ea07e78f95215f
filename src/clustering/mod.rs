//! Density clustering over the author feature table: input preparation, a battery of
//! HDBSCAN/DBSCAN runs, and consensus re-clustering.

pub mod dbscan;
pub mod ensemble;
pub mod hdbscan;
pub mod prepare;

pub use ensemble::{BatteryRun, ClusteringMethod, EnsembleClusteringEngine, EnsembleOutcome, RunFailure};
pub use prepare::FeaturePreparer;

use crate::error::ClusteringError;
use ndarray::{Array2, ArrayView1};
use std::collections::BTreeMap;

/// Cluster id; [`NOISE`] marks unassigned points.
pub type ClusterLabel = i64;
pub const NOISE: ClusterLabel = -1;

/// Dense Euclidean distance matrix between rows. O(n²) memory.
pub fn euclidean_distances(data: &Array2<f64>) -> Array2<f64> {
    let n = data.nrows();
    let mut d = Array2::<f64>::zeros((n, n));
    for i in 0..n {
        for j in (i + 1)..n {
            let v = euclidean(data.row(i), data.row(j));
            d[[i, j]] = v;
            d[[j, i]] = v;
        }
    }
    d
}

fn euclidean(a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f64>()
        .sqrt()
}

/// Square, finite, and at least `min_samples` rows.
pub(crate) fn check_distances(d: &Array2<f64>, min_samples: usize) -> Result<usize, ClusteringError> {
    let (rows, cols) = d.dim();
    if rows != cols {
        return Err(ClusteringError::NotSquare { rows, cols });
    }
    if rows < min_samples {
        return Err(ClusteringError::InsufficientSamples {
            required: min_samples,
            actual: rows,
        });
    }
    if d.iter().any(|v| !v.is_finite()) {
        return Err(ClusteringError::NonFiniteDistances);
    }
    Ok(rows)
}

/// Distinct non-noise labels.
pub fn cluster_count(labels: &[ClusterLabel]) -> usize {
    let mut seen: Vec<ClusterLabel> = labels.iter().copied().filter(|&l| l != NOISE).collect();
    seen.sort_unstable();
    seen.dedup();
    seen.len()
}

/// Clusters with fewer than `min_size` members become noise; the rest are renumbered
/// from 0 in order of first appearance.
pub fn discard_small_clusters(labels: &[ClusterLabel], min_size: usize) -> Vec<ClusterLabel> {
    let mut sizes: BTreeMap<ClusterLabel, usize> = BTreeMap::new();
    for &l in labels.iter().filter(|&&l| l != NOISE) {
        *sizes.entry(l).or_default() += 1;
    }
    let mut renumbered: BTreeMap<ClusterLabel, ClusterLabel> = BTreeMap::new();
    labels
        .iter()
        .map(|l| {
            if sizes.get(l).map_or(true, |&size| size < min_size) {
                return NOISE;
            }
            let next = renumbered.len() as ClusterLabel;
            *renumbered.entry(*l).or_insert(next)
        })
        .collect()
}

pub fn noise_count(labels: &[ClusterLabel]) -> usize {
    labels.iter().filter(|&&l| l == NOISE).count()
}
