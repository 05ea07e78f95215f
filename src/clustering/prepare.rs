//! Clustering input: sanitize → standardize → optional PCA.

use crate::config::ClusteringConfig;
use crate::features::{clustering_columns, FeatureTable};
use ndarray::{Array2, Axis};
use tracing::{debug, info};

const JACOBI_MAX_SWEEPS: usize = 100;
const JACOBI_TOLERANCE: f64 = 1e-12;

/// Spread, relative to a column's magnitude, below which the column is near-constant.
pub const MIN_RELATIVE_SPREAD: f64 = 0.05;

/// NaN → 0, +∞ → 1, −∞ → 0.
pub fn sanitize(m: &mut Array2<f64>) {
    m.mapv_inplace(|v| {
        if v.is_nan() {
            0.0
        } else if v == f64::INFINITY {
            1.0
        } else if v == f64::NEG_INFINITY {
            0.0
        } else {
            v
        }
    });
}

/// Zero mean, unit population variance per column.
///
/// A column whose spread is under [`MIN_RELATIVE_SPREAD`] of its magnitude (at least 1)
/// is scaled by that magnitude instead, so rounding-level differences stay small rather
/// than being stretched to unit variance. Constant columns become all 0.
pub fn standardize(m: &mut Array2<f64>) {
    let n = m.nrows();
    if n == 0 {
        return;
    }
    for mut col in m.axis_iter_mut(Axis(1)) {
        let mean = col.sum() / n as f64;
        let var = col.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n as f64;
        let std = var.sqrt();
        let magnitude = mean.abs().max(1.0);
        let scale = if std >= MIN_RELATIVE_SPREAD * magnitude {
            std
        } else {
            magnitude
        };
        col.mapv_inplace(|v| (v - mean) / scale);
    }
}

/// Eigenvalues (descending) and matching eigenvectors (as columns) of a symmetric matrix,
/// by cyclic Jacobi rotations.
pub fn symmetric_eigen(a: &Array2<f64>) -> (Vec<f64>, Array2<f64>) {
    let n = a.nrows();
    let mut a = a.clone();
    let mut v = Array2::<f64>::eye(n);
    let scale = a.iter().map(|x| x * x).sum::<f64>().sqrt().max(1.0);

    for _ in 0..JACOBI_MAX_SWEEPS {
        let mut off = 0.0;
        for p in 0..n {
            for q in (p + 1)..n {
                off += a[[p, q]] * a[[p, q]];
            }
        }
        if off.sqrt() < JACOBI_TOLERANCE * scale {
            break;
        }
        for p in 0..n {
            for q in (p + 1)..n {
                let apq = a[[p, q]];
                if apq.abs() < f64::MIN_POSITIVE {
                    continue;
                }
                let theta = (a[[q, q]] - a[[p, p]]) / (2.0 * apq);
                let t = theta.signum() / (theta.abs() + (theta * theta + 1.0).sqrt());
                let c = 1.0 / (t * t + 1.0).sqrt();
                let s = t * c;
                for k in 0..n {
                    let (akp, akq) = (a[[k, p]], a[[k, q]]);
                    a[[k, p]] = c * akp - s * akq;
                    a[[k, q]] = s * akp + c * akq;
                }
                for k in 0..n {
                    let (apk, aqk) = (a[[p, k]], a[[q, k]]);
                    a[[p, k]] = c * apk - s * aqk;
                    a[[q, k]] = s * apk + c * aqk;
                }
                for k in 0..n {
                    let (vkp, vkq) = (v[[k, p]], v[[k, q]]);
                    v[[k, p]] = c * vkp - s * vkq;
                    v[[k, q]] = s * vkp + c * vkq;
                }
            }
        }
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&i, &j| a[[j, j]].total_cmp(&a[[i, i]]));
    let values = order.iter().map(|&i| a[[i, i]].max(0.0)).collect();
    let mut vectors = Array2::<f64>::zeros((n, n));
    for (dst, &src) in order.iter().enumerate() {
        vectors.column_mut(dst).assign(&v.column(src));
    }
    (values, vectors)
}

/// Project centered data onto the fewest principal components whose cumulative explained
/// variance exceeds `retained`. Data without variance collapses to one zero column.
pub fn pca(data: &Array2<f64>, retained: f64) -> Array2<f64> {
    let n = data.nrows();
    let mean = data
        .mean_axis(Axis(0))
        .unwrap_or_else(|| ndarray::Array1::zeros(data.ncols()));
    let centered = data - &mean;
    let cov = centered.t().dot(&centered) / (n.saturating_sub(1).max(1)) as f64;
    let (values, vectors) = symmetric_eigen(&cov);

    let total: f64 = values.iter().sum();
    if total <= 0.0 {
        return Array2::zeros((n, 1));
    }
    let mut cumulative = 0.0;
    let mut k = values.len();
    for (i, v) in values.iter().enumerate() {
        cumulative += v / total;
        if cumulative > retained {
            k = i + 1;
            break;
        }
    }
    let basis = vectors.slice(ndarray::s![.., ..k]).to_owned();
    centered.dot(&basis)
}

pub struct FeaturePreparer {
    config: ClusteringConfig,
}

impl FeaturePreparer {
    pub fn new(config: ClusteringConfig) -> Self {
        Self { config }
    }

    /// Clustering matrix for a feature table, rows in author order.
    pub fn prepare(&self, table: &FeatureTable) -> Array2<f64> {
        self.prepare_matrix(table.matrix(&clustering_columns()))
    }

    pub fn prepare_matrix(&self, mut m: Array2<f64>) -> Array2<f64> {
        sanitize(&mut m);
        standardize(&mut m);
        let dims = m.ncols();
        if dims > self.config.pca_min_dimensions && m.nrows() > 0 {
            let reduced = pca(&m, self.config.pca_variance_retained);
            info!(from = dims, to = reduced.ncols(), "reduced feature dimensions");
            reduced
        } else {
            debug!(dims, "clustering on standardized features");
            m
        }
    }
}
