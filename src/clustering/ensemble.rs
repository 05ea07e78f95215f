//! Clustering battery and label-invariant consensus.
//!
//! Every run's labels become a co-membership matrix `M·Mᵀ`; the mean over successful runs
//! is the consensus matrix, and DBSCAN over `1 - consensus` gives the final partition,
//! with clusters under `min_cluster_size` returned to noise.
//! Both the consensus matrix and the final pass are O(n²) in authors.

use super::dbscan::{dbscan, dbscan_precomputed};
use super::hdbscan::{hdbscan, HdbscanParams};
use super::prepare::FeaturePreparer;
use super::{cluster_count, discard_small_clusters, noise_count, ClusterLabel, NOISE};
use crate::config::ClusteringConfig;
use crate::error::ClusteringError;
use crate::features::FeatureTable;
use ndarray::Array2;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "algorithm", rename_all = "snake_case")]
pub enum ClusteringMethod {
    Hdbscan { min_cluster_size: usize },
    Dbscan { eps: f64 },
}

impl std::fmt::Display for ClusteringMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Hdbscan { min_cluster_size } => write!(f, "hdbscan(min_cluster_size={min_cluster_size})"),
            Self::Dbscan { eps } => write!(f, "dbscan(eps={eps})"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatteryRun {
    pub method: ClusteringMethod,
    pub labels: Vec<ClusterLabel>,
    pub clusters: usize,
    pub noise: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunFailure {
    pub method: ClusteringMethod,
    #[serde(serialize_with = "display_reason")]
    pub reason: ClusteringError,
}

fn display_reason<S: Serializer>(e: &ClusteringError, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(e)
}

#[derive(Debug, Clone)]
pub struct EnsembleOutcome {
    /// Final cluster per row, [`NOISE`] when unassigned
    pub labels: Vec<ClusterLabel>,
    /// Mean consensus with same-cluster peers; 0 for noise
    pub confidence: Vec<f64>,
    /// Symmetric, zero diagonal
    pub consensus: Array2<f64>,
    pub runs: Vec<BatteryRun>,
    pub failures: Vec<RunFailure>,
}

impl EnsembleOutcome {
    fn unassigned(n: usize, failures: Vec<RunFailure>) -> Self {
        Self {
            labels: vec![NOISE; n],
            confidence: vec![0.0; n],
            consensus: Array2::zeros((n, n)),
            runs: Vec::new(),
            failures,
        }
    }

    pub fn cluster_count(&self) -> usize {
        cluster_count(&self.labels)
    }

    pub fn noise_count(&self) -> usize {
        noise_count(&self.labels)
    }
}

pub struct EnsembleClusteringEngine {
    config: ClusteringConfig,
}

impl EnsembleClusteringEngine {
    pub fn new(config: ClusteringConfig) -> Self {
        Self { config }
    }

    pub fn battery(&self) -> Vec<ClusteringMethod> {
        self.config
            .hdbscan_min_cluster_sizes
            .iter()
            .map(|&min_cluster_size| ClusteringMethod::Hdbscan { min_cluster_size })
            .chain(
                self.config
                    .dbscan_eps_values
                    .iter()
                    .map(|&eps| ClusteringMethod::Dbscan { eps }),
            )
            .collect()
    }

    /// Prepare the table and cluster it. Rows of the outcome follow table author order.
    pub fn cluster_table(&self, table: &FeatureTable) -> EnsembleOutcome {
        let data = FeaturePreparer::new(self.config.clone()).prepare(table);
        self.cluster(&data)
    }

    pub fn cluster(&self, data: &Array2<f64>) -> EnsembleOutcome {
        let n = data.nrows();
        let (runs, failures) = self.run_battery(data);
        if runs.is_empty() {
            warn!(
                authors = n,
                failed = failures.len(),
                "every clustering run failed; all authors unassigned"
            );
            return EnsembleOutcome::unassigned(n, failures);
        }

        let consensus = consensus_matrix(&runs, n);
        let labels = discard_small_clusters(
            &consensus_partition(
                &consensus,
                self.config.consensus_eps,
                self.config.consensus_min_samples,
            ),
            self.config.min_cluster_size,
        );
        let confidence = confidence_scores(&consensus, &labels);

        info!(
            runs = runs.len(),
            failed = failures.len(),
            clusters = cluster_count(&labels),
            noise = noise_count(&labels),
            "consensus clustering complete"
        );
        EnsembleOutcome {
            labels,
            confidence,
            consensus,
            runs,
            failures,
        }
    }

    /// Every configured run; failures are kept with their reason, never fatal.
    pub fn run_battery(&self, data: &Array2<f64>) -> (Vec<BatteryRun>, Vec<RunFailure>) {
        let mut runs = Vec::new();
        let mut failures = Vec::new();
        for method in self.battery() {
            let result = match method {
                ClusteringMethod::Hdbscan { min_cluster_size } => hdbscan(
                    data,
                    &HdbscanParams {
                        min_cluster_size,
                        min_samples: self.config.min_samples,
                        cluster_selection_epsilon: self.config.cluster_selection_epsilon,
                    },
                ),
                ClusteringMethod::Dbscan { eps } => dbscan(data, eps, self.config.min_samples),
            };
            match result {
                Ok(labels) => {
                    let (clusters, noise) = (cluster_count(&labels), noise_count(&labels));
                    info!(%method, clusters, noise, "clustering run complete");
                    runs.push(BatteryRun {
                        method,
                        labels,
                        clusters,
                        noise,
                    });
                }
                Err(reason) => {
                    warn!(%method, error = %reason, "clustering run skipped");
                    failures.push(RunFailure { method, reason });
                }
            }
        }
        (runs, failures)
    }
}

/// Fraction of runs placing each pair in the same non-noise cluster. Zero diagonal.
pub fn consensus_matrix(runs: &[BatteryRun], n: usize) -> Array2<f64> {
    let mut sum = Array2::<f64>::zeros((n, n));
    if runs.is_empty() {
        return sum;
    }
    for run in runs {
        let ids: BTreeMap<ClusterLabel, usize> = run
            .labels
            .iter()
            .filter(|&&l| l != NOISE)
            .copied()
            .collect::<std::collections::BTreeSet<_>>()
            .into_iter()
            .enumerate()
            .map(|(i, l)| (l, i))
            .collect();
        let mut one_hot = Array2::<f64>::zeros((n, ids.len()));
        for (row, label) in run.labels.iter().enumerate() {
            if let Some(&col) = ids.get(label) {
                one_hot[[row, col]] = 1.0;
            }
        }
        sum += &one_hot.dot(&one_hot.t());
    }
    for i in 0..n {
        sum[[i, i]] = 0.0;
    }
    sum / runs.len() as f64
}

/// DBSCAN over `1 - consensus`. The zero consensus diagonal puts every author at
/// distance 1 from itself, so a core author needs `min_samples` other authors in reach.
pub fn consensus_partition(
    consensus: &Array2<f64>,
    eps: f64,
    min_samples: usize,
) -> Vec<ClusterLabel> {
    let distances = consensus.mapv(|c| 1.0 - c);
    match dbscan_precomputed(&distances, eps, min_samples) {
        Ok(labels) => labels,
        Err(e) => {
            warn!(error = %e, "consensus clustering failed; all authors unassigned");
            vec![NOISE; consensus.nrows()]
        }
    }
}

/// Mean consensus of each clustered row with the other members of its cluster.
pub fn confidence_scores(consensus: &Array2<f64>, labels: &[ClusterLabel]) -> Vec<f64> {
    let mut members: BTreeMap<ClusterLabel, Vec<usize>> = BTreeMap::new();
    for (i, &l) in labels.iter().enumerate() {
        if l != NOISE {
            members.entry(l).or_default().push(i);
        }
    }
    labels
        .iter()
        .enumerate()
        .map(|(i, l)| {
            let Some(peers) = members.get(l) else {
                return 0.0;
            };
            let others: Vec<usize> = peers.iter().copied().filter(|&j| j != i).collect();
            if others.is_empty() {
                return 0.0;
            }
            others.iter().map(|&j| consensus[[i, j]]).sum::<f64>() / others.len() as f64
        })
        .collect()
}
