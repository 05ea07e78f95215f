//! Node centrality over an undirected [`Adjacency`].
//!
//! Iterative measures return `Err` on non-convergence; callers decide the fallback.

use super::Adjacency;
use crate::error::GraphError;
use std::collections::{BTreeSet, VecDeque};

/// deg / (n - 1). Zero for graphs with fewer than two nodes.
pub fn degree_centrality(adj: &Adjacency) -> Vec<f64> {
    let n = adj.len();
    if n < 2 {
        return vec![0.0; n];
    }
    let scale = 1.0 / (n - 1) as f64;
    (0..n).map(|v| adj.degree(v) as f64 * scale).collect()
}

/// Sum of incident edge weights.
pub fn weighted_degree(adj: &Adjacency) -> Vec<f64> {
    adj.neighbors
        .iter()
        .map(|l| l.iter().map(|&(_, w)| w).sum())
        .collect()
}

/// Unweighted shortest-path betweenness (Brandes), normalized by (n-1)(n-2).
pub fn betweenness_centrality(adj: &Adjacency) -> Vec<f64> {
    let n = adj.len();
    let mut betweenness = vec![0.0; n];

    for s in 0..n {
        let mut stack = Vec::with_capacity(n);
        let mut preds: Vec<Vec<usize>> = vec![Vec::new(); n];
        let mut sigma = vec![0.0f64; n];
        let mut dist = vec![-1i64; n];
        sigma[s] = 1.0;
        dist[s] = 0;

        let mut queue = VecDeque::from([s]);
        while let Some(v) = queue.pop_front() {
            stack.push(v);
            for &(w, _) in &adj.neighbors[v] {
                if dist[w] < 0 {
                    dist[w] = dist[v] + 1;
                    queue.push_back(w);
                }
                if dist[w] == dist[v] + 1 {
                    sigma[w] += sigma[v];
                    preds[w].push(v);
                }
            }
        }

        let mut delta = vec![0.0; n];
        while let Some(w) = stack.pop() {
            for &v in &preds[w] {
                delta[v] += sigma[v] / sigma[w] * (1.0 + delta[w]);
            }
            if w != s {
                betweenness[w] += delta[w];
            }
        }
    }

    if n > 2 {
        let scale = 1.0 / ((n - 1) * (n - 2)) as f64;
        betweenness.iter_mut().for_each(|b| *b *= scale);
    }
    betweenness
}

/// Unweighted eigenvector centrality by power iteration on (A + I), L2-normalized.
///
/// Converges when the L1 change drops below `n * tolerance`. A graph without edges has
/// no meaningful principal eigenvector and is reported as degenerate.
pub fn eigenvector_centrality(
    adj: &Adjacency,
    max_iter: usize,
    tolerance: f64,
) -> Result<Vec<f64>, GraphError> {
    let n = adj.len();
    if n == 0 || adj.edge_count() == 0 {
        return Err(GraphError::Degenerate {
            algorithm: "eigenvector centrality",
        });
    }

    let mut x = vec![1.0 / n as f64; n];
    for _ in 0..max_iter {
        let last = x.clone();
        for (v, neighbors) in adj.neighbors.iter().enumerate() {
            for &(w, _) in neighbors {
                x[w] += last[v];
            }
        }
        let norm = x.iter().map(|v| v * v).sum::<f64>().sqrt();
        let norm = if norm > 0.0 { norm } else { 1.0 };
        x.iter_mut().for_each(|v| *v /= norm);

        let change: f64 = x.iter().zip(&last).map(|(a, b)| (a - b).abs()).sum();
        if change < n as f64 * tolerance {
            return Ok(x);
        }
    }
    Err(GraphError::NotConverged {
        algorithm: "eigenvector centrality",
        iterations: max_iter,
    })
}

/// Weighted PageRank with uniform teleport; dangling mass is spread uniformly.
pub fn pagerank(
    adj: &Adjacency,
    damping: f64,
    max_iter: usize,
    tolerance: f64,
) -> Result<Vec<f64>, GraphError> {
    let n = adj.len();
    if n == 0 {
        return Ok(Vec::new());
    }
    let uniform = 1.0 / n as f64;
    let out_weight = weighted_degree(adj);
    let dangling: Vec<usize> = (0..n).filter(|&v| out_weight[v] == 0.0).collect();

    let mut x = vec![uniform; n];
    for _ in 0..max_iter {
        let last = x.clone();
        x.iter_mut().for_each(|v| *v = 0.0);
        let dangle_sum = damping * dangling.iter().map(|&v| last[v]).sum::<f64>();
        for (v, neighbors) in adj.neighbors.iter().enumerate() {
            for &(w, weight) in neighbors {
                x[w] += damping * last[v] * weight / out_weight[v];
            }
        }
        x.iter_mut()
            .for_each(|v| *v += dangle_sum * uniform + (1.0 - damping) * uniform);

        let err: f64 = x.iter().zip(&last).map(|(a, b)| (a - b).abs()).sum();
        if err < n as f64 * tolerance {
            return Ok(x);
        }
    }
    Err(GraphError::NotConverged {
        algorithm: "pagerank",
        iterations: max_iter,
    })
}

/// Local clustering coefficient: closed triangles / possible neighbor pairs.
pub fn clustering_coefficient(adj: &Adjacency) -> Vec<f64> {
    let sets = adj.neighbor_sets();
    (0..adj.len())
        .map(|v| local_clustering(&sets, v, None))
        .collect()
}

/// Clustering of `v` counting only neighbors inside `within`, when given.
pub(crate) fn local_clustering(
    sets: &[BTreeSet<usize>],
    v: usize,
    within: Option<&BTreeSet<usize>>,
) -> f64 {
    let neighbors: Vec<usize> = sets[v]
        .iter()
        .copied()
        .filter(|n| within.map_or(true, |w| w.contains(n)))
        .collect();
    let k = neighbors.len();
    if k < 2 {
        return 0.0;
    }
    let mut links = 0usize;
    for (i, &a) in neighbors.iter().enumerate() {
        for &b in &neighbors[i + 1..] {
            if sets[a].contains(&b) {
                links += 1;
            }
        }
    }
    2.0 * links as f64 / (k * (k - 1)) as f64
}

