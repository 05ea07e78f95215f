//! Hierarchical density-based clustering (HDBSCAN) with excess-of-mass selection.
//!
//! Steps: core distances → mutual reachability → minimum spanning tree (Prim, dense)
//! → single-linkage hierarchy → condensed tree → cluster stability → selection
//! (optionally merged up to `cluster_selection_epsilon`) → point labels.

use super::{check_distances, euclidean_distances, ClusterLabel, NOISE};
use crate::error::ClusteringError;
use ndarray::Array2;
use std::collections::{BTreeMap, BTreeSet, VecDeque};

/// Lambda reported for merges at distance 0.
const MAX_LAMBDA: f64 = 1e12;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HdbscanParams {
    /// Smallest group the condensed tree keeps as a cluster
    pub min_cluster_size: usize,
    /// Neighbors counted for a point's core distance
    pub min_samples: usize,
    /// Selected clusters born below this distance merge up toward their parent
    pub cluster_selection_epsilon: f64,
}

impl Default for HdbscanParams {
    fn default() -> Self {
        Self {
            min_cluster_size: 3,
            min_samples: 2,
            cluster_selection_epsilon: 0.0,
        }
    }
}

impl HdbscanParams {
    /// Whether these parameters can run on `samples` points.
    pub fn check_viable(&self, samples: usize) -> Result<(), ClusteringError> {
        if self.min_cluster_size < 2 || self.min_cluster_size > samples {
            return Err(ClusteringError::ParameterTooLarge {
                parameter: "min_cluster_size",
                value: self.min_cluster_size,
                samples,
            });
        }
        if self.min_samples == 0 || self.min_samples >= samples {
            return Err(ClusteringError::ParameterTooLarge {
                parameter: "min_samples",
                value: self.min_samples,
                samples,
            });
        }
        Ok(())
    }
}

/// One row of the condensed tree: `child` leaves `parent` at `lambda`.
#[derive(Debug, Clone, Copy, PartialEq)]
struct CondensedEdge {
    parent: usize,
    child: usize,
    lambda: f64,
    size: usize,
}

fn lambda_of(distance: f64) -> f64 {
    if distance > 0.0 {
        (1.0 / distance).min(MAX_LAMBDA)
    } else {
        MAX_LAMBDA
    }
}

/// Cluster rows of `data` under the Euclidean metric.
pub fn hdbscan(data: &Array2<f64>, params: &HdbscanParams) -> Result<Vec<ClusterLabel>, ClusteringError> {
    hdbscan_precomputed(&euclidean_distances(data), params)
}

pub fn hdbscan_precomputed(
    distances: &Array2<f64>,
    params: &HdbscanParams,
) -> Result<Vec<ClusterLabel>, ClusteringError> {
    let n = check_distances(distances, 2)?;
    params.check_viable(n)?;

    let core = core_distances(distances, params.min_samples);
    let mst = prim_mst(distances, &core);
    let hierarchy = single_linkage(n, mst);
    let condensed = condense(n, &hierarchy, params.min_cluster_size);
    let selected = select_clusters(n, &condensed, params.cluster_selection_epsilon);
    Ok(label_points(n, &condensed, &selected))
}

/// Distance to the `k`-th nearest other point.
fn core_distances(d: &Array2<f64>, k: usize) -> Vec<f64> {
    let n = d.nrows();
    (0..n)
        .map(|i| {
            let mut row: Vec<f64> = (0..n).filter(|&j| j != i).map(|j| d[[i, j]]).collect();
            row.sort_by(f64::total_cmp);
            row[k - 1]
        })
        .collect()
}

/// MST over mutual reachability distances, edges sorted ascending by weight.
fn prim_mst(d: &Array2<f64>, core: &[f64]) -> Vec<(usize, usize, f64)> {
    let n = d.nrows();
    let mrd = |i: usize, j: usize| d[[i, j]].max(core[i]).max(core[j]);
    let mut in_tree = vec![false; n];
    let mut best = vec![f64::INFINITY; n];
    let mut from = vec![0usize; n];
    let mut edges = Vec::with_capacity(n - 1);

    let mut current = 0;
    in_tree[0] = true;
    for _ in 1..n {
        let mut next = usize::MAX;
        let mut next_w = f64::INFINITY;
        for j in 0..n {
            if in_tree[j] {
                continue;
            }
            let w = mrd(current, j);
            if w < best[j] {
                best[j] = w;
                from[j] = current;
            }
            if best[j] < next_w || next == usize::MAX {
                next_w = best[j];
                next = j;
            }
        }
        in_tree[next] = true;
        edges.push((from[next], next, next_w));
        current = next;
    }
    edges.sort_by(|a, b| a.2.total_cmp(&b.2));
    edges
}

/// Merge rows `(left, right, distance, size)`; merge `k` creates node `n + k`.
fn single_linkage(n: usize, mst: Vec<(usize, usize, f64)>) -> Vec<(usize, usize, f64, usize)> {
    let mut parent: Vec<usize> = (0..2 * n).collect();
    let mut size = vec![1usize; 2 * n];
    fn find(parent: &mut [usize], mut x: usize) -> usize {
        while parent[x] != x {
            parent[x] = parent[parent[x]];
            x = parent[x];
        }
        x
    }

    let mut rows = Vec::with_capacity(n - 1);
    for (k, (a, b, w)) in mst.into_iter().enumerate() {
        let (ra, rb) = (find(&mut parent, a), find(&mut parent, b));
        let node = n + k;
        size[node] = size[ra] + size[rb];
        parent[ra] = node;
        parent[rb] = node;
        rows.push((ra, rb, w, size[node]));
    }
    rows
}

/// Leaf points under a hierarchy node.
fn leaves(n: usize, hierarchy: &[(usize, usize, f64, usize)], node: usize) -> Vec<usize> {
    let mut out = Vec::new();
    let mut stack = vec![node];
    while let Some(x) = stack.pop() {
        if x < n {
            out.push(x);
        } else {
            let (l, r, _, _) = hierarchy[x - n];
            stack.push(r);
            stack.push(l);
        }
    }
    out
}

/// Collapse the hierarchy into clusters of at least `min_cluster_size`. Cluster ids start
/// at `n` (the root) and points keep their own index.
fn condense(
    n: usize,
    hierarchy: &[(usize, usize, f64, usize)],
    min_cluster_size: usize,
) -> Vec<CondensedEdge> {
    let root = 2 * n - 2;
    let mut relabel = vec![0usize; 2 * n - 1];
    relabel[root] = n;
    let mut next_label = n + 1;
    let mut out = Vec::new();

    let node_size = |x: usize| if x < n { 1 } else { hierarchy[x - n].3 };
    let mut queue = VecDeque::from([root]);
    while let Some(node) = queue.pop_front() {
        if node < n {
            continue;
        }
        let (left, right, distance, _) = hierarchy[node - n];
        let lambda = lambda_of(distance);
        let (ls, rs) = (node_size(left), node_size(right));
        let parent = relabel[node];

        if ls >= min_cluster_size && rs >= min_cluster_size {
            for (child, size) in [(left, ls), (right, rs)] {
                relabel[child] = next_label;
                out.push(CondensedEdge {
                    parent,
                    child: next_label,
                    lambda,
                    size,
                });
                next_label += 1;
                queue.push_back(child);
            }
        } else {
            for (child, size) in [(left, ls), (right, rs)] {
                if size >= min_cluster_size {
                    relabel[child] = parent;
                    queue.push_back(child);
                } else {
                    for point in leaves(n, hierarchy, child) {
                        out.push(CondensedEdge {
                            parent,
                            child: point,
                            lambda,
                            size: 1,
                        });
                    }
                }
            }
        }
    }
    out
}

/// Excess-of-mass selection, excluding the root; then epsilon merging when configured.
fn select_clusters(n: usize, tree: &[CondensedEdge], epsilon: f64) -> BTreeSet<usize> {
    let root = n;
    let mut birth: BTreeMap<usize, f64> = BTreeMap::from([(root, 0.0)]);
    let mut children: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    let mut parent_of: BTreeMap<usize, usize> = BTreeMap::new();
    for e in tree.iter().filter(|e| e.size > 1) {
        birth.insert(e.child, e.lambda);
        children.entry(e.parent).or_default().push(e.child);
        parent_of.insert(e.child, e.parent);
    }

    let mut stability: BTreeMap<usize, f64> = birth.keys().map(|&c| (c, 0.0)).collect();
    for e in tree {
        let b = birth.get(&e.parent).copied().unwrap_or(0.0);
        *stability.entry(e.parent).or_default() += (e.lambda - b) * e.size as f64;
    }

    let mut is_cluster: BTreeMap<usize, bool> = stability
        .keys()
        .filter(|&&c| c != root)
        .map(|&c| (c, true))
        .collect();
    let descendants = |node: usize| {
        let mut out = Vec::new();
        let mut stack = vec![node];
        while let Some(x) = stack.pop() {
            if let Some(ch) = children.get(&x) {
                for &c in ch {
                    out.push(c);
                    stack.push(c);
                }
            }
        }
        out
    };

    let order: Vec<usize> = is_cluster.keys().rev().copied().collect();
    for node in order {
        let subtree: f64 = children
            .get(&node)
            .map(|ch| ch.iter().map(|c| stability[c]).sum())
            .unwrap_or(0.0);
        if subtree > stability[&node] {
            is_cluster.insert(node, false);
            stability.insert(node, subtree);
        } else {
            for d in descendants(node) {
                is_cluster.insert(d, false);
            }
        }
    }

    let mut selected: BTreeSet<usize> = is_cluster
        .iter()
        .filter(|(_, &sel)| sel)
        .map(|(&c, _)| c)
        .collect();

    if epsilon > 0.0 && !selected.is_empty() {
        let eps_of = |c: usize| 1.0 / birth[&c];
        let mut merged = BTreeSet::new();
        for &leaf in &selected {
            if eps_of(leaf) >= epsilon {
                merged.insert(leaf);
                continue;
            }
            // climb while the parent still splits below epsilon; never select the root
            let mut node = leaf;
            loop {
                let parent = parent_of[&node];
                if parent == root {
                    break;
                }
                node = parent;
                if eps_of(parent) > epsilon {
                    break;
                }
            }
            merged.insert(node);
        }
        let nested: Vec<usize> = merged
            .iter()
            .copied()
            .filter(|&c| {
                let mut x = c;
                while let Some(&p) = parent_of.get(&x) {
                    if merged.contains(&p) {
                        return true;
                    }
                    x = p;
                }
                false
            })
            .collect();
        for c in nested {
            merged.remove(&c);
        }
        selected = merged;
    }
    selected
}

/// Each point takes the nearest selected ancestor in the condensed tree, else noise.
/// Labels follow ascending cluster id.
fn label_points(n: usize, tree: &[CondensedEdge], selected: &BTreeSet<usize>) -> Vec<ClusterLabel> {
    let mut parent_of: BTreeMap<usize, usize> = BTreeMap::new();
    for e in tree {
        parent_of.insert(e.child, e.parent);
    }
    let label_of: BTreeMap<usize, ClusterLabel> = selected
        .iter()
        .enumerate()
        .map(|(i, &c)| (c, i as ClusterLabel))
        .collect();

    (0..n)
        .map(|point| {
            let mut x = point;
            while let Some(&p) = parent_of.get(&x) {
                if let Some(&label) = label_of.get(&p) {
                    return label;
                }
                x = p;
            }
            NOISE
        })
        .collect()
}
