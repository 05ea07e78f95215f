//! Louvain modularity optimization.
//!
//! Nodes are visited in index order and ties keep the current community, so the same
//! graph always yields the same partition.

use super::Adjacency;
use std::collections::BTreeMap;

const MAX_PASSES: usize = 100;
const MIN_GAIN: f64 = 1e-12;

/// Working graph for one aggregation level. `internal[i]` is the weight of edges folded
/// into node `i` by earlier levels.
struct Level {
    neighbors: Vec<BTreeMap<usize, f64>>,
    internal: Vec<f64>,
}

impl Level {
    fn from_adjacency(adj: &Adjacency) -> Self {
        let neighbors = adj
            .neighbors
            .iter()
            .map(|l| l.iter().copied().collect())
            .collect();
        Self {
            neighbors,
            internal: vec![0.0; adj.len()],
        }
    }

    fn len(&self) -> usize {
        self.neighbors.len()
    }

    fn degree(&self, i: usize) -> f64 {
        self.neighbors[i].values().sum::<f64>() + 2.0 * self.internal[i]
    }

    /// Local moving phase. Returns community per node and whether anything moved.
    fn local_moves(&self, resolution: f64, two_m: f64) -> (Vec<usize>, bool) {
        let n = self.len();
        let k: Vec<f64> = (0..n).map(|i| self.degree(i)).collect();
        let mut community: Vec<usize> = (0..n).collect();
        let mut total = k.clone();
        let mut moved_any = false;

        for _ in 0..MAX_PASSES {
            let mut moved = false;
            for i in 0..n {
                let current = community[i];
                let mut links: BTreeMap<usize, f64> = BTreeMap::new();
                for (&j, &w) in &self.neighbors[i] {
                    *links.entry(community[j]).or_default() += w;
                }
                total[current] -= k[i];

                let gain = |c: usize, w_in: f64| w_in - resolution * total[c] * k[i] / two_m;
                let mut best = current;
                let mut best_gain = gain(current, links.get(&current).copied().unwrap_or(0.0));
                for (&c, &w_in) in &links {
                    let g = gain(c, w_in);
                    if g > best_gain + MIN_GAIN {
                        best = c;
                        best_gain = g;
                    }
                }

                total[best] += k[i];
                if best != current {
                    community[i] = best;
                    moved = true;
                    moved_any = true;
                }
            }
            if !moved {
                break;
            }
        }
        (community, moved_any)
    }

    /// Collapse each community into one node.
    fn aggregate(&self, community: &[usize]) -> Self {
        let count = community.iter().max().map_or(0, |m| m + 1);
        let mut neighbors = vec![BTreeMap::new(); count];
        let mut internal = vec![0.0; count];
        for i in 0..self.len() {
            let ci = community[i];
            internal[ci] += self.internal[i];
            for (&j, &w) in &self.neighbors[i] {
                let cj = community[j];
                if ci == cj {
                    // each internal edge is seen from both ends
                    internal[ci] += w / 2.0;
                } else {
                    *neighbors[ci].entry(cj).or_insert(0.0) += w;
                }
            }
        }
        Self {
            neighbors,
            internal,
        }
    }
}

/// Relabel to 0.. in order of first appearance.
fn renumber(labels: &mut [usize]) {
    let mut map = BTreeMap::new();
    let mut order = Vec::new();
    for l in labels.iter() {
        if !map.contains_key(l) {
            map.insert(*l, order.len());
            order.push(*l);
        }
    }
    labels.iter_mut().for_each(|l| *l = map[l]);
}

/// Community id per node. Every node gets one; isolated nodes are singletons.
pub fn louvain(adj: &Adjacency, resolution: f64) -> Vec<usize> {
    let n = adj.len();
    let mut membership: Vec<usize> = (0..n).collect();
    let two_m: f64 = adj
        .neighbors
        .iter()
        .flat_map(|l| l.iter().map(|&(_, w)| w))
        .sum();
    if two_m <= 0.0 {
        return membership;
    }

    let mut level = Level::from_adjacency(adj);
    loop {
        let (mut community, moved) = level.local_moves(resolution, two_m);
        if !moved {
            break;
        }
        renumber(&mut community);
        for m in membership.iter_mut() {
            *m = community[*m];
        }
        let count = community.iter().max().map_or(0, |m| m + 1);
        if count == level.len() {
            break;
        }
        level = level.aggregate(&community);
    }
    renumber(&mut membership);
    membership
}

/// Newman modularity of a partition with a resolution factor.
pub fn modularity(adj: &Adjacency, communities: &[usize], resolution: f64) -> f64 {
    let two_m: f64 = adj
        .neighbors
        .iter()
        .flat_map(|l| l.iter().map(|&(_, w)| w))
        .sum();
    if two_m <= 0.0 {
        return 0.0;
    }
    let mut internal: BTreeMap<usize, f64> = BTreeMap::new();
    let mut degree: BTreeMap<usize, f64> = BTreeMap::new();
    for (i, list) in adj.neighbors.iter().enumerate() {
        for &(j, w) in list {
            *degree.entry(communities[i]).or_default() += w;
            if communities[i] == communities[j] {
                *internal.entry(communities[i]).or_default() += w;
            }
        }
    }
    degree
        .iter()
        .map(|(c, d)| {
            internal.get(c).copied().unwrap_or(0.0) / two_m
                - resolution * (d / two_m).powi(2)
        })
        .sum()
}

/// Members per community id.
pub fn community_sizes(communities: &[usize]) -> BTreeMap<usize, usize> {
    let mut sizes = BTreeMap::new();
    for &c in communities {
        *sizes.entry(c).or_default() += 1;
    }
    sizes
}
