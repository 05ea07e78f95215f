//! Dense and hub-shaped substructures: maximal cliques, star patterns, group cohesion.

use super::centrality::local_clustering;
use super::Adjacency;
use std::collections::BTreeSet;

/// Every maximal clique (Bron–Kerbosch with pivoting), members ascending, largest first.
/// Isolated nodes come out as cliques of one.
pub fn maximal_cliques(adj: &Adjacency) -> Vec<Vec<usize>> {
    let sets = adj.neighbor_sets();
    let mut out = Vec::new();
    let mut r = Vec::new();
    let p: BTreeSet<usize> = (0..adj.len()).collect();
    bron_kerbosch(&sets, &mut r, p, BTreeSet::new(), &mut out);
    for clique in &mut out {
        clique.sort_unstable();
    }
    out.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
    out
}

fn bron_kerbosch(
    sets: &[BTreeSet<usize>],
    r: &mut Vec<usize>,
    mut p: BTreeSet<usize>,
    mut x: BTreeSet<usize>,
    out: &mut Vec<Vec<usize>>,
) {
    if p.is_empty() {
        if x.is_empty() && !r.is_empty() {
            out.push(r.clone());
        }
        return;
    }
    let pivot = p
        .iter()
        .chain(x.iter())
        .copied()
        .max_by_key(|&u| (p.intersection(&sets[u]).count(), std::cmp::Reverse(u)))
        .unwrap_or(0);
    let candidates: Vec<usize> = p.difference(&sets[pivot]).copied().collect();
    for v in candidates {
        r.push(v);
        let np = p.intersection(&sets[v]).copied().collect();
        let nx = x.intersection(&sets[v]).copied().collect();
        bron_kerbosch(sets, r, np, nx, out);
        r.pop();
        p.remove(&v);
        x.insert(v);
    }
}

/// A hub whose neighbors are barely connected to one another.
#[derive(Debug, Clone, PartialEq)]
pub struct Star {
    pub center: usize,
    pub leaves: Vec<usize>,
    pub neighbor_density: f64,
}

/// Nodes with degree ≥ `min_degree` whose neighbor-induced subgraph has density
/// below `max_density`.
pub fn star_patterns(adj: &Adjacency, min_degree: usize, max_density: f64) -> Vec<Star> {
    let sets = adj.neighbor_sets();
    let mut stars = Vec::new();
    for (center, neighbors) in sets.iter().enumerate() {
        let d = neighbors.len();
        if d < min_degree || d < 2 {
            continue;
        }
        let density = induced_density(&sets, neighbors);
        if density < max_density {
            stars.push(Star {
                center,
                leaves: neighbors.iter().copied().collect(),
                neighbor_density: density,
            });
        }
    }
    stars
}

/// Edges among `members` over the possible pairs.
pub fn induced_density(sets: &[BTreeSet<usize>], members: &BTreeSet<usize>) -> f64 {
    let k = members.len();
    if k < 2 {
        return 0.0;
    }
    let edges: usize = members
        .iter()
        .map(|&m| sets[m].intersection(members).count())
        .sum::<usize>()
        / 2;
    2.0 * edges as f64 / (k * (k - 1)) as f64
}

/// (density + mean local clustering) / 2 of the subgraph induced by `members`.
/// Groups under two members score 0.
pub fn cohesion(adj: &Adjacency, members: &BTreeSet<usize>) -> f64 {
    if members.len() < 2 {
        return 0.0;
    }
    let sets = adj.neighbor_sets();
    let density = induced_density(&sets, members);
    let clustering = members
        .iter()
        .map(|&m| local_clustering(&sets, m, Some(members)))
        .sum::<f64>()
        / members.len() as f64;
    (density + clustering) / 2.0
}
