//! Author graphs and the structural algorithms over them.

mod common;

use botnet_detector::config::NetworkConfig;
use botnet_detector::features::NetworkFeatureExtractor;
use botnet_detector::graph::centrality::{
    betweenness_centrality, clustering_coefficient, degree_centrality, eigenvector_centrality,
    pagerank,
};
use botnet_detector::graph::cliques::{cohesion, maximal_cliques, star_patterns};
use botnet_detector::graph::community::{louvain, modularity};
use botnet_detector::graph::{Adjacency, NetworkGraphBuilder};
use botnet_detector::{CommentCorpus, GraphError};
use common::comment;
use std::collections::BTreeSet;

fn adjacency(n: usize, edges: &[(usize, usize)]) -> Adjacency {
    let mut neighbors = vec![Vec::new(); n];
    for &(a, b) in edges {
        neighbors[a].push((b, 1.0));
        neighbors[b].push((a, 1.0));
    }
    for list in &mut neighbors {
        list.sort_by_key(|&(v, _)| v);
    }
    Adjacency { neighbors }
}

#[test]
fn path_centralities() {
    let path3 = adjacency(3, &[(0, 1), (1, 2)]);
    let b = betweenness_centrality(&path3);
    assert!((b[1] - 1.0).abs() < 1e-12);
    assert_eq!(b[0], 0.0);
    assert_eq!(degree_centrality(&path3), vec![0.5, 1.0, 0.5]);

    let path4 = adjacency(4, &[(0, 1), (1, 2), (2, 3)]);
    let pr = pagerank(&path4, 0.85, 100, 1e-6).unwrap();
    assert!((pr.iter().sum::<f64>() - 1.0).abs() < 1e-6);
    assert!(pr[1] > pr[0]);
    assert!((pr[0] - pr[3]).abs() < 1e-6);

    let ev = eigenvector_centrality(&path4, 100, 1e-6).unwrap();
    assert!(ev[1] > ev[0]);
}

#[test]
fn degenerate_and_unconverged_centralities() {
    let empty = adjacency(3, &[]);
    assert!(matches!(
        eigenvector_centrality(&empty, 100, 1e-6),
        Err(GraphError::Degenerate { .. })
    ));
    assert_eq!(degree_centrality(&adjacency(1, &[])), vec![0.0]);
    assert!(pagerank(&adjacency(0, &[]), 0.85, 100, 1e-6).unwrap().is_empty());

    let path4 = adjacency(4, &[(0, 1), (1, 2), (2, 3)]);
    assert!(matches!(
        pagerank(&path4, 0.85, 1, 1e-12),
        Err(GraphError::NotConverged { .. })
    ));
}

#[test]
fn triangle_clustering() {
    let g = adjacency(4, &[(0, 1), (1, 2), (0, 2), (2, 3)]);
    let cc = clustering_coefficient(&g);
    assert_eq!(cc[0], 1.0);
    assert!((cc[2] - 1.0 / 3.0).abs() < 1e-12);
    assert_eq!(cc[3], 0.0);
}

#[test]
fn louvain_splits_bridged_triangles() {
    let g = adjacency(
        7,
        &[(0, 1), (1, 2), (0, 2), (3, 4), (4, 5), (3, 5), (2, 3)],
    );
    let c = louvain(&g, 1.0);
    assert_eq!(c[0], c[1]);
    assert_eq!(c[1], c[2]);
    assert_eq!(c[3], c[4]);
    assert_eq!(c[4], c[5]);
    assert_ne!(c[0], c[3]);
    // isolated node stays alone
    assert!(c[..6].iter().all(|&x| x != c[6]));
    assert!(modularity(&g, &c, 1.0) > 0.3);
    assert_eq!(c[0], 0);
}

#[test]
fn cliques_largest_first() {
    let g = adjacency(5, &[(0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3), (3, 4)]);
    let cliques = maximal_cliques(&g);
    assert_eq!(cliques, vec![vec![0, 1, 2, 3], vec![3, 4]]);
}

#[test]
fn star_hub_detected() {
    let edges: Vec<(usize, usize)> = (1..=10).map(|leaf| (0, leaf)).collect();
    let g = adjacency(11, &edges);
    let stars = star_patterns(&g, 10, 0.1);
    assert_eq!(stars.len(), 1);
    assert_eq!(stars[0].center, 0);
    assert_eq!(stars[0].leaves.len(), 10);
    assert_eq!(stars[0].neighbor_density, 0.0);
    assert!(star_patterns(&g, 11, 0.1).is_empty());
}

#[test]
fn group_cohesion() {
    let g = adjacency(4, &[(0, 1), (1, 2), (0, 2)]);
    let triangle: BTreeSet<usize> = [0, 1, 2].into_iter().collect();
    assert_eq!(cohesion(&g, &triangle), 1.0);
    let loose: BTreeSet<usize> = [0, 3].into_iter().collect();
    assert_eq!(cohesion(&g, &loose), 0.0);
    assert_eq!(cohesion(&g, &BTreeSet::from([0])), 0.0);
}

#[test]
fn builder_graphs() {
    let corpus = CommentCorpus::new(vec![
        comment("a1", "v1", "a", "x", 0),
        comment("b1", "v1", "b", "x", 10),
        comment("a2", "v2", "a", "x", 20),
        comment("b2", "v2", "b", "x", 30),
        comment("c1", "v2", "c", "x", 50_000),
        comment("c2", "v1", "c", "reply", 50_100).reply_to("a1"),
        comment("c3", "v1", "c", "self", 50_200).reply_to("c1"),
        comment("c4", "v1", "c", "orphan", 50_300).reply_to("missing"),
    ]);
    let graphs = NetworkGraphBuilder::new(NetworkConfig::default()).build(&corpus);

    let co = &graphs.co_occurrence;
    assert_eq!(co.node_count(), 3);
    assert_eq!(co.weight("a", "b"), Some(2));
    // c shares both videos with a and b too
    assert_eq!(co.weight("a", "c"), Some(2));
    assert_eq!(co.degree("a"), 2);

    let reply = &graphs.reply;
    assert_eq!(reply.edge_count(), 1);
    assert_eq!(reply.out_degree("c"), 1);
    assert_eq!(reply.in_degree("a"), 1);

    let temporal = &graphs.temporal;
    // a1-b1, a1-b2, b1-a2, a2-b2
    assert_eq!(temporal.weight("a", "b"), Some(4));
    assert_eq!(temporal.weight("a", "c"), None);
}

#[test]
fn network_features_for_a_tight_group() {
    let mut comments = Vec::new();
    for (i, author) in ["a", "b", "c", "d"].iter().enumerate() {
        for v in 0..3 {
            let secs = (i * 10 + v * 1000) as i64;
            comments.push(comment(&format!("{author}{v}"), &format!("v{v}"), author, "x", secs));
        }
    }
    comments.push(comment("loner", "v9", "e", "x", 90_000));
    let analysis =
        NetworkFeatureExtractor::new(NetworkConfig::default()).analyze(&CommentCorpus::new(comments));

    let a = &analysis.features["a"];
    assert_eq!(a.co_degree, 3);
    assert_eq!(a.co_weighted_degree, 9.0);
    assert!((a.co_degree_centrality - 0.75).abs() < 1e-12);
    assert_eq!(a.co_clustering_coefficient, 1.0);
    assert!(a.in_clique);
    assert_eq!(a.max_clique_size, 4);
    assert!(a.eigenvector_defined && a.pagerank_defined);
    assert_eq!(a.community_size, 4);

    let e = &analysis.features["e"];
    assert_eq!(e.co_degree, 0);
    assert_eq!(e.community_size, 1);
    assert!(!e.in_clique);

    assert_eq!(analysis.cliques.len(), 1);
    assert_eq!(analysis.communities["a"], analysis.communities["d"]);
    assert_ne!(analysis.communities["a"], analysis.communities["e"]);
    let group: BTreeSet<String> = ["a", "b", "c", "d"].iter().map(|s| s.to_string()).collect();
    assert_eq!(analysis.cohesion(&group), 1.0);
}
