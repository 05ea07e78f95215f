//! Per-author network features over the co-occurrence, reply and temporal graphs.

use crate::comments::{AuthorId, CommentCorpus};
use crate::config::NetworkConfig;
use crate::graph::centrality::{
    betweenness_centrality, clustering_coefficient, degree_centrality, eigenvector_centrality,
    pagerank, weighted_degree,
};
use crate::graph::cliques::{cohesion, maximal_cliques, star_patterns};
use crate::graph::community::{community_sizes, louvain};
use crate::graph::{Adjacency, AuthorGraphs, NetworkGraphBuilder};
use petgraph::graph::NodeIndex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{info, warn};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkFeatures {
    pub co_degree: usize,
    pub co_weighted_degree: f64,
    pub co_degree_centrality: f64,
    pub co_betweenness_centrality: f64,
    /// 0 when undefined; see `eigenvector_defined`
    pub co_eigenvector_centrality: f64,
    /// 0 when undefined; see `pagerank_defined`
    pub co_pagerank: f64,
    pub co_clustering_coefficient: f64,
    pub co_neighbor_count: usize,
    pub eigenvector_defined: bool,
    pub pagerank_defined: bool,
    pub community_id: usize,
    pub community_size: usize,
    pub replies_sent: usize,
    pub replies_received: usize,
    pub temporal_degree: usize,
    pub in_clique: bool,
    pub max_clique_size: usize,
    pub is_star_center: bool,
    pub in_star_pattern: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StarPattern {
    pub center: AuthorId,
    pub neighbors: BTreeSet<AuthorId>,
    pub neighbor_density: f64,
}

/// Graphs plus the structures derived from them, kept for reporting.
#[derive(Debug, Clone)]
pub struct NetworkAnalysis {
    pub graphs: AuthorGraphs,
    pub features: BTreeMap<AuthorId, NetworkFeatures>,
    pub communities: BTreeMap<AuthorId, usize>,
    /// Cliques of at least the configured size, largest first
    pub cliques: Vec<BTreeSet<AuthorId>>,
    pub stars: Vec<StarPattern>,
    co_adjacency: Adjacency,
}

impl NetworkAnalysis {
    /// Cohesion of an author group on the co-occurrence graph; unknown authors are ignored.
    pub fn cohesion(&self, authors: &BTreeSet<AuthorId>) -> f64 {
        let members: BTreeSet<usize> = authors
            .iter()
            .filter_map(|a| self.graphs.co_occurrence.node(a))
            .map(NodeIndex::index)
            .collect();
        cohesion(&self.co_adjacency, &members)
    }
}

pub struct NetworkFeatureExtractor {
    config: NetworkConfig,
}

impl NetworkFeatureExtractor {
    pub fn new(config: NetworkConfig) -> Self {
        Self { config }
    }

    pub fn analyze(&self, corpus: &CommentCorpus) -> NetworkAnalysis {
        let graphs = NetworkGraphBuilder::new(self.config.clone()).build(corpus);
        let co = &graphs.co_occurrence;
        let adj = Adjacency::from_graph(co);
        let n = adj.len();

        let degree_c = degree_centrality(&adj);
        let weighted = weighted_degree(&adj);
        let betweenness = betweenness_centrality(&adj);
        let clustering = clustering_coefficient(&adj);
        let eigenvector = match eigenvector_centrality(
            &adj,
            self.config.centrality_max_iter,
            self.config.centrality_tolerance,
        ) {
            Ok(v) => Some(v),
            Err(e) => {
                warn!(error = %e, "eigenvector centrality unavailable; marking undefined");
                None
            }
        };
        let pr = match pagerank(
            &adj,
            self.config.pagerank_damping,
            self.config.centrality_max_iter,
            self.config.centrality_tolerance,
        ) {
            Ok(v) => Some(v),
            Err(e) => {
                warn!(error = %e, "pagerank unavailable; marking undefined");
                None
            }
        };

        let membership = louvain(&adj, self.config.community_resolution);
        let sizes = community_sizes(&membership);

        let cliques: Vec<Vec<usize>> = maximal_cliques(&adj)
            .into_iter()
            .filter(|c| c.len() >= self.config.min_clique_size)
            .collect();
        let mut max_clique = vec![0usize; n];
        for clique in &cliques {
            for &v in clique {
                max_clique[v] = max_clique[v].max(clique.len());
            }
        }

        let stars = star_patterns(
            &adj,
            self.config.star_min_degree,
            self.config.star_max_neighbor_density,
        );
        let mut star_center = vec![false; n];
        let mut in_star = vec![false; n];
        for star in &stars {
            star_center[star.center] = true;
            in_star[star.center] = true;
            for &leaf in &star.leaves {
                in_star[leaf] = true;
            }
        }

        let mut features = BTreeMap::new();
        let mut communities = BTreeMap::new();
        for idx in co.graph.node_indices() {
            let v = idx.index();
            let author = co.author(idx);
            let community = membership[v];
            communities.insert(author.to_string(), community);
            features.insert(
                author.to_string(),
                NetworkFeatures {
                    co_degree: adj.degree(v),
                    co_weighted_degree: weighted[v],
                    co_degree_centrality: degree_c[v],
                    co_betweenness_centrality: betweenness[v],
                    co_eigenvector_centrality: eigenvector.as_ref().map_or(0.0, |e| e[v]),
                    co_pagerank: pr.as_ref().map_or(0.0, |p| p[v]),
                    co_clustering_coefficient: clustering[v],
                    co_neighbor_count: adj.degree(v),
                    eigenvector_defined: eigenvector.is_some(),
                    pagerank_defined: pr.is_some(),
                    community_id: community,
                    community_size: sizes.get(&community).copied().unwrap_or(0),
                    replies_sent: graphs.reply.out_degree(author),
                    replies_received: graphs.reply.in_degree(author),
                    temporal_degree: graphs.temporal.degree(author),
                    in_clique: max_clique[v] > 0,
                    max_clique_size: max_clique[v],
                    is_star_center: star_center[v],
                    in_star_pattern: in_star[v],
                },
            );
        }

        let name = |v: usize| co.author(NodeIndex::new(v)).to_string();
        let cliques: Vec<BTreeSet<AuthorId>> = cliques
            .iter()
            .map(|c| c.iter().map(|&v| name(v)).collect())
            .collect();
        let stars: Vec<StarPattern> = stars
            .iter()
            .map(|s| StarPattern {
                center: name(s.center),
                neighbors: s.leaves.iter().map(|&v| name(v)).collect(),
                neighbor_density: s.neighbor_density,
            })
            .collect();

        info!(
            authors = n,
            communities = sizes.len(),
            cliques = cliques.len(),
            stars = stars.len(),
            "network features extracted"
        );

        NetworkAnalysis {
            graphs,
            features,
            communities,
            cliques,
            stars,
            co_adjacency: adj,
        }
    }
}
