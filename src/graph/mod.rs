//! Author graphs and the structural algorithms run over them.
//!
//! Three graphs share the same node set (every author in the corpus):
//! - co-occurrence: undirected, weight = shared videos, pruned below a minimum weight
//! - reply: directed replier → parent author, weight = reply count
//! - temporal proximity: undirected, weight = comment pairs inside the time window

pub mod centrality;
pub mod cliques;
pub mod community;

use crate::comments::{AuthorId, CommentCorpus};
use crate::config::NetworkConfig;
use chrono::Duration;
use petgraph::graph::{Graph, NodeIndex};
use petgraph::{Directed, Direction, EdgeType, Undirected};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::info;

/// Graph over authors, nodes inserted in ascending author order.
#[derive(Debug, Clone)]
pub struct AuthorGraph<Ty: EdgeType> {
    pub graph: Graph<AuthorId, u32, Ty>,
    index: HashMap<AuthorId, NodeIndex>,
}

pub type UndirectedAuthorGraph = AuthorGraph<Undirected>;
pub type DirectedAuthorGraph = AuthorGraph<Directed>;

impl<Ty: EdgeType> AuthorGraph<Ty> {
    fn with_authors<'a>(authors: impl Iterator<Item = &'a str>) -> Self {
        let mut graph = Graph::default();
        let mut index = HashMap::new();
        for author in authors {
            let idx = graph.add_node(author.to_string());
            index.insert(author.to_string(), idx);
        }
        Self { graph, index }
    }

    fn add_weight(&mut self, a: &str, b: &str, weight: u32) {
        let (Some(&ia), Some(&ib)) = (self.index.get(a), self.index.get(b)) else {
            return;
        };
        match self.graph.find_edge(ia, ib) {
            Some(e) => self.graph[e] += weight,
            None => {
                self.graph.add_edge(ia, ib, weight);
            }
        }
    }

    pub fn node(&self, author: &str) -> Option<NodeIndex> {
        self.index.get(author).copied()
    }

    pub fn author(&self, idx: NodeIndex) -> &str {
        &self.graph[idx]
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn weight(&self, a: &str, b: &str) -> Option<u32> {
        let (ia, ib) = (self.node(a)?, self.node(b)?);
        self.graph.find_edge(ia, ib).map(|e| self.graph[e])
    }

    /// Edges as (author, author, weight), in insertion order.
    pub fn edges(&self) -> Vec<(&str, &str, u32)> {
        self.graph
            .raw_edges()
            .iter()
            .map(|e| {
                (
                    self.graph[e.source()].as_str(),
                    self.graph[e.target()].as_str(),
                    e.weight,
                )
            })
            .collect()
    }
}

impl AuthorGraph<Undirected> {
    pub fn degree(&self, author: &str) -> usize {
        self.node(author)
            .map(|i| self.graph.neighbors(i).count())
            .unwrap_or(0)
    }

    pub fn neighbors(&self, author: &str) -> BTreeSet<&str> {
        self.node(author)
            .map(|i| self.graph.neighbors(i).map(|n| self.author(n)).collect())
            .unwrap_or_default()
    }
}

impl AuthorGraph<Directed> {
    pub fn out_degree(&self, author: &str) -> usize {
        self.node(author)
            .map(|i| self.graph.neighbors_directed(i, Direction::Outgoing).count())
            .unwrap_or(0)
    }

    pub fn in_degree(&self, author: &str) -> usize {
        self.node(author)
            .map(|i| self.graph.neighbors_directed(i, Direction::Incoming).count())
            .unwrap_or(0)
    }
}

/// Weighted neighbor lists indexed by node position; the working form for the algorithms.
#[derive(Debug, Clone, Default)]
pub struct Adjacency {
    pub neighbors: Vec<Vec<(usize, f64)>>,
}

impl Adjacency {
    pub fn from_graph(g: &UndirectedAuthorGraph) -> Self {
        let mut neighbors = vec![Vec::new(); g.node_count()];
        for e in g.graph.raw_edges() {
            let (a, b) = (e.source().index(), e.target().index());
            if a == b {
                continue;
            }
            neighbors[a].push((b, e.weight as f64));
            neighbors[b].push((a, e.weight as f64));
        }
        for list in &mut neighbors {
            list.sort_by_key(|&(n, _)| n);
        }
        Self { neighbors }
    }

    pub fn len(&self) -> usize {
        self.neighbors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.neighbors.is_empty()
    }

    pub fn degree(&self, node: usize) -> usize {
        self.neighbors[node].len()
    }

    pub fn edge_count(&self) -> usize {
        self.neighbors.iter().map(Vec::len).sum::<usize>() / 2
    }

    pub fn neighbor_sets(&self) -> Vec<BTreeSet<usize>> {
        self.neighbors
            .iter()
            .map(|l| l.iter().map(|&(n, _)| n).collect())
            .collect()
    }
}

/// The three author graphs built from one corpus.
#[derive(Debug, Clone)]
pub struct AuthorGraphs {
    pub co_occurrence: UndirectedAuthorGraph,
    pub reply: DirectedAuthorGraph,
    pub temporal: UndirectedAuthorGraph,
}

/// Edge counts for reporting.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct GraphStats {
    pub nodes: usize,
    pub co_occurrence_edges: usize,
    pub reply_edges: usize,
    pub temporal_edges: usize,
}

impl AuthorGraphs {
    pub fn stats(&self) -> GraphStats {
        GraphStats {
            nodes: self.co_occurrence.node_count(),
            co_occurrence_edges: self.co_occurrence.edge_count(),
            reply_edges: self.reply.edge_count(),
            temporal_edges: self.temporal.edge_count(),
        }
    }
}

pub struct NetworkGraphBuilder {
    config: NetworkConfig,
}

impl NetworkGraphBuilder {
    pub fn new(config: NetworkConfig) -> Self {
        Self { config }
    }

    pub fn build(&self, corpus: &CommentCorpus) -> AuthorGraphs {
        AuthorGraphs {
            co_occurrence: self.co_occurrence(corpus),
            reply: self.reply(corpus),
            temporal: self.temporal_proximity(corpus),
        }
    }

    /// Edge per author pair sharing at least `min_edge_weight` videos.
    pub fn co_occurrence(&self, corpus: &CommentCorpus) -> UndirectedAuthorGraph {
        let mut by_video: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
        for c in corpus.comments() {
            by_video
                .entry(c.video_id.as_str())
                .or_default()
                .insert(c.author_id.as_str());
        }

        let mut pair_weights: BTreeMap<(&str, &str), u32> = BTreeMap::new();
        for authors in by_video.values() {
            let authors: Vec<&str> = authors.iter().copied().collect();
            for i in 0..authors.len() {
                for j in (i + 1)..authors.len() {
                    *pair_weights.entry((authors[i], authors[j])).or_default() += 1;
                }
            }
        }

        let mut g = AuthorGraph::with_authors(corpus.authors());
        for ((a, b), w) in pair_weights {
            if w >= self.config.min_edge_weight {
                g.add_weight(a, b, w);
            }
        }
        info!(
            nodes = g.node_count(),
            edges = g.edge_count(),
            "built co-occurrence network"
        );
        g
    }

    /// Directed edge from each replier to the author of the parent comment.
    pub fn reply(&self, corpus: &CommentCorpus) -> DirectedAuthorGraph {
        let mut g = AuthorGraph::with_authors(corpus.authors());
        for c in corpus.comments().iter().filter(|c| c.is_reply) {
            let Some(parent) = c.parent_id.as_deref().and_then(|p| corpus.get(p)) else {
                continue;
            };
            if parent.author_id != c.author_id {
                g.add_weight(&c.author_id, &parent.author_id, 1);
            }
        }
        info!(
            nodes = g.node_count(),
            edges = g.edge_count(),
            "built reply network"
        );
        g
    }

    /// Authors of comments within the window of each other, from one sorted sweep.
    pub fn temporal_proximity(&self, corpus: &CommentCorpus) -> UndirectedAuthorGraph {
        let comments = corpus.comments();
        let window = Duration::seconds(self.config.temporal_window_secs);
        let mut g = AuthorGraph::with_authors(corpus.authors());
        for (i, anchor) in comments.iter().enumerate() {
            for next in &comments[i + 1..] {
                if next.published_at - anchor.published_at > window {
                    break;
                }
                if next.author_id != anchor.author_id {
                    g.add_weight(&anchor.author_id, &next.author_id, 1);
                }
            }
        }
        info!(
            nodes = g.node_count(),
            edges = g.edge_count(),
            "built temporal proximity network"
        );
        g
    }
}
