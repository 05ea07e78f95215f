//! Detector configuration. Validated once, then handed to each component by value.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Timing statistics, synchronized posting, campaign waves
    pub temporal: TemporalConfig,
    /// Similarity, templates, duplicates
    pub text: TextConfig,
    /// Graph construction and structural analysis
    pub network: NetworkConfig,
    /// Account age, usernames, targeting
    pub behavioral: BehavioralConfig,
    /// Clustering battery and consensus
    pub clustering: ClusteringConfig,
    /// Probability fusion and classification thresholds
    pub scoring: ScoringConfig,
    /// Logging
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TemporalConfig {
    /// Consecutive comments closer than this count toward the burst score (seconds)
    pub burst_window_secs: i64,
    /// Window used to find synchronized posting groups (seconds)
    pub sync_window_secs: i64,
    /// Length of a campaign wave after its spike hour (hours)
    pub wave_horizon_hours: i64,
    /// Z-score an hourly bin must exceed to start a wave
    pub wave_z_threshold: f64,
    /// Minimum distinct authors (sync groups) or comments (waves). Independent of
    /// `network.min_clique_size` and `clustering.min_cluster_size`; see
    /// [`DetectorConfig::with_min_cluster_size`] to set all three
    pub min_group_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TextConfig {
    /// Similarity above which a comment counts as templated
    pub similarity_threshold: f64,
    /// Edit similarity above which two comments are near-duplicates
    pub near_duplicate_threshold: f64,
    /// Vocabulary cap for the lexical vectors
    pub max_features: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Shared videos required for a co-occurrence edge
    pub min_edge_weight: u32,
    /// Modularity resolution for community detection
    pub community_resolution: f64,
    /// Comments within this span connect their authors in the proximity graph (seconds)
    pub temporal_window_secs: i64,
    /// Minimum clique size reported. Independent of the other minimum group sizes
    pub min_clique_size: usize,
    /// Minimum degree for a star center candidate
    pub star_min_degree: usize,
    /// Neighbor density below which a hub is flagged as a star
    pub star_max_neighbor_density: f64,
    /// Power-iteration cap for eigenvector centrality and PageRank
    pub centrality_max_iter: usize,
    pub centrality_tolerance: f64,
    pub pagerank_damping: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BehavioralConfig {
    /// Accounts younger than this at first comment are suspicious (days)
    pub suspicious_account_age_days: i64,
    /// Edit similarity above which two usernames count as look-alikes
    pub username_similarity_threshold: f64,
    /// Keywords searched in titles of commented videos
    pub targeting_keywords: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusteringConfig {
    /// Smallest final cluster; smaller consensus clusters become noise. Independent of
    /// the other minimum group sizes
    pub min_cluster_size: usize,
    pub min_samples: usize,
    pub cluster_selection_epsilon: f64,
    /// Minimum cluster sizes tried by the hierarchical density runs
    pub hdbscan_min_cluster_sizes: Vec<usize>,
    /// Neighborhood radii tried by the flat density runs
    pub dbscan_eps_values: Vec<f64>,
    /// Radius over (1 - consensus) for the final partition
    pub consensus_eps: f64,
    pub consensus_min_samples: usize,
    /// Project onto principal components above this many columns
    pub pca_min_dimensions: usize,
    pub pca_variance_retained: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Probability above this is suspicious (0.0–1.0)
    pub suspicious_threshold: f64,
    /// Probability above this is a likely bot
    pub bot_threshold: f64,
    /// Comments per hour considered suspicious
    pub suspicious_comment_rate: f64,
    /// Account age score below this marks a young account
    pub young_account_cutoff: f64,
    /// Share of the final probability taken from the cluster score
    pub cluster_weight: f64,
    /// Share of the final probability taken from the individual score
    pub individual_weight: f64,
    /// Columns averaged into the cluster score
    pub cluster_indicators: Vec<String>,
    pub weights: FeatureWeights,
}

/// Individual-score weights before renormalization over the features an author has.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureWeights {
    /// `burst_score`
    pub temporal_burst: f64,
    /// `template_score`
    pub text_similarity: f64,
    /// `co_degree_centrality`
    pub network_connectivity: f64,
    /// `1 - account_age_score`
    pub account_age: f64,
    /// `username_pattern_score`
    pub username_pattern: f64,
    /// `comments_per_hour / suspicious_comment_rate`, capped at 1
    pub comment_rate: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
    pub json: bool,
}

impl Default for TemporalConfig {
    fn default() -> Self {
        Self {
            burst_window_secs: 300,
            sync_window_secs: 300,
            wave_horizon_hours: 24,
            wave_z_threshold: 2.0,
            min_group_size: 3,
        }
    }
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.85,
            near_duplicate_threshold: 0.9,
            max_features: 100,
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            min_edge_weight: 2,
            community_resolution: 1.0,
            temporal_window_secs: 3600,
            min_clique_size: 3,
            star_min_degree: 10,
            star_max_neighbor_density: 0.1,
            centrality_max_iter: 100,
            centrality_tolerance: 1e-6,
            pagerank_damping: 0.85,
        }
    }
}

impl Default for BehavioralConfig {
    fn default() -> Self {
        Self {
            suspicious_account_age_days: 30,
            username_similarity_threshold: 0.7,
            targeting_keywords: [
                "trump",
                "biden",
                "democrat",
                "republican",
                "liberal",
                "conservative",
                "election",
                "vote",
                "policy",
                "government",
                "politics",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            min_cluster_size: 3,
            min_samples: 2,
            cluster_selection_epsilon: 0.3,
            hdbscan_min_cluster_sizes: vec![3, 5, 10],
            dbscan_eps_values: vec![0.3, 0.5, 0.7],
            consensus_eps: 0.5,
            consensus_min_samples: 2,
            pca_min_dimensions: 10,
            pca_variance_retained: 0.95,
        }
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            suspicious_threshold: 0.5,
            bot_threshold: 0.7,
            suspicious_comment_rate: 10.0,
            young_account_cutoff: 0.3,
            cluster_weight: 0.6,
            individual_weight: 0.4,
            cluster_indicators: [
                "automation_score",
                "username_pattern_score",
                "targeting_score",
                "template_score",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            weights: FeatureWeights::default(),
        }
    }
}

impl Default for FeatureWeights {
    fn default() -> Self {
        Self {
            temporal_burst: 0.25,
            text_similarity: 0.20,
            network_connectivity: 0.20,
            account_age: 0.15,
            username_pattern: 0.10,
            comment_rate: 0.10,
        }
    }
}

impl FeatureWeights {
    /// Feature column and weight pairs, in a fixed order.
    pub fn entries(&self) -> [(&'static str, f64); 6] {
        [
            ("burst_score", self.temporal_burst),
            ("template_score", self.text_similarity),
            ("co_degree_centrality", self.network_connectivity),
            ("account_age_score", self.account_age),
            ("username_pattern_score", self.username_pattern),
            ("comments_per_hour", self.comment_rate),
        ]
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: true,
        }
    }
}

fn unit_interval(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            value: value.to_string(),
            expected: "a value in [0, 1]".to_string(),
        })
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            value: value.to_string(),
            expected: "a positive value".to_string(),
        })
    }
}

fn at_least(field: &'static str, value: usize, min: usize) -> Result<(), ConfigError> {
    if value >= min {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            value: value.to_string(),
            expected: format!("at least {min}"),
        })
    }
}

impl DetectorConfig {
    /// Use one minimum group size for synchronized posting groups and campaign waves,
    /// reported cliques, and final clusters.
    pub fn with_min_cluster_size(mut self, size: usize) -> Self {
        self.temporal.min_group_size = size;
        self.network.min_clique_size = size;
        self.clustering.min_cluster_size = size;
        self
    }

    /// Load from JSON file if present; otherwise return default. Always validated.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let config = if path.exists() {
            let data = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                path: path.display().to_string(),
                source,
            })?;
            serde_json::from_str::<DetectorConfig>(&data).map_err(|source| ConfigError::Parse {
                path: path.display().to_string(),
                source,
            })?
        } else {
            Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject any setting the detectors cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let t = &self.temporal;
        positive("temporal.burst_window_secs", t.burst_window_secs as f64)?;
        positive("temporal.sync_window_secs", t.sync_window_secs as f64)?;
        positive("temporal.wave_horizon_hours", t.wave_horizon_hours as f64)?;
        positive("temporal.wave_z_threshold", t.wave_z_threshold)?;
        at_least("temporal.min_group_size", t.min_group_size, 2)?;

        unit_interval("text.similarity_threshold", self.text.similarity_threshold)?;
        unit_interval("text.near_duplicate_threshold", self.text.near_duplicate_threshold)?;
        at_least("text.max_features", self.text.max_features, 1)?;

        let n = &self.network;
        at_least("network.min_edge_weight", n.min_edge_weight as usize, 1)?;
        positive("network.community_resolution", n.community_resolution)?;
        positive("network.temporal_window_secs", n.temporal_window_secs as f64)?;
        at_least("network.min_clique_size", n.min_clique_size, 2)?;
        at_least("network.star_min_degree", n.star_min_degree, 2)?;
        unit_interval("network.star_max_neighbor_density", n.star_max_neighbor_density)?;
        at_least("network.centrality_max_iter", n.centrality_max_iter, 1)?;
        positive("network.centrality_tolerance", n.centrality_tolerance)?;
        unit_interval("network.pagerank_damping", n.pagerank_damping)?;

        let b = &self.behavioral;
        positive(
            "behavioral.suspicious_account_age_days",
            b.suspicious_account_age_days as f64,
        )?;
        unit_interval(
            "behavioral.username_similarity_threshold",
            b.username_similarity_threshold,
        )?;

        let c = &self.clustering;
        at_least("clustering.min_cluster_size", c.min_cluster_size, 2)?;
        at_least("clustering.min_samples", c.min_samples, 1)?;
        if !(c.cluster_selection_epsilon.is_finite() && c.cluster_selection_epsilon >= 0.0) {
            return Err(ConfigError::OutOfRange {
                field: "clustering.cluster_selection_epsilon",
                value: c.cluster_selection_epsilon.to_string(),
                expected: "a non-negative value".to_string(),
            });
        }
        if c.hdbscan_min_cluster_sizes.is_empty() && c.dbscan_eps_values.is_empty() {
            return Err(ConfigError::EmptyBattery);
        }
        for &size in &c.hdbscan_min_cluster_sizes {
            at_least("clustering.hdbscan_min_cluster_sizes", size, 2)?;
        }
        for &eps in &c.dbscan_eps_values {
            positive("clustering.dbscan_eps_values", eps)?;
        }
        positive("clustering.consensus_eps", c.consensus_eps)?;
        at_least("clustering.consensus_min_samples", c.consensus_min_samples, 1)?;
        at_least("clustering.pca_min_dimensions", c.pca_min_dimensions, 1)?;
        positive("clustering.pca_variance_retained", c.pca_variance_retained)?;
        unit_interval("clustering.pca_variance_retained", c.pca_variance_retained)?;

        let s = &self.scoring;
        unit_interval("scoring.suspicious_threshold", s.suspicious_threshold)?;
        unit_interval("scoring.bot_threshold", s.bot_threshold)?;
        if s.suspicious_threshold >= s.bot_threshold {
            return Err(ConfigError::ThresholdOrder {
                suspicious: s.suspicious_threshold,
                bot: s.bot_threshold,
            });
        }
        positive("scoring.suspicious_comment_rate", s.suspicious_comment_rate)?;
        unit_interval("scoring.young_account_cutoff", s.young_account_cutoff)?;
        unit_interval("scoring.cluster_weight", s.cluster_weight)?;
        unit_interval("scoring.individual_weight", s.individual_weight)?;
        if (s.cluster_weight + s.individual_weight - 1.0).abs() > 1e-9 {
            return Err(ConfigError::FusionWeights {
                cluster: s.cluster_weight,
                individual: s.individual_weight,
            });
        }
        let mut total = 0.0;
        for (name, weight) in s.weights.entries() {
            if !(weight.is_finite() && weight >= 0.0) {
                return Err(ConfigError::InvalidWeight {
                    feature: name,
                    weight,
                });
            }
            total += weight;
        }
        if total <= 0.0 {
            return Err(ConfigError::ZeroWeights);
        }
        Ok(())
    }
}
