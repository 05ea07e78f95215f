//! Batch orchestration: comments → features → ensemble clustering → scores → report.

use crate::clustering::{BatteryRun, EnsembleClusteringEngine, RunFailure};
use crate::comments::{AuthorId, Comment, CommentCorpus};
use crate::config::DetectorConfig;
use crate::error::ConfigError;
use crate::features::{
    BehavioralFeatureExtractor, CampaignWave, DuplicateGroups, FeatureAggregator, FeatureTable,
    NetworkAnalysis, NetworkFeatureExtractor, StarPattern, TemporalFeatureExtractor,
    TemporalFeatures, TextFeatureExtractor,
};
use crate::graph::GraphStats;
use crate::scoring::{BotScoringEngine, DetectionResult, DetectionSummary};
use chrono::{DateTime, Utc};
use ndarray::Array2;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::info;
use uuid::Uuid;

/// Clustering battery diagnostics.
#[derive(Debug, Clone, Serialize)]
pub struct ClusteringReport {
    pub runs: Vec<BatteryRun>,
    pub failures: Vec<RunFailure>,
    pub clusters: usize,
    pub noise: usize,
}

/// Everything one batch produces. Graphs and the consensus matrix are kept for
/// downstream consumers but not serialized.
#[derive(Debug, Clone, Serialize)]
pub struct DetectionReport {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub summary: DetectionSummary,
    pub results: Vec<DetectionResult>,
    pub features: FeatureTable,
    pub temporal_patterns: BTreeMap<AuthorId, TemporalFeatures>,
    pub synchronized_groups: Vec<BTreeSet<AuthorId>>,
    pub campaign_waves: Vec<CampaignWave>,
    pub duplicates: DuplicateGroups,
    pub graph_stats: GraphStats,
    pub communities: BTreeMap<AuthorId, usize>,
    pub cliques: Vec<BTreeSet<AuthorId>>,
    pub stars: Vec<StarPattern>,
    pub clustering: ClusteringReport,
    #[serde(skip)]
    pub network: NetworkAnalysis,
    #[serde(skip)]
    pub consensus: Array2<f64>,
}

impl DetectionReport {
    pub fn result(&self, author: &str) -> Option<&DetectionResult> {
        self.results.iter().find(|r| r.author_id == author)
    }
}

pub struct BotnetDetector {
    config: DetectorConfig,
}

impl BotnetDetector {
    /// Validates the configuration; no batch runs with an invalid one.
    pub fn new(config: DetectorConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    pub fn run(&self, comments: Vec<Comment>) -> DetectionReport {
        self.run_corpus(&CommentCorpus::new(comments))
    }

    pub fn run_corpus(&self, corpus: &CommentCorpus) -> DetectionReport {
        let run_id = Uuid::new_v4();
        info!(
            %run_id,
            comments = corpus.len(),
            authors = corpus.author_count(),
            "detection run started"
        );

        let temporal_extractor = TemporalFeatureExtractor::new(self.config.temporal.clone());
        let temporal = temporal_extractor.extract(corpus);
        let synchronized_groups = temporal_extractor.synchronized_groups(corpus);
        let campaign_waves = temporal_extractor.campaign_waves(corpus);

        let text_extractor = TextFeatureExtractor::new(self.config.text.clone());
        let text = text_extractor.extract(corpus);
        let duplicates = text_extractor.duplicate_groups(corpus);

        let network = NetworkFeatureExtractor::new(self.config.network.clone()).analyze(corpus);
        let behavioral = BehavioralFeatureExtractor::new(self.config.behavioral.clone()).extract(corpus);

        let features =
            FeatureAggregator::new().aggregate(&temporal, &text, &network.features, &behavioral);

        let outcome = EnsembleClusteringEngine::new(self.config.clustering.clone()).cluster_table(&features);
        let results = BotScoringEngine::new(self.config.scoring.clone()).score(&features, &outcome);
        let summary = DetectionSummary::from_results(&results, corpus.len(), |authors| {
            network.cohesion(authors)
        });

        info!(
            %run_id,
            authors = summary.total_accounts,
            clusters = summary.clusters_found,
            noise = summary.noise_points,
            likely_bots = summary.classification_counts.likely_bot,
            suspicious = summary.classification_counts.suspicious,
            "detection run complete"
        );

        DetectionReport {
            run_id,
            generated_at: Utc::now(),
            summary,
            results,
            features,
            temporal_patterns: temporal,
            synchronized_groups,
            campaign_waves,
            duplicates,
            graph_stats: network.graphs.stats(),
            communities: network.communities.clone(),
            cliques: network.cliques.clone(),
            stars: network.stars.clone(),
            clustering: ClusteringReport {
                clusters: outcome.cluster_count(),
                noise: outcome.noise_count(),
                runs: outcome.runs,
                failures: outcome.failures,
            },
            network,
            consensus: outcome.consensus,
        }
    }
}
