//! Botnet detector: unsupervised detection of coordinated commenting accounts.
//!
//! Modular structure:
//! - [`comments`] - Comment records and the author-indexed corpus
//! - [`features`] - Temporal, text, network and behavioral feature extraction
//! - [`graph`] - Author graphs, centrality, communities, cliques and stars
//! - [`clustering`] - Density clustering battery and consensus
//! - [`scoring`] - Bot probability fusion and classification
//! - [`detector`] - Batch orchestration
//! - [`logging`] - Structured JSON logging

pub mod clustering;
pub mod comments;
pub mod config;
pub mod detector;
pub mod error;
pub mod features;
pub mod graph;
pub mod logging;
pub mod scoring;

pub use clustering::{ClusterLabel, EnsembleClusteringEngine, NOISE};
pub use comments::{Comment, CommentCorpus};
pub use config::DetectorConfig;
pub use detector::{BotnetDetector, DetectionReport};
pub use error::{ClusteringError, ConfigError, DetectorError, DetectorResult, GraphError};
pub use features::{FeatureAggregator, FeatureTable, FeatureVector};
pub use logging::StructuredLogger;
pub use scoring::{BotScoringEngine, Classification, DetectionResult, DetectionSummary};
