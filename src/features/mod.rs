//! Per-author feature extraction: temporal, text, network and behavioral signals,
//! joined into one [`FeatureTable`].

pub mod behavioral;
pub mod lexicon;
pub mod network;
pub mod pipeline;
pub mod similarity;
pub mod temporal;
pub mod text;

pub use behavioral::{BehavioralFeatureExtractor, BehavioralFeatures};
pub use network::{NetworkAnalysis, NetworkFeatureExtractor, NetworkFeatures, StarPattern};
pub use pipeline::{clustering_columns, FeatureAggregator, FeatureTable, FeatureVector, COLUMNS};
pub use similarity::{SimilarityMatrix, SimilarityMethod};
pub use temporal::{CampaignWave, TemporalFeatureExtractor, TemporalFeatures};
pub use text::{DuplicateGroups, TextFeatureExtractor, TextFeatures};
