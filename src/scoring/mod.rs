//! Bot probability fusion and classification.

mod engine;
mod summary;

pub use engine::BotScoringEngine;
pub use summary::{ClassificationCounts, ClusterSummary, DetectionSummary, TopAccount};

use crate::clustering::ClusterLabel;
use crate::comments::AuthorId;
use crate::config::ScoringConfig;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    LikelyHuman,
    Suspicious,
    LikelyBot,
}

impl Classification {
    /// p ≤ suspicious → likely human; p ≤ bot → suspicious; above → likely bot.
    pub fn from_probability(p: f64, config: &ScoringConfig) -> Self {
        if p <= config.suspicious_threshold {
            Classification::LikelyHuman
        } else if p <= config.bot_threshold {
            Classification::Suspicious
        } else {
            Classification::LikelyBot
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Classification::LikelyHuman => "likely_human",
            Classification::Suspicious => "suspicious",
            Classification::LikelyBot => "likely_bot",
        }
    }
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Detection outcome for one author.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionResult {
    pub author_id: AuthorId,
    /// -1 when unassigned
    pub cluster_id: ClusterLabel,
    pub cluster_confidence: f64,
    pub cluster_bot_probability: f64,
    pub individual_bot_probability: f64,
    /// Always in [0, 1]
    pub final_bot_probability: f64,
    pub classification: Classification,
}
