//! Batch-level summary of detection results.

use super::{Classification, DetectionResult};
use crate::clustering::{ClusterLabel, NOISE};
use crate::comments::AuthorId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

const HIGH_CONFIDENCE: f64 = 0.9;
const TOP_ACCOUNTS: usize = 10;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationCounts {
    pub likely_human: usize,
    pub suspicious: usize,
    pub likely_bot: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopAccount {
    pub author_id: AuthorId,
    pub final_bot_probability: f64,
    pub cluster_id: ClusterLabel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterSummary {
    pub cluster_id: ClusterLabel,
    pub size: usize,
    pub mean_bot_probability: f64,
    pub likely_bot_count: usize,
    /// Co-occurrence cohesion of the members
    pub cohesion: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionSummary {
    pub total_accounts: usize,
    pub total_comments: usize,
    pub classification_counts: ClassificationCounts,
    pub mean_bot_probability: f64,
    pub high_confidence_bots: usize,
    pub clusters_found: usize,
    pub noise_points: usize,
    pub top_accounts: Vec<TopAccount>,
    /// Sorted by mean probability, highest first
    pub cluster_statistics: Vec<ClusterSummary>,
}

impl DetectionSummary {
    /// `cohesion` scores an author group; clusters are summarized in descending
    /// mean probability.
    pub fn from_results(
        results: &[DetectionResult],
        total_comments: usize,
        cohesion: impl Fn(&BTreeSet<AuthorId>) -> f64,
    ) -> Self {
        let mut counts = ClassificationCounts::default();
        for r in results {
            match r.classification {
                Classification::LikelyHuman => counts.likely_human += 1,
                Classification::Suspicious => counts.suspicious += 1,
                Classification::LikelyBot => counts.likely_bot += 1,
            }
        }
        let mean_bot_probability = if results.is_empty() {
            0.0
        } else {
            results.iter().map(|r| r.final_bot_probability).sum::<f64>() / results.len() as f64
        };

        let mut ranked: Vec<&DetectionResult> = results.iter().collect();
        ranked.sort_by(|a, b| {
            b.final_bot_probability
                .total_cmp(&a.final_bot_probability)
                .then_with(|| a.author_id.cmp(&b.author_id))
        });
        let top_accounts = ranked
            .iter()
            .take(TOP_ACCOUNTS)
            .map(|r| TopAccount {
                author_id: r.author_id.clone(),
                final_bot_probability: r.final_bot_probability,
                cluster_id: r.cluster_id,
            })
            .collect();

        let mut clusters: BTreeMap<ClusterLabel, Vec<&DetectionResult>> = BTreeMap::new();
        for r in results.iter().filter(|r| r.cluster_id != NOISE) {
            clusters.entry(r.cluster_id).or_default().push(r);
        }
        let mut cluster_statistics: Vec<ClusterSummary> = clusters
            .iter()
            .map(|(&cluster_id, members)| {
                let authors: BTreeSet<AuthorId> =
                    members.iter().map(|r| r.author_id.clone()).collect();
                ClusterSummary {
                    cluster_id,
                    size: members.len(),
                    mean_bot_probability: members
                        .iter()
                        .map(|r| r.final_bot_probability)
                        .sum::<f64>()
                        / members.len() as f64,
                    likely_bot_count: members
                        .iter()
                        .filter(|r| r.classification == Classification::LikelyBot)
                        .count(),
                    cohesion: cohesion(&authors),
                }
            })
            .collect();
        cluster_statistics.sort_by(|a, b| {
            b.mean_bot_probability
                .total_cmp(&a.mean_bot_probability)
                .then_with(|| a.cluster_id.cmp(&b.cluster_id))
        });

        Self {
            total_accounts: results.len(),
            total_comments,
            classification_counts: counts,
            mean_bot_probability,
            high_confidence_bots: results
                .iter()
                .filter(|r| r.final_bot_probability > HIGH_CONFIDENCE)
                .count(),
            clusters_found: clusters.len(),
            noise_points: results.iter().filter(|r| r.cluster_id == NOISE).count(),
            top_accounts,
            cluster_statistics,
        }
    }
}
