//! Cluster-level and per-author scores fused into a final probability.

use super::{Classification, DetectionResult};
use crate::clustering::{ClusterLabel, EnsembleOutcome, NOISE};
use crate::config::ScoringConfig;
use crate::features::{FeatureTable, FeatureVector};
use std::collections::BTreeMap;
use tracing::info;

/// Share of the members defining `column` whose value is flagged; `None` when none do.
fn share(rows: &[&FeatureVector], column: &str, flagged: impl Fn(f64) -> bool) -> Option<f64> {
    let values: Vec<f64> = rows.iter().filter_map(|r| r.get(column)).collect();
    if values.is_empty() {
        return None;
    }
    Some(values.iter().filter(|&&v| flagged(v)).count() as f64 / values.len() as f64)
}

pub struct BotScoringEngine {
    config: ScoringConfig,
}

impl BotScoringEngine {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Score per non-noise cluster: the mean of each indicator column over members,
    /// plus the share of members above the suspicious comment rate and the share of
    /// young accounts, averaged. Undefined values are left out of every mean and share;
    /// an indicator no member defines is dropped.
    pub fn cluster_scores(
        &self,
        rows: &[&FeatureVector],
        labels: &[ClusterLabel],
    ) -> BTreeMap<ClusterLabel, f64> {
        let mut members: BTreeMap<ClusterLabel, Vec<&FeatureVector>> = BTreeMap::new();
        for (row, &label) in rows.iter().zip(labels) {
            if label != NOISE {
                members.entry(label).or_default().push(*row);
            }
        }

        members
            .into_iter()
            .map(|(label, rows)| (label, self.cluster_score(&rows)))
            .collect()
    }

    fn cluster_score(&self, rows: &[&FeatureVector]) -> f64 {
        let mut indicators = Vec::new();
        for column in &self.config.cluster_indicators {
            let values: Vec<f64> = rows
                .iter()
                .filter_map(|r| r.get(column))
                .filter(|v| v.is_finite())
                .collect();
            if !values.is_empty() {
                indicators.push(values.iter().sum::<f64>() / values.len() as f64);
            }
        }
        let rate = self.config.suspicious_comment_rate;
        let cutoff = self.config.young_account_cutoff;
        indicators.extend(share(rows, "comments_per_hour", |v| v > rate));
        indicators.extend(share(rows, "account_age_score", |v| v < cutoff));
        if indicators.is_empty() {
            return 0.0;
        }

        let mean = indicators.iter().sum::<f64>() / indicators.len() as f64;
        mean.clamp(0.0, 1.0)
    }

    /// Weighted average of the weighted features this author has, weights renormalized
    /// over those features. Account age is inverted and comment rate capped at 1.
    pub fn individual_score(&self, row: &FeatureVector) -> f64 {
        let mut total = 0.0;
        let mut weight_sum = 0.0;
        for (column, weight) in self.config.weights.entries() {
            let Some(mut value) = row.get(column) else {
                continue;
            };
            match column {
                "account_age_score" => value = 1.0 - value,
                "comments_per_hour" => {
                    value = (value / self.config.suspicious_comment_rate).min(1.0)
                }
                _ => {}
            }
            if !value.is_finite() {
                continue;
            }
            total += weight * value;
            weight_sum += weight;
        }
        if weight_sum > 0.0 {
            (total / weight_sum).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// cluster_weight × cluster score + individual_weight × individual score, in [0, 1].
    pub fn fuse(&self, cluster: f64, individual: f64) -> f64 {
        let p = self.config.cluster_weight * cluster + self.config.individual_weight * individual;
        if p.is_finite() {
            p.clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// One result per table row; `outcome` rows must follow table author order.
    pub fn score(&self, table: &FeatureTable, outcome: &EnsembleOutcome) -> Vec<DetectionResult> {
        let rows: Vec<&FeatureVector> = table.rows().collect();
        let cluster_scores = self.cluster_scores(&rows, &outcome.labels);

        let results: Vec<DetectionResult> = rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let cluster_id = outcome.labels.get(i).copied().unwrap_or(NOISE);
                let cluster_bot_probability = cluster_scores.get(&cluster_id).copied().unwrap_or(0.0);
                let individual_bot_probability = self.individual_score(row);
                let final_bot_probability =
                    self.fuse(cluster_bot_probability, individual_bot_probability);
                DetectionResult {
                    author_id: row.author_id.clone(),
                    cluster_id,
                    cluster_confidence: outcome.confidence.get(i).copied().unwrap_or(0.0),
                    cluster_bot_probability,
                    individual_bot_probability,
                    final_bot_probability,
                    classification: Classification::from_probability(
                        final_bot_probability,
                        &self.config,
                    ),
                }
            })
            .collect();

        let bots = results
            .iter()
            .filter(|r| r.classification == Classification::LikelyBot)
            .count();
        let suspicious = results
            .iter()
            .filter(|r| r.classification == Classification::Suspicious)
            .count();
        info!(
            authors = results.len(),
            bots,
            suspicious,
            humans = results.len() - bots - suspicious,
            "scoring complete"
        );
        results
    }
}
