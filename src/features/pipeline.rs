//! Feature aggregation: the four extractor outputs → one complete numeric row per author.

use super::behavioral::BehavioralFeatures;
use super::network::NetworkFeatures;
use super::temporal::TemporalFeatures;
use super::text::TextFeatures;
use crate::comments::AuthorId;
use ndarray::Array2;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info};

/// Every column of a [`FeatureVector`], in table order. Where two extractors produce the
/// same column the earlier one wins (temporal, text, network, behavioral).
pub const COLUMNS: &[&str] = &[
    "comment_count",
    "active_period_hours",
    "comments_per_hour",
    "most_active_hour",
    "hour_entropy",
    "most_active_day",
    "day_entropy",
    "mean_interval_seconds",
    "std_interval_seconds",
    "min_interval_seconds",
    "max_interval_seconds",
    "burst_score",
    "regularity_score",
    "total_comments",
    "avg_comment_length",
    "std_comment_length",
    "vocabulary_size",
    "vocabulary_richness",
    "flesch_reading_ease",
    "flesch_kincaid_grade",
    "avg_sentiment_compound",
    "std_sentiment_compound",
    "avg_sentiment_positive",
    "avg_sentiment_negative",
    "avg_sentiment_neutral",
    "exclamation_ratio",
    "question_ratio",
    "caps_ratio",
    "emoji_count",
    "url_count",
    "repeated_words_ratio",
    "repeated_phrases_count",
    "template_score",
    "spam_score",
    "diversity_score",
    "co_degree",
    "co_weighted_degree",
    "co_degree_centrality",
    "co_betweenness_centrality",
    "co_eigenvector_centrality",
    "co_pagerank",
    "co_clustering_coefficient",
    "co_neighbor_count",
    "community_id",
    "community_size",
    "replies_sent",
    "replies_received",
    "temporal_degree",
    "in_clique",
    "max_clique_size",
    "is_star_center",
    "in_star_pattern",
    "subscriber_count",
    "video_count",
    "total_views",
    "views_per_video",
    "subscriber_view_ratio",
    "unique_videos_commented",
    "comments_per_video",
    "total_likes_received",
    "avg_likes_per_comment",
    "zero_like_ratio",
    "reply_ratio",
    "account_age_score",
    "username_pattern_score",
    "automation_score",
    "targeting_score",
];

/// Identifier-like columns left out of clustering input.
pub const NON_CLUSTERING_COLUMNS: &[&str] = &["community_id"];

pub fn column_index(name: &str) -> Option<usize> {
    COLUMNS.iter().position(|c| *c == name)
}

/// Columns fed to the clustering battery.
pub fn clustering_columns() -> Vec<&'static str> {
    COLUMNS
        .iter()
        .copied()
        .filter(|c| !NON_CLUSTERING_COLUMNS.contains(c))
        .collect()
}

/// One author's complete feature row. Values align with [`COLUMNS`].
///
/// `undefined` lists the columns holding a neutral default rather than a measurement:
/// absent channel statistics, an unknown account age, interval scores of authors with
/// a single comment, centralities that did not converge. The stored value still feeds
/// clustering; scoring skips it.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    pub author_id: AuthorId,
    pub values: Vec<f64>,
    pub undefined: BTreeSet<&'static str>,
}

impl FeatureVector {
    /// Value of a column. `None` for unknown and undefined columns.
    pub fn get(&self, name: &str) -> Option<f64> {
        if self.undefined.contains(name) {
            return None;
        }
        column_index(name).map(|i| self.values[i])
    }

    /// Stored column value, neutral defaults included; 0 for unknown columns.
    pub fn value(&self, name: &str) -> f64 {
        column_index(name).map_or(0.0, |i| self.values[i])
    }

    pub fn is_defined(&self, name: &str) -> bool {
        column_index(name).is_some() && !self.undefined.contains(name)
    }
}

impl Serialize for FeatureVector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(COLUMNS.len() + 2))?;
        map.serialize_entry("author_id", &self.author_id)?;
        for (name, value) in COLUMNS.iter().zip(&self.values) {
            map.serialize_entry(name, value)?;
        }
        map.serialize_entry("undefined", &self.undefined)?;
        map.end()
    }
}

/// Author → feature row, ordered by author id.
#[derive(Debug, Clone, Default)]
pub struct FeatureTable {
    rows: BTreeMap<AuthorId, FeatureVector>,
}

impl FeatureTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, author: &str) -> Option<&FeatureVector> {
        self.rows.get(author)
    }

    pub fn authors(&self) -> impl Iterator<Item = &str> + '_ {
        self.rows.keys().map(String::as_str)
    }

    pub fn rows(&self) -> impl Iterator<Item = &FeatureVector> + '_ {
        self.rows.values()
    }

    pub fn insert(&mut self, row: FeatureVector) {
        self.rows.insert(row.author_id.clone(), row);
    }

    pub fn column(&self, name: &str) -> Vec<f64> {
        self.rows.values().map(|r| r.value(name)).collect()
    }

    /// Authors × columns matrix in author order. Unknown columns are skipped.
    pub fn matrix(&self, columns: &[&str]) -> Array2<f64> {
        let idx: Vec<usize> = columns.iter().filter_map(|c| column_index(c)).collect();
        let mut m = Array2::<f64>::zeros((self.rows.len(), idx.len()));
        for (r, row) in self.rows.values().enumerate() {
            for (c, &i) in idx.iter().enumerate() {
                m[[r, c]] = row.values[i];
            }
        }
        m
    }
}

impl Serialize for FeatureTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.rows.values())
    }
}

/// One column value. `defined: false` marks a neutral default.
#[derive(Debug, Clone, Copy)]
struct Cell {
    value: f64,
    defined: bool,
}

fn cell(value: f64, defined: bool) -> Cell {
    Cell { value, defined }
}

fn known(value: f64) -> Cell {
    cell(value, true)
}

fn optional(value: Option<f64>) -> Cell {
    cell(value.unwrap_or(0.0), value.is_some())
}

fn flag(b: bool) -> Cell {
    known(if b { 1.0 } else { 0.0 })
}

/// Source of named columns for one author.
trait FeatureSource {
    fn columns(&self) -> Vec<(&'static str, Cell)>;
}

impl FeatureSource for TemporalFeatures {
    fn columns(&self) -> Vec<(&'static str, Cell)> {
        // rates and interval scores need two timestamps
        let timed = self.comment_count >= 2;
        vec![
            ("comment_count", known(self.comment_count as f64)),
            ("active_period_hours", known(self.active_period_hours)),
            ("comments_per_hour", cell(self.comments_per_hour, timed)),
            ("most_active_hour", known(self.most_active_hour as f64)),
            ("hour_entropy", known(self.hour_entropy)),
            ("most_active_day", known(self.most_active_day as f64)),
            ("day_entropy", known(self.day_entropy)),
            ("mean_interval_seconds", known(self.mean_interval_seconds)),
            ("std_interval_seconds", known(self.std_interval_seconds)),
            ("min_interval_seconds", known(self.min_interval_seconds)),
            ("max_interval_seconds", known(self.max_interval_seconds)),
            ("burst_score", cell(self.burst_score, timed)),
            ("regularity_score", cell(self.regularity_score, timed)),
        ]
    }
}

impl FeatureSource for TextFeatures {
    fn columns(&self) -> Vec<(&'static str, Cell)> {
        vec![
            ("total_comments", known(self.total_comments as f64)),
            ("avg_comment_length", known(self.avg_comment_length)),
            ("std_comment_length", known(self.std_comment_length)),
            ("vocabulary_size", known(self.vocabulary_size as f64)),
            ("vocabulary_richness", known(self.vocabulary_richness)),
            ("flesch_reading_ease", known(self.flesch_reading_ease)),
            ("flesch_kincaid_grade", known(self.flesch_kincaid_grade)),
            ("avg_sentiment_compound", known(self.avg_sentiment_compound)),
            ("std_sentiment_compound", known(self.std_sentiment_compound)),
            ("avg_sentiment_positive", known(self.avg_sentiment_positive)),
            ("avg_sentiment_negative", known(self.avg_sentiment_negative)),
            ("avg_sentiment_neutral", known(self.avg_sentiment_neutral)),
            ("exclamation_ratio", known(self.exclamation_ratio)),
            ("question_ratio", known(self.question_ratio)),
            ("caps_ratio", known(self.caps_ratio)),
            ("emoji_count", known(self.emoji_count as f64)),
            ("url_count", known(self.url_count as f64)),
            ("repeated_words_ratio", known(self.repeated_words_ratio)),
            ("repeated_phrases_count", known(self.repeated_phrases_count as f64)),
            ("template_score", known(self.template_score)),
            ("spam_score", known(self.spam_score)),
            ("diversity_score", known(self.diversity_score)),
        ]
    }
}

impl FeatureSource for NetworkFeatures {
    fn columns(&self) -> Vec<(&'static str, Cell)> {
        vec![
            ("co_degree", known(self.co_degree as f64)),
            ("co_weighted_degree", known(self.co_weighted_degree)),
            ("co_degree_centrality", known(self.co_degree_centrality)),
            ("co_betweenness_centrality", known(self.co_betweenness_centrality)),
            (
                "co_eigenvector_centrality",
                cell(self.co_eigenvector_centrality, self.eigenvector_defined),
            ),
            ("co_pagerank", cell(self.co_pagerank, self.pagerank_defined)),
            ("co_clustering_coefficient", known(self.co_clustering_coefficient)),
            ("co_neighbor_count", known(self.co_neighbor_count as f64)),
            ("community_id", known(self.community_id as f64)),
            ("community_size", known(self.community_size as f64)),
            ("replies_sent", known(self.replies_sent as f64)),
            ("replies_received", known(self.replies_received as f64)),
            ("temporal_degree", known(self.temporal_degree as f64)),
            ("in_clique", flag(self.in_clique)),
            ("max_clique_size", known(self.max_clique_size as f64)),
            ("is_star_center", flag(self.is_star_center)),
            ("in_star_pattern", flag(self.in_star_pattern)),
        ]
    }
}

impl FeatureSource for BehavioralFeatures {
    fn columns(&self) -> Vec<(&'static str, Cell)> {
        vec![
            ("subscriber_count", optional(self.subscriber_count.map(|v| v as f64))),
            ("video_count", optional(self.video_count.map(|v| v as f64))),
            ("total_views", optional(self.total_views.map(|v| v as f64))),
            ("views_per_video", optional(self.views_per_video)),
            ("subscriber_view_ratio", optional(self.subscriber_view_ratio)),
            ("total_comments", known(self.total_comments as f64)),
            ("unique_videos_commented", known(self.unique_videos_commented as f64)),
            ("comments_per_video", known(self.comments_per_video)),
            ("total_likes_received", known(self.total_likes_received as f64)),
            ("avg_likes_per_comment", known(self.avg_likes_per_comment)),
            ("zero_like_ratio", known(self.zero_like_ratio)),
            ("reply_ratio", known(self.reply_ratio)),
            (
                "account_age_score",
                cell(self.account_age_score, self.account_age_known),
            ),
            ("username_pattern_score", known(self.username_pattern_score)),
            ("automation_score", cell(self.automation_score, self.total_comments >= 2)),
            ("targeting_score", known(self.targeting_score)),
        ]
    }
}

/// Outer join of the extractor outputs on author id.
#[derive(Debug, Default)]
pub struct FeatureAggregator;

impl FeatureAggregator {
    pub fn new() -> Self {
        Self
    }

    /// One row per author found in any input. The first source to carry a column sets
    /// it; anything still missing is 0 and undefined.
    pub fn aggregate(
        &self,
        temporal: &BTreeMap<AuthorId, TemporalFeatures>,
        text: &BTreeMap<AuthorId, TextFeatures>,
        network: &BTreeMap<AuthorId, NetworkFeatures>,
        behavioral: &BTreeMap<AuthorId, BehavioralFeatures>,
    ) -> FeatureTable {
        let mut authors: Vec<&AuthorId> = temporal
            .keys()
            .chain(text.keys())
            .chain(network.keys())
            .chain(behavioral.keys())
            .collect();
        authors.sort();
        authors.dedup();

        let mut table = FeatureTable::default();
        let mut filled = 0usize;
        let mut neutral = 0usize;
        for author in authors {
            let sources: [Option<&dyn FeatureSource>; 4] = [
                temporal.get(author).map(|f| f as &dyn FeatureSource),
                text.get(author).map(|f| f as &dyn FeatureSource),
                network.get(author).map(|f| f as &dyn FeatureSource),
                behavioral.get(author).map(|f| f as &dyn FeatureSource),
            ];
            let mut seen = vec![false; COLUMNS.len()];
            let mut values = vec![0.0; COLUMNS.len()];
            let mut undefined = BTreeSet::new();
            for source in sources.into_iter().flatten() {
                for (name, cell) in source.columns() {
                    let Some(i) = column_index(name) else { continue };
                    if seen[i] {
                        continue;
                    }
                    seen[i] = true;
                    values[i] = cell.value;
                    if !cell.defined {
                        undefined.insert(COLUMNS[i]);
                    }
                }
            }
            for (i, _) in seen.iter().enumerate().filter(|(_, s)| !**s) {
                undefined.insert(COLUMNS[i]);
                filled += 1;
            }
            neutral += undefined.len();

            table.insert(FeatureVector {
                author_id: author.clone(),
                values,
                undefined,
            });
        }
        debug!(filled, neutral, "missing feature values defaulted");
        info!(
            authors = table.len(),
            columns = COLUMNS.len(),
            "feature table aggregated"
        );
        table
    }
}
