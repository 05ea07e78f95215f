//! Account-level behavioral signals: account age, username shape, automation,
//! content targeting, engagement and channel statistics.

use super::temporal::{intervals_secs, regularity_score};
use crate::comments::{AuthorId, Comment, CommentCorpus};
use crate::config::BehavioralConfig;
use chrono::{DateTime, Timelike, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::OnceLock;
use tracing::debug;

/// Score used when an account's creation date is unknown or inconsistent.
pub const NEUTRAL_ACCOUNT_AGE: f64 = 0.5;

const RAPID_INTERVAL_SECS: f64 = 60.0;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BehavioralFeatures {
    pub subscriber_count: Option<u64>,
    pub video_count: Option<u64>,
    pub total_views: Option<u64>,
    pub views_per_video: Option<f64>,
    pub subscriber_view_ratio: Option<f64>,
    pub total_comments: usize,
    pub unique_videos_commented: usize,
    pub comments_per_video: f64,
    pub total_likes_received: u64,
    pub avg_likes_per_comment: f64,
    pub zero_like_ratio: f64,
    pub reply_ratio: f64,
    /// Lower is newer, 0.5 when unknown
    pub account_age_score: f64,
    /// Creation date present and not after the first comment
    #[serde(default)]
    pub account_age_known: bool,
    pub username_pattern_score: f64,
    pub automation_score: f64,
    pub targeting_score: f64,
}

static BOT_USERNAMES: OnceLock<Vec<Regex>> = OnceLock::new();

fn bot_username_patterns() -> &'static [Regex] {
    BOT_USERNAMES.get_or_init(|| {
        [
            r"^user\d{5,}$",
            r"^[a-z]+\d{4,}$",
            r"^\w+_\d{4,}$",
            r"^[A-Z][a-z]+[A-Z][a-z]+\d{2,}$",
            r"^\w{8}-\w{4}-\w{4}-\w{4}-\w{12}$",
            r"^temp_\w+$",
            r"^test\w*\d+$",
        ]
        .iter()
        .map(|p| Regex::new(&format!("(?i){p}")).expect("valid regex"))
        .collect()
    })
}

pub fn matches_bot_username(name: &str) -> bool {
    bot_username_patterns().iter().any(|re| re.is_match(name))
}

/// Shannon entropy (bits) of the character distribution.
pub fn string_entropy(s: &str) -> f64 {
    let mut counts: HashMap<char, usize> = HashMap::new();
    let mut len = 0usize;
    for c in s.chars() {
        *counts.entry(c).or_default() += 1;
        len += 1;
    }
    if len == 0 {
        return 0.0;
    }
    counts
        .values()
        .map(|&c| c as f64 / len as f64)
        .map(|p| -p * p.log2())
        .sum()
}

/// Whole days from channel creation to first comment over the suspicious age, in [0, 1].
pub fn account_age_score(
    first_comment: DateTime<Utc>,
    channel_created: Option<DateTime<Utc>>,
    suspicious_age_days: i64,
) -> f64 {
    let Some(created) = channel_created else {
        return NEUTRAL_ACCOUNT_AGE;
    };
    let elapsed = first_comment - created;
    if elapsed < chrono::Duration::zero() {
        return NEUTRAL_ACCOUNT_AGE;
    }
    let days = elapsed.num_days();
    if days >= suspicious_age_days {
        1.0
    } else {
        days as f64 / suspicious_age_days as f64
    }
}

/// Mean of the automation indicators over sorted timestamps; 0 below two comments.
///
/// Indicators: share of comments at second :00, interval regularity (with two or more
/// intervals and a positive mean), share of intervals under a minute, and the fraction
/// of the day's hours the author posts in.
pub fn automation_score(times: &[DateTime<Utc>]) -> f64 {
    if times.len() < 2 {
        return 0.0;
    }
    let n = times.len() as f64;
    let mut indicators = Vec::with_capacity(4);

    indicators.push(times.iter().filter(|t| t.second() == 0).count() as f64 / n);

    let intervals = intervals_secs(times);
    let mean = intervals.iter().sum::<f64>() / intervals.len() as f64;
    if intervals.len() >= 2 && mean > 0.0 {
        indicators.push(regularity_score(&intervals));
    }

    let rapid = intervals.iter().filter(|&&i| i < RAPID_INTERVAL_SECS).count();
    indicators.push(rapid as f64 / intervals.len() as f64);

    let hours: BTreeSet<u32> = times.iter().map(|t| t.hour()).collect();
    indicators.push(hours.len() as f64 / 24.0);

    indicators.iter().sum::<f64>() / indicators.len() as f64
}

pub struct BehavioralFeatureExtractor {
    config: BehavioralConfig,
}

impl BehavioralFeatureExtractor {
    pub fn new(config: BehavioralConfig) -> Self {
        Self { config }
    }

    pub fn extract(&self, corpus: &CommentCorpus) -> BTreeMap<AuthorId, BehavioralFeatures> {
        let usernames = self.usernames(corpus);
        let username_scores = self.username_scores(&usernames);

        let mut out = BTreeMap::new();
        for (author, comments) in corpus.by_author() {
            let mut features = engagement(&comments);
            let times: Vec<DateTime<Utc>> = comments.iter().map(|c| c.published_at).collect();
            let created = comments
                .iter()
                .find_map(|c| c.channel.author_channel_created_at);
            features.account_age_score = account_age_score(
                times[0],
                created,
                self.config.suspicious_account_age_days,
            );
            features.account_age_known = created.is_some_and(|c| c <= times[0]);
            features.username_pattern_score =
                username_scores.get(author).copied().unwrap_or(0.0);
            features.automation_score = automation_score(&times);
            features.targeting_score = self.targeting_score(&comments);
            out.insert(author.to_string(), features);
        }
        debug!(authors = out.len(), "behavioral features extracted");
        out
    }

    /// Display name per author, taken from their first comment.
    fn usernames<'a>(&self, corpus: &'a CommentCorpus) -> Vec<(&'a str, &'a str)> {
        corpus
            .by_author()
            .filter_map(|(author, comments)| comments.first().map(|c| (author, c.username())))
            .collect()
    }

    /// 0.4 template match + 0.3 normalized entropy + 0.3 share of look-alike names.
    /// Quadratic in the number of authors.
    pub fn username_scores(&self, usernames: &[(&str, &str)]) -> BTreeMap<AuthorId, f64> {
        let others = usernames.len().saturating_sub(1).max(1) as f64;
        usernames
            .iter()
            .map(|&(author, name)| {
                let pattern = if matches_bot_username(name) { 1.0 } else { 0.0 };
                let entropy = (string_entropy(name) / 3.0).min(1.0);
                let similar = usernames
                    .iter()
                    .filter(|&&(other, _)| other != author)
                    .filter(|&&(_, other_name)| {
                        strsim::normalized_levenshtein(name, other_name)
                            > self.config.username_similarity_threshold
                    })
                    .count();
                let similarity = similar as f64 / others;
                (
                    author.to_string(),
                    0.4 * pattern + 0.3 * entropy + 0.3 * similarity,
                )
            })
            .collect()
    }

    /// 0.6 / distinct channels + 0.4 share of targeting keywords found in video titles.
    pub fn targeting_score(&self, comments: &[&Comment]) -> f64 {
        let channels: BTreeSet<&str> = comments
            .iter()
            .filter_map(|c| c.video.channel_title.as_deref())
            .collect();
        let concentration = 1.0 / channels.len().max(1) as f64;

        let titles: Vec<&str> = comments
            .iter()
            .filter_map(|c| c.video.video_title.as_deref())
            .collect();
        let keywords = &self.config.targeting_keywords;
        let keyword_share = if titles.is_empty() || keywords.is_empty() {
            0.0
        } else {
            let joined = titles.join(" ").to_lowercase();
            let hits = keywords
                .iter()
                .filter(|k| joined.contains(&k.to_lowercase()))
                .count();
            hits as f64 / keywords.len() as f64
        };
        0.6 * concentration + 0.4 * keyword_share
    }
}

/// Comment, like and reply ratios plus channel statistics when present.
fn engagement(comments: &[&Comment]) -> BehavioralFeatures {
    let total = comments.len();
    let videos: BTreeSet<&str> = comments.iter().map(|c| c.video_id.as_str()).collect();
    let likes: u64 = comments.iter().map(|c| c.like_count).sum();
    let zero_likes = comments.iter().filter(|c| c.like_count == 0).count();
    let replies = comments.iter().filter(|c| c.is_reply).count();
    let per = |count: usize| {
        if total == 0 {
            0.0
        } else {
            count as f64 / total as f64
        }
    };

    let subscriber_count = comments.iter().find_map(|c| c.channel.author_subscriber_count);
    let video_count = comments.iter().find_map(|c| c.channel.author_video_count);
    let total_views = comments.iter().find_map(|c| c.channel.author_total_views);
    let views_per_video = match (total_views, video_count) {
        (Some(views), Some(videos)) if videos > 0 => Some(views as f64 / videos as f64),
        (Some(_), Some(_)) => Some(0.0),
        _ => None,
    };
    let subscriber_view_ratio = match (subscriber_count, total_views) {
        (Some(subs), Some(views)) if views > 0 => Some(subs as f64 / views as f64),
        (Some(_), Some(_)) => Some(0.0),
        _ => None,
    };

    BehavioralFeatures {
        subscriber_count,
        video_count,
        total_views,
        views_per_video,
        subscriber_view_ratio,
        total_comments: total,
        unique_videos_commented: videos.len(),
        comments_per_video: total as f64 / videos.len().max(1) as f64,
        total_likes_received: likes,
        avg_likes_per_comment: if total == 0 { 0.0 } else { likes as f64 / total as f64 },
        zero_like_ratio: per(zero_likes),
        reply_ratio: per(replies),
        ..BehavioralFeatures::default()
    }
}
