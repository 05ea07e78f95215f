//! Per-author timing statistics and corpus-wide coordination patterns
//! (synchronized posting groups, campaign waves).

use crate::comments::{AuthorId, CommentCorpus};
use crate::config::TemporalConfig;
use chrono::{DateTime, Datelike, Duration, DurationRound, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemporalFeatures {
    pub comment_count: usize,
    pub first_comment: DateTime<Utc>,
    pub last_comment: DateTime<Utc>,
    pub active_period_hours: f64,
    /// Equals the comment count when all comments share one instant
    pub comments_per_hour: f64,
    pub most_active_hour: u32,
    pub hour_entropy: f64,
    /// Monday = 0
    pub most_active_day: u32,
    pub day_entropy: f64,
    pub mean_interval_seconds: f64,
    pub std_interval_seconds: f64,
    pub min_interval_seconds: f64,
    pub max_interval_seconds: f64,
    /// Fraction of consecutive intervals shorter than the burst window
    pub burst_score: f64,
    /// 1 / (1 + coefficient of variation of intervals)
    pub regularity_score: f64,
}

/// A spike hour and the comments that follow it within the wave horizon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignWave {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub comment_count: usize,
    pub unique_authors: usize,
    pub z_score: f64,
    pub participating_authors: Vec<AuthorId>,
}

pub struct TemporalFeatureExtractor {
    config: TemporalConfig,
}

impl TemporalFeatureExtractor {
    pub fn new(config: TemporalConfig) -> Self {
        Self { config }
    }

    pub fn extract(&self, corpus: &CommentCorpus) -> BTreeMap<AuthorId, TemporalFeatures> {
        let mut out = BTreeMap::new();
        for (author, comments) in corpus.by_author() {
            let times: Vec<DateTime<Utc>> = comments.iter().map(|c| c.published_at).collect();
            out.insert(author.to_string(), self.author_features(&times));
        }
        debug!(authors = out.len(), "temporal features extracted");
        out
    }

    /// Features for one author's timestamps, which must be sorted ascending and non-empty.
    fn author_features(&self, times: &[DateTime<Utc>]) -> TemporalFeatures {
        let first = times[0];
        let last = times[times.len() - 1];
        let count = times.len();
        let active_period_hours = (last - first).num_seconds() as f64 / 3600.0;
        let comments_per_hour = if active_period_hours > 0.0 {
            count as f64 / active_period_hours
        } else {
            count as f64
        };

        let hours: Vec<u32> = times.iter().map(|t| t.hour()).collect();
        let days: Vec<u32> = times
            .iter()
            .map(|t| t.weekday().num_days_from_monday())
            .collect();

        let intervals = intervals_secs(times);
        let (mean, std, min, max) = if intervals.is_empty() {
            (0.0, 0.0, 0.0, 0.0)
        } else {
            let (mean, std) = mean_std(&intervals);
            let min = intervals.iter().copied().fold(f64::INFINITY, f64::min);
            let max = intervals.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            (mean, std, min, max)
        };

        TemporalFeatures {
            comment_count: count,
            first_comment: first,
            last_comment: last,
            active_period_hours,
            comments_per_hour,
            most_active_hour: mode(&hours),
            hour_entropy: count_entropy(&hours),
            most_active_day: mode(&days),
            day_entropy: count_entropy(&days),
            mean_interval_seconds: mean,
            std_interval_seconds: std,
            min_interval_seconds: min,
            max_interval_seconds: max,
            burst_score: burst_score(&intervals, self.config.burst_window_secs as f64),
            regularity_score: regularity_score(&intervals),
        }
    }

    /// Sets of at least `min_group_size` authors posting inside one sliding window,
    /// merged until no two groups share an author.
    pub fn synchronized_groups(&self, corpus: &CommentCorpus) -> Vec<BTreeSet<AuthorId>> {
        let comments = corpus.comments();
        let window = Duration::seconds(self.config.sync_window_secs);
        let mut groups = Vec::new();
        let mut processed = vec![false; comments.len()];

        for i in 0..comments.len() {
            if processed[i] {
                continue;
            }
            let window_end = comments[i].published_at + window;
            let mut end = i;
            while end < comments.len() && comments[end].published_at <= window_end {
                end += 1;
            }
            let authors: BTreeSet<AuthorId> = comments[i..end]
                .iter()
                .map(|c| c.author_id.clone())
                .collect();
            if authors.len() >= self.config.min_group_size {
                groups.push(authors);
                processed[i..end].iter_mut().for_each(|p| *p = true);
            }
        }

        let merged = merge_overlapping_groups(groups);
        info!(groups = merged.len(), "synchronized posting groups detected");
        merged
    }

    /// Hourly bins whose count z-score exceeds the threshold, expanded over the wave horizon.
    pub fn campaign_waves(&self, corpus: &CommentCorpus) -> Vec<CampaignWave> {
        let comments = corpus.comments();
        let hour = Duration::hours(1);
        let mut hourly: BTreeMap<DateTime<Utc>, usize> = BTreeMap::new();
        for c in comments {
            let bin = c.published_at.duration_trunc(hour).unwrap_or(c.published_at);
            *hourly.entry(bin).or_default() += 1;
        }
        if hourly.len() < 2 {
            return Vec::new();
        }

        let counts: Vec<f64> = hourly.values().map(|&c| c as f64).collect();
        let mean = counts.iter().sum::<f64>() / counts.len() as f64;
        let var = counts.iter().map(|c| (c - mean).powi(2)).sum::<f64>()
            / (counts.len() - 1) as f64;
        let std = var.sqrt();
        if std <= 0.0 || !std.is_finite() {
            return Vec::new();
        }

        let horizon = Duration::hours(self.config.wave_horizon_hours);
        let mut waves = Vec::new();
        for (&start, &count) in &hourly {
            let z = (count as f64 - mean) / std;
            if z <= self.config.wave_z_threshold {
                continue;
            }
            let end = start + horizon;
            let in_wave: Vec<_> = comments
                .iter()
                .filter(|c| c.published_at >= start && c.published_at <= end)
                .collect();
            if in_wave.len() < self.config.min_group_size {
                continue;
            }
            let authors: BTreeSet<AuthorId> =
                in_wave.iter().map(|c| c.author_id.clone()).collect();
            waves.push(CampaignWave {
                start,
                end,
                comment_count: in_wave.len(),
                unique_authors: authors.len(),
                z_score: z,
                participating_authors: authors.into_iter().collect(),
            });
        }
        info!(waves = waves.len(), "campaign waves detected");
        waves
    }
}

/// Merge groups that share members until all output groups are disjoint.
/// Output is sorted, so applying the merge to its own output is a no-op.
pub fn merge_overlapping_groups(groups: Vec<BTreeSet<AuthorId>>) -> Vec<BTreeSet<AuthorId>> {
    let mut parent: Vec<usize> = (0..groups.len()).collect();
    let mut owner: HashMap<&str, usize> = HashMap::new();

    fn find(parent: &mut [usize], mut x: usize) -> usize {
        while parent[x] != x {
            parent[x] = parent[parent[x]];
            x = parent[x];
        }
        x
    }

    for (gi, group) in groups.iter().enumerate() {
        for author in group {
            match owner.get(author.as_str()) {
                Some(&other) => {
                    let (a, b) = (find(&mut parent, gi), find(&mut parent, other));
                    if a != b {
                        parent[a.max(b)] = a.min(b);
                    }
                }
                None => {
                    owner.insert(author.as_str(), gi);
                }
            }
        }
    }

    let mut merged: BTreeMap<usize, BTreeSet<AuthorId>> = BTreeMap::new();
    for gi in 0..groups.len() {
        let root = find(&mut parent, gi);
        merged
            .entry(root)
            .or_default()
            .extend(groups[gi].iter().cloned());
    }
    let mut out: Vec<BTreeSet<AuthorId>> = merged.into_values().collect();
    out.sort();
    out
}

/// Seconds between consecutive sorted timestamps.
pub fn intervals_secs(times: &[DateTime<Utc>]) -> Vec<f64> {
    times
        .windows(2)
        .map(|w| (w[1] - w[0]).num_milliseconds() as f64 / 1000.0)
        .collect()
}

/// Fraction of intervals below `window_secs`; 0 without intervals.
pub fn burst_score(intervals: &[f64], window_secs: f64) -> f64 {
    if intervals.is_empty() {
        return 0.0;
    }
    intervals.iter().filter(|&&i| i < window_secs).count() as f64 / intervals.len() as f64
}

/// 1 / (1 + CV) of the intervals. Needs two intervals; a zero mean interval scores 0.
pub fn regularity_score(intervals: &[f64]) -> f64 {
    if intervals.len() < 2 {
        return 0.0;
    }
    let (mean, std) = mean_std(intervals);
    if mean <= 0.0 {
        return 0.0;
    }
    1.0 / (1.0 + std / mean)
}

/// Correlation of two authors' hourly activity over their overlapping period, in [0, 1].
pub fn temporal_similarity(a: &[DateTime<Utc>], b: &[DateTime<Utc>]) -> f64 {
    let (Some(a_min), Some(a_max)) = (a.iter().min(), a.iter().max()) else {
        return 0.0;
    };
    let (Some(b_min), Some(b_max)) = (b.iter().min(), b.iter().max()) else {
        return 0.0;
    };
    let start = *a_min.max(b_min);
    let end = *a_max.min(b_max);
    if start >= end {
        return 0.0;
    }
    let bins = ((end - start).num_seconds() / 3600) as usize;
    if bins < 2 {
        return 0.0;
    }
    let last_edge = start + Duration::hours(bins as i64);

    let histogram = |times: &[DateTime<Utc>]| {
        let mut h = vec![0.0; bins];
        for t in times {
            if *t < start || *t > last_edge {
                continue;
            }
            let idx = ((*t - start).num_seconds() / 3600) as usize;
            h[idx.min(bins - 1)] += 1.0;
        }
        h
    };
    let r = pearson(&histogram(a), &histogram(b));
    if r.is_finite() {
        ((r + 1.0) / 2.0).clamp(0.0, 1.0)
    } else {
        0.0
    }
}

pub(crate) fn mean_std(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, var.sqrt())
}

fn pearson(x: &[f64], y: &[f64]) -> f64 {
    let (mx, sx) = mean_std(x);
    let (my, sy) = mean_std(y);
    if sx == 0.0 || sy == 0.0 {
        return f64::NAN;
    }
    let cov = x
        .iter()
        .zip(y)
        .map(|(a, b)| (a - mx) * (b - my))
        .sum::<f64>()
        / x.len() as f64;
    cov / (sx * sy)
}

/// Most frequent value, lowest on ties.
fn mode(values: &[u32]) -> u32 {
    let mut counts: BTreeMap<u32, usize> = BTreeMap::new();
    for &v in values {
        *counts.entry(v).or_default() += 1;
    }
    let mut best = (0, 0);
    for (v, c) in counts {
        if c > best.1 {
            best = (v, c);
        }
    }
    best.0
}

/// Shannon entropy (nats) of the value counts.
fn count_entropy(values: &[u32]) -> f64 {
    let mut counts: BTreeMap<u32, usize> = BTreeMap::new();
    for &v in values {
        *counts.entry(v).or_default() += 1;
    }
    let total = values.len() as f64;
    counts
        .values()
        .map(|&c| c as f64 / total)
        .filter(|&p| p > 0.0)
        .map(|p| -p * p.ln())
        .sum::<f64>()
        .max(0.0)
}
