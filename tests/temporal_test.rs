//! Temporal features, synchronized groups and campaign waves.

mod common;

use botnet_detector::config::TemporalConfig;
use botnet_detector::features::temporal::{
    burst_score, merge_overlapping_groups, regularity_score, temporal_similarity,
};
use botnet_detector::features::TemporalFeatureExtractor;
use botnet_detector::CommentCorpus;
use common::{at, comment};
use std::collections::BTreeSet;

fn set(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[test]
fn single_comment_author() {
    let corpus = CommentCorpus::new(vec![comment("c1", "v1", "solo", "hi there", 0)]);
    let features = TemporalFeatureExtractor::new(TemporalConfig::default()).extract(&corpus);
    let f = &features["solo"];
    assert_eq!(f.comment_count, 1);
    assert_eq!(f.active_period_hours, 0.0);
    assert_eq!(f.comments_per_hour, 1.0);
    assert_eq!(f.mean_interval_seconds, 0.0);
    assert_eq!(f.burst_score, 0.0);
    assert_eq!(f.regularity_score, 0.0);
    assert_eq!(f.hour_entropy, 0.0);
}

#[test]
fn regular_bursty_author() {
    let corpus = CommentCorpus::new(
        (0..5)
            .map(|i| comment(&format!("c{i}"), "v1", "a", "same", i * 60))
            .collect(),
    );
    let features = TemporalFeatureExtractor::new(TemporalConfig::default()).extract(&corpus);
    let f = &features["a"];
    assert_eq!(f.comment_count, 5);
    assert!((f.active_period_hours - 4.0 / 60.0).abs() < 1e-9);
    assert!((f.comments_per_hour - 75.0).abs() < 1e-6);
    assert_eq!(f.mean_interval_seconds, 60.0);
    assert_eq!(f.std_interval_seconds, 0.0);
    assert_eq!(f.burst_score, 1.0);
    assert_eq!(f.regularity_score, 1.0);
    assert_eq!(f.most_active_hour, 12);
}

#[test]
fn interval_scores() {
    assert_eq!(burst_score(&[], 300.0), 0.0);
    assert_eq!(burst_score(&[10.0, 400.0, 299.0, 300.0], 300.0), 0.5);
    assert_eq!(regularity_score(&[60.0]), 0.0);
    assert_eq!(regularity_score(&[0.0, 0.0]), 0.0);
    // mean 2, std 1 → 1 / 1.5
    assert!((regularity_score(&[1.0, 3.0]) - 1.0 / 1.5).abs() < 1e-12);
}

#[test]
fn synchronized_group_found() {
    let corpus = CommentCorpus::new(vec![
        comment("c1", "v1", "a", "x", 0),
        comment("c2", "v2", "b", "x", 30),
        comment("c3", "v3", "c", "x", 90),
        comment("c4", "v4", "d", "x", 10_000),
    ]);
    let groups = TemporalFeatureExtractor::new(TemporalConfig::default()).synchronized_groups(&corpus);
    assert_eq!(groups, vec![set(&["a", "b", "c"])]);
}

#[test]
fn too_few_authors_is_no_group() {
    let corpus = CommentCorpus::new(vec![
        comment("c1", "v1", "a", "x", 0),
        comment("c2", "v2", "a", "x", 30),
        comment("c3", "v3", "b", "x", 60),
    ]);
    let groups = TemporalFeatureExtractor::new(TemporalConfig::default()).synchronized_groups(&corpus);
    assert!(groups.is_empty());
}

#[test]
fn merge_is_transitive_and_idempotent() {
    let merged = merge_overlapping_groups(vec![
        set(&["a", "b"]),
        set(&["x", "y"]),
        set(&["c", "d"]),
        set(&["b", "c"]),
    ]);
    assert_eq!(merged, vec![set(&["a", "b", "c", "d"]), set(&["x", "y"])]);
    assert_eq!(merge_overlapping_groups(merged.clone()), merged);
}

#[test]
fn campaign_wave_detected() {
    let mut comments = Vec::new();
    for day in 1..=10i64 {
        comments.push(comment(&format!("quiet{day}"), "v0", "regular", "x", -day * 86_400));
    }
    for i in 0..20i64 {
        comments.push(comment(&format!("spike{i}"), "v1", &format!("acct{}", i % 7), "x", i * 30));
    }
    let corpus = CommentCorpus::new(comments);
    let waves = TemporalFeatureExtractor::new(TemporalConfig::default()).campaign_waves(&corpus);
    assert_eq!(waves.len(), 1);
    let w = &waves[0];
    assert_eq!(w.start, at(0));
    assert_eq!(w.comment_count, 20);
    assert_eq!(w.unique_authors, 7);
    assert_eq!(w.participating_authors.len(), 7);
    assert!(w.z_score > 2.0);
}

#[test]
fn flat_activity_has_no_waves() {
    let corpus = CommentCorpus::new(
        (0..10)
            .map(|i| comment(&format!("c{i}"), "v1", "a", "x", i * 3600))
            .collect(),
    );
    let waves = TemporalFeatureExtractor::new(TemporalConfig::default()).campaign_waves(&corpus);
    assert!(waves.is_empty());
}

#[test]
fn identical_schedules_are_fully_similar() {
    let times: Vec<_> = [0, 60, 5 * 3600, 9 * 3600 + 30, 9 * 3600 + 90, 12 * 3600]
        .iter()
        .map(|&s| at(s))
        .collect();
    assert!((temporal_similarity(&times, &times) - 1.0).abs() < 1e-12);
    assert_eq!(temporal_similarity(&times, &[]), 0.0);
}
