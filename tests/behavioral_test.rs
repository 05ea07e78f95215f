//! Account age, username, automation and targeting signals.

mod common;

use botnet_detector::comments::AuthorChannel;
use botnet_detector::config::BehavioralConfig;
use botnet_detector::features::behavioral::{
    account_age_score, automation_score, matches_bot_username, string_entropy,
    NEUTRAL_ACCOUNT_AGE,
};
use botnet_detector::features::BehavioralFeatureExtractor;
use botnet_detector::CommentCorpus;
use chrono::Duration;
use common::{at, base_time, comment};

#[test]
fn account_age_bounds() {
    let first = base_time();
    assert_eq!(account_age_score(first, Some(first), 30), 0.0);
    assert_eq!(account_age_score(first, Some(first - Duration::days(30)), 30), 1.0);
    assert_eq!(account_age_score(first, Some(first - Duration::days(400)), 30), 1.0);
    assert!((account_age_score(first, Some(first - Duration::days(3)), 30) - 0.1).abs() < 1e-12);
    // partial days round down
    assert!(
        (account_age_score(first, Some(first - Duration::hours(47)), 30) - 1.0 / 30.0).abs()
            < 1e-12
    );
}

#[test]
fn account_age_unknown_or_inconsistent_is_neutral() {
    let first = base_time();
    assert_eq!(account_age_score(first, None, 30), NEUTRAL_ACCOUNT_AGE);
    assert_eq!(
        account_age_score(first, Some(first + Duration::days(1)), 30),
        NEUTRAL_ACCOUNT_AGE
    );
}

#[test]
fn bot_username_patterns() {
    for name in ["user12345", "john1984", "free_stuff_2024", "JohnSmith42", "temp_abc", "test99", "TEST_77"] {
        assert!(matches_bot_username(name), "{name}");
    }
    for name in ["Margaret Ellis", "user 12345", "cooking with dan"] {
        assert!(!matches_bot_username(name), "{name}");
    }
}

#[test]
fn entropy_in_bits() {
    assert_eq!(string_entropy(""), 0.0);
    assert_eq!(string_entropy("aaaa"), 0.0);
    assert!((string_entropy("abcd") - 2.0).abs() < 1e-12);
}

#[test]
fn automation_indicators() {
    assert_eq!(automation_score(&[at(0)]), 0.0);

    // on the minute, perfectly regular, one hour of the day, nothing under a minute
    let times: Vec<_> = (0..5).map(|i| at(i * 60)).collect();
    let expected = (1.0 + 1.0 + 0.0 + 1.0 / 24.0) / 4.0;
    assert!((automation_score(&times) - expected).abs() < 1e-12);

    // two comments: no regularity indicator
    let pair = [at(0), at(30)];
    let expected = (0.5 + 1.0 + 1.0 / 24.0) / 3.0;
    assert!((automation_score(&pair) - expected).abs() < 1e-12);
}

#[test]
fn username_scores_reward_look_alikes() {
    let extractor = BehavioralFeatureExtractor::new(BehavioralConfig::default());
    let scores = extractor.username_scores(&[
        ("a", "user1234567"),
        ("b", "user1234576"),
        ("c", "Margaret Ellis"),
    ]);
    // pattern + saturated entropy + one of two others similar
    assert!((scores["a"] - (0.4 + 0.3 + 0.3 * 0.5)).abs() < 1e-12);
    assert!(scores["c"] < scores["a"]);
    assert!(scores["c"] <= 0.3 + 1e-12);
}

#[test]
fn targeting_concentration_and_keywords() {
    let extractor = BehavioralFeatureExtractor::new(BehavioralConfig {
        targeting_keywords: vec!["election".into(), "vote".into()],
        ..BehavioralConfig::default()
    });
    let c1 = comment("c1", "v1", "a", "x", 0).with_video("Election Night", "News One");
    let c2 = comment("c2", "v2", "a", "x", 60).with_video("Cooking pasta", "News One");
    assert!((extractor.targeting_score(&[&c1, &c2]) - (0.6 + 0.4 * 0.5)).abs() < 1e-12);

    let c3 = comment("c3", "v3", "a", "x", 120).with_video("Gardening", "Other");
    assert!((extractor.targeting_score(&[&c2, &c3]) - 0.3).abs() < 1e-12);
    assert!((extractor.targeting_score(&[]) - 0.6).abs() < 1e-12);
}

#[test]
fn extract_engagement_and_channel_stats() {
    let channel = AuthorChannel {
        author_channel_created_at: Some(base_time() - Duration::days(15)),
        author_subscriber_count: Some(10),
        author_video_count: Some(4),
        author_total_views: Some(200),
    };
    let corpus = CommentCorpus::new(vec![
        comment("c1", "v1", "a", "x", 0).with_likes(4).with_channel(channel.clone()),
        comment("c2", "v1", "a", "y", 60).with_channel(channel.clone()),
        comment("c3", "v2", "a", "z", 120).reply_to("c9").with_channel(channel),
        comment("c4", "v3", "b", "w", 500),
    ]);
    let features = BehavioralFeatureExtractor::new(BehavioralConfig::default()).extract(&corpus);

    let a = &features["a"];
    assert_eq!(a.total_comments, 3);
    assert_eq!(a.unique_videos_commented, 2);
    assert_eq!(a.comments_per_video, 1.5);
    assert_eq!(a.total_likes_received, 4);
    assert!((a.zero_like_ratio - 2.0 / 3.0).abs() < 1e-12);
    assert!((a.reply_ratio - 1.0 / 3.0).abs() < 1e-12);
    assert_eq!(a.views_per_video, Some(50.0));
    assert_eq!(a.subscriber_view_ratio, Some(0.05));
    assert_eq!(a.account_age_score, 0.5);

    let b = &features["b"];
    assert_eq!(b.subscriber_count, None);
    assert_eq!(b.views_per_video, None);
    assert_eq!(b.account_age_score, NEUTRAL_ACCOUNT_AGE);
    assert_eq!(b.automation_score, 0.0);
}
