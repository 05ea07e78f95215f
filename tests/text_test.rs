//! Text similarity, templates, spam and duplicates.

mod common;

use botnet_detector::config::TextConfig;
use botnet_detector::features::similarity::{clean_text, edit_similarity, similarity_matrix};
use botnet_detector::features::text::is_spam;
use botnet_detector::features::{SimilarityMethod, TextFeatureExtractor};
use botnet_detector::CommentCorpus;
use common::comment;
use std::collections::BTreeSet;

fn ids(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[test]
fn clean_text_strips_links_mentions_and_tags() {
    assert_eq!(
        clean_text("Check   @someone THIS https://x.io/a #tag out"),
        "check this out"
    );
}

#[test]
fn identical_texts_score_one() {
    let texts = vec![
        "support the new policy today".to_string(),
        "support the new policy today".to_string(),
        "my dog loves long walks by the river".to_string(),
    ];
    let sim = similarity_matrix(&texts, 100);
    assert_eq!(sim.method, SimilarityMethod::Lexical);
    assert_eq!(sim.get(0, 1), 1.0);
    assert_eq!(sim.get(1, 0), 1.0);
    assert_eq!(sim.get(2, 2), 1.0);
    assert!(sim.get(0, 2) < 0.5);
}

#[test]
fn stop_word_only_corpus_falls_back_to_edit_similarity() {
    let texts = vec!["the and".to_string(), "the an".to_string()];
    let sim = similarity_matrix(&texts, 100);
    assert_eq!(sim.method, SimilarityMethod::EditDistance);
    assert!((sim.get(0, 1) - edit_similarity("the and", "the an")).abs() < 1e-12);
}

#[test]
fn template_and_single_comment_features() {
    let corpus = CommentCorpus::new(vec![
        comment("c1", "v1", "a", "Vote for change now", 0),
        comment("c2", "v2", "b", "Vote for change now", 10),
        comment("c3", "v3", "c", "The mountain photos at dusk were lovely", 20),
    ]);
    let features = TextFeatureExtractor::new(TextConfig::default()).extract(&corpus);
    assert_eq!(features["a"].template_score, 1.0);
    assert_eq!(features["b"].template_score, 1.0);
    assert_eq!(features["c"].template_score, 0.0);

    let c = &features["c"];
    assert_eq!(c.total_comments, 1);
    assert_eq!(c.diversity_score, 1.0);
    assert_eq!(c.std_comment_length, 0.0);
    assert_eq!(c.spam_score, 0.0);
}

#[test]
fn spam_indicators() {
    assert!(is_spam("Click the link for a FREE prize"));
    assert!(is_spam("AMAZING video"));
    assert!(is_spam("wow!!!!!"));
    assert!(is_spam("only $1,000 today"));
    assert!(!is_spam("Thoughtful analysis, thanks for sharing"));
}

#[test]
fn spam_and_diversity_scores() {
    let corpus = CommentCorpus::new(vec![
        comment("c1", "v1", "a", "subscribe to my channel", 0),
        comment("c2", "v2", "a", "subscribe to my channel", 60),
        comment("c3", "v3", "a", "nice one", 120),
        comment("c4", "v4", "a", "great stuff here", 180),
    ]);
    let f = &TextFeatureExtractor::new(TextConfig::default()).extract(&corpus)["a"];
    assert_eq!(f.spam_score, 0.5);
    assert!(f.diversity_score < 1.0);
    assert!(f.diversity_score > 0.0);
}

#[test]
fn duplicate_groups_exact_and_near() {
    let corpus = CommentCorpus::new(vec![
        comment("c1", "v1", "a", "Great video", 0),
        comment("c2", "v2", "b", "great   video", 10),
        comment("c3", "v3", "c", "This channel deserves far more subscribers", 20),
        comment("c4", "v4", "d", "This channel deserves far more subscribers!", 30),
        comment("c5", "v5", "e", "Completely unrelated remark about weather", 40),
    ]);
    let groups = TextFeatureExtractor::new(TextConfig::default()).duplicate_groups(&corpus);
    assert!(groups.exact.contains(&ids(&["c1", "c2"])));
    assert!(groups.near.contains(&ids(&["c3", "c4"])));
    assert!(groups.exact.iter().chain(&groups.near).all(|g| !g.contains("c5")));
}
