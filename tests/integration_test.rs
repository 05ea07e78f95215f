//! End-to-end batch runs: coordinated accounts vs ordinary commenters.

mod common;

use botnet_detector::features::COLUMNS;
use botnet_detector::logging::ResultLine;
use botnet_detector::{
    BotnetDetector, Classification, CommentCorpus, DetectorConfig, StructuredLogger, NOISE,
};
use common::{bot_comments, human_comments, promo_burst, BOT_NAMES};

fn mixed_corpus() -> Vec<botnet_detector::Comment> {
    let mut comments = bot_comments();
    comments.extend(human_comments("margaret_ellis", 6, 1));
    comments.extend(human_comments("oliver_chen", 8, 2));
    comments.extend(human_comments("priya_nair", 5, 4));
    comments
}

#[test]
fn coordinated_accounts_are_flagged() {
    let detector = BotnetDetector::new(DetectorConfig::default()).unwrap();
    let report = detector.run(mixed_corpus());

    assert_eq!(report.results.len(), 8);
    assert_eq!(report.summary.total_accounts, 8);
    assert_eq!(report.summary.total_comments, 25 + 6 + 8 + 5);

    let bot_cluster = report.result(BOT_NAMES[0]).unwrap().cluster_id;
    assert_ne!(bot_cluster, NOISE);
    for name in BOT_NAMES {
        let r = report.result(name).unwrap();
        assert_eq!(r.cluster_id, bot_cluster, "{name}");
        assert!(r.final_bot_probability > 0.7, "{name}: {}", r.final_bot_probability);
        assert_eq!(r.classification, Classification::LikelyBot);
        assert!(r.cluster_confidence > 0.5);
    }
    for name in ["margaret_ellis", "oliver_chen", "priya_nair"] {
        let r = report.result(name).unwrap();
        assert_ne!(r.cluster_id, bot_cluster);
        assert_eq!(r.classification, Classification::LikelyHuman, "{name}");
    }

    assert_eq!(report.summary.classification_counts.likely_bot, 5);
    let top = &report.summary.cluster_statistics[0];
    assert_eq!(top.cluster_id, bot_cluster);
    assert_eq!(top.size, 5);
    assert_eq!(top.cohesion, 1.0);

    // structural side outputs
    assert_eq!(report.cliques.len(), 1);
    assert_eq!(report.cliques[0].len(), 5);
    assert!(report
        .synchronized_groups
        .iter()
        .any(|g| BOT_NAMES.iter().all(|b| g.contains(*b))));
    assert_eq!(report.duplicates.exact.len(), 1);
    assert_eq!(report.duplicates.exact[0].len(), 25);
    assert_eq!(report.graph_stats.co_occurrence_edges, 10);
    assert_eq!(report.consensus.dim(), (8, 8));
}

#[test]
fn promotional_burst_on_one_video_is_flagged() {
    let mut config = DetectorConfig::default();
    config.network.min_edge_weight = 1;
    let suspicious = config.scoring.suspicious_threshold;
    let detector = BotnetDetector::new(config).unwrap();
    let report = detector.run(promo_burst());

    assert_eq!(report.results.len(), 5);
    assert_eq!(report.graph_stats.co_occurrence_edges, 10);
    assert!(report.cliques.iter().any(|c| c.len() == 5));
    for row in report.features.rows() {
        assert_eq!(row.value("comment_count"), 1.0);
        assert_eq!(row.value("burst_score"), 0.0);
        assert_eq!(row.value("regularity_score"), 0.0);
        assert_eq!(row.value("automation_score"), 0.0);
        assert_eq!(row.value("diversity_score"), 1.0);
        assert!(row.value("template_score") > 0.99, "{}", row.author_id);
        assert_eq!(row.value("co_degree_centrality"), 1.0);
    }

    let cluster = report.results[0].cluster_id;
    assert_ne!(cluster, NOISE);
    for r in &report.results {
        assert_eq!(r.cluster_id, cluster, "{}", r.author_id);
        assert!(
            r.final_bot_probability > suspicious,
            "{}: {}",
            r.author_id,
            r.final_bot_probability
        );
        assert_ne!(r.classification, Classification::LikelyHuman);
    }
}

#[test]
fn lone_established_account_is_human() {
    let comments = human_comments("margaret_ellis", 50, 1);
    let first = comments.first().unwrap().published_at;
    let last = comments.last().unwrap().published_at;
    assert!((last - first).num_days() >= 365);

    let detector = BotnetDetector::new(DetectorConfig::default()).unwrap();
    let report = detector.run(comments);

    assert_eq!(report.results.len(), 1);
    let row = report.features.get("margaret_ellis").unwrap();
    assert_eq!(row.value("unique_videos_commented"), 50.0);
    assert_eq!(row.value("template_score"), 0.0);
    assert_eq!(row.value("burst_score"), 0.0);
    let automation = row.value("automation_score");
    assert!(automation < 0.2, "automation {automation}");
    assert!(row.value("regularity_score") < 0.5);
    assert!(report.duplicates.exact.is_empty());

    let r = &report.results[0];
    assert_eq!(r.cluster_id, NOISE);
    assert_eq!(r.cluster_bot_probability, 0.0);
    assert!(r.individual_bot_probability < 0.2);
    assert_eq!(r.classification, Classification::LikelyHuman);
    // a single author cannot be clustered
    assert!(report.clustering.runs.is_empty());
    assert_eq!(report.clustering.failures.len(), 6);
}

#[test]
fn ordinary_commenters_keep_low_automation_scores() {
    let detector = BotnetDetector::new(DetectorConfig::default()).unwrap();
    let report = detector.run(mixed_corpus());
    for name in ["margaret_ellis", "oliver_chen", "priya_nair"] {
        let row = report.features.get(name).unwrap();
        assert_eq!(row.value("template_score"), 0.0, "{name}");
        assert_eq!(row.value("burst_score"), 0.0, "{name}");
        assert!(row.value("automation_score") < 0.35, "{name}");
    }
}

#[test]
fn empty_batch_produces_empty_report() {
    let detector = BotnetDetector::new(DetectorConfig::default()).unwrap();
    let report = detector.run_corpus(&CommentCorpus::default());
    assert!(report.results.is_empty());
    assert_eq!(report.summary.total_accounts, 0);
    assert_eq!(report.summary.mean_bot_probability, 0.0);
}

#[test]
fn invalid_config_is_rejected() {
    let mut config = DetectorConfig::default();
    config.scoring.bot_threshold = 0.2;
    assert!(BotnetDetector::new(config).is_err());
}

#[test]
fn features_cover_every_author_and_column() {
    let detector = BotnetDetector::new(DetectorConfig::default()).unwrap();
    let report = detector.run(mixed_corpus());
    assert_eq!(report.features.len(), 8);
    for row in report.features.rows() {
        assert_eq!(row.values.len(), COLUMNS.len());
        assert!(row.values.iter().all(|v| v.is_finite()));
    }
    let bot = report.features.get(BOT_NAMES[0]).unwrap();
    assert_eq!(bot.value("template_score"), 1.0);
    assert_eq!(bot.value("co_degree"), 4.0);
    assert_eq!(bot.value("in_clique"), 1.0);
}

#[test]
fn report_and_result_lines_serialize() {
    StructuredLogger::init(false, "warn");
    let detector = BotnetDetector::new(DetectorConfig::default()).unwrap();
    let report = detector.run(mixed_corpus());

    let json = serde_json::to_value(&report).unwrap();
    assert!(json.get("summary").is_some());
    assert!(json.get("consensus").is_none());
    assert_eq!(json["results"].as_array().map(Vec::len), Some(8));

    let mut out = Vec::new();
    for r in &report.results {
        let line = ResultLine::new(report.run_id, report.generated_at.to_rfc3339(), r);
        StructuredLogger::emit_json(&line, &mut out).unwrap();
    }
    let text = String::from_utf8(out).unwrap();
    assert_eq!(text.lines().count(), 8);
    for line in text.lines() {
        let v: serde_json::Value = serde_json::from_str(line).unwrap();
        assert!(v["final_bot_probability"].as_f64().is_some());
        assert!(v["classification"].as_str().is_some());
    }
}
