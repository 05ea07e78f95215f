//! Config load, partial overrides and validation failures.

use botnet_detector::config::DetectorConfig;
use botnet_detector::ConfigError;
use std::io::Write;
use std::path::Path;

fn write_config(json: &str) -> tempfile::NamedTempFile {
    let mut f = tempfile::NamedTempFile::new().unwrap();
    f.write_all(json.as_bytes()).unwrap();
    f
}

#[test]
fn config_load_default() {
    let c = DetectorConfig::load(Path::new("nonexistent.json")).unwrap();
    assert_eq!(c.scoring.suspicious_threshold, 0.5);
    assert_eq!(c.scoring.bot_threshold, 0.7);
    assert_eq!(c.network.min_edge_weight, 2);
    assert_eq!(c.clustering.hdbscan_min_cluster_sizes, vec![3, 5, 10]);
    assert_eq!(c.behavioral.targeting_keywords.len(), 11);
    assert!(c.log.json);
}

#[test]
fn partial_file_keeps_other_defaults() {
    let f = write_config(r#"{"scoring": {"bot_threshold": 0.8}, "network": {"min_edge_weight": 1}}"#);
    let c = DetectorConfig::load(f.path()).unwrap();
    assert_eq!(c.scoring.bot_threshold, 0.8);
    assert_eq!(c.scoring.suspicious_threshold, 0.5);
    assert_eq!(c.network.min_edge_weight, 1);
    assert_eq!(c.temporal.sync_window_secs, 300);
}

#[test]
fn malformed_file_is_a_parse_error() {
    let f = write_config("{ not json");
    let err = DetectorConfig::load(f.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
}

#[test]
fn thresholds_must_be_ordered() {
    let f = write_config(r#"{"scoring": {"suspicious_threshold": 0.8, "bot_threshold": 0.6}}"#);
    let err = DetectorConfig::load(f.path()).unwrap_err();
    assert!(matches!(err, ConfigError::ThresholdOrder { .. }));
}

#[test]
fn fusion_weights_must_sum_to_one() {
    let mut c = DetectorConfig::default();
    c.scoring.cluster_weight = 0.7;
    assert!(matches!(
        c.validate().unwrap_err(),
        ConfigError::FusionWeights { .. }
    ));
}

#[test]
fn negative_feature_weight_rejected() {
    let mut c = DetectorConfig::default();
    c.scoring.weights.account_age = -0.1;
    assert!(matches!(
        c.validate().unwrap_err(),
        ConfigError::InvalidWeight {
            feature: "account_age_score",
            ..
        }
    ));
}

#[test]
fn all_zero_feature_weights_rejected() {
    let mut c = DetectorConfig::default();
    let w = &mut c.scoring.weights;
    w.temporal_burst = 0.0;
    w.text_similarity = 0.0;
    w.network_connectivity = 0.0;
    w.account_age = 0.0;
    w.username_pattern = 0.0;
    w.comment_rate = 0.0;
    assert!(matches!(c.validate().unwrap_err(), ConfigError::ZeroWeights));
}

#[test]
fn empty_battery_rejected() {
    let mut c = DetectorConfig::default();
    c.clustering.hdbscan_min_cluster_sizes.clear();
    c.clustering.dbscan_eps_values.clear();
    assert!(matches!(c.validate().unwrap_err(), ConfigError::EmptyBattery));
}

#[test]
fn out_of_range_values_name_the_field() {
    let mut c = DetectorConfig::default();
    c.text.similarity_threshold = 1.5;
    match c.validate().unwrap_err() {
        ConfigError::OutOfRange { field, .. } => assert_eq!(field, "text.similarity_threshold"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn minimum_size_messages_use_the_actual_bound() {
    let mut c = DetectorConfig::default();
    c.network.min_clique_size = 1;
    let err = c.validate().unwrap_err();
    assert_eq!(err.to_string(), "network.min_clique_size = 1: expected at least 2");

    let mut c = DetectorConfig::default();
    c.text.max_features = 0;
    match c.validate().unwrap_err() {
        ConfigError::OutOfRange { expected, .. } => assert_eq!(expected, "at least 1"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn one_minimum_size_for_groups_cliques_and_clusters() {
    let c = DetectorConfig::default().with_min_cluster_size(4);
    assert_eq!(c.temporal.min_group_size, 4);
    assert_eq!(c.network.min_clique_size, 4);
    assert_eq!(c.clustering.min_cluster_size, 4);
    assert!(c.validate().is_ok());
    assert!(DetectorConfig::default().with_min_cluster_size(1).validate().is_err());
}
