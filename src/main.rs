//! Batch runner: load config and a comment file, run one detection pass, write results
//! as ndjson to stdout and log the summary.

use botnet_detector::{
    comments::load_comments,
    config::DetectorConfig,
    detector::BotnetDetector,
    logging::{ResultLine, StructuredLogger},
    DetectorError,
};
use std::io::Write;
use std::path::PathBuf;
use tracing::{error, info};

fn input_path() -> Option<PathBuf> {
    std::env::args()
        .nth(1)
        .or_else(|| std::env::var("BOTNET_INPUT_PATH").ok())
        .map(PathBuf::from)
}

fn run() -> Result<(), DetectorError> {
    let config_path = std::env::var("BOTNET_CONFIG_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.json"));
    let config = DetectorConfig::load(&config_path)?;

    StructuredLogger::init(config.log.json, &config.log.level);
    info!(config = %config_path.display(), "botnet detector starting");

    let Some(input) = input_path() else {
        error!("no input: pass a comment file or set BOTNET_INPUT_PATH");
        return Err(DetectorError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "no comment file given",
        )));
    };
    let comments = load_comments(&input)?;
    info!(input = %input.display(), comments = comments.len(), "comments loaded");

    let detector = BotnetDetector::new(config)?;
    let report = detector.run(comments);

    let ts = report.generated_at.to_rfc3339();
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for result in &report.results {
        StructuredLogger::emit_json(&ResultLine::new(report.run_id, ts.clone(), result), &mut out)?;
    }
    out.flush()?;

    let s = &report.summary;
    info!(
        run_id = %report.run_id,
        accounts = s.total_accounts,
        comments = s.total_comments,
        likely_bots = s.classification_counts.likely_bot,
        suspicious = s.classification_counts.suspicious,
        likely_human = s.classification_counts.likely_human,
        high_confidence_bots = s.high_confidence_bots,
        clusters = s.clusters_found,
        noise = s.noise_points,
        mean_probability = s.mean_bot_probability,
        "batch complete"
    );
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    run().map_err(|e| {
        error!(error = %e, "batch failed");
        e.into()
    })
}
