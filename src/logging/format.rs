//! Structured output: tracing subscriber setup, and ndjson result lines (one JSON object
//! per line) for downstream ingestion.

use crate::clustering::ClusterLabel;
use crate::scoring::DetectionResult;
use serde::Serialize;
use std::io::Write;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

/// One detection result as emitted by the batch runner.
#[derive(Serialize)]
pub struct ResultLine<'a> {
    pub ts: String,
    pub run_id: Uuid,
    pub author_id: &'a str,
    pub cluster_id: ClusterLabel,
    pub cluster_confidence: f64,
    pub cluster_bot_probability: f64,
    pub individual_bot_probability: f64,
    pub final_bot_probability: f64,
    pub classification: &'a str,
}

impl<'a> ResultLine<'a> {
    pub fn new(run_id: Uuid, ts: String, result: &'a DetectionResult) -> Self {
        Self {
            ts,
            run_id,
            author_id: &result.author_id,
            cluster_id: result.cluster_id,
            cluster_confidence: result.cluster_confidence,
            cluster_bot_probability: result.cluster_bot_probability,
            individual_bot_probability: result.individual_bot_probability,
            final_bot_probability: result.final_bot_probability,
            classification: result.classification.as_str(),
        }
    }
}

pub struct StructuredLogger;

impl StructuredLogger {
    /// Install the global subscriber writing to stderr (stdout carries results).
    /// `RUST_LOG` overrides `default_level`. Safe to call more than once.
    pub fn init(json: bool, default_level: &str) {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
        let installed = if json {
            let fmt = tracing_subscriber::fmt::layer()
                .json()
                .with_span_events(FmtSpan::NONE)
                .with_writer(std::io::stderr);
            tracing_subscriber::registry().with(filter).with(fmt).try_init()
        } else {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .try_init()
        };
        if installed.is_err() {
            tracing::debug!("tracing subscriber already installed");
        }
    }

    /// Write one record as a single JSON line.
    pub fn emit_json(event: &impl Serialize, w: &mut impl Write) -> std::io::Result<()> {
        let line = serde_json::to_string(event)?;
        writeln!(w, "{}", line)
    }
}
