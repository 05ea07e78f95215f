//! Comment input: a JSON array or newline-delimited JSON objects.

use super::Comment;
use crate::error::{DetectorError, DetectorResult};
use std::path::Path;
use tracing::{info, warn};

pub fn load_comments(path: &Path) -> DetectorResult<Vec<Comment>> {
    let data = std::fs::read_to_string(path)?;
    let comments = parse_comments(&data)?;
    info!(path = %path.display(), count = comments.len(), "loaded comments");
    Ok(comments)
}

/// Parse comment records. Syntax errors fail; records that do not fit the comment
/// schema are dropped with a warning.
pub fn parse_comments(data: &str) -> DetectorResult<Vec<Comment>> {
    let values: Vec<(usize, serde_json::Value)> = if data.trim_start().starts_with('[') {
        let values: Vec<serde_json::Value> = serde_json::from_str(data)
            .map_err(|source| DetectorError::Json { line: 1, source })?;
        values.into_iter().enumerate().map(|(i, v)| (i + 1, v)).collect()
    } else {
        let mut out = Vec::new();
        for (i, line) in data.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let value = serde_json::from_str(line)
                .map_err(|source| DetectorError::Json { line: i + 1, source })?;
            out.push((i + 1, value));
        }
        out
    };

    let mut comments = Vec::with_capacity(values.len());
    for (record, value) in values {
        match serde_json::from_value::<Comment>(value) {
            Ok(c) => comments.push(c),
            Err(e) => warn!(record, error = %e, "skipping malformed comment record"),
        }
    }
    Ok(comments)
}
