//! Structured logging and ndjson emission.

mod format;

pub use format::{ResultLine, StructuredLogger};
