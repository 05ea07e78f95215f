use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{field} = {value}: expected {expected}")]
    OutOfRange {
        field: &'static str,
        value: String,
        expected: String,
    },

    #[error("suspicious threshold {suspicious} must be below bot threshold {bot}")]
    ThresholdOrder { suspicious: f64, bot: f64 },

    #[error("cluster weight {cluster} and individual weight {individual} must sum to 1")]
    FusionWeights { cluster: f64, individual: f64 },

    #[error("weight for {feature} must be finite and non-negative, got {weight}")]
    InvalidWeight { feature: &'static str, weight: f64 },

    #[error("individual feature weights sum to zero")]
    ZeroWeights,

    #[error("clustering battery has no runs configured")]
    EmptyBattery,
}

/// Reason a single clustering run produced no labels.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClusteringError {
    #[error("need at least {required} samples, got {actual}")]
    InsufficientSamples { required: usize, actual: usize },

    #[error("{parameter} = {value} exceeds sample count {samples}")]
    ParameterTooLarge {
        parameter: &'static str,
        value: usize,
        samples: usize,
    },

    #[error("distance matrix contains non-finite values")]
    NonFiniteDistances,

    #[error("distance matrix is {rows}x{cols}, expected square")]
    NotSquare { rows: usize, cols: usize },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GraphError {
    #[error("{algorithm} did not converge within {iterations} iterations")]
    NotConverged {
        algorithm: &'static str,
        iterations: usize,
    },

    #[error("{algorithm} undefined on a graph without edges")]
    Degenerate { algorithm: &'static str },
}

#[derive(Debug, Error)]
pub enum DetectorError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error at line {line}: {source}")]
    Json {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

pub type DetectorResult<T> = Result<T, DetectorError>;
