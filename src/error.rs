use thiserror::Error;

/// Rejected engine configuration.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConfigError {
    #[error("region thresholds must be finite with low <= high (got low={low}, high={high})")]
    InvertedThresholds { low: f64, high: f64 },
    #[error("simplification tolerance must be finite and non-negative (got {0})")]
    InvalidTolerance(f64),
    #[error("escape token {token:?} is empty or a prefix of {other:?}")]
    AmbiguousEscapeTokens { token: String, other: String },
    #[error("escape token {token:?} must map to a single ASCII digit (got {digit:?})")]
    InvalidEscapeDigit { token: String, digit: char },
    #[error("malformed configuration: {0}")]
    Parse(String),
}

/// Rejected layer document. Raised at the ingest boundary only.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum IngestError {
    #[error("malformed layer document: {0}")]
    Malformed(String),
    #[error("layer exceeds {limit} cap ({got} > {max})")]
    LimitExceeded { limit: &'static str, got: usize, max: usize },
    #[error("feature {id:?} has a coordinate outside the accepted range")]
    CoordOutOfBounds { id: String },
}

/// Geometry that the repairer could not turn into a valid polygon.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RepairError {
    #[error("geometry contains a non-finite coordinate")]
    NonFinite,
    #[error("geometry has no area after repair")]
    Degenerate,
}
