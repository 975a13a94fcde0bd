use std::io;

use thiserror::Error;

/// Errors surfaced by the metrics engine and its export layer.
///
/// Degenerate inputs (an empty corpus, an empty document, no categories)
/// are never errors; they produce empty or "uncategorized" results instead.
#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("duplicate document id `{0}`")]
    DuplicateDocument(String),
    #[error("duplicate category `{0}`")]
    DuplicateCategory(String),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("unknown export format `{0}` (expected `json` or `cbor`)")]
    UnknownFormat(String),
    #[error("unknown metric `{0}` (expected `cf`, `df`, `idf` or `balanced`)")]
    UnknownMetric(String),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Cbor(#[from] serde_cbor::Error),
    #[error(transparent)]
    Toml(#[from] toml::de::Error),
}

pub type Result<T, E = MetricsError> = std::result::Result<T, E>;
