//! Typed errors for the feed pipeline.
//!
//! None of these escape `FeedSource::parse`: record-level failures are logged
//! and the record skipped. They surface only from explicit template, config
//! and binding calls.

use thiserror::Error;

/// Errors raised while resolving or loading template text.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// No template registered under this name
    #[error("template not found: {name}")]
    NotFound { name: String },

    /// Backing file could not be read
    #[error("failed to read template {name}: {source}")]
    Io {
        name: String,
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised while reading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration payload is not valid JSON for `RenderConfig`
    #[error("invalid config: {0}")]
    Json(#[from] serde_json::Error),
}

/// Reasons a single raw record is dropped from a batch.
#[derive(Debug, Error)]
pub enum RecordError {
    /// Record has no (or an empty) identifier
    #[error("record has no identifier")]
    MissingId,

    /// Record payload does not have the expected shape
    #[error("malformed record: {0}")]
    Malformed(#[from] serde_json::Error),

    /// Creation timestamp missing or not parseable
    #[error("invalid timestamp for record {id}: {value:?}")]
    InvalidTimestamp { id: String, value: Option<String> },

    /// Item template could not be rendered
    #[error("template error: {0}")]
    Template(#[from] TemplateError),
}

/// Umbrella error for whole-batch helpers used by the bindings.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Batch payload is not a JSON array, or output serialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// User supplied annotation pattern failed to compile
    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Result alias for template operations.
pub type TemplateResult<T> = std::result::Result<T, TemplateError>;

/// Result alias for batch helpers.
pub type Result<T> = std::result::Result<T, FeedError>;
