use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serde JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Unsupported source kind: {0}")]
    UnsupportedSourceKind(String),

    #[error("Records of {found} cannot be rendered with the {expected} schema")]
    SchemaMismatch { expected: String, found: String },

    #[error("Unknown field for {kind}: {key}")]
    UnknownField { kind: String, key: String },

    #[error("Unsupported export format: {0}")]
    UnsupportedFormat(String),

    #[error("Record provider failed: {0}")]
    Provider(String),

    #[error("Cache error: {0}")]
    CacheError(String),

    #[error("Preview blocked: {0}")]
    PreviewBlocked(String),

    #[error("Download blocked: {0}")]
    DownloadBlocked(String),

    #[error("Delivery failed: {0}")]
    Delivery(String),

    #[error("Background task failed: {0}")]
    Task(String),
}
