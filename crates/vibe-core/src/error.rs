use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VibeError {
    #[error("analytics store is corrupt: {}", path.display())]
    CorruptStore { path: PathBuf },

    #[error("cannot read {}: {reason}", path.display())]
    UnreadablePath { path: PathBuf, reason: String },

    #[error("malformed project record: {0}")]
    MalformedRecord(String),

    #[error("failed to process project '{project}': {reason}")]
    AggregationFailure { project: String, reason: String },

    #[error("analytics document is not a mapping: {0}")]
    NotAMapping(String),

    #[error("home directory not found: set HOME or VIBECODING_HOME")]
    HomeNotFound,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Regex(#[from] regex::Error),
}

impl VibeError {
    /// Short classification used in the error log's secondary line.
    pub fn kind(&self) -> &'static str {
        match self {
            VibeError::CorruptStore { .. } => "CorruptStore",
            VibeError::UnreadablePath { .. } => "UnreadablePath",
            VibeError::MalformedRecord(_) => "MalformedRecord",
            VibeError::AggregationFailure { .. } => "AggregationFailure",
            VibeError::NotAMapping(_) => "NotAMapping",
            VibeError::HomeNotFound => "HomeNotFound",
            VibeError::Io(_) => "IoError",
            VibeError::Json(_) => "JsonError",
            VibeError::Regex(_) => "RegexError",
        }
    }
}

pub type Result<T> = std::result::Result<T, VibeError>;
