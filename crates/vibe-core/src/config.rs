use crate::error::{Result, VibeError};
use crate::paths;
use std::path::{Path, PathBuf};

/// Environment variable overriding the per-user data directory.
pub const DATA_DIR_ENV: &str = "VIBECODING_HOME";

/// Version string written into fresh analytics documents.
pub const STORE_VERSION: &str = "1.0";

/// Status files above this size are rejected without being read.
pub const MAX_CONTEXT_BYTES: u64 = 1024 * 1024;

/// Maximum character width of an extracted current-focus phase.
pub const PHASE_WIDTH: usize = 50;

/// Number of technologies kept in the popularity table.
pub const TOP_TECH_LIMIT: usize = 5;

/// Where analytics state lives. Passed explicitly to the store so tests can
/// point it at a temporary directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyticsConfig {
    pub data_dir: PathBuf,
}

impl AnalyticsConfig {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Resolve the data directory.
    ///
    /// Priority:
    /// 1. `explicit` (the `--data-dir` flag or `VIBECODING_HOME`, already
    ///    merged by the caller)
    /// 2. `$HOME/.vibecoding`
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        if let Some(p) = explicit {
            return Ok(Self::new(p));
        }
        let home = home::home_dir().ok_or(VibeError::HomeNotFound)?;
        Ok(Self::new(home.join(paths::DATA_DIR)))
    }

    pub fn analytics_path(&self) -> PathBuf {
        paths::analytics_path(&self.data_dir)
    }

    pub fn error_log_path(&self) -> PathBuf {
        paths::error_log_path(&self.data_dir)
    }
}
