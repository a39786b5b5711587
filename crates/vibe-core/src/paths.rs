use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Directory and file constants
// ---------------------------------------------------------------------------

pub const DATA_DIR: &str = ".vibecoding";
pub const ANALYTICS_FILE: &str = "analytics.json";
pub const ERROR_LOG_FILE: &str = "errors.log";

pub const CORRUPTED_SUFFIX: &str = "corrupted";

pub const AGENT_DIR: &str = ".agent";
pub const CONTEXT_MD: &str = "CONTEXT.md";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn analytics_path(data_dir: &Path) -> PathBuf {
    data_dir.join(ANALYTICS_FILE)
}

pub fn error_log_path(data_dir: &Path) -> PathBuf {
    data_dir.join(ERROR_LOG_FILE)
}

/// `analytics.json` -> `analytics.json.corrupted`.
pub fn backup_path(path: &Path) -> PathBuf {
    with_extra_suffix(path, CORRUPTED_SUFFIX)
}

/// Status file of a scaffolded project: `<project>/.agent/CONTEXT.md`.
pub fn context_path(project_root: &Path) -> PathBuf {
    project_root.join(AGENT_DIR).join(CONTEXT_MD)
}

fn with_extra_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".");
    name.push(suffix);
    path.with_file_name(name)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
