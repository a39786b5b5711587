//! Best-effort diagnostic sinks.
//!
//! The store, parser and aggregator never surface their failures to the
//! caller; the details land here instead. Implementations must not panic and
//! must swallow their own I/O failures.

use crate::error::VibeError;
use chrono::Local;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

pub trait ErrorSink {
    /// Record one diagnostic entry, optionally with the error that caused it.
    fn record(&self, message: &str, error: Option<&VibeError>);

    fn note(&self, message: &str) {
        self.record(message, None);
    }
}

/// Local time as `2026-10-19T14:03:27.512094`, the format used for both log
/// entries and record timestamps.
pub fn local_timestamp() -> String {
    Local::now().format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
}

/// Format one entry the way it appears in `errors.log`.
pub fn format_entry(message: &str, error: Option<&VibeError>) -> String {
    let timestamp = local_timestamp();
    let mut entry = format!("[{timestamp}] {message}\n");
    if let Some(e) = error {
        entry.push_str(&format!("  Error: {}: {}\n", e.kind(), e));
    }
    entry
}

// ---------------------------------------------------------------------------
// FileErrorLog
// ---------------------------------------------------------------------------

/// Append-only text log, normally `~/.vibecoding/errors.log`.
#[derive(Debug, Clone)]
pub struct FileErrorLog {
    path: PathBuf,
}

impl FileErrorLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn append(&self, entry: &str) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut f = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        f.write_all(entry.as_bytes())
    }
}

impl ErrorSink for FileErrorLog {
    fn record(&self, message: &str, error: Option<&VibeError>) {
        match error {
            Some(e) => tracing::warn!(error = %e, "{message}"),
            None => tracing::debug!("{message}"),
        }
        if let Err(e) = self.append(&format_entry(message, error)) {
            tracing::debug!(path = %self.path.display(), error = %e, "error log write failed");
        }
    }
}

// ---------------------------------------------------------------------------
// MemoryErrorLog
// ---------------------------------------------------------------------------

/// Keeps entries in memory. Used by tests to assert on diagnostics.
#[derive(Debug, Default)]
pub struct MemoryErrorLog {
    entries: Mutex<Vec<String>>,
}

impl MemoryErrorLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<String> {
        match self.entries.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.entries().iter().any(|e| e.contains(needle))
    }
}

impl ErrorSink for MemoryErrorLog {
    fn record(&self, message: &str, error: Option<&VibeError>) {
        let entry = match error {
            Some(e) => format!("{message} ({}: {e})", e.kind()),
            None => message.to_string(),
        };
        match self.entries.lock() {
            Ok(mut guard) => guard.push(entry),
            Err(poisoned) => poisoned.into_inner().push(entry),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn file_log_appends_entries() {
        let dir = TempDir::new().unwrap();
        let log = FileErrorLog::new(dir.path().join("nested/errors.log"));
        log.note("first");
        log.record(
            "second",
            Some(&VibeError::MalformedRecord("no id".to_string())),
        );

        let content = std::fs::read_to_string(log.path()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with('[') && lines[0].ends_with("] first"));
        assert!(lines[1].ends_with("] second"));
        assert_eq!(
            lines[2],
            "  Error: MalformedRecord: malformed project record: no id"
        );
    }

    #[test]
    fn file_log_swallows_write_failures() {
        let dir = TempDir::new().unwrap();
        // A directory where the log file should be makes the open fail.
        let path = dir.path().join("errors.log");
        std::fs::create_dir_all(&path).unwrap();
        FileErrorLog::new(&path).note("dropped");
        assert!(path.is_dir());
    }

    #[test]
    fn memory_log_collects() {
        let log = MemoryErrorLog::new();
        log.note("hello");
        assert!(log.contains("hello"));
        assert_eq!(log.entries().len(), 1);
    }
}
