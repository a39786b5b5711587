use crate::config::{MAX_CONTEXT_BYTES, PHASE_WIDTH};
use crate::errlog::ErrorSink;
use crate::error::VibeError;
use crate::text;
use crate::types::{ProgressSnapshot, ProgressStatus};
use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// Markers
// ---------------------------------------------------------------------------

pub const DONE_MARKERS: [&str; 2] = ["[x]", "[X]"];
pub const PENDING_MARKER: &str = "[ ]";
pub const IN_PROGRESS_MARKER: &str = "[/]";

/// Sections every well-formed status file is expected to mention.
pub const REQUIRED_SECTIONS: [&str; 3] = ["Project Status", "Completed", "Current Focus"];

/// "Current Focus" conventions, tried in order; the first capture wins.
pub const FOCUS_PATTERNS: [&str; 3] = [
    r"(?i)## 🎯 Current Focus\s*\n+>\s*\*?\*?(.+?)(?:\*?\*?)(?:\n|$)",
    r"(?i)## Current Focus\s*\n+>\s*(.+?)(?:\n|$)",
    r"(?i)\*\*Current Focus\*\*[:\s]+(.+?)(?:\n|$)",
];

const MIN_CONTENT_CHARS: usize = 50;
const MIN_PRINTABLE_RATIO: f64 = 0.9;

// ---------------------------------------------------------------------------
// Checkbox counting
// ---------------------------------------------------------------------------

/// Raw marker counts. These are substring counts: a marker outside a list
/// item still counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CheckboxCounts {
    pub done: usize,
    pub pending: usize,
    pub in_progress: usize,
}

impl CheckboxCounts {
    pub fn count(content: &str) -> Self {
        Self {
            done: DONE_MARKERS.iter().map(|m| content.matches(m).count()).sum(),
            pending: content.matches(PENDING_MARKER).count(),
            in_progress: content.matches(IN_PROGRESS_MARKER).count(),
        }
    }

    pub fn total(&self) -> usize {
        self.done + self.pending + self.in_progress
    }

    /// Percentage of done markers, rounded half-to-even and clamped to 0..=100.
    /// In-progress markers count toward the total but not toward completion.
    pub fn percent(&self) -> u32 {
        let total = self.total();
        if total == 0 {
            return 0;
        }
        let pct = (self.done as f64 / total as f64 * 100.0).round_ties_even();
        pct.clamp(0.0, 100.0) as u32
    }

    pub fn status(&self) -> ProgressStatus {
        if self.percent() >= 100 {
            ProgressStatus::Complete
        } else if self.in_progress > 0 || self.done > 0 {
            ProgressStatus::InProgress
        } else {
            ProgressStatus::Paused
        }
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Advisory structure check. An empty list means the content looks like a
/// status file; issues never stop parsing.
pub fn validate_context(content: &str) -> Vec<String> {
    let mut issues = Vec::new();

    let chars = content.chars().count();
    if chars < MIN_CONTENT_CHARS {
        issues.push(format!("File too short (< {MIN_CONTENT_CHARS} chars)"));
    }

    let lower = content.to_lowercase();
    for section in REQUIRED_SECTIONS {
        if !lower.contains(&section.to_lowercase()) {
            issues.push(format!("Missing section: {section}"));
        }
    }

    let printable = content.chars().filter(|&c| is_printable(c)).count();
    let ratio = if chars == 0 {
        0.0
    } else {
        printable as f64 / chars as f64
    };
    if ratio < MIN_PRINTABLE_RATIO {
        issues.push(format!(
            "Too many non-printable chars ({:.0}% printable)",
            ratio * 100.0
        ));
    }

    issues
}

fn is_printable(c: char) -> bool {
    match c {
        '\n' | '\r' | '\t' | ' ' => true,
        '\u{FEFF}' | '\u{200B}'..='\u{200F}' | '\u{202A}'..='\u{202E}' | '\u{2060}'..='\u{2064}' => {
            false
        }
        _ => !c.is_control() && !c.is_whitespace(),
    }
}

// ---------------------------------------------------------------------------
// Current focus
// ---------------------------------------------------------------------------

static FOCUS_RES: OnceLock<Result<Vec<Regex>, regex::Error>> = OnceLock::new();

fn focus_res() -> Result<&'static [Regex], VibeError> {
    let compiled = FOCUS_RES.get_or_init(|| FOCUS_PATTERNS.iter().map(|p| Regex::new(p)).collect());
    match compiled {
        Ok(res) => Ok(res.as_slice()),
        Err(e) => Err(e.clone().into()),
    }
}

/// Find the current-focus callout. `Ok(None)` when no convention matches.
pub fn extract_phase(content: &str) -> Result<Option<String>, VibeError> {
    for re in focus_res()? {
        if let Some(m) = re.captures(content).and_then(|caps| caps.get(1)) {
            let cleaned = m.as_str().replace('*', "");
            return Ok(Some(truncate_phase(cleaned.trim())));
        }
    }
    Ok(None)
}

fn truncate_phase(phase: &str) -> String {
    if phase.chars().count() <= PHASE_WIDTH {
        return phase.to_string();
    }
    let head: String = phase.chars().take(PHASE_WIDTH - 3).collect();
    format!("{head}...")
}

// ---------------------------------------------------------------------------
// calculate_progress
// ---------------------------------------------------------------------------

/// Derive a progress snapshot from one status file.
///
/// Never fails: a missing file is `no-context`, and any file that cannot be
/// read is an `error` snapshot whose phase names the reason.
pub fn calculate_progress(context_path: &Path, sink: &dyn ErrorSink) -> ProgressSnapshot {
    if !context_path.exists() {
        return ProgressSnapshot::unavailable(ProgressStatus::NoContext, "No CONTEXT.md");
    }

    let size = match std::fs::metadata(context_path) {
        Ok(meta) => meta.len(),
        Err(e) => {
            sink.record(
                &format!("Cannot stat file: {}", context_path.display()),
                Some(&e.into()),
            );
            return ProgressSnapshot::unavailable(ProgressStatus::Error, "Cannot access file");
        }
    };
    if size > MAX_CONTEXT_BYTES {
        sink.note(&format!(
            "CONTEXT.md too large: {size} bytes at {}",
            context_path.display()
        ));
        return ProgressSnapshot::unavailable(ProgressStatus::Error, "File too large")
            .with_error(format!("File size: {size} bytes"));
    }

    let content = match read_context(context_path, sink) {
        Ok(content) => content,
        Err(snapshot) => return snapshot,
    };

    let issues = validate_context(&content);
    if !issues.is_empty() {
        sink.note(&format!(
            "Invalid CONTEXT.md at {}: {}",
            context_path.display(),
            issues.join("; ")
        ));
    }

    let counts = CheckboxCounts::count(&content);

    let current_phase = match extract_phase(&content) {
        Ok(Some(phase)) => phase,
        Ok(None) => "Unknown".to_string(),
        Err(e) => {
            sink.record("Error extracting current phase", Some(&e));
            "Parse error".to_string()
        }
    };

    ProgressSnapshot {
        progress: counts.percent(),
        done: counts.done,
        total: counts.total(),
        in_progress: counts.in_progress,
        current_phase,
        status: counts.status(),
        error: None,
    }
}

fn read_context(path: &Path, sink: &dyn ErrorSink) -> Result<String, ProgressSnapshot> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            sink.record(
                &format!("Permission denied: {}", path.display()),
                Some(&e.into()),
            );
            return Err(ProgressSnapshot::unavailable(
                ProgressStatus::Error,
                "Permission denied",
            ));
        }
        Err(e) => {
            let err = VibeError::UnreadablePath {
                path: path.to_path_buf(),
                reason: e.to_string(),
            };
            sink.record("Could not read CONTEXT.md with any encoding", Some(&err));
            return Err(ProgressSnapshot::unavailable(
                ProgressStatus::Error,
                "Cannot read file",
            ));
        }
    };

    let decoded = text::decodings(&bytes).next();
    match decoded {
        Some((_, content)) => Ok(content),
        None => {
            sink.note(&format!(
                "Could not read CONTEXT.md with any encoding: {}",
                path.display()
            ));
            Err(ProgressSnapshot::unavailable(
                ProgressStatus::Error,
                "Cannot read file",
            ))
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errlog::MemoryErrorLog;
    use tempfile::TempDir;

    const WELL_FORMED: &str = "# Project Status\n\n## 🎯 Current Focus\n> **Building checkout flow**\n\n## Completed\n- [x] Scaffold\n- [x] Auth\n- [/] Checkout\n- [ ] Deploy\n";

    fn parse(content: &[u8]) -> (ProgressSnapshot, MemoryErrorLog) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("CONTEXT.md");
        std::fs::write(&path, content).unwrap();
        let log = MemoryErrorLog::new();
        let snapshot = calculate_progress(&path, &log);
        (snapshot, log)
    }

    #[test]
    fn missing_file_is_no_context() {
        let dir = TempDir::new().unwrap();
        let log = MemoryErrorLog::new();
        let snap = calculate_progress(&dir.path().join("CONTEXT.md"), &log);
        assert_eq!(snap.status, ProgressStatus::NoContext);
        assert_eq!(snap.current_phase, "No CONTEXT.md");
        assert_eq!((snap.progress, snap.done, snap.total), (0, 0, 0));
        assert!(log.entries().is_empty());
    }

    #[test]
    fn two_of_three_done() {
        let (snap, _) = parse(b"[x][x][ ]");
        assert_eq!(snap.done, 2);
        assert_eq!(snap.in_progress, 0);
        assert_eq!(snap.total, 3);
        assert_eq!(snap.progress, 67);
        assert_eq!(snap.status, ProgressStatus::InProgress);
    }

    #[test]
    fn all_done_is_complete() {
        let (snap, _) = parse(b"[x][X][x][X]");
        assert_eq!(snap.done, 4);
        assert_eq!(snap.total, 4);
        assert_eq!(snap.progress, 100);
        assert_eq!(snap.status, ProgressStatus::Complete);
    }

    #[test]
    fn prose_without_markers_is_paused() {
        let (snap, log) = parse(b"Just some notes about the project, nothing to tick off yet.");
        assert_eq!(snap.total, 0);
        assert_eq!(snap.progress, 0);
        assert_eq!(snap.status, ProgressStatus::Paused);
        assert_eq!(snap.current_phase, "Unknown");
        assert!(log.contains("Missing section: Project Status"));
    }

    #[test]
    fn only_in_progress_markers_is_in_progress() {
        let (snap, _) = parse(b"[/][ ]");
        assert_eq!(snap.progress, 0);
        assert_eq!(snap.in_progress, 1);
        assert_eq!(snap.status, ProgressStatus::InProgress);
    }

    #[test]
    fn percent_rounds_half_to_even() {
        // 1 of 8 is 12.5%.
        let counts = CheckboxCounts {
            done: 1,
            pending: 7,
            in_progress: 0,
        };
        assert_eq!(counts.percent(), 12);
        let counts = CheckboxCounts {
            done: 3,
            pending: 5,
            in_progress: 0,
        };
        assert_eq!(counts.percent(), 38);
    }

    #[test]
    fn percent_stays_in_range() {
        for done in 0..12 {
            for pending in 0..12 {
                for in_progress in 0..4 {
                    let c = CheckboxCounts {
                        done,
                        pending,
                        in_progress,
                    };
                    let p = c.percent();
                    assert!(p <= 100);
                    if c.total() == 0 {
                        assert_eq!(p, 0);
                    }
                    if p == 100 {
                        assert_eq!(c.done, c.total());
                    }
                }
            }
        }
    }

    #[test]
    fn well_formed_file_extracts_focus() {
        let (snap, log) = parse(WELL_FORMED.as_bytes());
        assert_eq!(snap.done, 2);
        assert_eq!(snap.in_progress, 1);
        assert_eq!(snap.total, 4);
        assert_eq!(snap.progress, 50);
        assert_eq!(snap.current_phase, "Building checkout flow");
        assert!(log.entries().is_empty(), "{:?}", log.entries());
    }

    #[test]
    fn focus_conventions_in_order() {
        assert_eq!(
            extract_phase("## Current Focus\n\n> Writing tests\n").unwrap(),
            Some("Writing tests".to_string())
        );
        assert_eq!(
            extract_phase("**Current Focus**: Ship *v2*\nrest").unwrap(),
            Some("Ship v2".to_string())
        );
        assert_eq!(
            extract_phase("## current focus\n> lower case works").unwrap(),
            Some("lower case works".to_string())
        );
        assert_eq!(extract_phase("## Current Focus\nno quote").unwrap(), None);
    }

    #[test]
    fn long_focus_is_truncated() {
        let long = "a".repeat(80);
        let phase = extract_phase(&format!("## Current Focus\n> {long}\n"))
            .unwrap()
            .unwrap();
        assert_eq!(phase.chars().count(), 50);
        assert!(phase.ends_with("..."));
    }

    #[test]
    fn oversized_file_is_error() {
        let big = vec![b'a'; (MAX_CONTEXT_BYTES + 1) as usize];
        let (snap, log) = parse(&big);
        assert_eq!(snap.status, ProgressStatus::Error);
        assert_eq!(snap.current_phase, "File too large");
        assert_eq!(
            snap.error.as_deref(),
            Some(format!("File size: {} bytes", MAX_CONTEXT_BYTES + 1).as_str())
        );
        assert!(log.contains("too large"));
    }

    #[test]
    fn non_utf8_file_is_still_parsed() {
        let (snap, _) = parse(b"Project Status \xE9t\xE9\n[x] one\n[ ] two\n");
        assert_eq!(snap.done, 1);
        assert_eq!(snap.total, 2);
        assert_eq!(snap.progress, 50);
    }

    #[test]
    fn validation_reports_issues() {
        assert!(validate_context(WELL_FORMED).is_empty());
        let issues = validate_context("");
        assert!(issues.contains(&"File too short (< 50 chars)".to_string()));
        assert!(issues.contains(&"Missing section: Completed".to_string()));
        assert!(issues.iter().any(|i| i.starts_with("Too many non-printable")));

        let binary = format!("{WELL_FORMED}{}", "\u{0}".repeat(200));
        assert!(validate_context(&binary)
            .iter()
            .any(|i| i.starts_with("Too many non-printable")));
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_file_is_error() {
        use std::os::unix::fs::PermissionsExt;
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("CONTEXT.md");
        std::fs::write(&path, WELL_FORMED).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o000)).unwrap();
        // Root ignores file modes; nothing to observe there.
        if std::fs::read(&path).is_ok() {
            return;
        }
        let log = MemoryErrorLog::new();
        let snap = calculate_progress(&path, &log);
        assert_eq!(snap.status, ProgressStatus::Error);
        assert_eq!(snap.current_phase, "Permission denied");
        assert!(log.contains("Permission denied"));
    }
}
