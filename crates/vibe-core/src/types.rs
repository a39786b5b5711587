use crate::config::STORE_VERSION;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

// ---------------------------------------------------------------------------
// ProjectRecord
// ---------------------------------------------------------------------------

/// One project-creation event in the analytics store.
///
/// The entry is held exactly as it was read and written back unchanged, so
/// rewriting the store never alters older records. Records written by older
/// tools or edited by hand may have missing or oddly shaped fields; the
/// accessors give a typed view and supply defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectRecord(Value);

impl Default for ProjectRecord {
    fn default() -> Self {
        Self(Value::Object(Map::new()))
    }
}

impl From<Value> for ProjectRecord {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

impl ProjectRecord {
    /// A fresh record for a newly scaffolded project.
    pub fn new(id: String, timestamp: String, project: NewProject) -> Self {
        let mut obj = Map::new();
        obj.insert("id".to_string(), Value::String(id));
        obj.insert("timestamp".to_string(), Value::String(timestamp));
        obj.insert("project_name".to_string(), Value::String(project.project_name));
        obj.insert("project_path".to_string(), Value::String(project.project_path));
        obj.insert(
            "project_types".to_string(),
            Value::Array(project.project_types.into_iter().map(Value::String).collect()),
        );
        obj.insert("tech_stack".to_string(), Value::Object(project.tech_stack));
        obj.insert("environment".to_string(), Value::Object(project.environment));
        Self(Value::Object(obj))
    }

    /// The record as stored.
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn is_mapping(&self) -> bool {
        self.0.is_object()
    }

    fn text(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn id(&self) -> &str {
        self.text("id").unwrap_or("unknown")
    }

    pub fn name(&self) -> &str {
        self.text("project_name").unwrap_or("Unknown")
    }

    pub fn path(&self) -> &str {
        self.text("project_path").unwrap_or("")
    }

    pub fn created(&self) -> &str {
        self.text("timestamp").unwrap_or("")
    }

    /// String tags from `project_types`; other elements are skipped.
    pub fn types(&self) -> Vec<String> {
        self.0
            .get("project_types")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect()
    }

    /// Tech-stack entries whose value is a string, in stored order.
    pub fn stack_entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0
            .get("tech_stack")
            .and_then(Value::as_object)
            .into_iter()
            .flatten()
            .filter_map(|(k, v)| v.as_str().map(|s| (k.as_str(), s)))
    }

    /// Names of the expected fields that are absent or had the wrong shape.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        for key in ["id", "timestamp", "project_name", "project_path"] {
            if self.text(key).is_none() {
                missing.push(key);
            }
        }
        if !self.0.get("project_types").is_some_and(Value::is_array) {
            missing.push("project_types");
        }
        if !self.0.get("tech_stack").is_some_and(Value::is_object) {
            missing.push("tech_stack");
        }
        missing
    }
}

/// Input to [`crate::store::AnalyticsStore::track_project`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewProject {
    pub project_name: String,
    pub project_path: String,
    #[serde(default)]
    pub project_types: Vec<String>,
    #[serde(default)]
    pub tech_stack: Map<String, Value>,
    #[serde(default)]
    pub environment: Map<String, Value>,
}

// ---------------------------------------------------------------------------
// AnalyticsDocument
// ---------------------------------------------------------------------------

/// The persisted analytics file: `{"version": "1.0", "projects": [...]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsDocument {
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub projects: Vec<ProjectRecord>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_version() -> String {
    STORE_VERSION.to_string()
}

impl Default for AnalyticsDocument {
    fn default() -> Self {
        Self {
            version: default_version(),
            projects: Vec::new(),
            extra: Map::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// ProgressStatus
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProgressStatus {
    NoContext,
    Complete,
    InProgress,
    Paused,
    Deleted,
    Error,
}

impl ProgressStatus {
    pub fn all() -> &'static [ProgressStatus] {
        &[
            ProgressStatus::NoContext,
            ProgressStatus::Complete,
            ProgressStatus::InProgress,
            ProgressStatus::Paused,
            ProgressStatus::Deleted,
            ProgressStatus::Error,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ProgressStatus::NoContext => "no-context",
            ProgressStatus::Complete => "complete",
            ProgressStatus::InProgress => "in-progress",
            ProgressStatus::Paused => "paused",
            ProgressStatus::Deleted => "deleted",
            ProgressStatus::Error => "error",
        }
    }
}

impl fmt::Display for ProgressStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ProgressSnapshot / ProjectProgress
// ---------------------------------------------------------------------------

/// Progress derived from one project's status file at one point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    pub progress: u32,
    pub done: usize,
    pub total: usize,
    pub in_progress: usize,
    pub current_phase: String,
    pub status: ProgressStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProgressSnapshot {
    /// A zero-progress snapshot for a project whose status file could not be
    /// used.
    pub fn unavailable(status: ProgressStatus, phase: impl Into<String>) -> Self {
        Self {
            progress: 0,
            done: 0,
            total: 0,
            in_progress: 0,
            current_phase: phase.into(),
            status,
            error: None,
        }
    }

    pub fn with_error(mut self, detail: impl Into<String>) -> Self {
        self.error = Some(detail.into());
        self
    }
}

/// One row of the aggregated progress report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectProgress {
    pub id: String,
    pub name: String,
    pub path: String,
    pub types: Vec<String>,
    pub created: String,
    #[serde(flatten)]
    pub snapshot: ProgressSnapshot,
}
