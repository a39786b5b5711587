//! Durable analytics store: one JSON document holding every project-creation
//! event.
//!
//! Reads never fail. A missing file yields an empty document, a file that no
//! candidate encoding turns into JSON is moved aside to
//! `analytics.json.corrupted` and replaced by an empty document, and shape
//! problems (`projects` missing or not a list) are normalized in place.
//! Writes go through a verified tempfile and an atomic rename, and report
//! failure as `false` rather than an error.

use crate::config::AnalyticsConfig;
use crate::errlog::{local_timestamp, ErrorSink, FileErrorLog};
use crate::error::{Result, VibeError};
use crate::paths;
use crate::text::TextEncoding;
use crate::types::{AnalyticsDocument, NewProject, ProjectRecord};
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;

pub struct AnalyticsStore {
    config: AnalyticsConfig,
    sink: Arc<dyn ErrorSink>,
}

impl AnalyticsStore {
    /// Store rooted at `config.data_dir`, logging to its `errors.log`.
    pub fn new(config: AnalyticsConfig) -> Self {
        let sink = Arc::new(FileErrorLog::new(config.error_log_path()));
        Self { config, sink }
    }

    pub fn with_sink(config: AnalyticsConfig, sink: Arc<dyn ErrorSink>) -> Self {
        Self { config, sink }
    }

    pub fn config(&self) -> &AnalyticsConfig {
        &self.config
    }

    pub fn sink(&self) -> &dyn ErrorSink {
        self.sink.as_ref()
    }

    pub fn path(&self) -> PathBuf {
        self.config.analytics_path()
    }

    // ---------------------------------------------------------------------------
    // Load
    // ---------------------------------------------------------------------------

    pub fn load(&self) -> AnalyticsDocument {
        match self.try_load() {
            Ok(doc) => doc,
            Err(e @ VibeError::CorruptStore { .. }) => {
                self.sink
                    .record("All encodings failed, backing up corrupted file", Some(&e));
                self.backup_corrupted();
                AnalyticsDocument::default()
            }
            Err(e) => {
                self.sink.record("Unexpected error loading analytics", Some(&e));
                AnalyticsDocument::default()
            }
        }
    }

    fn try_load(&self) -> Result<AnalyticsDocument> {
        let path = self.path();
        if !path.exists() {
            return Ok(AnalyticsDocument::default());
        }
        let bytes = std::fs::read(&path)?;

        for encoding in TextEncoding::PREFERENCE {
            let Some(text) = encoding.decode(&bytes) else {
                self.sink
                    .note(&format!("Unicode decode error with {encoding} encoding"));
                continue;
            };
            match serde_json::from_str::<Value>(&text) {
                Ok(value) => return Ok(self.normalize(value)),
                Err(e) => self.sink.record(
                    &format!("JSON decode error with {encoding} encoding"),
                    Some(&e.into()),
                ),
            }
        }

        Err(VibeError::CorruptStore { path })
    }

    /// Coerce any parsed JSON value into a well-formed document.
    fn normalize(&self, value: Value) -> AnalyticsDocument {
        let mut obj = match value {
            Value::Object(obj) => obj,
            other => {
                self.sink.note(&format!(
                    "Analytics file is not a mapping: {}",
                    json_type(&other)
                ));
                return AnalyticsDocument::default();
            }
        };

        let mut doc = AnalyticsDocument::default();
        match obj.remove("version") {
            Some(Value::String(v)) => doc.version = v,
            Some(other) => self.sink.note(&format!(
                "Analytics version is not a string: {}",
                json_type(&other)
            )),
            None => {}
        }

        match obj.remove("projects") {
            Some(Value::Array(items)) => {
                doc.projects = items
                    .into_iter()
                    .enumerate()
                    .map(|(idx, item)| self.record_from_value(idx, item))
                    .collect();
            }
            Some(other) => self.sink.note(&format!(
                "Projects is not a list: {}",
                json_type(&other)
            )),
            None => {}
        }

        doc.extra = obj;
        doc
    }

    fn record_from_value(&self, idx: usize, item: Value) -> ProjectRecord {
        if !item.is_object() {
            let err = VibeError::MalformedRecord(format!(
                "entry {idx} is {}, not a mapping",
                json_type(&item)
            ));
            self.sink.record("Unreadable project record kept as-is", Some(&err));
        }
        ProjectRecord::from(item)
    }

    fn backup_corrupted(&self) {
        let path = self.path();
        let backup = paths::backup_path(&path);
        if let Err(e) = std::fs::rename(&path, &backup) {
            self.sink
                .record("Could not back up corrupted analytics file", Some(&e.into()));
        }
    }

    // ---------------------------------------------------------------------------
    // Save
    // ---------------------------------------------------------------------------

    pub fn save(&self, doc: &AnalyticsDocument) -> bool {
        match serde_json::to_value(doc) {
            Ok(value) => self.save_value(&value),
            Err(e) => {
                self.sink.record("Error serializing analytics", Some(&e.into()));
                false
            }
        }
    }

    /// Save an arbitrary JSON value. Anything other than an object is refused.
    pub fn save_value(&self, value: &Value) -> bool {
        if !value.is_object() {
            self.sink.record(
                "Attempted to save non-mapping data",
                Some(&VibeError::NotAMapping(json_type(value).to_string())),
            );
            return false;
        }
        match self.write_document(value, |bytes| {
            serde_json::from_slice::<Value>(bytes)?;
            Ok(())
        }) {
            Ok(()) => true,
            Err(e) => {
                self.sink.record("Error saving analytics", Some(&e));
                false
            }
        }
    }

    fn write_document<F>(&self, value: &Value, verify: F) -> Result<()>
    where
        F: FnOnce(&[u8]) -> Result<()>,
    {
        let data = serde_json::to_string_pretty(value)?;
        crate::io::atomic_write_verified(&self.path(), data.as_bytes(), verify)
    }

    // ---------------------------------------------------------------------------
    // Tracking
    // ---------------------------------------------------------------------------

    /// Append a creation event. Returns the new record id, or `None` when the
    /// document could not be saved (in which case nothing was written).
    pub fn track_project(&self, project: NewProject) -> Option<String> {
        let mut doc = self.load();

        if project.project_name.is_empty() || project.project_name == "Unknown" {
            self.sink.note("Track project called with invalid project_name");
        }

        let id = Uuid::new_v4().to_string();
        doc.projects.push(ProjectRecord::new(id.clone(), local_timestamp(), project));

        if self.save(&doc) {
            Some(id)
        } else {
            self.sink.note("Failed to save analytics after tracking project");
            None
        }
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "mapping",
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
