use crate::errlog::ErrorSink;
use crate::error::{Result, VibeError};
use crate::paths;
use crate::progress::calculate_progress;
use crate::store::AnalyticsStore;
use crate::types::{ProgressSnapshot, ProgressStatus, ProjectProgress, ProjectRecord};
use std::io::ErrorKind;
use std::path::Path;

/// Progress for every tracked project, in store order.
pub fn get_all_projects_progress(store: &AnalyticsStore) -> Vec<ProjectProgress> {
    let doc = store.load();
    aggregate(&doc.projects, store.sink())
}

/// Compute one progress row per record. A record that fails is replaced by an
/// `error` row; the rest of the batch is unaffected.
pub fn aggregate(records: &[ProjectRecord], sink: &dyn ErrorSink) -> Vec<ProjectProgress> {
    records
        .iter()
        .map(|record| match project_progress(record, sink) {
            Ok(row) => row,
            Err(e) => {
                sink.record(
                    &format!("Error processing project: {}", record.name()),
                    Some(&e),
                );
                placeholder(record)
            }
        })
        .collect()
}

fn project_progress(record: &ProjectRecord, sink: &dyn ErrorSink) -> Result<ProjectProgress> {
    let missing = record.missing_fields();
    if !missing.is_empty() {
        tracing::debug!(project = record.name(), ?missing, "record missing fields, using defaults");
    }

    let path = record.path();
    let snapshot = if path.is_empty() || !project_exists(record, Path::new(path))? {
        ProgressSnapshot::unavailable(ProgressStatus::Deleted, "Project not found")
    } else {
        calculate_progress(&paths::context_path(Path::new(path)), sink)
    };

    Ok(ProjectProgress {
        id: record.id().to_string(),
        name: record.name().to_string(),
        path: path.to_string(),
        types: record.types(),
        created: record.created().to_string(),
        snapshot,
    })
}

/// A path under a regular file cannot exist either, so `NotADirectory` reads
/// as absent. Anything else (permission denied) is a real failure.
fn project_exists(record: &ProjectRecord, path: &Path) -> Result<bool> {
    match path.try_exists() {
        Ok(exists) => Ok(exists),
        Err(e) if e.kind() == ErrorKind::NotADirectory => Ok(false),
        Err(e) => Err(VibeError::AggregationFailure {
            project: record.name().to_string(),
            reason: e.to_string(),
        }),
    }
}

fn placeholder(record: &ProjectRecord) -> ProjectProgress {
    ProjectProgress {
        id: record.id().to_string(),
        name: record.name().to_string(),
        path: record.path().to_string(),
        types: Vec::new(),
        created: String::new(),
        snapshot: ProgressSnapshot::unavailable(ProgressStatus::Error, "Error loading"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalyticsConfig;
    use crate::errlog::MemoryErrorLog;
    use crate::types::NewProject;
    use serde_json::json;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn record(name: &str, path: &Path) -> ProjectRecord {
        ProjectRecord::from(json!({
            "id": format!("id-{name}"),
            "timestamp": "2026-10-01T09:00:00.000000",
            "project_name": name,
            "project_path": path.to_string_lossy(),
            "project_types": ["saas-platform"],
        }))
    }

    fn write_context(project: &Path, content: &str) {
        let ctx = paths::context_path(project);
        std::fs::create_dir_all(ctx.parent().unwrap()).unwrap();
        std::fs::write(ctx, content).unwrap();
    }

    #[test]
    fn classifies_each_record() {
        let dir = TempDir::new().unwrap();
        let live = dir.path().join("live");
        let bare = dir.path().join("bare");
        std::fs::create_dir_all(&bare).unwrap();
        write_context(&live, "[x][x][ ]");

        let records = vec![
            record("live", &live),
            record("gone", &dir.path().join("gone")),
            record("bare", &bare),
            ProjectRecord::default(),
        ];
        let log = MemoryErrorLog::new();
        let rows = aggregate(&records, &log);

        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0].name, "live");
        assert_eq!(rows[0].snapshot.status, ProgressStatus::InProgress);
        assert_eq!(rows[0].snapshot.progress, 67);
        assert_eq!(rows[0].types, vec!["saas-platform".to_string()]);
        assert_eq!(rows[0].created, "2026-10-01T09:00:00.000000");

        assert_eq!(rows[1].snapshot.status, ProgressStatus::Deleted);
        assert_eq!(rows[1].snapshot.current_phase, "Project not found");

        assert_eq!(rows[2].snapshot.status, ProgressStatus::NoContext);

        assert_eq!(rows[3].snapshot.status, ProgressStatus::Deleted);
        assert_eq!(rows[3].id, "unknown");
        assert_eq!(rows[3].name, "Unknown");
    }

    #[test]
    fn deleted_project_never_reaches_parser() {
        let dir = TempDir::new().unwrap();
        let log = MemoryErrorLog::new();
        // A parse of this path would log "too large"/"Invalid"; deleted must not.
        let rows = aggregate(&[record("gone", &dir.path().join("gone"))], &log);
        assert_eq!(rows[0].snapshot.status, ProgressStatus::Deleted);
        assert!(log.entries().is_empty());
    }

    #[test]
    fn path_below_a_regular_file_is_deleted() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("was-a-project");
        std::fs::write(&file, "replaced by a file").unwrap();

        let log = MemoryErrorLog::new();
        let rows = aggregate(&[record("nested", &file.join("app"))], &log);

        assert_eq!(rows[0].snapshot.status, ProgressStatus::Deleted);
        assert_eq!(rows[0].snapshot.current_phase, "Project not found");
        assert!(log.entries().is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn failing_record_is_isolated() {
        use std::os::unix::fs::PermissionsExt;
        let dir = TempDir::new().unwrap();
        let locked = dir.path().join("locked");
        std::fs::create_dir_all(&locked).unwrap();
        let ok = dir.path().join("ok");
        write_context(&ok, "[x]");
        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o000)).unwrap();

        let inside = locked.join("project");
        let probe = inside.try_exists();
        let log = MemoryErrorLog::new();
        let rows = aggregate(&[record("inside", &inside), record("ok", &ok)], &log);
        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o755)).unwrap();

        if probe.is_err() {
            assert_eq!(rows[0].snapshot.status, ProgressStatus::Error);
            assert_eq!(rows[0].snapshot.current_phase, "Error loading");
            assert!(rows[0].types.is_empty());
            assert!(log.contains("AggregationFailure"));
        }
        assert_eq!(rows[1].snapshot.status, ProgressStatus::Complete);
    }

    #[test]
    fn repeated_aggregation_is_identical() {
        let dir = TempDir::new().unwrap();
        let project = dir.path().join("shop");
        write_context(&project, "## Current Focus\n> Payments\n[x][ ][/]");
        let log = Arc::new(MemoryErrorLog::new());
        let store = AnalyticsStore::with_sink(AnalyticsConfig::new(dir.path().join("data")), log);
        store
            .track_project(NewProject {
                project_name: "shop".to_string(),
                project_path: project.to_string_lossy().into_owned(),
                ..Default::default()
            })
            .unwrap();
        store
            .track_project(NewProject {
                project_name: "old".to_string(),
                project_path: dir.path().join("old").to_string_lossy().into_owned(),
                ..Default::default()
            })
            .unwrap();

        let first = get_all_projects_progress(&store);
        let second = get_all_projects_progress(&store);
        assert_eq!(first, second);
        assert_eq!(first[0].name, "shop");
        assert_eq!(first[0].snapshot.current_phase, "Payments");
        assert_eq!(first[1].snapshot.status, ProgressStatus::Deleted);
    }
}
