use crate::error::Result;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Atomically write `data` to `path` using a tempfile in the same directory.
/// The tempfile is re-read and its bytes handed to `verify` before the rename.
/// If `verify` fails the target is untouched and the tempfile is removed.
pub fn atomic_write_verified<F>(path: &Path, data: &[u8], verify: F) -> Result<()>
where
    F: FnOnce(&[u8]) -> Result<()>,
{
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let prefix = match path.file_name() {
        Some(name) => format!("{}.", name.to_string_lossy()),
        None => ".".to_string(),
    };
    let mut tmp = tempfile::Builder::new()
        .prefix(&prefix)
        .suffix(".tmp")
        .tempfile_in(dir)?;
    tmp.write_all(data)?;
    tmp.as_file_mut().sync_all()?;

    let written = std::fs::read(tmp.path())?;
    verify(&written)?;

    persist(tmp, path)
}

fn persist(tmp: NamedTempFile, path: &Path) -> Result<()> {
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::VibeError;
    use tempfile::TempDir;

    fn leftover_temps(dir: &Path) -> Vec<String> {
        std::fs::read_dir(dir)
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .filter(|n| n.ends_with(".tmp"))
            .collect()
    }

    #[test]
    fn write_creates_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("analytics.json");
        atomic_write_verified(&path, b"{\"projects\": []}", |_| Ok(())).unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "{\"projects\": []}"
        );
        assert!(leftover_temps(dir.path()).is_empty());
    }

    #[test]
    fn write_creates_parents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a/b/c/analytics.json");
        atomic_write_verified(&path, b"{}", |_| Ok(())).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn failed_verification_leaves_target_and_no_tempfile() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("analytics.json");
        std::fs::write(&path, b"original").unwrap();

        let result = atomic_write_verified(&path, b"replacement", |_| {
            Err(VibeError::MalformedRecord("interrupted".to_string()))
        });

        assert!(result.is_err());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "original");
        assert!(leftover_temps(dir.path()).is_empty());
    }

    #[test]
    fn verify_sees_written_bytes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.json");
        atomic_write_verified(&path, b"[1,2]", |bytes| {
            assert_eq!(bytes, b"[1,2]");
            Ok(())
        })
        .unwrap();
    }
}
