use crate::db::errors::DBError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::Path;
use tracing::{debug, warn};
use uuid::Uuid;

/// Reads a JSON record, falling back to the default when the file is missing or unreadable.
pub fn load_or_default<T>(path: &Path) -> T
where
    T: DeserializeOwned + Default,
{
    let data = match fs::read_to_string(path) {
        Ok(data) => data,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), "no stored data yet, starting empty");
            return T::default();
        }
        Err(err) => {
            warn!(path = %path.display(), error = %err, "failed to read stored data, starting empty");
            return T::default();
        }
    };
    serde_json::from_str(&data).unwrap_or_else(|err| {
        warn!(path = %path.display(), error = %err, "stored data is corrupt, starting empty");
        T::default()
    })
}

/// Replaces `path` wholesale: the payload goes to a sibling temp file which is
/// synced and then renamed over the target, so readers see old or new content only.
pub fn write_atomically<T>(path: &Path, value: &T) -> Result<(), DBError>
where
    T: Serialize + ?Sized,
{
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let payload = serde_json::to_vec_pretty(value)?;
    let temp_path = path.with_extension(format!("{}.tmp", Uuid::new_v4().simple()));

    let written = File::create(&temp_path).and_then(|mut file| {
        file.write_all(&payload)?;
        file.sync_all()
    });
    if let Err(err) = written.and_then(|_| fs::rename(&temp_path, path)) {
        let _ = fs::remove_file(&temp_path);
        return Err(DBError::IoError(err));
    }
    sync_parent(path)?;
    Ok(())
}

/// Flushes the directory entry so the rename itself survives a crash.
#[cfg(unix)]
fn sync_parent(path: &Path) -> std::io::Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    File::open(parent)?.sync_all()
}

#[cfg(not(unix))]
fn sync_parent(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn missing_file_loads_default() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let loaded: Vec<String> = load_or_default(&dir.path().join("absent.json"));
        assert!(loaded.is_empty());
    }

    #[test]
    fn corrupt_file_loads_default() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ not json").expect("Failed to write file");
        let loaded: BTreeMap<String, Vec<String>> = load_or_default(&path);
        assert!(loaded.is_empty());
    }

    #[test]
    fn write_then_load_works() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("nested").join("data.json");
        let value = vec!["a".to_string(), "b".to_string()];
        write_atomically(&path, &value).expect("Failed to write");
        let loaded: Vec<String> = load_or_default(&path);
        assert_eq!(loaded, value);
    }

    #[test]
    fn write_leaves_no_temp_files() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("data.json");
        write_atomically(&path, &vec![1, 2, 3]).expect("Failed to write");
        write_atomically(&path, &vec![4]).expect("Failed to write");
        let entries: Vec<_> = fs::read_dir(dir.path())
            .expect("Failed to read dir")
            .filter_map(Result::ok)
            .collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn sync_parent_accepts_nested_and_bare_paths() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        sync_parent(&dir.path().join("data.json")).expect("Failed to sync directory");
        sync_parent(Path::new("data.json")).expect("Failed to sync working directory");
    }

    #[test]
    fn write_into_unusable_directory_fails() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "file, not a directory").expect("Failed to write file");
        let result = write_atomically(&blocker.join("data.json"), &vec![1]);
        assert!(matches!(result, Err(DBError::IoError(_))));
    }
}
