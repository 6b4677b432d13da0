use std::fs;
use std::io::Write;
use std::path::{Component, Path, PathBuf};

use tracing::debug;
use uuid::Uuid;

use super::error::StorageError;
use super::RecordStore;

/// File-based record store rooted at the vault directory.
///
/// Writes are staged in a hidden temporary file next to the target and
/// renamed into place:
/// ```text
/// vault/
///   skills/n8n/.webhook-retries.md.<uuid>.tmp   # staged
///   skills/n8n/webhook-retries.md               # after rename
/// ```
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Creates a store rooted at `root`. The directory need not exist yet.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolves a vault-relative path, rejecting anything that climbs out.
    fn resolve(&self, rel_path: &str) -> Result<PathBuf, StorageError> {
        let rel = Path::new(rel_path);
        let escapes = rel.components().any(|c| {
            matches!(
                c,
                Component::ParentDir | Component::RootDir | Component::Prefix(_)
            )
        });
        if escapes || rel_path.is_empty() {
            return Err(StorageError::OutsideRoot(rel.to_path_buf()));
        }
        Ok(self.root.join(rel))
    }

    /// Ensures a directory exists.
    fn ensure_dir(dir: &Path) -> Result<(), StorageError> {
        if !dir.exists() {
            fs::create_dir_all(dir).map_err(|e| StorageError::io(dir, e))?;
        }
        Ok(())
    }
}

impl RecordStore for FileStore {
    fn root(&self) -> &Path {
        &self.root
    }

    fn write(&self, rel_path: &str, contents: &str) -> Result<(), StorageError> {
        let path = self.resolve(rel_path)?;
        let parent = path
            .parent()
            .ok_or_else(|| StorageError::OutsideRoot(path.clone()))?;
        Self::ensure_dir(parent)?;

        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("record");
        let tmp_path = parent.join(format!(".{}.{}.tmp", file_name, Uuid::new_v4().simple()));

        {
            let mut tmp = fs::File::create(&tmp_path).map_err(|e| StorageError::io(&tmp_path, e))?;
            tmp.write_all(contents.as_bytes())
                .and_then(|_| tmp.sync_all())
                .map_err(|e| StorageError::io(&tmp_path, e))?;
        }

        if let Err(e) = fs::rename(&tmp_path, &path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(StorageError::io(&path, e));
        }

        debug!(path = %rel_path, bytes = contents.len(), "wrote record");
        Ok(())
    }

    fn remove(&self, rel_path: &str) -> Result<(), StorageError> {
        let path = self.resolve(rel_path)?;
        fs::remove_file(&path).map_err(|e| StorageError::io(&path, e))
    }
}
