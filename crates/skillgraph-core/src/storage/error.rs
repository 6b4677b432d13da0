use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading or writing vault files.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Path escapes the vault root: {}", .0.display())]
    OutsideRoot(PathBuf),
}

impl StorageError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StorageError::Io {
            path: path.into(),
            source,
        }
    }
}
