mod error;
mod file;

pub use error::StorageError;
pub use file::FileStore;

use std::path::Path;

/// Trait for record storage backends.
///
/// Paths are relative to the vault root and `/`-separated. Only the mutation
/// operations in [`crate::vault`] write through a store; scanning reads the
/// directory tree directly.
pub trait RecordStore {
    /// Root directory the relative paths resolve against.
    fn root(&self) -> &Path;

    /// Writes `contents` to `rel_path`, creating parent directories.
    ///
    /// Implementations must replace the file as a whole: readers see either
    /// the old or the new contents, never a partial write.
    fn write(&self, rel_path: &str, contents: &str) -> Result<(), StorageError>;

    /// Removes the file at `rel_path`.
    fn remove(&self, rel_path: &str) -> Result<(), StorageError>;
}
