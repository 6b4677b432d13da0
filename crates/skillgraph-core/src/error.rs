//! Vault error types.

use std::path::PathBuf;
use thiserror::Error;

use crate::models::UnknownNodeType;
use crate::record::RecordError;
use crate::storage::StorageError;

/// Errors surfaced by vault scans and mutations.
///
/// Unknown ids are not errors: lookups and mutations return `None` instead.
#[derive(Debug, Error)]
pub enum VaultError {
    /// The directory handed to a scan does not exist.
    #[error("Vault root not found: {}", .0.display())]
    RootNotFound(PathBuf),

    /// A node with this id is already indexed.
    #[error("Node \"{0}\" already exists")]
    DuplicateId(String),

    /// A caller-supplied type is not one of the known node types.
    #[error("Invalid node type: {0}")]
    InvalidType(#[from] UnknownNodeType),

    /// A record could not be encoded.
    #[error("Record error: {0}")]
    Record(#[from] RecordError),

    /// Writing or removing a file failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}
