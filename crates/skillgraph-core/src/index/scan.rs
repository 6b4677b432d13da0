//! Directory walk that builds a fresh index state.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use ignore::WalkBuilder;
use tracing::warn;

use super::derive_edges;
use crate::error::VaultError;
use crate::models::{Edge, Node};
use crate::record;

/// Index state produced by one scan, not yet published.
pub(super) struct ScannedVault {
    pub nodes: HashMap<String, Node>,
    pub order: Vec<String>,
    pub edges: Vec<Edge>,
}

pub(super) fn scan_directory(root: &Path, extension: &str) -> Result<ScannedVault, VaultError> {
    if !root.is_dir() {
        return Err(VaultError::RootNotFound(root.to_path_buf()));
    }

    let mut nodes: HashMap<String, Node> = HashMap::new();
    let mut order: Vec<String> = Vec::new();

    for path in collect_record_paths(root, extension) {
        let rel_path = relative_path(root, &path);

        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(path = %rel_path, error = %e, "skipping unreadable record");
                continue;
            }
        };

        let decoded = match record::decode(&raw) {
            Ok(decoded) => decoded,
            Err(e) if e.is_parse_error() => {
                warn!(path = %rel_path, error = %e, "failed to parse front matter");
                continue;
            }
            Err(e) => {
                warn!(path = %rel_path, error = %e, "skipping invalid record");
                continue;
            }
        };

        let id = decoded.meta.id.clone();
        let node = Node {
            meta: decoded.meta,
            content: decoded.body,
            raw,
            file_path: rel_path,
        };

        match nodes.get(&id) {
            None => {
                order.push(id.clone());
                nodes.insert(id, node);
            }
            // A stale active copy left behind by an archive must not undo it.
            Some(previous) if previous.is_archived() && !node.is_archived() => {
                warn!(
                    id = %id,
                    kept = %previous.file_path,
                    ignored = %node.file_path,
                    "duplicate node id; keeping the archived copy"
                );
            }
            Some(previous) => {
                warn!(
                    id = %id,
                    replaced = %previous.file_path,
                    path = %node.file_path,
                    "duplicate node id; later file wins"
                );
                nodes.insert(id, node);
            }
        }
    }

    let edges = order
        .iter()
        .filter_map(|id| nodes.get(id))
        .flat_map(|node| derive_edges(&node.meta.id, &node.meta.connections))
        .collect();

    Ok(ScannedVault {
        nodes,
        order,
        edges,
    })
}

/// Every `*.<extension>` file under `root`, hidden entries excluded, sorted.
fn collect_record_paths(root: &Path, extension: &str) -> Vec<PathBuf> {
    let walker = WalkBuilder::new(root)
        .hidden(true)
        .ignore(false)
        .git_ignore(false)
        .git_global(false)
        .git_exclude(false)
        .parents(false)
        .build();

    let mut paths: Vec<PathBuf> = walker
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(error = %e, "skipping unreadable vault entry");
                None
            }
        })
        .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
        .map(|entry| entry.into_path())
        .filter(|path| {
            path.extension()
                .and_then(|e| e.to_str())
                .map(|e| e == extension)
                .unwrap_or(false)
        })
        .collect();

    paths.sort();
    paths
}

/// `/`-separated path of `path` relative to `root`.
fn relative_path(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
