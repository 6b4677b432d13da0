//! In-memory index of vault nodes and the edges derived from them.
//!
//! The index is rebuilt wholesale by [`VaultIndex::scan`] and patched in place
//! by the mutation operations in [`crate::vault`]. Every accessor that hands
//! data out returns clones, so a later scan never changes what a caller holds.

mod scan;

use std::collections::HashMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::config::RECORD_EXTENSION;
use crate::error::VaultError;
use crate::models::{Connection, Edge, Neighbor, Node};

/// Counts reported by a completed scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScanSummary {
    pub nodes: usize,
    pub edges: usize,
}

/// Nodes keyed by id (in scan/insertion order) plus the derived edge list.
#[derive(Debug, Clone, Default)]
pub struct VaultIndex {
    nodes: HashMap<String, Node>,
    order: Vec<String>,
    edges: Vec<Edge>,
    last_scan: Option<DateTime<Utc>>,
}

impl VaultIndex {
    /// Creates an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds the index from every record file under `root`.
    pub fn scan(&mut self, root: &Path) -> Result<ScanSummary, VaultError> {
        self.scan_with_extension(root, RECORD_EXTENSION)
    }

    /// Rebuilds the index from every `*.<extension>` file under `root`.
    ///
    /// Files that cannot be read or decoded are logged and skipped. The new
    /// state replaces the old one only after the whole tree has been walked;
    /// on error the index is left as it was.
    pub fn scan_with_extension(
        &mut self,
        root: &Path,
        extension: &str,
    ) -> Result<ScanSummary, VaultError> {
        let scanned = scan::scan_directory(root, extension)?;

        self.nodes = scanned.nodes;
        self.order = scanned.order;
        self.edges = scanned.edges;
        self.last_scan = Some(Utc::now());

        let summary = ScanSummary {
            nodes: self.nodes.len(),
            edges: self.edges.len(),
        };
        info!(
            root = %root.display(),
            nodes = summary.nodes,
            edges = summary.edges,
            "scanned vault"
        );
        Ok(summary)
    }

    /// Looks up a node by id.
    pub fn get(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Whether a node with this id is indexed.
    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// Iterates nodes in scan/insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Node> + '_ {
        self.order.iter().filter_map(move |id| self.nodes.get(id))
    }

    /// Snapshot of all nodes in scan/insertion order.
    pub fn all(&self) -> Vec<Node> {
        self.iter().cloned().collect()
    }

    /// The derived edge list.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Snapshot of the derived edge list.
    pub fn edges_snapshot(&self) -> Vec<Edge> {
        self.edges.clone()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// When the last successful scan finished.
    pub fn last_scan(&self) -> Option<DateTime<Utc>> {
        self.last_scan
    }

    /// Nodes one edge away from `id`, in either direction.
    ///
    /// Returns `None` when `id` is not indexed. Edges whose other endpoint is
    /// not indexed are skipped.
    pub fn neighbors(&self, id: &str) -> Option<Vec<Neighbor>> {
        if !self.contains(id) {
            return None;
        }

        let found = self
            .edges
            .iter()
            .filter_map(|edge| {
                let other = if edge.source == id {
                    &edge.target
                } else if edge.target == id {
                    &edge.source
                } else {
                    return None;
                };
                self.nodes.get(other).map(|node| Neighbor {
                    node: node.clone(),
                    edge: edge.edge_type.clone(),
                })
            })
            .collect();

        Some(found)
    }

    // =========================================================================
    // Patch operations (used by the mutation layer)
    // =========================================================================

    pub(crate) fn get_mut(&mut self, id: &str) -> Option<&mut Node> {
        self.nodes.get_mut(id)
    }

    /// Inserts or replaces a node. A replaced node keeps its position.
    pub(crate) fn upsert(&mut self, node: Node) {
        let id = node.meta.id.clone();
        if self.nodes.insert(id.clone(), node).is_none() {
            self.order.push(id);
        }
    }

    /// Drops every edge from `source` and appends one per connection.
    pub(crate) fn replace_edges_from(&mut self, source: &str, connections: &[Connection]) {
        self.edges.retain(|edge| edge.source != source);
        self.append_edges(source, connections);
    }

    /// Appends one edge per connection with a non-empty target.
    pub(crate) fn append_edges(&mut self, source: &str, connections: &[Connection]) {
        self.edges.extend(derive_edges(source, connections));
    }
}

/// Edges contributed by one node's connections, in declaration order.
pub(crate) fn derive_edges<'a>(
    source: &'a str,
    connections: &'a [Connection],
) -> impl Iterator<Item = Edge> + 'a {
    connections
        .iter()
        .filter(|conn| !conn.target.is_empty())
        .map(move |conn| Edge {
            source: source.to_string(),
            target: conn.target.clone(),
            edge_type: conn.edge.clone(),
        })
}
