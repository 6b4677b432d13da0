//! Read-only queries over a [`VaultIndex`].

use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::index::VaultIndex;
use crate::models::{Edge, Node, NodeType};

/// Exact-match filter. Fields left as `None` are not applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeFilter {
    pub node_type: Option<NodeType>,
    pub domain: Option<String>,
    pub status: Option<String>,
    pub confidence: Option<String>,
}

impl NodeFilter {
    pub fn with_type(mut self, node_type: NodeType) -> Self {
        self.node_type = Some(node_type);
        self
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn with_confidence(mut self, confidence: impl Into<String>) -> Self {
        self.confidence = Some(confidence.into());
        self
    }

    pub fn matches(&self, node: &Node) -> bool {
        let meta = &node.meta;
        self.node_type.map_or(true, |t| meta.node_type == t)
            && self.domain.as_deref().map_or(true, |d| meta.domain == d)
            && self.status.as_deref().map_or(true, |s| meta.status == s)
            && self
                .confidence
                .as_deref()
                .map_or(true, |c| meta.confidence == c)
    }
}

/// Summary counts for the whole index.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultStats {
    pub total_nodes: usize,
    pub total_edges: usize,
    pub types: BTreeMap<String, usize>,
    pub domains: BTreeMap<String, usize>,
    pub last_scan: Option<DateTime<Utc>>,
}

/// A node as drawn in the graph view.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    pub title: String,
    pub domain: String,
    pub tags: Vec<String>,
    pub status: String,
    pub confidence: String,
    pub connection_count: usize,
    pub updated: String,
}

/// Active nodes plus the edges running between them.
#[derive(Debug, Clone, Serialize)]
pub struct GraphView {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<Edge>,
}

impl VaultIndex {
    /// Nodes matching `filter`, in index order.
    pub fn list(&self, filter: &NodeFilter) -> Vec<Node> {
        self.iter().filter(|n| filter.matches(n)).cloned().collect()
    }

    /// Case-insensitive substring search over title, id, domain, tags and content.
    ///
    /// Title hits rank first, then newer `updated` dates. An empty query
    /// matches every node that passes the filter.
    pub fn search(&self, query: &str, filter: &NodeFilter) -> Vec<Node> {
        let q = query.to_lowercase();

        let mut hits: Vec<(bool, &Node)> = self
            .iter()
            .filter(|n| filter.matches(n))
            .filter_map(|n| {
                let title_hit = n.meta.title.to_lowercase().contains(&q);
                let hit = title_hit
                    || n.meta.id.to_lowercase().contains(&q)
                    || n.meta.domain.to_lowercase().contains(&q)
                    || n.meta.tags.iter().any(|t| t.to_lowercase().contains(&q))
                    || n.content.to_lowercase().contains(&q);
                hit.then_some((title_hit, n))
            })
            .collect();

        hits.sort_by(|(a_title, a), (b_title, b)| {
            b_title
                .cmp(a_title)
                .then_with(|| by_updated_desc(a, b))
        });

        hits.into_iter().map(|(_, n)| n.clone()).collect()
    }

    /// The `limit` most recently updated nodes.
    pub fn changelog(&self, limit: usize) -> Vec<Node> {
        let mut nodes: Vec<&Node> = self.iter().collect();
        nodes.sort_by(|a, b| by_updated_desc(a, b));
        nodes.into_iter().take(limit).cloned().collect()
    }

    /// Node count per domain.
    pub fn domain_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for node in self.iter() {
            *counts.entry(node.meta.domain.clone()).or_insert(0) += 1;
        }
        counts
    }

    /// Node count per type.
    pub fn type_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for node in self.iter() {
            *counts
                .entry(node.meta.node_type.as_str().to_string())
                .or_insert(0) += 1;
        }
        counts
    }

    pub fn stats(&self) -> VaultStats {
        VaultStats {
            total_nodes: self.len(),
            total_edges: self.edges().len(),
            types: self.type_counts(),
            domains: self.domain_counts(),
            last_scan: self.last_scan(),
        }
    }

    /// Graph of non-archived nodes and the edges whose endpoints are both shown.
    pub fn graph(&self) -> GraphView {
        let nodes: Vec<GraphNode> = self
            .iter()
            .filter(|n| !n.is_archived())
            .map(|n| GraphNode {
                id: n.meta.id.clone(),
                node_type: n.meta.node_type,
                title: n.meta.title.clone(),
                domain: n.meta.domain.clone(),
                tags: n.meta.tags.clone(),
                status: n.meta.status.clone(),
                confidence: n.meta.confidence.clone(),
                connection_count: n.meta.connections.len(),
                updated: n.meta.updated.clone(),
            })
            .collect();

        let shown = |id: &str| self.get(id).map_or(false, |n| !n.is_archived());
        let edges = self
            .edges()
            .iter()
            .filter(|e| shown(&e.source) && shown(&e.target))
            .cloned()
            .collect();

        GraphView { nodes, edges }
    }

    /// Node stored at `path`, or failing that the first whose path ends with it.
    pub fn find_by_path(&self, path: &str) -> Option<&Node> {
        let path = path.trim_start_matches('/');
        if path.is_empty() {
            return None;
        }
        self.iter()
            .find(|n| n.file_path == path)
            .or_else(|| self.iter().find(|n| n.file_path.ends_with(path)))
    }
}

fn by_updated_desc(a: &Node, b: &Node) -> Ordering {
    b.meta.updated.cmp(&a.meta.updated)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_conjunction() {
        let filter = NodeFilter::default()
            .with_domain("n8n")
            .with_status("active");
        assert_eq!(filter.domain.as_deref(), Some("n8n"));
        assert_eq!(filter.status.as_deref(), Some("active"));
        assert!(filter.node_type.is_none());
        assert!(filter.confidence.is_none());
    }

    #[test]
    fn test_stats_json_keys() {
        let stats = VaultIndex::new().stats();
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["totalNodes"], 0);
        assert_eq!(json["totalEdges"], 0);
        assert!(json["types"].as_object().unwrap().is_empty());
        assert!(json["lastScan"].is_null());
    }
}
