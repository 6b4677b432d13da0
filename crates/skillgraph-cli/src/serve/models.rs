//! API request and response types for the REST server.
//!
//! These are Data Transfer Objects (DTOs) that define the shape of the JSON
//! exchanged with the dashboard and with automation clients.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use skillgraph_core::config::SNIPPET_LENGTH;
use skillgraph_core::{
    Connection, EdgeType, Neighbor, Node, NodeType, NodeUpdate, Suggestion, VaultStats,
};

// =============================================================================
// Service Models
// =============================================================================

/// Response for `GET /`.
#[derive(Debug, Serialize)]
pub struct ServiceInfo {
    pub service: &'static str,
    pub version: &'static str,
    pub status: &'static str,
    #[serde(flatten)]
    pub stats: VaultStats,
}

/// Response for `GET /health`.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub time: String,
}

/// Response for `POST /v1/sync`.
#[derive(Debug, Serialize)]
pub struct SyncResponse {
    pub synced: bool,
    pub nodes: usize,
    pub edges: usize,
}

// =============================================================================
// Node Models (for `/v1/nodes`)
// =============================================================================

/// Query parameters for `GET /v1/nodes`.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    #[serde(rename = "type")]
    pub node_type: Option<String>,
    pub domain: Option<String>,
    pub status: Option<String>,
}

/// Compact node listing entry.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeSummary {
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    pub title: String,
    pub domain: String,
    pub tags: Vec<String>,
    pub status: String,
    pub confidence: String,
    pub updated: String,
    pub connection_count: usize,
}

impl From<&Node> for NodeSummary {
    fn from(node: &Node) -> Self {
        Self {
            id: node.meta.id.clone(),
            node_type: node.meta.node_type,
            title: node.meta.title.clone(),
            domain: node.meta.domain.clone(),
            tags: node.meta.tags.clone(),
            status: node.meta.status.clone(),
            confidence: node.meta.confidence.clone(),
            updated: node.meta.updated.clone(),
            connection_count: node.meta.connections.len(),
        }
    }
}

/// Response for `GET /v1/nodes`.
#[derive(Debug, Serialize)]
pub struct NodeListResponse {
    pub count: usize,
    pub nodes: Vec<NodeSummary>,
}

/// A node one edge away, for `GET /v1/nodes/{id}/connections`.
#[derive(Debug, Serialize)]
pub struct ConnectedNode {
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    pub title: String,
    pub domain: String,
    pub edge: EdgeType,
}

impl From<Neighbor> for ConnectedNode {
    fn from(neighbor: Neighbor) -> Self {
        let meta = neighbor.node.meta;
        Self {
            id: meta.id,
            node_type: meta.node_type,
            title: meta.title,
            domain: meta.domain,
            edge: neighbor.edge,
        }
    }
}

/// Response for `GET /v1/nodes/{id}/connections`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionsResponse {
    pub node_id: String,
    pub connections: Vec<ConnectedNode>,
}

/// Body for `POST /v1/nodes`.
#[derive(Debug, Default, Deserialize)]
pub struct CreateNodeRequest {
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub node_type: Option<String>,
    pub title: Option<String>,
    pub domain: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub confidence: Option<String>,
    #[serde(default)]
    pub connections: Vec<Connection>,
    pub content: Option<String>,
}

/// Response for `POST /v1/nodes`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedResponse {
    pub created: bool,
    pub id: String,
    pub file_path: String,
}

/// Body for `PUT /v1/nodes/{id}`. Absent fields are left unchanged.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateNodeRequest {
    pub title: Option<String>,
    pub domain: Option<String>,
    pub tags: Option<Vec<String>>,
    pub confidence: Option<String>,
    pub content: Option<String>,
    pub connections: Option<Vec<Connection>>,
}

impl From<UpdateNodeRequest> for NodeUpdate {
    fn from(body: UpdateNodeRequest) -> Self {
        NodeUpdate {
            title: body.title,
            domain: body.domain,
            tags: body.tags,
            confidence: body.confidence,
            content: body.content,
            connections: body.connections,
        }
    }
}

/// Body for `POST /v1/nodes/{id}/connections`.
#[derive(Debug, Deserialize)]
pub struct AddConnectionsRequest {
    #[serde(default)]
    pub connections: Vec<Connection>,
}

/// Response for `DELETE /v1/nodes/{id}`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchivedResponse {
    pub archived: bool,
    pub id: String,
    pub file_path: String,
}

// =============================================================================
// Search Models (for `/v1/search`)
// =============================================================================

/// Query parameters for `GET /v1/search`.
#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
    #[serde(rename = "type")]
    pub node_type: Option<String>,
    pub domain: Option<String>,
    pub status: Option<String>,
    pub confidence: Option<String>,
    pub limit: Option<usize>,
}

/// A single search hit.
#[derive(Debug, Serialize)]
pub struct SearchHit {
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    pub title: String,
    pub domain: String,
    pub tags: Vec<String>,
    pub confidence: String,
    pub updated: String,
    /// Start of the body on one line.
    pub snippet: String,
}

impl From<&Node> for SearchHit {
    fn from(node: &Node) -> Self {
        Self {
            id: node.meta.id.clone(),
            node_type: node.meta.node_type,
            title: node.meta.title.clone(),
            domain: node.meta.domain.clone(),
            tags: node.meta.tags.clone(),
            confidence: node.meta.confidence.clone(),
            updated: node.meta.updated.clone(),
            snippet: snippet(&node.content),
        }
    }
}

/// First [`SNIPPET_LENGTH`] characters of `content` with newlines flattened.
pub fn snippet(content: &str) -> String {
    content
        .chars()
        .take(SNIPPET_LENGTH)
        .map(|c| if c == '\n' { ' ' } else { c })
        .collect::<String>()
        .trim()
        .to_string()
}

/// Response for `GET /v1/search`.
#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub count: usize,
    pub results: Vec<SearchHit>,
}

// =============================================================================
// Changelog Models (for `/v1/changelog`)
// =============================================================================

/// Query parameters for `GET /v1/changelog`.
#[derive(Debug, Default, Deserialize)]
pub struct ChangelogQuery {
    pub limit: Option<usize>,
}

/// One recently updated node.
#[derive(Debug, Serialize)]
pub struct ChangelogEntry {
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    pub title: String,
    pub domain: String,
    pub status: String,
    pub updated: String,
    pub created: String,
}

impl From<&Node> for ChangelogEntry {
    fn from(node: &Node) -> Self {
        Self {
            id: node.meta.id.clone(),
            node_type: node.meta.node_type,
            title: node.meta.title.clone(),
            domain: node.meta.domain.clone(),
            status: node.meta.status.clone(),
            updated: node.meta.updated.clone(),
            created: node.meta.created.clone(),
        }
    }
}

/// Response for `GET /v1/changelog`.
#[derive(Debug, Serialize)]
pub struct ChangelogResponse {
    pub count: usize,
    pub entries: Vec<ChangelogEntry>,
}

/// Response for `GET /v1/graph/domains`.
pub type DomainCounts = BTreeMap<String, usize>;

// =============================================================================
// Suggestion and Ingestion Models
// =============================================================================

/// Body for `POST /v1/suggest`.
#[derive(Debug, Default, Deserialize)]
pub struct SuggestRequest {
    pub title: Option<String>,
    #[serde(default)]
    pub domain: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub content: String,
}

/// Response for `POST /v1/suggest`.
#[derive(Debug, Serialize)]
pub struct SuggestResponse {
    pub count: usize,
    pub suggestions: Vec<Suggestion>,
}

/// Body for `POST /v1/ingest` and `POST /v1/webhook/n8n`.
#[derive(Debug, Default, Deserialize)]
pub struct IngestBody {
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub node_type: Option<String>,
    pub title: Option<String>,
    pub domain: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub confidence: Option<String>,
    pub content: Option<String>,
    #[serde(default)]
    pub connections: Vec<Connection>,
    /// Webhook only: replace connections with suggestions.
    #[serde(default)]
    pub auto_connect: bool,
    /// Also add the reverse connection on each existing target.
    #[serde(default)]
    pub mirror: bool,
}

/// Response for `POST /v1/ingest`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestResponse {
    pub ingested: bool,
    pub id: String,
    pub file_path: String,
    pub url: String,
    pub mirrored: Vec<String>,
}

/// Response for `POST /v1/webhook/n8n`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookResponse {
    pub created: bool,
    pub id: String,
    pub file_path: String,
    pub auto_connections: usize,
    pub source: &'static str,
}
