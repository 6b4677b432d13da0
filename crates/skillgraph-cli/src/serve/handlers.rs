//! HTTP route handlers for the REST server.
//!
//! Handlers are kept thin: they validate input, take the vault lock and call
//! into `skillgraph_core`. Reads share the lock; anything that writes a file
//! or rescans takes it exclusively.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;

use skillgraph_core::config::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, WEBHOOK_SLUG_MAX_LEN};
use skillgraph_core::{
    ingest, Draft, GraphView, IngestRequest, NewNode, Node, NodeFilter, NodeType, VaultStats,
};

use super::error::ApiError;
use super::models::{
    AddConnectionsRequest, ArchivedResponse, ChangelogEntry, ChangelogQuery, ChangelogResponse,
    ConnectedNode, ConnectionsResponse, CreateNodeRequest, CreatedResponse, DomainCounts,
    HealthResponse, IngestBody, IngestResponse, ListQuery, NodeListResponse, NodeSummary,
    SearchHit, SearchQuery, SearchResponse, ServiceInfo, SuggestRequest, SuggestResponse,
    SyncResponse, UpdateNodeRequest, WebhookResponse,
};
use super::AppState;

const MARKDOWN_CONTENT_TYPE: &str = "text/markdown; charset=utf-8";

// =============================================================================
// Service Handlers
// =============================================================================

/// GET `/` - Service info plus vault statistics.
pub async fn index(State(state): State<Arc<AppState>>) -> Json<ServiceInfo> {
    let vault = state.vault.read().await;
    Json(ServiceInfo {
        service: "skillgraph-api",
        version: env!("CARGO_PKG_VERSION"),
        status: "online",
        stats: vault.index().stats(),
    })
}

/// GET `/health` - Liveness check.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        time: Utc::now().to_rfc3339(),
    })
}

/// POST `/v1/sync` - Rescan the vault from disk.
pub async fn sync(State(state): State<Arc<AppState>>) -> Result<Json<SyncResponse>, ApiError> {
    let mut vault = state.vault.write().await;
    let summary = vault.rescan()?;
    Ok(Json(SyncResponse {
        synced: true,
        nodes: summary.nodes,
        edges: summary.edges,
    }))
}

/// GET `/vault/{*path}` - Raw markdown by vault-relative file path.
pub async fn vault_file(State(state): State<Arc<AppState>>, Path(path): Path<String>) -> Response {
    let vault = state.vault.read().await;
    match vault.index().find_by_path(&path) {
        Some(node) => (
            [
                (header::CONTENT_TYPE, MARKDOWN_CONTENT_TYPE),
                (header::CACHE_CONTROL, "public, max-age=300"),
            ],
            node.raw.clone(),
        )
            .into_response(),
        None => (StatusCode::NOT_FOUND, "// 404: File not found in vault").into_response(),
    }
}

// =============================================================================
// Node Handlers
// =============================================================================

/// GET `/v1/nodes` - List nodes, optionally filtered by type, domain and status.
pub async fn list_nodes(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListQuery>,
) -> Result<Json<NodeListResponse>, ApiError> {
    let filter = NodeFilter {
        node_type: optional_type(params.node_type)?,
        domain: non_empty(params.domain),
        status: non_empty(params.status),
        confidence: None,
    };

    let vault = state.vault.read().await;
    let nodes: Vec<NodeSummary> = vault
        .index()
        .list(&filter)
        .iter()
        .map(NodeSummary::from)
        .collect();

    Ok(Json(NodeListResponse {
        count: nodes.len(),
        nodes,
    }))
}

/// GET `/v1/nodes/{id}` - Full node including content.
pub async fn get_node(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Node>, ApiError> {
    let vault = state.vault.read().await;
    vault
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or_else(ApiError::not_found)
}

/// GET `/v1/nodes/{id}/raw` - The record file exactly as stored.
pub async fn get_node_raw(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> Response {
    let vault = state.vault.read().await;
    match vault.get(&id) {
        Some(node) => {
            ([(header::CONTENT_TYPE, MARKDOWN_CONTENT_TYPE)], node.raw.clone()).into_response()
        }
        None => (StatusCode::NOT_FOUND, "Node not found").into_response(),
    }
}

/// GET `/v1/nodes/{id}/connections` - Nodes one edge away, either direction.
pub async fn get_node_connections(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ConnectionsResponse>, ApiError> {
    let vault = state.vault.read().await;
    let neighbors = vault.index().neighbors(&id).ok_or_else(ApiError::not_found)?;

    Ok(Json(ConnectionsResponse {
        node_id: id,
        connections: neighbors.into_iter().map(ConnectedNode::from).collect(),
    }))
}

/// POST `/v1/nodes` - Create a node. Requires the API key.
pub async fn create_node(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateNodeRequest>,
) -> Result<(StatusCode, Json<CreatedResponse>), ApiError> {
    let (Some(id), Some(type_name), Some(title), Some(content)) = (
        non_empty(body.id),
        non_empty(body.node_type),
        non_empty(body.title),
        non_empty(body.content),
    ) else {
        return Err(ApiError::BadRequest(
            "Missing required fields: id, type, title, content".to_string(),
        ));
    };
    let node_type = parse_type(&type_name)?;

    let mut vault = state.vault.write().await;
    if vault.contains(&id) {
        return Err(ApiError::Conflict(format!(
            "Node with id \"{id}\" already exists"
        )));
    }

    let mut new_node = NewNode::new(id, node_type, title)
        .with_tags(body.tags)
        .with_content(content)
        .with_connections(body.connections);
    if let Some(domain) = non_empty(body.domain) {
        new_node = new_node.with_domain(domain);
    }
    new_node.confidence = non_empty(body.confidence);

    let node = vault.create(new_node)?;

    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse {
            created: true,
            id: node.meta.id,
            file_path: node.file_path,
        }),
    ))
}

/// PUT `/v1/nodes/{id}` - Update fields of a node. Requires the API key.
pub async fn update_node(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<UpdateNodeRequest>,
) -> Result<Json<Node>, ApiError> {
    let mut vault = state.vault.write().await;
    vault
        .update(&id, body.into())?
        .map(Json)
        .ok_or_else(ApiError::not_found)
}

/// POST `/v1/nodes/{id}/connections` - Append connections. Requires the API key.
pub async fn add_node_connections(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<AddConnectionsRequest>,
) -> Result<Json<Node>, ApiError> {
    let mut vault = state.vault.write().await;
    vault
        .add_connections(&id, body.connections)?
        .map(Json)
        .ok_or_else(ApiError::not_found)
}

/// DELETE `/v1/nodes/{id}` - Archive a node. Requires the API key.
pub async fn archive_node(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ArchivedResponse>, ApiError> {
    let mut vault = state.vault.write().await;
    let node = vault.archive_node(&id)?.ok_or_else(ApiError::not_found)?;

    Ok(Json(ArchivedResponse {
        archived: true,
        id: node.meta.id,
        file_path: node.file_path,
    }))
}

// =============================================================================
// Query Handlers
// =============================================================================

/// GET `/v1/search` - Substring search.
///
/// Query parameters:
/// - `q`: search text (empty matches everything)
/// - `type`, `domain`, `status`, `confidence`: exact-match filters
/// - `limit`: maximum results (default: 20, max: 50)
pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchQuery>,
) -> Result<Json<SearchResponse>, ApiError> {
    let filter = NodeFilter {
        node_type: optional_type(params.node_type)?,
        domain: non_empty(params.domain),
        status: non_empty(params.status),
        confidence: non_empty(params.confidence),
    };
    let limit = page_size(params.limit);

    let vault = state.vault.read().await;
    let results: Vec<SearchHit> = vault
        .index()
        .search(&params.q, &filter)
        .iter()
        .take(limit)
        .map(SearchHit::from)
        .collect();

    Ok(Json(SearchResponse {
        query: params.q,
        count: results.len(),
        results,
    }))
}

/// GET `/v1/graph` - Active nodes and the edges between them.
pub async fn graph(State(state): State<Arc<AppState>>) -> Json<GraphView> {
    let vault = state.vault.read().await;
    Json(vault.index().graph())
}

/// GET `/v1/graph/stats` - Summary statistics.
pub async fn graph_stats(State(state): State<Arc<AppState>>) -> Json<VaultStats> {
    let vault = state.vault.read().await;
    Json(vault.index().stats())
}

/// GET `/v1/graph/domains` - Node count per domain.
pub async fn graph_domains(State(state): State<Arc<AppState>>) -> Json<DomainCounts> {
    let vault = state.vault.read().await;
    Json(vault.index().domain_counts())
}

/// GET `/v1/changelog` - Most recently updated nodes.
pub async fn changelog(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ChangelogQuery>,
) -> Json<ChangelogResponse> {
    let vault = state.vault.read().await;
    let entries: Vec<ChangelogEntry> = vault
        .index()
        .changelog(page_size(params.limit))
        .iter()
        .map(ChangelogEntry::from)
        .collect();

    Json(ChangelogResponse {
        count: entries.len(),
        entries,
    })
}

/// POST `/v1/suggest` - Connection suggestions for a draft node.
pub async fn suggest(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SuggestRequest>,
) -> Result<Json<SuggestResponse>, ApiError> {
    let title = non_empty(body.title)
        .ok_or_else(|| ApiError::BadRequest("Missing required field: title".to_string()))?;

    let draft = Draft {
        title,
        domain: body.domain,
        tags: body.tags,
        content: body.content,
    };

    let vault = state.vault.read().await;
    let suggestions = vault.suggest(&draft);

    Ok(Json(SuggestResponse {
        count: suggestions.len(),
        suggestions,
    }))
}

// =============================================================================
// Ingestion Handlers
// =============================================================================

/// POST `/v1/ingest` - Create a node with an id derived from its title.
/// Requires the API key.
pub async fn ingest_node(
    State(state): State<Arc<AppState>>,
    Json(body): Json<IngestBody>,
) -> Result<(StatusCode, Json<IngestResponse>), ApiError> {
    let (Some(type_name), Some(title), Some(content)) = (
        non_empty(body.node_type),
        non_empty(body.title),
        non_empty(body.content),
    ) else {
        return Err(ApiError::BadRequest(
            "Missing required fields: type, title, content".to_string(),
        ));
    };

    let mut request = IngestRequest::new(parse_type(&type_name)?, title);
    request.id = non_empty(body.id);
    request.domain = body.domain;
    request.tags = body.tags;
    request.confidence = non_empty(body.confidence);
    request.content = content;
    request.connections = body.connections;
    request.mirror = body.mirror;

    let mut vault = state.vault.write().await;
    let outcome = ingest(&mut vault, request)?;
    let id = outcome.node.meta.id;

    Ok((
        StatusCode::CREATED,
        Json(IngestResponse {
            ingested: true,
            url: format!("/v1/nodes/{id}/raw"),
            id,
            file_path: outcome.node.file_path,
            mirrored: outcome.mirrored,
        }),
    ))
}

/// POST `/v1/webhook/n8n` - Create a node from an automation payload.
/// Requires the API key.
pub async fn n8n_webhook(
    State(state): State<Arc<AppState>>,
    Json(body): Json<IngestBody>,
) -> Result<(StatusCode, Json<WebhookResponse>), ApiError> {
    let (Some(type_name), Some(title)) = (non_empty(body.node_type), non_empty(body.title)) else {
        return Err(ApiError::BadRequest(
            "Missing required fields: title, type".to_string(),
        ));
    };

    let content = non_empty(body.content)
        .unwrap_or_else(|| format!("# {title}\n\n(Auto-created via n8n webhook)"));

    let mut request = IngestRequest::new(parse_type(&type_name)?, title);
    request.domain = body.domain;
    request.tags = body.tags;
    request.confidence = non_empty(body.confidence);
    request.content = content;
    request.connections = body.connections;
    request.auto_connect = body.auto_connect;
    request.mirror = body.mirror;
    request.slug_max_len = WEBHOOK_SLUG_MAX_LEN;

    let mut vault = state.vault.write().await;
    let outcome = ingest(&mut vault, request)?;

    Ok((
        StatusCode::CREATED,
        Json(WebhookResponse {
            created: true,
            id: outcome.node.meta.id,
            file_path: outcome.node.file_path,
            auto_connections: outcome.node.meta.connections.len(),
            source: "n8n-webhook",
        }),
    ))
}

// =============================================================================
// Helpers
// =============================================================================

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn parse_type(name: &str) -> Result<NodeType, ApiError> {
    name.parse::<NodeType>().map_err(|_| {
        let valid: Vec<&str> = NodeType::ALL.iter().map(|t| t.as_str()).collect();
        ApiError::BadRequest(format!(
            "Invalid type. Must be one of: {}",
            valid.join(", ")
        ))
    })
}

fn optional_type(name: Option<String>) -> Result<Option<NodeType>, ApiError> {
    non_empty(name).map(|n| parse_type(&n)).transpose()
}

fn page_size(limit: Option<usize>) -> usize {
    limit.unwrap_or(DEFAULT_PAGE_SIZE).min(MAX_PAGE_SIZE)
}
