//! REST server over a SkillGraph vault.
//!
//! Serves the vault index as JSON for the dashboard and accepts writes from
//! automation clients. Write endpoints require `Authorization: Bearer <key>`.
//!
//! # Module Structure
//!
//! - `handlers` - HTTP route handlers
//! - `models` - API request/response types (DTOs)
//! - `auth` - Bearer-key middleware
//! - `error` - Error to response mapping

mod auth;
mod error;
mod handlers;
mod models;
#[cfg(test)]
mod tests;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use color_eyre::eyre::WrapErr;
use tokio::sync::RwLock;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{DefaultOnResponse, TraceLayer};
use tracing::{info, warn, Level};

use skillgraph_core::{Config, FileStore, Vault};

// =============================================================================
// Application State
// =============================================================================

/// Shared application state for the server.
pub struct AppState {
    /// The vault. Mutations and rescans take the write lock.
    pub vault: Arc<RwLock<Vault<FileStore>>>,
    /// Key expected in the `Authorization` header of write requests.
    pub api_key: String,
}

impl AppState {
    pub fn new(vault: Vault<FileStore>, api_key: impl Into<String>) -> Self {
        Self {
            vault: Arc::new(RwLock::new(vault)),
            api_key: api_key.into(),
        }
    }
}

// =============================================================================
// Router
// =============================================================================

/// Build the full router over `state`.
pub fn app_router(state: Arc<AppState>) -> Router {
    let public = Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health))
        .route("/vault/{*path}", get(handlers::vault_file))
        .route("/v1/sync", post(handlers::sync))
        // Reads
        .route("/v1/nodes", get(handlers::list_nodes))
        .route("/v1/nodes/{id}", get(handlers::get_node))
        .route("/v1/nodes/{id}/raw", get(handlers::get_node_raw))
        .route("/v1/nodes/{id}/connections", get(handlers::get_node_connections))
        .route("/v1/search", get(handlers::search))
        .route("/v1/graph", get(handlers::graph))
        .route("/v1/graph/stats", get(handlers::graph_stats))
        .route("/v1/graph/domains", get(handlers::graph_domains))
        .route("/v1/changelog", get(handlers::changelog))
        .route("/v1/suggest", post(handlers::suggest));

    let protected = Router::new()
        .route("/v1/nodes", post(handlers::create_node))
        .route(
            "/v1/nodes/{id}",
            axum::routing::put(handlers::update_node).delete(handlers::archive_node),
        )
        .route("/v1/nodes/{id}/connections", post(handlers::add_node_connections))
        .route("/v1/ingest", post(handlers::ingest_node))
        .route("/v1/webhook/n8n", post(handlers::n8n_webhook))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_api_key,
        ));

    public
        .merge(protected)
        .layer(TraceLayer::new_for_http().on_response(DefaultOnResponse::new().level(Level::INFO)))
        .layer(CorsLayer::new().allow_origin(Any))
        .with_state(state)
}

// =============================================================================
// Server Entry Point
// =============================================================================

/// Open the vault described by `config` and serve it until shutdown.
pub async fn start_server(config: Config) -> color_eyre::Result<()> {
    let root = config.vault.root.clone();
    let vault = Vault::open(config.vault.clone())
        .wrap_err_with(|| format!("failed to open vault at {}", root.display()))?
        .with_suggest_config(config.suggest.clone());

    let summary = vault.index().stats();
    info!(
        vault = %root.display(),
        nodes = summary.total_nodes,
        edges = summary.total_edges,
        "vault loaded"
    );

    if config.server.uses_default_key() {
        warn!("using the built-in development API key; set SG_API_KEY before exposing this server");
    }

    let state = Arc::new(AppState::new(vault, config.server.api_key_or_default()));
    let app = app_router(state);

    let addr = format!("{}:{}", config.server.bind, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .wrap_err_with(|| format!("failed to bind {addr}"))?;

    info!(%addr, "skillgraph api listening");
    axum::serve(listener, app).await?;

    Ok(())
}
