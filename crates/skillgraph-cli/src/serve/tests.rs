use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use skillgraph_core::config::VaultConfig;
use skillgraph_core::{NewNode, NodeType, Vault};

use super::{app_router, AppState};

const KEY: &str = "test-key";

fn test_app() -> (Router, Arc<AppState>, TempDir) {
    let temp = TempDir::new().unwrap();
    let mut vault = Vault::open(VaultConfig::with_root(temp.path())).unwrap();
    vault
        .create(
            NewNode::new("concept-webhooks", NodeType::Concept, "Webhook Retries")
                .with_domain("n8n")
                .with_tags(vec!["webhooks".into()])
                .with_content("Retry failed webhook deliveries\nwith backoff."),
        )
        .unwrap();

    let state = Arc::new(AppState::new(vault, KEY));
    (app_router(state.clone()), state, temp)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, body.to_vec())
}

async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::get(uri).body(Body::empty()).unwrap();
    let (status, body) = send(app, request).await;
    (status, serde_json::from_slice(&body).unwrap())
}

async fn post_json(app: &Router, uri: &str, key: Option<&str>, body: Value) -> (StatusCode, Value) {
    let mut builder = Request::post(uri).header(header::CONTENT_TYPE, "application/json");
    if let Some(key) = key {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {key}"));
    }
    let request = builder.body(Body::from(body.to_string())).unwrap();
    let (status, body) = send(app, request).await;
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn test_health_and_index() {
    let (app, _state, _temp) = test_app();

    let (status, body) = get_json(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert!(body["time"].is_string());

    let (status, body) = get_json(&app, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["service"], "skillgraph-api");
    assert_eq!(body["status"], "online");
    assert_eq!(body["totalNodes"], 1);
}

#[tokio::test]
async fn test_write_requires_api_key() {
    let (app, _state, _temp) = test_app();
    let body = json!({"id": "x", "type": "concept", "title": "X", "content": "x"});

    let (status, error) = post_json(&app, "/v1/nodes", None, body.clone()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error["error"], "Missing Authorization header");

    let (status, error) = post_json(&app, "/v1/nodes", Some("wrong"), body).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(error["error"], "Invalid API key");
}

#[tokio::test]
async fn test_reads_do_not_require_api_key() {
    let (app, _state, _temp) = test_app();

    let (status, body) = get_json(&app, "/v1/nodes").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    assert_eq!(body["nodes"][0]["id"], "concept-webhooks");
    assert_eq!(body["nodes"][0]["connectionCount"], 0);
}

#[tokio::test]
async fn test_create_node() {
    let (app, state, _temp) = test_app();
    let body = json!({
        "id": "skill-backoff",
        "type": "skill",
        "title": "Exponential Backoff",
        "domain": "n8n",
        "content": "Double the delay.",
        "connections": [{"target": "concept-webhooks", "edge": "uses"}]
    });

    let (status, created) = post_json(&app, "/v1/nodes", Some(KEY), body.clone()).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["created"], true);
    assert_eq!(created["filePath"], "skills/n8n/backoff.md");
    assert!(state.vault.read().await.contains("skill-backoff"));

    let (status, _) = post_json(&app, "/v1/nodes", Some(KEY), body).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, connections) = get_json(&app, "/v1/nodes/concept-webhooks/connections").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(connections["nodeId"], "concept-webhooks");
    assert_eq!(connections["connections"][0]["id"], "skill-backoff");
    assert_eq!(connections["connections"][0]["edge"], "uses");
}

#[tokio::test]
async fn test_create_node_validation() {
    let (app, _state, _temp) = test_app();

    let (status, error) =
        post_json(&app, "/v1/nodes", Some(KEY), json!({"id": "x", "title": "X"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["error"], "Missing required fields: id, type, title, content");

    let body = json!({"id": "x", "type": "widget", "title": "X", "content": "x"});
    let (status, error) = post_json(&app, "/v1/nodes", Some(KEY), body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        error["error"],
        "Invalid type. Must be one of: skill, lesson, project, tool, concept, reference"
    );
}

#[tokio::test]
async fn test_get_node_and_raw() {
    let (app, _state, _temp) = test_app();

    let (status, node) = get_json(&app, "/v1/nodes/concept-webhooks").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(node["title"], "Webhook Retries");
    assert_eq!(node["filePath"], "concepts/webhooks.md");

    let (status, error) = get_json(&app, "/v1/nodes/missing").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error["error"], "Node not found");

    let request = Request::get("/v1/nodes/concept-webhooks/raw")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    let raw = String::from_utf8(body).unwrap();
    assert!(raw.starts_with("---\n"));
    assert!(raw.contains("Retry failed webhook deliveries"));
}

#[tokio::test]
async fn test_update_and_archive() {
    let (app, _state, _temp) = test_app();

    let request = Request::put("/v1/nodes/concept-webhooks")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, format!("Bearer {KEY}"))
        .body(Body::from(json!({"title": "Webhook Retry Policy"}).to_string()))
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    let node: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(node["title"], "Webhook Retry Policy");

    let request = Request::delete("/v1/nodes/concept-webhooks")
        .header(header::AUTHORIZATION, format!("Bearer {KEY}"))
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    let archived: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(archived["archived"], true);
    assert_eq!(archived["filePath"], "archive/concept-webhooks.md");

    let (_, list) = get_json(&app, "/v1/nodes?status=active").await;
    assert_eq!(list["count"], 0);
}

#[tokio::test]
async fn test_search() {
    let (app, _state, _temp) = test_app();

    let (status, body) = get_json(&app, "/v1/search?q=webhook&limit=500").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["query"], "webhook");
    assert_eq!(body["count"], 1);
    assert_eq!(
        body["results"][0]["snippet"],
        "Retry failed webhook deliveries with backoff."
    );

    let (status, _) = get_json(&app, "/v1/search?q=x&type=widget").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_vault_file() {
    let (app, _state, _temp) = test_app();

    let request = Request::get("/vault/concepts/webhooks.md")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CACHE_CONTROL],
        "public, max-age=300"
    );

    let request = Request::get("/vault/nope.md").body(Body::empty()).unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, b"// 404: File not found in vault");
}

#[tokio::test]
async fn test_sync_picks_up_external_files() {
    let (app, _state, temp) = test_app();
    std::fs::write(
        temp.path().join("concepts/manual.md"),
        "---\nid: concept-manual\ntype: concept\ntitle: Manual\n---\nWritten by hand.\n",
    )
    .unwrap();

    let (status, body) = post_json(&app, "/v1/sync", None, json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["synced"], true);
    assert_eq!(body["nodes"], 2);
}

#[tokio::test]
async fn test_suggest() {
    let (app, _state, _temp) = test_app();

    let (status, error) = post_json(&app, "/v1/suggest", None, json!({"domain": "n8n"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["error"], "Missing required field: title");

    let draft = json!({
        "title": "Webhook retries for payments",
        "domain": "n8n",
        "tags": ["webhooks"],
        "content": "retry webhook deliveries"
    });
    let (status, body) = post_json(&app, "/v1/suggest", None, draft).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    assert_eq!(body["suggestions"][0]["id"], "concept-webhooks");
    assert_eq!(body["suggestions"][0]["suggestedEdge"], "depends_on");
}

#[tokio::test]
async fn test_ingest() {
    let (app, _state, _temp) = test_app();
    let body = json!({
        "type": "lesson",
        "title": "Webhooks Need Idempotency Keys",
        "content": "Retries can double-charge.",
        "connections": [{"target": "concept-webhooks", "edge": "related_to"}],
        "mirror": true
    });

    let (status, created) = post_json(&app, "/v1/ingest", Some(KEY), body).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["ingested"], true);
    assert_eq!(created["id"], "lesson-webhooks-need-idempotency-keys");
    assert_eq!(
        created["url"],
        "/v1/nodes/lesson-webhooks-need-idempotency-keys/raw"
    );
    assert_eq!(created["mirrored"], json!(["concept-webhooks"]));

    let (status, error) =
        post_json(&app, "/v1/ingest", Some(KEY), json!({"type": "lesson"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["error"], "Missing required fields: type, title, content");
}

#[tokio::test]
async fn test_webhook_defaults_content() {
    let (app, state, _temp) = test_app();
    let body = json!({"type": "reference", "title": "n8n Error Trigger Docs"});

    let (status, created) = post_json(&app, "/v1/webhook/n8n", Some(KEY), body).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["source"], "n8n-webhook");
    assert_eq!(created["id"], "reference-n8n-error-trigger-docs");
    assert_eq!(created["autoConnections"], 0);

    let vault = state.vault.read().await;
    let node = vault.get("reference-n8n-error-trigger-docs").unwrap();
    assert_eq!(
        node.content,
        "# n8n Error Trigger Docs\n\n(Auto-created via n8n webhook)"
    );
}
