//! End-to-end tests for the module server HTTP API.
//!
//! Each test lays out a source directory, a build directory, and a module
//! graph in a fresh temp dir, then drives the router with
//! `tower::ServiceExt::oneshot` without starting a network server.

use std::path::Path;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::json;
use tempfile::TempDir;
use tower::ServiceExt;

use modserver_server::config::ServerConfig;
use modserver_server::router::build_router;
use modserver_server::state::AppState;

// ---------------------------------------------------------------------------
// Test helpers
// ---------------------------------------------------------------------------

const GRAPH: &str = r#"[
    {"name": "module$a", "inputs": ["a.js"], "transitive-dependencies": []},
    {"name": "module$b", "inputs": ["b.js"], "transitive-dependencies": ["module$a"]},
    {"name": "module$c", "inputs": ["c.js"], "transitive-dependencies": ["module$a", "module$b"]}
]"#;

fn source_map(file: &str) -> String {
    format!(
        r#"{{"version":3,"file":"{}.js","sources":["{}.js"],"names":[],"mappings":"AAAA"}}"#,
        file, file
    )
}

/// Writes sources, compiled artifacts, and the graph under a temp dir.
fn fixture() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("src");
    let build = dir.path().join("build");
    let static_dir = dir.path().join("static");
    std::fs::create_dir_all(&src).unwrap();
    std::fs::create_dir_all(&build).unwrap();
    std::fs::create_dir_all(&static_dir).unwrap();

    std::fs::write(src.join("module-graph.json"), GRAPH).unwrap();
    std::fs::write(src.join("a.js"), "export const a = 1;\n").unwrap();
    std::fs::write(static_dir.join("loader.js"), "/* loader */\n").unwrap();

    for (name, body) in [
        ("module$a", "var module$a=1;"),
        ("module$b", "var module$b=module$a+1;"),
        ("module$c", "var module$c=module$b+1;"),
    ] {
        std::fs::write(build.join(format!("{}.js", name)), body).unwrap();
        std::fs::write(build.join(format!("{}.js.map", name)), source_map(name)).unwrap();
    }
    dir
}

fn config(root: &Path, build_dir: &str) -> ServerConfig {
    let vars = [
        ("MODSERVER_SOURCE_DIR", root.join("src")),
        ("MODSERVER_BUILD_DIR", root.join(build_dir)),
        ("MODSERVER_STATIC_DIR", root.join("static")),
    ];
    ServerConfig::from_lookup(|key| match key {
        "MODSERVER_DEBUG_MARKERS" => Some("false".to_string()),
        _ => vars
            .iter()
            .find(|(var, _)| *var == key)
            .map(|(_, path)| path.display().to_string()),
    })
    .unwrap()
}

/// A router whose artifacts have finished loading.
async fn ready_app(root: &Path) -> Router {
    let state = AppState::new(config(root, "build"));
    state.initialize().await.unwrap();
    build_router(state)
}

/// Sends a GET request and returns (status, headers, body text).
async fn get(app: &Router, path: &str) -> (StatusCode, axum::http::HeaderMap, String) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(path).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, headers, String::from_utf8(body_bytes.to_vec()).unwrap())
}

async fn get_json(app: &Router, path: &str) -> (StatusCode, serde_json::Value) {
    let (status, _, body) = get(app, path).await;
    let json: serde_json::Value = serde_json::from_str(&body).unwrap_or(json!(null));
    (status, json)
}

// ---------------------------------------------------------------------------
// Payloads
// ---------------------------------------------------------------------------

#[tokio::test]
async fn payload_includes_dependencies_in_order() {
    let dir = fixture();
    let app = ready_app(dir.path()).await;

    let (status, headers, body) = get(&app, "/module$c").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        "var module$a=1;\nModuleServer.m.module$a=module$a;\n\
         var module$b=module$a+1;\nModuleServer.m.module$b=module$b;\n\
         var module$c=module$b+1;\nModuleServer.m.module$c=module$c;\n"
    );
    assert_eq!(headers["content-type"], "application/javascript; charset=utf-8");
    assert_eq!(headers["content-length"], body.len().to_string().as_str());
    assert_eq!(headers["sourcemap"], "/_sourcemap/module$c");
    assert_eq!(headers["x-sourcemap"], "/_sourcemap/module$c");
}

#[tokio::test]
async fn held_modules_are_left_out() {
    let dir = fixture();
    let app = ready_app(dir.path()).await;

    let (status, headers, body) = get(&app, "/module$c/module$b").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "var module$c=module$b+1;\nModuleServer.m.module$c=module$c;\n");
    assert_eq!(headers["sourcemap"], "/_sourcemap/module$c/module$b");
}

#[tokio::test]
async fn percent_encoded_names_are_decoded() {
    let dir = fixture();
    let app = ready_app(dir.path()).await;

    let (status, _, body) = get(&app, "/module%24c/module%24a%2Cmodule%24b").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "var module$c=module$b+1;\nModuleServer.m.module$c=module$c;\n");
}

#[tokio::test]
async fn fully_held_request_yields_empty_payload() {
    let dir = fixture();
    let app = ready_app(dir.path()).await;

    let (status, headers, body) = get(&app, "/module$a/module$c").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.is_empty());
    assert_eq!(headers["content-length"], "0");
}

#[tokio::test]
async fn unknown_module_is_404() {
    let dir = fixture();
    let app = ready_app(dir.path()).await;

    let (status, json) = get_json(&app, "/module$a,module$ghost").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["success"], false);
    assert_eq!(json["error"]["code"], "NOT_FOUND");
    assert!(json["error"]["message"]
        .as_str()
        .unwrap()
        .contains("module$ghost"));
}

// ---------------------------------------------------------------------------
// Source maps
// ---------------------------------------------------------------------------

#[tokio::test]
async fn source_map_sections_line_up_with_payload() {
    let dir = fixture();
    let app = ready_app(dir.path()).await;

    let (status, headers, body) = get(&app, "/_sourcemap/module$c").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers["pragma"], "no-cache");
    assert!(headers["content-type"]
        .to_str()
        .unwrap()
        .starts_with("application/json"));

    let map: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(map["version"], 3);
    let sections = map["sections"].as_array().unwrap();
    let lines: Vec<u64> = sections
        .iter()
        .map(|s| s["offset"]["line"].as_u64().unwrap())
        .collect();
    assert_eq!(lines, vec![1, 3, 5]);
    assert_eq!(sections[0]["map"]["sources"], json!(["module$a.js"]));
    assert!(sections
        .iter()
        .all(|s| s["map"]["sourceRoot"] == "http://127.0.0.1:1337/_js"));
}

#[tokio::test]
async fn source_map_honors_held_modules() {
    let dir = fixture();
    let app = ready_app(dir.path()).await;

    let (status, json) = get_json(&app, "/_sourcemap/module$c/module$a").await;
    assert_eq!(status, StatusCode::OK);
    let sections = json["sections"].as_array().unwrap();
    assert_eq!(sections.len(), 2);
    assert_eq!(sections[1]["map"]["file"], "module$c.js");
}

// ---------------------------------------------------------------------------
// Readiness
// ---------------------------------------------------------------------------

#[tokio::test]
async fn requests_before_loading_are_503() {
    let dir = fixture();
    let app = build_router(AppState::new(config(dir.path(), "build")));

    let (status, json) = get_json(&app, "/module$a").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["error"]["code"], "NOT_READY");

    let (status, json) = get_json(&app, "/health").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["status"], "loading");
}

#[tokio::test]
async fn failed_loading_keeps_server_unavailable() {
    let dir = fixture();
    let state = AppState::new(config(dir.path(), "missing-build"));
    assert!(state.initialize().await.is_err());
    let app = build_router(state);

    let (status, json) = get_json(&app, "/module$a").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["error"]["code"], "NOT_READY");
    assert!(json["error"]["message"]
        .as_str()
        .unwrap()
        .contains("failed to initialize"));

    let (status, json) = get_json(&app, "/health").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["status"], "failed");
    assert!(json["error"].is_string());
}

#[tokio::test]
async fn health_reports_module_count_when_ready() {
    let dir = fixture();
    let app = ready_app(dir.path()).await;

    let (status, json) = get_json(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!({"status": "ready", "modules": 3}));
}

// ---------------------------------------------------------------------------
// Passthrough
// ---------------------------------------------------------------------------

#[tokio::test]
async fn original_sources_are_served_under_js_prefix() {
    let dir = fixture();
    let app = ready_app(dir.path()).await;

    let (status, _, body) = get(&app, "/_js/a.js").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "export const a = 1;\n");
}

#[tokio::test]
async fn passthrough_does_not_wait_for_loading() {
    let dir = fixture();
    let app = build_router(AppState::new(config(dir.path(), "build")));

    let (status, _, body) = get(&app, "/static/loader.js").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "/* loader */\n");
}
