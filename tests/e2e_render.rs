//! E2E tests for the render RPC against a fake renderer on a Unix socket.

use axum::extract::Query;
use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use ssr_e2e_tests::{init_logging, serve_unix};
use ssr_engine::{EngineError, RenderClient};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;

#[tokio::test]
async fn test_render_returns_markup_from_live_renderer() {
    init_logging();
    let tmp = TempDir::new().unwrap();
    let socket = tmp.path().join("renderer.sock");
    serve_unix(
        &socket,
        Router::new().route("/render", get(|| async { "<div>hi</div>" })),
    );

    let client = RenderClient::new(&socket, Duration::from_secs(1));
    let markup = client
        .render(
            Path::new("/bundles/App.js"),
            "/static/dist/App.js",
            "",
            &serde_json::json!({"title": "hello"}),
        )
        .await
        .unwrap();
    assert_eq!(markup, "<div>hi</div>");
}

#[tokio::test]
async fn test_render_error_status_carries_body() {
    init_logging();
    let tmp = TempDir::new().unwrap();
    let socket = tmp.path().join("renderer.sock");
    serve_unix(
        &socket,
        Router::new().route(
            "/render",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        ),
    );

    let client = RenderClient::new(&socket, Duration::from_secs(1));
    let result = client
        .render(Path::new("/bundles/App.js"), "/static/dist/App.js", "", &())
        .await;
    assert!(matches!(
        result,
        Err(EngineError::RenderFailed { body }) if body == "boom"
    ));
}

#[tokio::test]
async fn test_render_with_no_renderer_is_a_transport_error() {
    init_logging();
    let tmp = TempDir::new().unwrap();
    let client = RenderClient::new(tmp.path().join("gone.sock"), Duration::from_secs(1));

    let result = client
        .render(Path::new("/bundles/App.js"), "/static/dist/App.js", "", &())
        .await;
    assert!(matches!(result, Err(EngineError::Transport { .. })));
}

#[tokio::test]
async fn test_render_round_trips_props_json() {
    init_logging();
    let tmp = TempDir::new().unwrap();
    let socket = tmp.path().join("renderer.sock");
    serve_unix(
        &socket,
        Router::new().route(
            "/render",
            get(|Query(params): Query<HashMap<String, String>>| async move {
                params["props"].clone()
            }),
        ),
    );

    let client = RenderClient::new(&socket, Duration::from_secs(1));
    let props = serde_json::json!({"count": 3, "label": "a & b"});
    let echoed = client
        .render(
            Path::new("/bundles/App.js"),
            "/static/dist/App.js",
            "",
            &props,
        )
        .await
        .unwrap();
    assert_eq!(
        serde_json::from_str::<serde_json::Value>(&echoed).unwrap(),
        props
    );
}
