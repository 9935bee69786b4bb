//! Integration tests for the HTTP side of the server.
//!
//! Tests the health endpoint and routing against an in-process session.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use home_poker::{
    GameAction,
    session::{SessionActor, SessionConfig, SessionHandle},
};
use http_body_util::BodyExt;
use tower::ServiceExt; // For `oneshot` method

/// Helper to create a router around a fresh session
fn create_test_server() -> (axum::Router, SessionHandle) {
    let session = SessionActor::spawn(SessionConfig::default());
    let state = hp_server::api::AppState {
        session: session.clone(),
        subscriber_buffer: 8,
    };
    (hp_server::api::create_router(state), session)
}

async fn get_json(app: axum::Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&body).unwrap())
}

// ============================================================================
// Health Check Tests
// ============================================================================

#[tokio::test]
async fn test_health_check_endpoint() {
    let (app, _) = create_test_server();

    let (status, json) = get_json(app, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["players"], 0);
    assert_eq!(json["potValue"], 0);
    assert_eq!(json["round"], 0);
    assert_eq!(json["timerRunning"], false);
    assert!(json["timestamp"].is_string());
}

#[tokio::test]
async fn test_health_check_reflects_session() {
    let (app, session) = create_test_server();
    for name in ["Ana", "Ben"] {
        session
            .player_action(GameAction::AddPlayer {
                name: name.to_string(),
            })
            .await
            .unwrap();
    }

    let (_, json) = get_json(app, "/health").await;

    assert_eq!(json["players"], 2);
}

#[tokio::test]
async fn test_health_check_unhealthy_after_close() {
    let (app, session) = create_test_server();
    session.close().await.unwrap();
    tokio::task::yield_now().await;

    let (status, json) = get_json(app, "/health").await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["status"], "unhealthy");
}

// ============================================================================
// Routing Tests
// ============================================================================

#[tokio::test]
async fn test_unknown_route_is_404() {
    let (app, _) = create_test_server();

    let request = Request::builder()
        .uri("/api/tables")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_ws_requires_upgrade() {
    let (app, _) = create_test_server();

    let request = Request::builder().uri("/ws").body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn test_cors_headers_present() {
    let (app, _) = create_test_server();

    let request = Request::builder()
        .uri("/health")
        .header("Origin", "http://192.168.1.20:8080")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert!(
        response
            .headers()
            .contains_key("access-control-allow-origin")
    );
}
