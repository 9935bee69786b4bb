//! HTTP/WebSocket API for the session server.
//!
//! # Architecture
//!
//! The API is built with:
//! - **Axum**: Async web framework for HTTP/WebSocket
//! - **Tower**: Middleware for CORS
//! - **Actor Model**: Session state owned by a single actor task
//!
//! # Endpoints Overview
//!
//! - `GET /ws` - WebSocket connection; manager and player pages alike
//! - `GET /health` - Server health status
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use hp_server::api::{AppState, create_router};
//! use home_poker::session::{SessionActor, SessionConfig};
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!
//! let state = AppState {
//!     session: SessionActor::spawn(SessionConfig::default()),
//!     subscriber_buffer: 32,
//! };
//!
//! let app = create_router(state);
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Security
//!
//! There is none. Every connection may send every action; the server is
//! meant for a table of friends on one local network.
//!
//! # CORS
//!
//! CORS is configured permissively so the pages can be served from anywhere
//! on the local network.

pub mod websocket;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
};
use home_poker::session::SessionHandle;
use serde::Serialize;
use serde_json::json;
use tower_http::cors::CorsLayer;

/// Application state shared across all HTTP handlers and WebSocket connections.
///
/// Cloned for each request; the session handle is just a channel sender.
#[derive(Clone, Debug)]
pub struct AppState {
    pub session: SessionHandle,
    /// Outbound buffer per connection, in messages
    pub subscriber_buffer: usize,
}

/// Create the API router with all endpoints and middleware.
///
/// ```text
/// GET  /health   - Health check
/// GET  /ws       - WebSocket
/// ```
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/ws", get(websocket::websocket_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Body of a healthy `/health` response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub players: usize,
    pub pot_value: u64,
    pub round: usize,
    pub timer_running: bool,
    /// Subscribed viewers, the metrics monitor included when enabled.
    pub connections: usize,
    pub timestamp: String,
}

/// Health check endpoint for monitoring.
///
/// Returns `200 OK` with session counters while the session actor answers,
/// `503 Service Unavailable` otherwise.
///
/// # Example
///
/// ```bash
/// curl http://localhost:3000/health
/// # {"status":"healthy","players":4,"potValue":150,"round":2,"timerRunning":true,...}
/// ```
async fn health_check(State(state): State<AppState>) -> Response {
    match state.session.stats().await {
        Ok(stats) => {
            let response = HealthResponse {
                status: "healthy",
                version: env!("CARGO_PKG_VERSION"),
                players: stats.players,
                pot_value: stats.pot_value,
                round: stats.round,
                timer_running: stats.timer_running,
                connections: stats.subscribers,
                timestamp: chrono::Utc::now().to_rfc3339(),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            log::error!("Health check failed: {}", e);
            let response = json!({
                "status": "unhealthy",
                "version": env!("CARGO_PKG_VERSION"),
                "error": e.to_string(),
                "timestamp": chrono::Utc::now().to_rfc3339(),
            });
            (StatusCode::SERVICE_UNAVAILABLE, Json(response)).into_response()
        }
    }
}
