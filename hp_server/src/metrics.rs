//! Prometheus metrics for monitoring the session server.
//!
//! Metrics are exposed in Prometheus text format for scraping when an
//! exporter address is configured. Without an exporter the recording calls
//! are no-ops.
//!
//! # Metrics Categories
//!
//! - **WebSocket Metrics**: Active connections, messages received/rejected
//! - **Game Metrics**: Actions by kind and outcome, level advances, seated
//!   players, pot value
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use hp_server::metrics;
//! use std::net::SocketAddr;
//!
//! // Initialize metrics exporter
//! let addr: SocketAddr = "127.0.0.1:9090".parse().unwrap();
//! metrics::init_metrics(addr).unwrap();
//!
//! // Record a WebSocket connection
//! metrics::websocket_connections_total();
//! ```

use home_poker::{ServerMessage, session::SessionHandle};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use tokio::{sync::mpsc, task::JoinHandle};
use uuid::Uuid;

/// Initialize Prometheus metrics exporter.
///
/// Sets up a Prometheus scrape endpoint on the specified address.
/// Metrics will be available at `http://<addr>/metrics`.
///
/// # Arguments
///
/// - `addr`: Address to bind the metrics server to (e.g., `0.0.0.0:9090`)
pub fn init_metrics(addr: SocketAddr) -> Result<(), String> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| format!("Failed to install Prometheus exporter: {}", e))
}

// ============================================================================
// WebSocket Metrics
// ============================================================================

/// Set current active WebSocket connections count.
pub fn websocket_connections_active(count: u64) {
    metrics::gauge!("websocket_connections_active").set(count as f64);
}

/// Increment total WebSocket connections counter.
pub fn websocket_connections_total() {
    metrics::counter!("websocket_connections_total").increment(1);
}

/// Increment WebSocket messages received counter.
pub fn websocket_messages_received() {
    metrics::counter!("websocket_messages_received").increment(1);
}

/// Increment counter of frames that failed to parse.
pub fn websocket_messages_rejected() {
    metrics::counter!("websocket_messages_rejected").increment(1);
}

// ============================================================================
// Game Metrics
// ============================================================================

/// Record an action by kind and outcome (`applied` / `rejected`).
pub fn actions_total(kind: &str, outcome: &str) {
    metrics::counter!("actions_total",
        "kind" => kind.to_string(),
        "outcome" => outcome.to_string()
    )
    .increment(1);
}

/// Increment blind level advances counter.
pub fn level_advances_total() {
    metrics::counter!("level_advances_total").increment(1);
}

/// Set current seated players count.
pub fn players_seated(count: usize) {
    metrics::gauge!("players_seated").set(count as f64);
}

/// Set current pot value.
pub fn pot_value(value: u64) {
    metrics::gauge!("pot_value").set(value as f64);
}

// ============================================================================
// Session Monitor
// ============================================================================

/// Subscribe to the session like a viewer and turn what it broadcasts into
/// game metrics.
///
/// The task ends when the session closes.
pub async fn spawn_session_monitor(
    session: SessionHandle,
    buffer: usize,
) -> Result<JoinHandle<()>, home_poker::session::SessionError> {
    let (sender, mut receiver) = mpsc::channel(buffer.max(1));
    session.subscribe(Uuid::new_v4(), sender).await?;

    Ok(tokio::spawn(async move {
        while let Some(message) = receiver.recv().await {
            match message {
                ServerMessage::GameStateUpdate(snapshot) => {
                    players_seated(snapshot.players.len());
                    pot_value(snapshot.pot.value());
                }
                ServerMessage::PlaySound => level_advances_total(),
            }
        }
        log::debug!("Session monitor stopped");
    }))
}
