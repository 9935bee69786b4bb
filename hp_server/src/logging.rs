//! Structured logging configuration.
//!
//! The server logs through `tracing`; the game library logs through the
//! `log` facade, whose records are picked up by the same subscriber.

use home_poker::ActionOutcome;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

/// Initialize structured logging
///
/// Log levels are configurable via the RUST_LOG env var, e.g.
/// `RUST_LOG=home_poker=debug,info`.
///
/// # Example
///
/// ```no_run
/// use hp_server::logging;
///
/// #[tokio::main]
/// async fn main() {
///     logging::init();
///     tracing::info!("Server starting");
/// }
/// ```
pub fn init() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,hyper=warn,tower_http=warn"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    tracing::info!("Structured logging initialized");
}

/// Log the outcome of an action a connection submitted
///
/// Rejections are never reported back to the client, so this is where they
/// become visible.
///
/// # Arguments
///
/// * `connection_id` - Connection that sent the action
/// * `kind` - Action kind as it appears on the wire
/// * `outcome` - What the session did with it
pub fn log_action(connection_id: Uuid, kind: &str, outcome: &ActionOutcome) {
    match outcome {
        ActionOutcome::Applied => {
            tracing::debug!(
                connection_id = %connection_id,
                action = kind,
                "Action applied"
            );
        }
        ActionOutcome::Rejected(reason) => {
            tracing::info!(
                connection_id = %connection_id,
                action = kind,
                reason = %reason,
                "Action rejected"
            );
        }
    }
}

/// Log a frame that couldn't be parsed
///
/// # Arguments
///
/// * `connection_id` - Connection that sent the frame
/// * `error` - Parser error
/// * `frame` - Raw frame text, truncated for the log
pub fn log_malformed_frame(connection_id: Uuid, error: &str, frame: &str) {
    let preview: String = frame.chars().take(200).collect();
    tracing::warn!(
        connection_id = %connection_id,
        error = error,
        frame = %preview,
        "Ignoring malformed message"
    );
}
