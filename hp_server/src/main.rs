//! Home poker session server.
//!
//! Spawns the session actor and serves the WebSocket endpoint the manager
//! and player pages connect to.

use std::net::SocketAddr;

use anyhow::Error;
use home_poker::session::SessionActor;
use hp_server::{
    api,
    config::ServerConfig,
    logging, metrics,
};
use log::info;
use pico_args::Arguments;

const HELP: &str = "\
Run a home poker session server

USAGE:
  hp_server [OPTIONS]

OPTIONS:
  --bind       IP:PORT     Server socket bind address  [default: env SERVER_BIND or 127.0.0.1:3000]
  --duration   MINUTES     Blind level length          [default: env LEVEL_DURATION_MINUTES or 15]

FLAGS:
  -h, --help               Print help information

ENVIRONMENT:
  SERVER_BIND              Server bind address (e.g., 0.0.0.0:3000)
  LEVEL_DURATION_MINUTES   Blind level length in minutes
  STARTING_WHITE           White chips per new player [8]
  STARTING_RED             Red chips per new player [8]
  STARTING_GREEN           Green chips per new player [8]
  STARTING_BLACK           Black chips per new player [8]
  STARTING_BLUE            Blue chips per new player [0]
  SUBSCRIBER_BUFFER        Outbound messages buffered per connection [32]
  SESSION_INBOX            Session inbox capacity [100]
  METRICS_BIND             Prometheus exporter address (disabled when unset)
  (See .env file for all configuration options)
";

struct Args {
    bind: Option<SocketAddr>,
    duration: Option<u32>,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let args = Args {
        bind: pargs.opt_value_from_str("--bind")?,
        duration: pargs.opt_value_from_str("--duration")?,
    };

    logging::init();

    let config = ServerConfig::from_env(args.bind, args.duration)?;
    config.validate()?;

    if let Some(metrics_bind) = config.metrics_bind {
        metrics::init_metrics(metrics_bind).map_err(|e| anyhow::anyhow!(e))?;
        info!("Prometheus metrics at http://{}/metrics", metrics_bind);
    }

    info!(
        "Starting session: {} minute levels, starting stack {} ({})",
        config.session.level_minutes,
        config.session.starting_chips,
        config.session.starting_chips.value()
    );

    let session_config = config.session_config();
    session_config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid session configuration: {}", e))?;
    let session = SessionActor::spawn(session_config);

    if config.metrics_bind.is_some() {
        let _monitor = metrics::spawn_session_monitor(session.clone(), config.subscriber_buffer)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to start session monitor: {}", e))?;
    }

    let app = api::create_router(api::AppState {
        session: session.clone(),
        subscriber_buffer: config.subscriber_buffer,
    });

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind to {}: {}", config.bind, e))?;

    info!(
        "Server is running at http://{}. Press Ctrl+C to stop.",
        config.bind
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    info!("Shutting down server...");
    let _ = session.close().await;

    Ok(())
}

/// Graceful shutdown signal
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
}
