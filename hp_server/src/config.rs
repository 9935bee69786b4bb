//! Server configuration management.
//!
//! Consolidates all environment variable reads and provides validated configuration.

use home_poker::{
    ChipBundle, Denomination, session::SessionConfig, timer::DEFAULT_LEVEL_MINUTES,
};
use std::net::SocketAddr;

/// Complete server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server bind address
    pub bind: SocketAddr,
    /// Prometheus exporter address, exporter disabled when unset
    pub metrics_bind: Option<SocketAddr>,
    /// Session defaults
    pub session: SessionDefaultsConfig,
    /// Per-connection outbound buffer, in messages
    pub subscriber_buffer: usize,
}

/// Defaults for the single game session
#[derive(Debug, Clone)]
pub struct SessionDefaultsConfig {
    /// Blind level length in minutes
    pub level_minutes: u32,
    /// Stack handed to each new player
    pub starting_chips: ChipBundle,
    /// Capacity of the session actor inbox
    pub inbox_capacity: usize,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Arguments
    ///
    /// * `bind_override` - Optional bind address override (from CLI args)
    /// * `duration_override` - Optional level duration override (from CLI args)
    ///
    /// # Errors
    ///
    /// Returns error if an address variable is set but can't be parsed
    pub fn from_env(
        bind_override: Option<SocketAddr>,
        duration_override: Option<u32>,
    ) -> Result<Self, ConfigError> {
        let bind = match bind_override {
            Some(bind) => bind,
            None => parse_addr("SERVER_BIND")?.unwrap_or_else(default_bind),
        };

        let metrics_bind = parse_addr("METRICS_BIND")?;

        let starting_chips = ChipBundle::full([
            (Denomination::White, parse_env_or("STARTING_WHITE", 8)),
            (Denomination::Red, parse_env_or("STARTING_RED", 8)),
            (Denomination::Green, parse_env_or("STARTING_GREEN", 8)),
            (Denomination::Black, parse_env_or("STARTING_BLACK", 8)),
            (Denomination::Blue, parse_env_or("STARTING_BLUE", 0)),
        ]);

        let session = SessionDefaultsConfig {
            level_minutes: duration_override
                .unwrap_or_else(|| parse_env_or("LEVEL_DURATION_MINUTES", DEFAULT_LEVEL_MINUTES)),
            starting_chips,
            inbox_capacity: parse_env_or("SESSION_INBOX", 100),
        };

        Ok(ServerConfig {
            bind,
            metrics_bind,
            session,
            subscriber_buffer: parse_env_or("SUBSCRIBER_BUFFER", 32),
        })
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.session.level_minutes == 0 {
            return Err(ConfigError::Invalid {
                var: "LEVEL_DURATION_MINUTES".to_string(),
                reason: "Must be at least 1".to_string(),
            });
        }

        if self.session.starting_chips.value() == 0 {
            return Err(ConfigError::Invalid {
                var: "STARTING_*".to_string(),
                reason: "Starting stack must be worth more than 0".to_string(),
            });
        }

        if self.session.inbox_capacity == 0 {
            return Err(ConfigError::Invalid {
                var: "SESSION_INBOX".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        if self.subscriber_buffer == 0 {
            return Err(ConfigError::Invalid {
                var: "SUBSCRIBER_BUFFER".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        if self.metrics_bind == Some(self.bind) {
            return Err(ConfigError::Invalid {
                var: "METRICS_BIND".to_string(),
                reason: format!("Must differ from the server address ({})", self.bind),
            });
        }

        Ok(())
    }

    /// Session actor configuration for these settings.
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            level_minutes: self.session.level_minutes,
            starting_chips: self.session.starting_chips.clone(),
            inbox_capacity: self.session.inbox_capacity,
            ..SessionConfig::default()
        }
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

fn default_bind() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 3000))
}

/// Read an optional socket address. Set but unparsable is an error.
fn parse_addr(key: &str) -> Result<Option<SocketAddr>, ConfigError> {
    match std::env::var(key) {
        Ok(value) => value
            .parse()
            .map(Some)
            .map_err(|e| ConfigError::Invalid {
                var: key.to_string(),
                reason: format!("'{}' is not an IP:PORT address ({})", value, e),
            }),
        Err(_) => Ok(None),
    }
}

/// Helper to parse environment variable with default fallback
fn parse_env_or<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
