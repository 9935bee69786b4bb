//! Session module: the single live game behind an async actor.
//!
//! This module implements:
//! - SessionActor: owns the [`GameState`](crate::game::entities::GameState)
//!   and runs the blind clock
//! - SessionHandle: cloneable sender used by connections
//! - Subscriber fan-out of snapshots and sound cues
//!
//! ## Architecture
//!
//! The session runs in one Tokio task with an mpsc inbox. Player actions,
//! clock commands and clock ticks are processed strictly one after another,
//! so there is a single writer and no locking. Every connection subscribes
//! with its own bounded channel and receives the full snapshot after each
//! change.
//!
//! There is no authentication: every connection may send any action. This
//! is a deliberate fit for a table of friends sharing one local server, not
//! a security boundary.
//!
//! ## Example
//!
//! ```no_run
//! use home_poker::game::actions::GameAction;
//! use home_poker::session::{SessionActor, SessionConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let handle = SessionActor::spawn(SessionConfig::default());
//!     let outcome = handle
//!         .player_action(GameAction::AddPlayer { name: "Ana".to_string() })
//!         .await
//!         .unwrap();
//!     assert!(outcome.is_applied());
//! }
//! ```

pub mod actor;
pub mod config;
pub mod messages;

pub use actor::{SessionActor, SessionHandle};
pub use config::SessionConfig;
pub use messages::{ConnectionId, SessionError, SessionMessage, SessionStats};
