//! WebSocket server for a live home poker session.
//!
//! One process hosts one session. The manager page and every player page
//! connect to `/ws`, receive the full game state after each change and send
//! actions back.

pub mod api;
pub mod config;
pub mod logging;
pub mod metrics;
