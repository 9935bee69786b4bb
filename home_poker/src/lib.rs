//! # Home Poker
//!
//! Shared state for a live home poker game: chip stacks, betting rounds, the
//! pot and the blind-level clock, owned by one authoritative session and
//! mirrored by every connected viewer.
//!
//! ## Architecture
//!
//! A single [`session::SessionActor`] owns the [`GameState`]. Viewers send
//! [`GameAction`]s and [`TimerAction`]s; the actor applies them one at a
//! time and broadcasts a full [`Snapshot`] after every change and every
//! clock tick. There are no partial updates and no per-client state on the
//! server beyond the subscription itself.
//!
//! ## Core Modules
//!
//! - [`game`]: chips, players, and the action reducer
//! - [`timer`]: blind schedule and deadline-based level clock
//! - [`session`]: the actor that owns the state and fans out snapshots
//! - [`net`]: JSON wire protocol
//!
//! ## Example
//!
//! ```
//! use home_poker::{GameAction, GameState, Reducer};
//!
//! let reducer = Reducer::default();
//! let mut state = GameState::default();
//! let outcome = reducer.apply(&mut state, &GameAction::AddPlayer { name: "Ana".into() });
//! assert!(outcome.is_applied());
//! assert_eq!(state.players[0].id, 1);
//! ```

/// Chips, players, and the action reducer.
pub mod game;
pub use game::{
    actions::{GameAction, Reducer},
    chips::{ChipBundle, Denomination},
    entities::{GameState, Player, PlayerId},
    errors::{ActionOutcome, Rejection},
};

/// JSON wire protocol.
pub mod net;
pub use net::messages::{ClientMessage, ServerMessage, Snapshot};

/// Session actor owning the live game.
pub mod session;

/// Blind-level clock.
pub mod timer;
pub use timer::{TimerAction, TimerState};
