//! Session actor message types.

use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use uuid::Uuid;

use crate::{
    game::{actions::GameAction, chips::ChipValue, errors::ActionOutcome},
    net::messages::{ServerMessage, Snapshot},
    timer::TimerAction,
};

/// Identifies one connected viewer.
pub type ConnectionId = Uuid;

/// Messages that can be sent to a SessionActor
#[derive(Debug)]
pub enum SessionMessage {
    /// Roster, betting or pot action
    PlayerAction {
        action: GameAction,
        response: oneshot::Sender<ActionOutcome>,
    },

    /// Blind clock command
    TimerAction {
        action: TimerAction,
        response: oneshot::Sender<ActionOutcome>,
    },

    /// Current snapshot
    GetSnapshot { response: oneshot::Sender<Snapshot> },

    /// Counters for health checks
    GetStats {
        response: oneshot::Sender<SessionStats>,
    },

    /// Start receiving server messages. The current snapshot is pushed
    /// right away.
    Subscribe {
        connection_id: ConnectionId,
        sender: mpsc::Sender<ServerMessage>,
    },

    Unsubscribe { connection_id: ConnectionId },

    /// Run one clock tick now
    Tick,

    /// Stop the actor
    Close,
}

#[derive(Clone, Debug, Default, Eq, PartialEq, serde::Serialize)]
pub struct SessionStats {
    pub players: usize,
    pub pot_value: ChipValue,
    pub round: usize,
    pub timer_running: bool,
    pub subscribers: usize,
    pub actions_applied: u64,
    pub actions_rejected: u64,
    pub level_advances: u64,
}

#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum SessionError {
    #[error("session is closed")]
    Closed,

    #[error("session dropped the request")]
    NoResponse,
}

impl From<oneshot::error::RecvError> for SessionError {
    fn from(_: oneshot::error::RecvError) -> Self {
        Self::NoResponse
    }
}

impl<T> From<mpsc::error::SendError<T>> for SessionError {
    fn from(_: mpsc::error::SendError<T>) -> Self {
        Self::Closed
    }
}
