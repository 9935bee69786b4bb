//! Reasons an action can be turned away.

use thiserror::Error;

use super::{chips::Denomination, entities::PlayerId};

/// Why an action or timer command left the session untouched.
///
/// Rejections are never sent back to clients; they only show up in logs,
/// metrics and in-process callers.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum Rejection {
    #[error("name is empty")]
    EmptyName,

    #[error("no player with id {0}")]
    UnknownPlayer(PlayerId),

    #[error("bet is empty")]
    EmptyBet,

    #[error("insufficient {denomination} chips: available {available}, requested {requested}")]
    InsufficientChips {
        denomination: Denomination,
        available: u32,
        requested: u32,
    },

    #[error("no winner selected")]
    NoWinnerSelected,

    #[error("pot is empty")]
    EmptyPot,

    #[error("timer is running")]
    TimerRunning,

    #[error("already at the first level")]
    AlreadyFirstLevel,

    #[error("level duration must be at least one minute")]
    InvalidDuration,

    #[error("malformed message: {0}")]
    Malformed(String),
}

/// Result of feeding an action to the session.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ActionOutcome {
    Applied,
    Rejected(Rejection),
}

impl ActionOutcome {
    #[must_use]
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied)
    }

    #[must_use]
    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            Self::Applied => None,
            Self::Rejected(reason) => Some(reason),
        }
    }

    /// Label used for logs and metrics.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Applied => "applied",
            Self::Rejected(_) => "rejected",
        }
    }
}

impl From<Result<(), Rejection>> for ActionOutcome {
    fn from(result: Result<(), Rejection>) -> Self {
        match result {
            Ok(()) => Self::Applied,
            Err(reason) => Self::Rejected(reason),
        }
    }
}
