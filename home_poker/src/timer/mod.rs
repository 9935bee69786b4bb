//! Blind-level clock.
//!
//! While running, the time left is always derived from a monotonic deadline
//! rather than counted down tick by tick, so a late or skipped tick never
//! makes the clock drift. Every operation takes the current instant as an
//! argument; the session actor passes `Instant::now()`, tests pass whatever
//! they like.

pub mod levels;

pub use levels::{BlindLevel, BlindSchedule, DEFAULT_BLIND_LEVELS};

use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::time::{Duration, Instant};

use crate::game::errors::Rejection;

pub const DEFAULT_LEVEL_MINUTES: u32 = 15;

/// Commands accepted by the clock. Wire form is
/// `{"type": "<command>", "payload": <minutes>}`.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum TimerAction {
    StartPause,
    Reset,
    NextLevel,
    PrevLevel,
    ChangeDuration(u32),
}

impl TimerAction {
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::StartPause => "startPause",
            Self::Reset => "reset",
            Self::NextLevel => "nextLevel",
            Self::PrevLevel => "prevLevel",
            Self::ChangeDuration(_) => "changeDuration",
        }
    }
}

impl fmt::Display for TimerAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ChangeDuration(minutes) => write!(f, "changeDuration({minutes})"),
            other => write!(f, "{}", other.kind()),
        }
    }
}

/// Side effects a clock operation asks the session to carry out.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct TimerEffects {
    /// The blinds went up; clients play the level-change tone.
    pub level_advanced: bool,
    /// The clock ran into the last level and stopped.
    pub final_level_reached: bool,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TimerState {
    /// Index into the blind schedule.
    pub round: usize,
    /// Seconds left in the level. Frozen while paused, refreshed on every
    /// tick while running.
    pub time: u64,
    pub is_running: bool,
    /// Level length in minutes, shared by every level.
    pub duration: u32,
    /// When the current level ends. Only meaningful while running.
    pub deadline: Option<Instant>,
}

impl Default for TimerState {
    fn default() -> Self {
        Self::new(DEFAULT_LEVEL_MINUTES)
    }
}

impl TimerState {
    #[must_use]
    pub fn new(duration: u32) -> Self {
        Self {
            round: 0,
            time: level_seconds(duration),
            is_running: false,
            duration,
            deadline: None,
        }
    }

    /// Seconds until the deadline, rounded to the nearest second. Negative
    /// once the deadline has passed.
    #[must_use]
    pub fn seconds_to_deadline(&self, now: Instant) -> Option<i64> {
        let deadline = self.deadline?;
        let millis = if deadline >= now {
            millis_i64(deadline - now)
        } else {
            -millis_i64(now - deadline)
        };
        Some((millis + 500).div_euclid(1000))
    }

    /// Seconds left in the level as a client should see it.
    #[must_use]
    pub fn remaining(&self, now: Instant) -> u64 {
        match (self.is_running, self.seconds_to_deadline(now)) {
            (true, Some(secs)) => secs.max(0).unsigned_abs(),
            _ => self.time,
        }
    }

    pub fn apply(
        &mut self,
        action: TimerAction,
        schedule: &BlindSchedule,
        now: Instant,
    ) -> Result<TimerEffects, Rejection> {
        match action {
            TimerAction::StartPause => {
                self.start_pause(now);
                Ok(TimerEffects::default())
            }
            TimerAction::Reset => {
                self.reset();
                Ok(TimerEffects::default())
            }
            TimerAction::NextLevel => {
                if self.is_running {
                    return Err(Rejection::TimerRunning);
                }
                Ok(self.advance_level(schedule, now))
            }
            TimerAction::PrevLevel => {
                self.previous_level()?;
                Ok(TimerEffects::default())
            }
            TimerAction::ChangeDuration(minutes) => {
                self.change_duration(minutes)?;
                Ok(TimerEffects::default())
            }
        }
    }

    pub fn start_pause(&mut self, now: Instant) {
        if self.is_running {
            if let Some(secs) = self.seconds_to_deadline(now) {
                self.time = secs.max(0).unsigned_abs();
            }
            self.is_running = false;
            self.deadline = None;
        } else {
            self.is_running = true;
            self.deadline = Some(now + Duration::from_secs(self.time));
        }
    }

    pub fn reset(&mut self) {
        self.round = 0;
        self.time = level_seconds(self.duration);
        self.is_running = false;
        self.deadline = None;
    }

    pub fn previous_level(&mut self) -> Result<(), Rejection> {
        if self.is_running {
            return Err(Rejection::TimerRunning);
        }
        if self.round == 0 {
            return Err(Rejection::AlreadyFirstLevel);
        }
        self.round -= 1;
        self.time = level_seconds(self.duration);
        Ok(())
    }

    pub fn change_duration(&mut self, minutes: u32) -> Result<(), Rejection> {
        if self.is_running {
            return Err(Rejection::TimerRunning);
        }
        if minutes == 0 {
            return Err(Rejection::InvalidDuration);
        }
        self.duration = minutes;
        self.time = level_seconds(minutes);
        Ok(())
    }

    /// Move to the next level, or stop the clock if this is the last one.
    pub fn advance_level(&mut self, schedule: &BlindSchedule, now: Instant) -> TimerEffects {
        if self.round < schedule.last_index() {
            self.round += 1;
            self.time = level_seconds(self.duration);
            if self.is_running {
                self.deadline = Some(now + Duration::from_secs(self.time));
            }
            TimerEffects {
                level_advanced: true,
                final_level_reached: false,
            }
        } else {
            self.is_running = false;
            self.deadline = None;
            TimerEffects {
                level_advanced: false,
                final_level_reached: true,
            }
        }
    }

    /// Once-a-second refresh while running. Rolls over to the next level
    /// when the deadline has passed.
    pub fn tick(&mut self, schedule: &BlindSchedule, now: Instant) -> TimerEffects {
        if !self.is_running {
            return TimerEffects::default();
        }
        let Some(remaining) = self.seconds_to_deadline(now) else {
            return TimerEffects::default();
        };
        if remaining > 0 {
            self.time = remaining.unsigned_abs();
            return TimerEffects::default();
        }
        let effects = self.advance_level(schedule, now);
        if !self.is_running {
            // Stopped at the final level.
            self.time = 0;
        }
        effects
    }
}

#[must_use]
pub fn level_seconds(minutes: u32) -> u64 {
    u64::from(minutes) * 60
}

fn millis_i64(duration: Duration) -> i64 {
    i64::try_from(duration.as_millis()).unwrap_or(i64::MAX)
}
