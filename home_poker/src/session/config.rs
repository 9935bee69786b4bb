//! Session configuration.

use tokio::time::Duration;

use crate::{
    game::{chips::ChipBundle, entities::default_starting_chips},
    timer::{BlindSchedule, DEFAULT_LEVEL_MINUTES},
};

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SessionConfig {
    /// Length of every blind level in minutes.
    pub level_minutes: u32,

    /// Stack handed to each new player.
    pub starting_chips: ChipBundle,

    /// Blind levels in play order.
    pub blind_schedule: BlindSchedule,

    /// How often viewers get a heartbeat snapshot while the clock runs.
    pub tick_period: Duration,

    /// Capacity of the actor's inbox.
    pub inbox_capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            level_minutes: DEFAULT_LEVEL_MINUTES,
            starting_chips: default_starting_chips(),
            blind_schedule: BlindSchedule::default(),
            tick_period: Duration::from_secs(1),
            inbox_capacity: 100,
        }
    }
}

impl SessionConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.level_minutes == 0 {
            return Err("Level duration must be at least one minute".to_string());
        }

        if self.starting_chips.value() == 0 {
            return Err("Starting chips must be worth something".to_string());
        }

        if self.tick_period.is_zero() {
            return Err("Tick period must be greater than zero".to_string());
        }

        if self.inbox_capacity == 0 {
            return Err("Inbox capacity must be greater than zero".to_string());
        }

        self.blind_schedule.validate()
    }
}
