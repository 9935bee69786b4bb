//! Blind schedule.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::game::chips::ChipValue;

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct BlindLevel {
    pub small: ChipValue,
    pub big: ChipValue,
}

impl BlindLevel {
    #[must_use]
    pub const fn new(small: ChipValue, big: ChipValue) -> Self {
        Self { small, big }
    }
}

impl fmt::Display for BlindLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.small, self.big)
    }
}

pub const DEFAULT_BLIND_LEVELS: [BlindLevel; 13] = [
    BlindLevel::new(25, 50),
    BlindLevel::new(50, 100),
    BlindLevel::new(75, 150),
    BlindLevel::new(100, 200),
    BlindLevel::new(150, 300),
    BlindLevel::new(200, 400),
    BlindLevel::new(250, 500),
    BlindLevel::new(300, 600),
    BlindLevel::new(400, 800),
    BlindLevel::new(500, 1000),
    BlindLevel::new(600, 1200),
    BlindLevel::new(800, 1600),
    BlindLevel::new(1000, 2000),
];

/// Ordered blind levels the clock walks through. The clock stops at the
/// last one.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BlindSchedule(Vec<BlindLevel>);

impl Default for BlindSchedule {
    fn default() -> Self {
        Self(DEFAULT_BLIND_LEVELS.to_vec())
    }
}

impl BlindSchedule {
    #[must_use]
    pub fn new(levels: Vec<BlindLevel>) -> Self {
        Self(levels)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn last_index(&self) -> usize {
        self.0.len().saturating_sub(1)
    }

    #[must_use]
    pub fn level(&self, round: usize) -> Option<BlindLevel> {
        self.0.get(round).copied()
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.0.is_empty() {
            return Err("Blind schedule must have at least one level".to_string());
        }
        for (round, level) in self.0.iter().enumerate() {
            if level.small == 0 || level.big <= level.small {
                return Err(format!(
                    "Level {} ({}) must have 0 < small blind < big blind",
                    round + 1,
                    level
                ));
            }
        }
        Ok(())
    }
}
