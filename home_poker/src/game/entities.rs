use serde::{Deserialize, Serialize};
use std::fmt;

use super::chips::{ChipBundle, ChipValue, Denomination};
use crate::timer::TimerState;

/// Player identifier. Allocated as one past the highest id at the table.
pub type PlayerId = u32;

/// Starting stack handed to every new player: eight each of white, red,
/// green and black, no blue.
#[must_use]
pub fn default_starting_chips() -> ChipBundle {
    ChipBundle::full([
        (Denomination::White, 8),
        (Denomination::Red, 8),
        (Denomination::Green, 8),
        (Denomination::Black, 8),
        (Denomination::Blue, 0),
    ])
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    /// Chips in hand.
    pub chips: ChipBundle,
    /// Chips committed this betting round, not yet in the pot.
    pub round_bet: ChipBundle,
    /// Marked as one of the winners of the next pot distribution.
    pub selected_for_pot: bool,
}

impl Player {
    #[must_use]
    pub fn new(id: PlayerId, name: &str, chips: ChipBundle) -> Self {
        Self {
            id,
            name: name.trim().to_string(),
            chips: chips.normalized(),
            round_bet: ChipBundle::zeroed(),
            selected_for_pot: false,
        }
    }

    /// Monetary value of the chips in hand.
    #[must_use]
    pub fn stack(&self) -> ChipValue {
        self.chips.value()
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (#{}, stack {})", self.name, self.id, self.stack())
    }
}

/// The whole session: seating order, the pot and the blind clock.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GameState {
    pub players: Vec<Player>,
    pub pot: ChipBundle,
    pub timer: TimerState,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(TimerState::default())
    }
}

impl GameState {
    #[must_use]
    pub fn new(timer: TimerState) -> Self {
        Self {
            players: Vec::new(),
            pot: ChipBundle::zeroed(),
            timer,
        }
    }

    #[must_use]
    pub fn next_player_id(&self) -> PlayerId {
        self.players.iter().map(|p| p.id).max().map_or(1, |id| id + 1)
    }

    #[must_use]
    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == id)
    }

    pub fn winners(&self) -> impl Iterator<Item = &Player> {
        self.players.iter().filter(|p| p.selected_for_pot)
    }

    /// Value of every chip in play: stacks, round bets and the pot.
    #[must_use]
    pub fn total_value(&self) -> ChipValue {
        self.players
            .iter()
            .map(|p| p.chips.value() + p.round_bet.value())
            .sum::<ChipValue>()
            + self.pot.value()
    }

    /// Highest round bet at the table, the amount others have to cover.
    #[must_use]
    pub fn highest_round_bet(&self) -> ChipValue {
        self.players
            .iter()
            .map(|p| p.round_bet.value())
            .max()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_player_id_starts_at_one() {
        let state = GameState::default();
        assert_eq!(state.next_player_id(), 1);
    }

    #[test]
    fn test_next_player_id_is_max_plus_one() {
        let mut state = GameState::default();
        state.players.push(Player::new(4, "a", ChipBundle::zeroed()));
        state.players.push(Player::new(2, "b", ChipBundle::zeroed()));
        assert_eq!(state.next_player_id(), 5);
    }

    #[test]
    fn test_new_player_trims_name_and_normalizes() {
        let player = Player::new(1, "  Ana ", ChipBundle::full([(Denomination::Red, 1)]));
        assert_eq!(player.name, "Ana");
        assert_eq!(player.round_bet, ChipBundle::zeroed());
        assert_eq!(player.stack(), 25);
        assert!(!player.selected_for_pot);
    }

    #[test]
    fn test_default_starting_chips_value() {
        assert_eq!(default_starting_chips().value(), 2400);
    }

    #[test]
    fn test_player_serializes_camel_case() {
        let player = Player::new(1, "Ana", default_starting_chips());
        let json = serde_json::to_value(&player).unwrap();
        assert!(json.get("roundBet").is_some());
        assert_eq!(json["selectedForPot"], false);
        assert_eq!(json["chips"]["white"], 8);
    }

    #[test]
    fn test_highest_round_bet() {
        let mut state = GameState::default();
        let mut a = Player::new(1, "a", ChipBundle::zeroed());
        a.round_bet.add(Denomination::Black, 2);
        state.players.push(a);
        state.players.push(Player::new(2, "b", ChipBundle::zeroed()));
        assert_eq!(state.highest_round_bet(), 100);
    }
}
