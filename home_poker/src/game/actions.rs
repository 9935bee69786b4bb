//! Roster, betting and pot actions and the reducer that applies them.
//!
//! Every action either mutates the [`GameState`] completely or not at all.
//! Validation failures come back as [`Rejection`]s; nothing here panics on
//! client input.

use serde::{Deserialize, Serialize};
use std::{collections::HashSet, fmt};

use super::{
    chips::{ChipBundle, ChipValue},
    entities::{GameState, Player, PlayerId, default_starting_chips},
    errors::{ActionOutcome, Rejection},
};

/// A roster/betting/pot action as sent by the manager or player views.
///
/// Wire form is `{"type": "<action>", "payload": {...}}`.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(
    tag = "type",
    content = "payload",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum GameAction {
    AddPlayer {
        name: String,
    },
    RemovePlayer {
        player_id: PlayerId,
    },
    /// New seating order. Unknown ids are ignored.
    UpdateOrder {
        player_ids: Vec<PlayerId>,
    },
    UpdatePlayerName {
        player_id: PlayerId,
        name: String,
    },
    /// Manager override of a whole stack.
    UpdatePlayerChips {
        player_id: PlayerId,
        chips: ChipBundle,
    },
    /// Move chips from a player's stack into their round bet.
    PlayerBet {
        player_id: PlayerId,
        bet: ChipBundle,
    },
    EndBettingRound,
    ToggleWinner {
        player_id: PlayerId,
    },
    DistributePot,
    ResetGame,
}

impl GameAction {
    /// Short name used for logs and metric labels.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::AddPlayer { .. } => "addPlayer",
            Self::RemovePlayer { .. } => "removePlayer",
            Self::UpdateOrder { .. } => "updateOrder",
            Self::UpdatePlayerName { .. } => "updatePlayerName",
            Self::UpdatePlayerChips { .. } => "updatePlayerChips",
            Self::PlayerBet { .. } => "playerBet",
            Self::EndBettingRound => "endBettingRound",
            Self::ToggleWinner { .. } => "toggleWinner",
            Self::DistributePot => "distributePot",
            Self::ResetGame => "resetGame",
        }
    }
}

impl fmt::Display for GameAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AddPlayer { name } => write!(f, "add player {name:?}"),
            Self::RemovePlayer { player_id } => write!(f, "remove player #{player_id}"),
            Self::UpdateOrder { player_ids } => write!(f, "reorder players {player_ids:?}"),
            Self::UpdatePlayerName { player_id, name } => {
                write!(f, "rename player #{player_id} to {name:?}")
            }
            Self::UpdatePlayerChips { player_id, chips } => {
                write!(f, "set player #{player_id} chips to {chips}")
            }
            Self::PlayerBet { player_id, bet } => write!(f, "player #{player_id} bets {bet}"),
            Self::EndBettingRound => write!(f, "end betting round"),
            Self::ToggleWinner { player_id } => write!(f, "toggle winner #{player_id}"),
            Self::DistributePot => write!(f, "distribute pot"),
            Self::ResetGame => write!(f, "reset game"),
        }
    }
}

/// What a pot distribution paid out.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Distribution {
    pub winners: Vec<PlayerId>,
    /// Pot value before distribution.
    pub pot_value: ChipValue,
    /// Value actually handed to winners.
    pub paid_value: ChipValue,
}

impl Distribution {
    /// Value lost to floor division and chip granularity.
    #[must_use]
    pub fn discarded(&self) -> ChipValue {
        self.pot_value - self.paid_value
    }
}

/// Applies [`GameAction`]s to a [`GameState`].
#[derive(Clone, Debug)]
pub struct Reducer {
    starting_chips: ChipBundle,
}

impl Default for Reducer {
    fn default() -> Self {
        Self::new(default_starting_chips())
    }
}

impl Reducer {
    #[must_use]
    pub fn new(starting_chips: ChipBundle) -> Self {
        Self {
            starting_chips: starting_chips.normalized(),
        }
    }

    #[must_use]
    pub fn starting_chips(&self) -> &ChipBundle {
        &self.starting_chips
    }

    /// Apply `action` to `state`. A rejected action leaves `state` exactly as
    /// it was.
    pub fn apply(&self, state: &mut GameState, action: &GameAction) -> ActionOutcome {
        let result = match action {
            GameAction::AddPlayer { name } => self.add_player(state, name).map(|_| ()),
            GameAction::RemovePlayer { player_id } => remove_player(state, *player_id),
            GameAction::UpdateOrder { player_ids } => {
                update_order(state, player_ids);
                Ok(())
            }
            GameAction::UpdatePlayerName { player_id, name } => {
                update_player_name(state, *player_id, name)
            }
            GameAction::UpdatePlayerChips { player_id, chips } => {
                update_player_chips(state, *player_id, chips)
            }
            GameAction::PlayerBet { player_id, bet } => player_bet(state, *player_id, bet),
            GameAction::EndBettingRound => {
                end_betting_round(state);
                Ok(())
            }
            GameAction::ToggleWinner { player_id } => toggle_winner(state, *player_id),
            GameAction::DistributePot => distribute_pot(state).map(|_| ()),
            GameAction::ResetGame => {
                reset_game(state);
                Ok(())
            }
        };
        result.into()
    }

    /// Seat a new player with the starting stack and return their id.
    pub fn add_player(&self, state: &mut GameState, name: &str) -> Result<PlayerId, Rejection> {
        if name.trim().is_empty() {
            return Err(Rejection::EmptyName);
        }
        let id = state.next_player_id();
        state
            .players
            .push(Player::new(id, name, self.starting_chips.clone()));
        Ok(id)
    }
}

pub fn remove_player(state: &mut GameState, player_id: PlayerId) -> Result<(), Rejection> {
    let idx = state
        .players
        .iter()
        .position(|p| p.id == player_id)
        .ok_or(Rejection::UnknownPlayer(player_id))?;
    state.players.remove(idx);
    Ok(())
}

/// Reseat players in the given order. Ids that don't match a player are
/// dropped, and so are players the order doesn't mention.
pub fn update_order(state: &mut GameState, player_ids: &[PlayerId]) {
    let mut remaining = std::mem::take(&mut state.players);
    let mut seen = HashSet::with_capacity(player_ids.len());
    let mut ordered = Vec::with_capacity(remaining.len());
    for id in player_ids {
        if !seen.insert(*id) {
            continue;
        }
        if let Some(idx) = remaining.iter().position(|p| p.id == *id) {
            ordered.push(remaining.remove(idx));
        }
    }
    state.players = ordered;
}

pub fn update_player_name(
    state: &mut GameState,
    player_id: PlayerId,
    name: &str,
) -> Result<(), Rejection> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Rejection::EmptyName);
    }
    let player = state
        .player_mut(player_id)
        .ok_or(Rejection::UnknownPlayer(player_id))?;
    player.name = name.to_string();
    Ok(())
}

/// Trusted override; the bundle is taken as-is.
pub fn update_player_chips(
    state: &mut GameState,
    player_id: PlayerId,
    chips: &ChipBundle,
) -> Result<(), Rejection> {
    let player = state
        .player_mut(player_id)
        .ok_or(Rejection::UnknownPlayer(player_id))?;
    player.chips = chips.clone().normalized();
    Ok(())
}

/// All-or-nothing: every denomination is checked before any chip moves.
pub fn player_bet(
    state: &mut GameState,
    player_id: PlayerId,
    bet: &ChipBundle,
) -> Result<(), Rejection> {
    if bet.is_empty() {
        return Err(Rejection::EmptyBet);
    }
    let player = state
        .player_mut(player_id)
        .ok_or(Rejection::UnknownPlayer(player_id))?;

    if let Some((denomination, requested)) = bet
        .iter()
        .find(|(d, count)| player.chips.get(*d) < *count)
    {
        return Err(Rejection::InsufficientChips {
            denomination,
            available: player.chips.get(denomination),
            requested,
        });
    }

    for (denomination, count) in bet.iter() {
        player.chips.remove(denomination, count);
        player.round_bet.add(denomination, count);
    }
    Ok(())
}

/// Sweep every round bet into the pot.
pub fn end_betting_round(state: &mut GameState) {
    for player in &mut state.players {
        state.pot.absorb(&player.round_bet);
        player.round_bet = ChipBundle::zeroed();
    }
}

pub fn toggle_winner(state: &mut GameState, player_id: PlayerId) -> Result<(), Rejection> {
    let player = state
        .player_mut(player_id)
        .ok_or(Rejection::UnknownPlayer(player_id))?;
    player.selected_for_pot = !player.selected_for_pot;
    Ok(())
}

/// Pay the pot to the selected winners.
///
/// A single winner takes the pot's chips as they are. Several winners split
/// the pot's value evenly (floor division), each share paid out in the
/// largest chips that fit. Anything that doesn't divide evenly is dropped
/// with the pot.
pub fn distribute_pot(state: &mut GameState) -> Result<Distribution, Rejection> {
    let winners: Vec<usize> = state
        .players
        .iter()
        .enumerate()
        .filter(|(_, p)| p.selected_for_pot)
        .map(|(idx, _)| idx)
        .collect();
    if winners.is_empty() {
        return Err(Rejection::NoWinnerSelected);
    }
    let pot_value = state.pot.value();
    if pot_value == 0 {
        return Err(Rejection::EmptyPot);
    }

    let paid_value = if let [winner] = winners.as_slice() {
        state.players[*winner].chips.absorb(&state.pot);
        pot_value
    } else {
        let share = pot_value / winners.len() as ChipValue;
        let (payout, _) = ChipBundle::greedy_change(share);
        for idx in &winners {
            state.players[*idx].chips.absorb(&payout);
        }
        payout.value() * winners.len() as ChipValue
    };

    let distribution = Distribution {
        winners: winners.iter().map(|idx| state.players[*idx].id).collect(),
        pot_value,
        paid_value,
    };

    state.pot = ChipBundle::zeroed();
    for player in &mut state.players {
        player.selected_for_pot = false;
    }

    if distribution.discarded() > 0 {
        log::debug!(
            "Pot of {} split between {} winners, {} discarded",
            pot_value,
            distribution.winners.len(),
            distribution.discarded()
        );
    }
    Ok(distribution)
}

/// Clear the roster and the pot. The blind clock keeps going.
pub fn reset_game(state: &mut GameState) {
    state.players.clear();
    state.pot = ChipBundle::zeroed();
}
