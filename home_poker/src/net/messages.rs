use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::time::Instant;

use crate::{
    game::{
        actions::GameAction,
        chips::{ChipBundle, ChipValue},
        entities::{GameState, Player},
        errors::Rejection,
    },
    timer::{BlindSchedule, TimerAction},
};

/// A message from a viewer (manager or player page) to the server.
///
/// Wire form: `{"event": "playerAction", "data": {"type": ..., "payload": ...}}`.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ClientMessage {
    PlayerAction(GameAction),
    TimerAction(TimerAction),
}

impl ClientMessage {
    /// Parse a text frame. Anything that doesn't fit the protocol comes back
    /// as [`Rejection::Malformed`].
    pub fn from_json(text: &str) -> Result<Self, Rejection> {
        serde_json::from_str(text).map_err(|e| Rejection::Malformed(e.to_string()))
    }
}

impl fmt::Display for ClientMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PlayerAction(action) => write!(f, "{action}"),
            Self::TimerAction(action) => write!(f, "timer {action}"),
        }
    }
}

/// A message from the server to every viewer.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ServerMessage {
    /// The whole session, sent on connect and after every change or tick.
    GameStateUpdate(Snapshot),
    /// The blinds went up.
    PlaySound,
}

impl ServerMessage {
    #[must_use]
    pub fn snapshot(&self) -> Option<&Snapshot> {
        match self {
            Self::GameStateUpdate(snapshot) => Some(snapshot),
            Self::PlaySound => None,
        }
    }
}

/// Full copy of the session as viewers see it.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub players: Vec<Player>,
    pub pot: ChipBundle,
    /// Largest round bet on the table, the amount a player has to cover.
    pub highest_bet: ChipValue,
    pub timer: TimerView,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerView {
    pub round: usize,
    pub time: u64,
    pub is_running: bool,
    pub duration: u32,
    /// Wall-clock end of the level in Unix milliseconds, while running.
    pub end_time: Option<i64>,
    pub small_blind: Option<ChipValue>,
    pub big_blind: Option<ChipValue>,
}

impl Snapshot {
    /// Project `state` for viewers. `now` and `wall_now` must describe the
    /// same moment; the monotonic deadline is translated to wall-clock time
    /// through them.
    #[must_use]
    pub fn capture(
        state: &GameState,
        schedule: &BlindSchedule,
        now: Instant,
        wall_now: DateTime<Utc>,
    ) -> Self {
        let timer = &state.timer;
        let end_time = match (timer.is_running, timer.deadline) {
            (true, Some(deadline)) => {
                let left = deadline.saturating_duration_since(now);
                let left = i64::try_from(left.as_millis()).unwrap_or(i64::MAX);
                Some(wall_now.timestamp_millis().saturating_add(left))
            }
            _ => None,
        };
        let level = schedule.level(timer.round);

        Self {
            players: state.players.clone(),
            pot: state.pot.clone(),
            highest_bet: state.highest_round_bet(),
            timer: TimerView {
                round: timer.round,
                time: timer.remaining(now),
                is_running: timer.is_running,
                duration: timer.duration,
                end_time,
                small_blind: level.map(|l| l.small),
                big_blind: level.map(|l| l.big),
            },
        }
    }

    #[must_use]
    pub fn player(&self, id: u32) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::chips::Denomination;
    use std::time::Duration;

    #[test]
    fn test_client_message_player_action() {
        let msg = ClientMessage::from_json(
            r#"{"event":"playerAction","data":{"type":"addPlayer","payload":{"name":"Ana"}}}"#,
        )
        .unwrap();
        assert_eq!(
            msg,
            ClientMessage::PlayerAction(GameAction::AddPlayer {
                name: "Ana".to_string()
            })
        );
    }

    #[test]
    fn test_client_message_timer_action() {
        let msg = ClientMessage::from_json(
            r#"{"event":"timerAction","data":{"type":"changeDuration","payload":10}}"#,
        )
        .unwrap();
        assert_eq!(msg, ClientMessage::TimerAction(TimerAction::ChangeDuration(10)));
    }

    #[test]
    fn test_malformed_client_messages() {
        for raw in [
            "not json",
            r#"{"event":"playerAction"}"#,
            r#"{"event":"chat","data":"hi"}"#,
            r#"{"event":"playerAction","data":{"type":"playerBet","payload":{"playerId":1,"bet":{"red":-2}}}}"#,
        ] {
            assert!(
                matches!(ClientMessage::from_json(raw), Err(Rejection::Malformed(_))),
                "{raw}"
            );
        }
    }

    #[test]
    fn test_play_sound_wire_format() {
        let json = serde_json::to_string(&ServerMessage::PlaySound).unwrap();
        assert_eq!(json, r#"{"event":"playSound"}"#);
    }

    #[test]
    fn test_snapshot_paused() {
        let mut state = GameState::default();
        state.pot.add(Denomination::Red, 2);
        let snapshot = Snapshot::capture(
            &state,
            &BlindSchedule::default(),
            Instant::now(),
            Utc::now(),
        );
        assert_eq!(snapshot.timer.time, 900);
        assert_eq!(snapshot.timer.end_time, None);
        assert_eq!(snapshot.timer.small_blind, Some(25));
        assert_eq!(snapshot.timer.big_blind, Some(50));
        assert_eq!(snapshot.pot.value(), 50);

        let json = serde_json::to_value(ServerMessage::GameStateUpdate(snapshot)).unwrap();
        assert_eq!(json["event"], "gameStateUpdate");
        assert_eq!(json["data"]["timer"]["isRunning"], false);
        assert_eq!(json["data"]["pot"]["red"], 2);
        assert_eq!(json["data"]["highestBet"], 0);
    }

    #[test]
    fn test_snapshot_running_projects_end_time() {
        let now = Instant::now();
        let wall = Utc::now();
        let mut state = GameState::default();
        state.timer.start_pause(now);
        let snapshot = Snapshot::capture(
            &state,
            &BlindSchedule::default(),
            now + Duration::from_secs(60),
            wall,
        );
        assert_eq!(snapshot.timer.time, 840);
        assert_eq!(
            snapshot.timer.end_time,
            Some(wall.timestamp_millis() + 840_000)
        );
    }

    #[test]
    fn test_snapshot_carries_highest_bet() {
        let mut state = GameState::default();
        let mut ana = Player::new(1, "Ana", ChipBundle::zeroed());
        ana.round_bet.add(Denomination::Black, 2);
        let mut ben = Player::new(2, "Ben", ChipBundle::zeroed());
        ben.round_bet.add(Denomination::Red, 1);
        state.players = vec![ana, ben];

        let snapshot = Snapshot::capture(
            &state,
            &BlindSchedule::default(),
            Instant::now(),
            Utc::now(),
        );
        assert_eq!(snapshot.highest_bet, 100);

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["highestBet"], 100);
    }
}
