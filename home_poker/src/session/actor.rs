//! Session actor with async message handling.

use chrono::Utc;
use std::collections::HashMap;
use tokio::{
    sync::{mpsc, oneshot},
    time::{Instant, Interval, MissedTickBehavior, interval_at},
};

use super::{
    config::SessionConfig,
    messages::{ConnectionId, SessionError, SessionMessage, SessionStats},
};
use crate::{
    game::{
        actions::{GameAction, Reducer},
        entities::GameState,
        errors::ActionOutcome,
    },
    net::messages::{ServerMessage, Snapshot},
    timer::{TimerAction, TimerEffects, TimerState},
};

/// Cloneable handle for talking to a running [`SessionActor`].
#[derive(Clone, Debug)]
pub struct SessionHandle {
    sender: mpsc::Sender<SessionMessage>,
}

impl SessionHandle {
    pub fn new(sender: mpsc::Sender<SessionMessage>) -> Self {
        Self { sender }
    }

    /// Send a message to the session
    pub async fn send(&self, message: SessionMessage) -> Result<(), SessionError> {
        self.sender.send(message).await?;
        Ok(())
    }

    pub async fn player_action(&self, action: GameAction) -> Result<ActionOutcome, SessionError> {
        let (response, rx) = oneshot::channel();
        self.send(SessionMessage::PlayerAction { action, response })
            .await?;
        Ok(rx.await?)
    }

    pub async fn timer_action(&self, action: TimerAction) -> Result<ActionOutcome, SessionError> {
        let (response, rx) = oneshot::channel();
        self.send(SessionMessage::TimerAction { action, response })
            .await?;
        Ok(rx.await?)
    }

    pub async fn snapshot(&self) -> Result<Snapshot, SessionError> {
        let (response, rx) = oneshot::channel();
        self.send(SessionMessage::GetSnapshot { response }).await?;
        Ok(rx.await?)
    }

    pub async fn stats(&self) -> Result<SessionStats, SessionError> {
        let (response, rx) = oneshot::channel();
        self.send(SessionMessage::GetStats { response }).await?;
        Ok(rx.await?)
    }

    pub async fn subscribe(
        &self,
        connection_id: ConnectionId,
        sender: mpsc::Sender<ServerMessage>,
    ) -> Result<(), SessionError> {
        self.send(SessionMessage::Subscribe {
            connection_id,
            sender,
        })
        .await
    }

    pub async fn unsubscribe(&self, connection_id: ConnectionId) -> Result<(), SessionError> {
        self.send(SessionMessage::Unsubscribe { connection_id })
            .await
    }

    pub async fn close(&self) -> Result<(), SessionError> {
        self.send(SessionMessage::Close).await
    }
}

/// Sole owner of the [`GameState`].
///
/// Inbox messages and clock ticks are handled one at a time inside a single
/// task, so nothing else ever observes a half-applied change.
pub struct SessionActor {
    config: SessionConfig,

    state: GameState,

    reducer: Reducer,

    inbox: mpsc::Receiver<SessionMessage>,

    /// Present only while the clock runs.
    ticker: Option<Interval>,

    subscribers: HashMap<ConnectionId, mpsc::Sender<ServerMessage>>,

    is_closed: bool,

    actions_applied: u64,
    actions_rejected: u64,
    level_advances: u64,
}

impl SessionActor {
    /// Create a new session actor
    ///
    /// # Returns
    ///
    /// * `(SessionActor, SessionHandle)` - Actor and handle for sending messages
    pub fn new(config: SessionConfig) -> (Self, SessionHandle) {
        let (sender, inbox) = mpsc::channel(config.inbox_capacity.max(1));

        let actor = Self {
            state: GameState::new(TimerState::new(config.level_minutes)),
            reducer: Reducer::new(config.starting_chips.clone()),
            config,
            inbox,
            ticker: None,
            subscribers: HashMap::new(),
            is_closed: false,
            actions_applied: 0,
            actions_rejected: 0,
            level_advances: 0,
        };

        (actor, SessionHandle::new(sender))
    }

    /// Spawn the actor on the current runtime and return its handle.
    pub fn spawn(config: SessionConfig) -> SessionHandle {
        let (actor, handle) = Self::new(config);
        tokio::spawn(actor.run());
        handle
    }

    /// Run the session event loop
    pub async fn run(mut self) {
        log::info!(
            "Session starting ({} minute levels, {} blind levels)",
            self.config.level_minutes,
            self.config.blind_schedule.len()
        );

        loop {
            tokio::select! {
                message = self.inbox.recv() => {
                    match message {
                        Some(message) => self.handle_message(message),
                        // Every handle is gone.
                        None => break,
                    }

                    if self.is_closed {
                        break;
                    }
                }

                _ = next_tick(&mut self.ticker) => {
                    self.tick();
                }
            }
        }

        log::info!("Session closed");
    }

    fn handle_message(&mut self, message: SessionMessage) {
        match message {
            SessionMessage::PlayerAction { action, response } => {
                let outcome = self.handle_player_action(&action);
                let _ = response.send(outcome);
            }

            SessionMessage::TimerAction { action, response } => {
                let outcome = self.handle_timer_action(action);
                let _ = response.send(outcome);
            }

            SessionMessage::GetSnapshot { response } => {
                let _ = response.send(self.snapshot());
            }

            SessionMessage::GetStats { response } => {
                let _ = response.send(self.stats());
            }

            SessionMessage::Subscribe {
                connection_id,
                sender,
            } => {
                let snapshot = ServerMessage::GameStateUpdate(self.snapshot());
                if sender.try_send(snapshot).is_ok() {
                    self.subscribers.insert(connection_id, sender);
                    log::debug!("Connection {} subscribed", connection_id);
                } else {
                    log::warn!(
                        "Connection {} could not take the initial snapshot, not subscribing",
                        connection_id
                    );
                }
            }

            SessionMessage::Unsubscribe { connection_id } => {
                self.subscribers.remove(&connection_id);
                log::debug!("Connection {} unsubscribed", connection_id);
            }

            SessionMessage::Tick => {
                self.tick();
            }

            SessionMessage::Close => {
                self.is_closed = true;
            }
        }
    }

    fn handle_player_action(&mut self, action: &GameAction) -> ActionOutcome {
        let outcome = self.reducer.apply(&mut self.state, action);
        self.record(action.kind(), &outcome);
        self.broadcast_snapshot();
        outcome
    }

    fn handle_timer_action(&mut self, action: TimerAction) -> ActionOutcome {
        let result = self
            .state
            .timer
            .apply(action, &self.config.blind_schedule, Instant::now());
        let outcome = match result {
            Ok(effects) => {
                self.apply_effects(effects);
                ActionOutcome::Applied
            }
            Err(reason) => ActionOutcome::Rejected(reason),
        };
        self.sync_ticker();
        self.record(action.kind(), &outcome);
        self.broadcast_snapshot();
        outcome
    }

    /// Refresh the clock and push the heartbeat snapshot.
    fn tick(&mut self) {
        let effects = self
            .state
            .timer
            .tick(&self.config.blind_schedule, Instant::now());
        self.apply_effects(effects);
        self.sync_ticker();
        self.broadcast_snapshot();
    }

    fn apply_effects(&mut self, effects: TimerEffects) {
        if effects.level_advanced {
            self.level_advances += 1;
            log::info!(
                "Blinds up: level {} ({})",
                self.state.timer.round + 1,
                self.config
                    .blind_schedule
                    .level(self.state.timer.round)
                    .map_or_else(String::new, |level| level.to_string())
            );
            self.broadcast(ServerMessage::PlaySound);
        } else if effects.final_level_reached {
            log::info!("Final blind level reached, clock stopped");
        }
    }

    /// Start the tick process when the clock runs and stop it when it doesn't.
    fn sync_ticker(&mut self) {
        match (self.state.timer.is_running, self.ticker.is_some()) {
            (true, false) => {
                let period = self.config.tick_period;
                let mut ticker = interval_at(Instant::now() + period, period);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
                self.ticker = Some(ticker);
            }
            (false, true) => {
                self.ticker = None;
            }
            _ => {}
        }
    }

    fn record(&mut self, kind: &str, outcome: &ActionOutcome) {
        match outcome {
            ActionOutcome::Applied => {
                self.actions_applied += 1;
                log::debug!("{} applied", kind);
            }
            ActionOutcome::Rejected(reason) => {
                self.actions_rejected += 1;
                log::debug!("{} rejected: {}", kind, reason);
            }
        }
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot::capture(
            &self.state,
            &self.config.blind_schedule,
            Instant::now(),
            Utc::now(),
        )
    }

    fn stats(&self) -> SessionStats {
        SessionStats {
            players: self.state.players.len(),
            pot_value: self.state.pot.value(),
            round: self.state.timer.round,
            timer_running: self.state.timer.is_running,
            subscribers: self.subscribers.len(),
            actions_applied: self.actions_applied,
            actions_rejected: self.actions_rejected,
            level_advances: self.level_advances,
        }
    }

    fn broadcast_snapshot(&mut self) {
        let message = ServerMessage::GameStateUpdate(self.snapshot());
        self.broadcast(message);
    }

    /// Fan a message out to every subscriber
    fn broadcast(&mut self, message: ServerMessage) {
        self.subscribers.retain(|connection_id, sender| {
            match sender.try_send(message.clone()) {
                Ok(()) => true,
                Err(mpsc::error::TrySendError::Full(_)) => {
                    log::warn!(
                        "Connection {} channel full, dropping message",
                        connection_id
                    );
                    true
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    log::debug!("Connection {} disconnected, removing", connection_id);
                    false
                }
            }
        });
    }
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}
