//! WebSocket handler for live session updates.
//!
//! Every connection is a full peer: the manager page and the player pages
//! connect the same way, receive the same broadcasts and may send any
//! action.
//!
//! # Connection Flow
//!
//! 1. Client connects via `GET /ws`
//! 2. The connection subscribes to the session and immediately receives the
//!    current snapshot
//! 3. Server spawns a send task that forwards session broadcasts to the
//!    socket, while the handler reads client frames
//! 4. On disconnect the subscription is dropped
//!
//! # Client Messages
//!
//! ```json
//! {"event": "playerAction", "data": {"type": "playerBet", "payload": {"playerId": 1, "bet": {"red": 2}}}}
//! {"event": "timerAction", "data": {"type": "startPause"}}
//! ```
//!
//! Frames that fail to parse and actions the session rejects are logged and
//! otherwise ignored; nothing is sent back to the client.
//!
//! # Server Messages
//!
//! ```json
//! {"event": "gameStateUpdate", "data": {"players": [...], "pot": {...}, "timer": {...}}}
//! {"event": "playSound"}
//! ```

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use home_poker::{ClientMessage, ServerMessage, session::SessionError};
use log::{error, info, warn};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;
use uuid::Uuid;

use super::AppState;
use crate::{logging, metrics};

static ACTIVE_CONNECTIONS: AtomicU64 = AtomicU64::new(0);

/// Upgrade HTTP connection to WebSocket.
pub async fn websocket_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle an established WebSocket connection.
async fn handle_socket(socket: WebSocket, state: AppState) {
    let connection_id = Uuid::new_v4();
    let (mut sender, mut receiver) = socket.split();

    let (broadcast_tx, mut broadcast_rx) =
        mpsc::channel::<ServerMessage>(state.subscriber_buffer.max(1));

    if let Err(e) = state.session.subscribe(connection_id, broadcast_tx).await {
        error!("Connection {} could not subscribe: {}", connection_id, e);
        return;
    }

    metrics::websocket_connections_total();
    metrics::websocket_connections_active(ACTIVE_CONNECTIONS.fetch_add(1, Ordering::Relaxed) + 1);
    info!("WebSocket connected: {}", connection_id);

    // Forward session broadcasts to the socket
    let mut send_task = tokio::spawn(async move {
        while let Some(message) = broadcast_rx.recv().await {
            let json = match serde_json::to_string(&message) {
                Ok(j) => j,
                Err(e) => {
                    error!("Failed to serialize server message: {}", e);
                    continue;
                }
            };

            if sender.send(Message::Text(json.into())).await.is_err() {
                break;
            }
        }
    });

    // Receive messages from client
    loop {
        tokio::select! {
            frame = receiver.next() => match frame {
                Some(Ok(Message::Text(text))) => {
                    metrics::websocket_messages_received();
                    if let Err(e) = dispatch(&state, connection_id, text.as_str()).await {
                        error!("Connection {} lost the session: {}", connection_id, e);
                        break;
                    }
                }
                Some(Ok(Message::Close(_))) | None => {
                    info!("WebSocket closed: {}", connection_id);
                    break;
                }
                Some(Err(e)) => {
                    warn!("WebSocket error on {}: {}", connection_id, e);
                    break;
                }
                // Pings are answered by axum; binary frames aren't part of the protocol.
                Some(Ok(_)) => {}
            },

            // Socket writer gone, or the session dropped the subscription.
            _ = &mut send_task => break,
        }
    }

    send_task.abort();
    let _ = state.session.unsubscribe(connection_id).await;
    metrics::websocket_connections_active(
        ACTIVE_CONNECTIONS
            .fetch_sub(1, Ordering::Relaxed)
            .saturating_sub(1),
    );

    info!("WebSocket disconnected: {}", connection_id);
}

/// Parse one text frame and hand it to the session.
///
/// Only a dead session is an error; malformed frames and rejected actions
/// are logged and dropped.
async fn dispatch(state: &AppState, connection_id: Uuid, text: &str) -> Result<(), SessionError> {
    let message = match ClientMessage::from_json(text) {
        Ok(message) => message,
        Err(e) => {
            metrics::websocket_messages_rejected();
            logging::log_malformed_frame(connection_id, &e.to_string(), text);
            return Ok(());
        }
    };

    let (kind, outcome) = match message {
        ClientMessage::PlayerAction(action) => {
            (action.kind(), state.session.player_action(action).await?)
        }
        ClientMessage::TimerAction(action) => {
            (action.kind(), state.session.timer_action(action).await?)
        }
    };

    metrics::actions_total(kind, outcome.label());
    logging::log_action(connection_id, kind, &outcome);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use home_poker::session::{SessionActor, SessionConfig};

    fn state() -> AppState {
        AppState {
            session: SessionActor::spawn(SessionConfig::default()),
            subscriber_buffer: 8,
        }
    }

    #[tokio::test]
    async fn test_dispatch_player_action() {
        let state = state();
        let frame = r#"{"event":"playerAction","data":{"type":"addPlayer","payload":{"name":"Ana"}}}"#;

        dispatch(&state, Uuid::new_v4(), frame).await.unwrap();

        let snapshot = state.session.snapshot().await.unwrap();
        assert_eq!(snapshot.players.len(), 1);
        assert_eq!(snapshot.players[0].name, "Ana");
    }

    #[tokio::test]
    async fn test_dispatch_timer_action() {
        let state = state();
        let frame = r#"{"event":"timerAction","data":{"type":"changeDuration","payload":20}}"#;

        dispatch(&state, Uuid::new_v4(), frame).await.unwrap();

        let snapshot = state.session.snapshot().await.unwrap();
        assert_eq!(snapshot.timer.duration, 20);
        assert_eq!(snapshot.timer.time, 1200);
    }

    #[tokio::test]
    async fn test_dispatch_ignores_malformed_frames() {
        let state = state();

        for frame in [
            "not json",
            r#"{"event":"playerAction"}"#,
            r#"{"event":"playerAction","data":{"type":"playerBet","payload":{"playerId":1,"bet":{"red":-1}}}}"#,
            r#"{"event":"cheat","data":{}}"#,
        ] {
            assert!(dispatch(&state, Uuid::new_v4(), frame).await.is_ok());
        }

        let stats = state.session.stats().await.unwrap();
        assert_eq!(stats.actions_applied + stats.actions_rejected, 0);
    }

    #[tokio::test]
    async fn test_dispatch_rejected_action_is_not_an_error() {
        let state = state();
        let frame = r#"{"event":"playerAction","data":{"type":"distributePot"}}"#;

        assert!(dispatch(&state, Uuid::new_v4(), frame).await.is_ok());
        assert_eq!(state.session.stats().await.unwrap().actions_rejected, 1);
    }

    #[tokio::test]
    async fn test_dispatch_closed_session() {
        let state = state();
        state.session.close().await.unwrap();
        // Let the actor wind down.
        tokio::task::yield_now().await;

        let frame = r#"{"event":"timerAction","data":{"type":"reset"}}"#;
        assert!(dispatch(&state, Uuid::new_v4(), frame).await.is_err());
    }
}
