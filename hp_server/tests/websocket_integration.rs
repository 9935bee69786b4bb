//! WebSocket integration tests against a real listener.
//!
//! Tests connection, broadcast fan-out, malformed input and disconnection.

use futures_util::{SinkExt, StreamExt};
use home_poker::{
    ServerMessage, Snapshot,
    game::entities::default_starting_chips,
    session::{SessionActor, SessionConfig, SessionHandle},
};
use serde_json::json;
use std::{net::SocketAddr, time::Duration};
use tokio::{net::TcpStream, time::timeout};
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message,
};

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Helper to start a server on an ephemeral port
async fn start_server() -> (SocketAddr, SessionHandle) {
    let session = SessionActor::spawn(SessionConfig::default());
    let app = hp_server::api::create_router(hp_server::api::AppState {
        session: session.clone(),
        subscriber_buffer: 64,
    });

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (addr, session)
}

async fn connect(addr: SocketAddr) -> Client {
    let (client, _) = connect_async(format!("ws://{}/ws", addr)).await.unwrap();
    client
}

/// Next server message, failing the test after two seconds of silence
async fn recv(client: &mut Client) -> ServerMessage {
    loop {
        let frame = timeout(Duration::from_secs(2), client.next())
            .await
            .expect("timed out waiting for a server message")
            .expect("connection closed")
            .unwrap();
        if let Message::Text(text) = frame {
            return serde_json::from_str(&text).unwrap();
        }
    }
}

async fn recv_snapshot(client: &mut Client) -> Snapshot {
    loop {
        if let ServerMessage::GameStateUpdate(snapshot) = recv(client).await {
            return snapshot;
        }
    }
}

async fn send(client: &mut Client, value: serde_json::Value) {
    client
        .send(Message::Text(value.to_string().into()))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_connect_receives_snapshot() {
    let (addr, _) = start_server().await;
    let mut client = connect(addr).await;

    let snapshot = recv_snapshot(&mut client).await;

    assert!(snapshot.players.is_empty());
    assert_eq!(snapshot.timer.round, 0);
    assert_eq!(snapshot.timer.time, 900);
    assert_eq!(snapshot.timer.end_time, None);
}

#[tokio::test]
async fn test_action_is_broadcast_to_every_viewer() {
    let (addr, _) = start_server().await;
    let mut manager = connect(addr).await;
    recv_snapshot(&mut manager).await;
    let mut player = connect(addr).await;
    recv_snapshot(&mut player).await;

    send(
        &mut manager,
        json!({"event": "playerAction", "data": {"type": "addPlayer", "payload": {"name": "Ana"}}}),
    )
    .await;

    for client in [&mut manager, &mut player] {
        let snapshot = recv_snapshot(client).await;
        assert_eq!(snapshot.players.len(), 1);
        assert_eq!(snapshot.players[0].name, "Ana");
        assert_eq!(
            snapshot.players[0].chips.value(),
            default_starting_chips().value()
        );
    }

    // Players send actions too.
    send(
        &mut player,
        json!({"event": "playerAction", "data": {"type": "playerBet", "payload": {"playerId": 1, "bet": {"red": 2}}}}),
    )
    .await;
    let snapshot = recv_snapshot(&mut manager).await;
    assert_eq!(snapshot.players[0].round_bet.value(), 50);
    assert_eq!(snapshot.highest_bet, 50);
}

#[tokio::test]
async fn test_malformed_frames_are_ignored() {
    let (addr, session) = start_server().await;
    let mut client = connect(addr).await;
    recv_snapshot(&mut client).await;

    client
        .send(Message::Text("{not json".to_string().into()))
        .await
        .unwrap();
    send(&mut client, json!({"event": "playerAction", "data": {"type": "launchRocket"}})).await;

    let silence = timeout(Duration::from_millis(300), client.next()).await;
    assert!(silence.is_err(), "malformed input must not be answered");

    // The connection still works.
    send(
        &mut client,
        json!({"event": "playerAction", "data": {"type": "addPlayer", "payload": {"name": "Ben"}}}),
    )
    .await;
    let snapshot = recv_snapshot(&mut client).await;
    assert_eq!(snapshot.players[0].name, "Ben");

    let stats = session.stats().await.unwrap();
    assert_eq!(stats.actions_applied, 1);
    assert_eq!(stats.actions_rejected, 0);
}

#[tokio::test]
async fn test_rejected_action_still_sends_snapshot() {
    let (addr, _) = start_server().await;
    let mut client = connect(addr).await;
    recv_snapshot(&mut client).await;

    send(&mut client, json!({"event": "playerAction", "data": {"type": "distributePot"}})).await;

    let snapshot = recv_snapshot(&mut client).await;
    assert!(snapshot.pot.is_empty());
}

#[tokio::test]
async fn test_running_clock_sends_heartbeats() {
    let (addr, _) = start_server().await;
    let mut client = connect(addr).await;
    recv_snapshot(&mut client).await;

    send(&mut client, json!({"event": "timerAction", "data": {"type": "startPause"}})).await;
    let started = recv_snapshot(&mut client).await;
    assert!(started.timer.is_running);
    let end_time = started.timer.end_time.unwrap();
    let now = chrono::Utc::now().timestamp_millis();
    assert!((end_time - now - 900_000).abs() < 5_000);

    let heartbeat = recv_snapshot(&mut client).await;
    assert!(heartbeat.timer.is_running);
    assert!(heartbeat.timer.time <= 900);

    send(&mut client, json!({"event": "timerAction", "data": {"type": "startPause"}})).await;
    let paused = loop {
        let snapshot = recv_snapshot(&mut client).await;
        if !snapshot.timer.is_running {
            break snapshot;
        }
    };
    assert_eq!(paused.timer.end_time, None);
}

#[tokio::test]
async fn test_disconnect_unsubscribes() {
    let (addr, session) = start_server().await;
    let mut client = connect(addr).await;
    recv_snapshot(&mut client).await;
    assert_eq!(session.stats().await.unwrap().subscribers, 1);

    client.close(None).await.unwrap();

    let mut subscribers = 1;
    for _ in 0..50 {
        subscribers = session.stats().await.unwrap().subscribers;
        if subscribers == 0 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert_eq!(subscribers, 0);
}
