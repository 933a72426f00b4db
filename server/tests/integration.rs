//! Integration tests for the session server.
//!
//! These tests start a real server instance and connect via WebSocket
//! to verify end-to-end behavior.

use futures_util::{SinkExt, StreamExt};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio_tungstenite::{connect_async, tungstenite::Message};

use forge_shared::protocol::{JoinMsg, SpawnEntityMsg, UpdateEntityMsg};
use forge_shared::{
    ClientMsg, EntityState, ServerMsg, Transform, TransformPatch, Vec3,
};

type WsStream =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

/// Start a test server on a random available port and return the WebSocket URL.
async fn start_test_server() -> String {
    use forge_server::config::ServerConfig;
    use forge_server::session::spawn_session_loop;
    use forge_server::ws::AppState;

    // Find an available port
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener); // Release the port so the server can bind to it

    let config = ServerConfig {
        listen_addr: addr.to_string(),
        ..ServerConfig::default()
    };
    let session = spawn_session_loop(&config);

    let app_state = AppState::new(session);
    let app = axum::Router::new()
        .route("/session", axum::routing::get(forge_server::ws::ws_handler))
        .with_state(app_state);

    tokio::spawn(async move {
        let listener = TcpListener::bind(&config.listen_addr).await.unwrap();
        axum::serve(listener, app).await.unwrap();
    });

    // Give server time to start
    tokio::time::sleep(Duration::from_millis(50)).await;

    format!("ws://{}/session", addr)
}

async fn connect(url: &str) -> WsStream {
    let (ws, _) = connect_async(url).await.expect("Failed to connect");
    ws
}

async fn send(ws: &mut WsStream, msg: &ClientMsg) {
    let json = serde_json::to_string(msg).unwrap();
    ws.send(Message::Text(json.into())).await.unwrap();
}

/// Read the next text message and parse as ServerMsg.
async fn recv_msg(ws: &mut WsStream) -> ServerMsg {
    loop {
        match ws.next().await {
            Some(Ok(Message::Text(text))) => {
                return serde_json::from_str(&text).expect("Failed to parse server message");
            }
            Some(Ok(_)) => continue, // Skip ping/pong
            Some(Err(e)) => panic!("WebSocket error: {}", e),
            None => panic!("WebSocket closed unexpectedly"),
        }
    }
}

/// Read the next text message with a timeout.
async fn recv_msg_timeout(ws: &mut WsStream, timeout: Duration) -> Option<ServerMsg> {
    tokio::time::timeout(timeout, recv_msg(ws)).await.ok()
}

/// Join a room and drain messages until the welcome arrives, returning it.
async fn join_room(ws: &mut WsStream, room_id: &str, client_id: &str) -> Vec<EntityState> {
    send(
        ws,
        &ClientMsg::Join(JoinMsg {
            room_id: room_id.to_string(),
            client_id: Some(client_id.to_string()),
        }),
    )
    .await;
    loop {
        match recv_msg(ws).await {
            ServerMsg::Welcome(welcome) => {
                assert_eq!(welcome.room_id, room_id);
                assert_eq!(welcome.client_id, client_id);
                return welcome.entities;
            }
            _ => continue,
        }
    }
}

fn crate_entity(entity_id: &str) -> EntityState {
    EntityState {
        entity_id: entity_id.to_string(),
        asset_id: "wooden_crate".to_string(),
        owner_id: None,
        transform: Transform {
            position: Vec3::new(0.0, 1.0, 0.0),
            ..Transform::default()
        },
        physics: None,
    }
}

fn position_update(entity_id: &str, room_id: &str, x: f32) -> ClientMsg {
    ClientMsg::UpdateEntity(UpdateEntityMsg {
        room_id: room_id.to_string(),
        entity_id: entity_id.to_string(),
        transform: Some(TransformPatch {
            position: Some(Vec3::new(x, 1.0, 0.0)),
            ..TransformPatch::default()
        }),
        physics: None,
        asset_id: None,
    })
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn test_join_creates_player_and_returns_snapshot() {
    let url = start_test_server().await;
    let mut ws = connect(&url).await;

    let entities = join_room(&mut ws, "r1", "A").await;
    assert_eq!(entities.len(), 1);
    assert_eq!(entities[0].entity_id, "player_A");
    assert_eq!(entities[0].owner_id.as_deref(), Some("A"));
}

#[tokio::test]
async fn test_second_client_sees_existing_entities() {
    let url = start_test_server().await;
    let mut ws_a = connect(&url).await;
    let mut ws_b = connect(&url).await;

    join_room(&mut ws_a, "r1", "A").await;
    let entities = join_room(&mut ws_b, "r1", "B").await;
    assert_eq!(entities.len(), 2);

    // A is told about B's player.
    match recv_msg(&mut ws_a).await {
        ServerMsg::EntitySpawned(spawned) => {
            assert_eq!(spawned.entity.entity_id, "player_B");
        }
        other => panic!("Expected entity_spawned, got {:?}", other),
    }
}

#[tokio::test]
async fn test_spawn_and_update_are_broadcast() {
    let url = start_test_server().await;
    let mut ws_a = connect(&url).await;
    let mut ws_b = connect(&url).await;
    join_room(&mut ws_a, "r1", "A").await;
    join_room(&mut ws_b, "r1", "B").await;
    recv_msg(&mut ws_a).await; // player_B spawn

    send(
        &mut ws_a,
        &ClientMsg::SpawnEntity(SpawnEntityMsg {
            room_id: "r1".to_string(),
            entity: crate_entity("crate_1"),
        }),
    )
    .await;

    // Both clients see the spawn, with ownership assigned to A.
    for ws in [&mut ws_a, &mut ws_b] {
        match recv_msg(ws).await {
            ServerMsg::EntitySpawned(spawned) => {
                assert_eq!(spawned.entity.entity_id, "crate_1");
                assert_eq!(spawned.entity.owner_id.as_deref(), Some("A"));
            }
            other => panic!("Expected entity_spawned, got {:?}", other),
        }
    }

    send(&mut ws_a, &position_update("crate_1", "r1", 7.0)).await;
    match recv_msg(&mut ws_b).await {
        ServerMsg::EntityUpdated(updated) => {
            assert_eq!(updated.entity.transform.position.x, 7.0);
            // Unpatched fields survive.
            assert_eq!(updated.entity.transform.scale, Vec3::splat(1.0));
        }
        other => panic!("Expected entity_updated, got {:?}", other),
    }
}

#[tokio::test]
async fn test_non_owner_update_is_dropped_silently() {
    let url = start_test_server().await;
    let mut ws_a = connect(&url).await;
    let mut ws_b = connect(&url).await;
    join_room(&mut ws_a, "r1", "A").await;
    join_room(&mut ws_b, "r1", "B").await;
    recv_msg(&mut ws_a).await; // player_B spawn

    // B tries to move A's player. Nothing is broadcast and the
    // connection stays usable.
    send(&mut ws_b, &position_update("player_A", "r1", 99.0)).await;
    assert!(
        recv_msg_timeout(&mut ws_a, Duration::from_millis(200))
            .await
            .is_none(),
        "non-owner update must not be broadcast"
    );

    // B can still act on entities it owns.
    send(&mut ws_b, &position_update("player_B", "r1", 2.0)).await;
    match recv_msg(&mut ws_a).await {
        ServerMsg::EntityUpdated(updated) => {
            assert_eq!(updated.entity.entity_id, "player_B");
        }
        other => panic!("Expected entity_updated, got {:?}", other),
    }
}

#[tokio::test]
async fn test_disconnect_removes_the_player_entity() {
    let url = start_test_server().await;
    let mut ws_a = connect(&url).await;
    let mut ws_b = connect(&url).await;
    join_room(&mut ws_a, "r1", "A").await;
    join_room(&mut ws_b, "r1", "B").await;
    recv_msg(&mut ws_a).await; // player_B spawn

    ws_b.close(None).await.unwrap();

    match recv_msg(&mut ws_a).await {
        ServerMsg::EntityRemoved(removed) => {
            assert_eq!(removed.entity_id, "player_B");
        }
        other => panic!("Expected entity_removed, got {:?}", other),
    }
}

#[tokio::test]
async fn test_malformed_json_does_not_close_the_connection() {
    let url = start_test_server().await;
    let mut ws = connect(&url).await;
    join_room(&mut ws, "r1", "A").await;

    ws.send(Message::Text("{not json".to_string().into()))
        .await
        .unwrap();
    ws.send(Message::Text(r#"{"type":"warp_entity"}"#.to_string().into()))
        .await
        .unwrap();

    // The connection still processes valid traffic.
    send(&mut ws, &position_update("player_A", "r1", 3.0)).await;
    match recv_msg(&mut ws).await {
        ServerMsg::EntityUpdated(updated) => {
            assert_eq!(updated.entity.transform.position.x, 3.0);
        }
        other => panic!("Expected entity_updated, got {:?}", other),
    }
}

#[tokio::test]
async fn test_messages_before_join_are_ignored() {
    let url = start_test_server().await;
    let mut ws = connect(&url).await;

    send(
        &mut ws,
        &ClientMsg::SpawnEntity(SpawnEntityMsg {
            room_id: "r1".to_string(),
            entity: crate_entity("crate_1"),
        }),
    )
    .await;

    // Joining afterwards yields a snapshot containing only the player.
    let entities = join_room(&mut ws, "r1", "A").await;
    assert_eq!(entities.len(), 1);
    assert_eq!(entities[0].entity_id, "player_A");
}

#[tokio::test]
async fn test_rooms_are_isolated() {
    let url = start_test_server().await;
    let mut ws_a = connect(&url).await;
    let mut ws_b = connect(&url).await;
    join_room(&mut ws_a, "r1", "A").await;
    join_room(&mut ws_b, "r2", "B").await;

    send(
        &mut ws_a,
        &ClientMsg::SpawnEntity(SpawnEntityMsg {
            room_id: "r1".to_string(),
            entity: crate_entity("crate_1"),
        }),
    )
    .await;

    assert!(
        recv_msg_timeout(&mut ws_b, Duration::from_millis(200))
            .await
            .is_none(),
        "activity in r1 must not leak into r2"
    );
}
