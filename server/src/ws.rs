use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;

use forge_shared::{ClientMsg, ServerMsg};

use crate::registry::ConnId;
use crate::session::{SessionCommand, SessionHandle};

/// Shared app state passed to each WebSocket handler
#[derive(Clone)]
pub struct AppState {
    pub session: SessionHandle,
    next_conn_id: Arc<AtomicU64>,
}

impl AppState {
    pub fn new(session: SessionHandle) -> Self {
        Self {
            session,
            next_conn_id: Arc::new(AtomicU64::new(1)),
        }
    }
}

/// HTTP handler for WebSocket upgrade
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(app_state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, app_state))
}

async fn handle_socket(socket: WebSocket, app_state: AppState) {
    let conn: ConnId = app_state.next_conn_id.fetch_add(1, Ordering::Relaxed);
    let (mut sink, mut stream) = socket.split();

    // Outbound channel: the session loop pushes room events here.
    let (out_tx, mut out_rx) = mpsc::unbounded_channel::<ServerMsg>();
    let mut joined = false;

    tracing::info!("Connection {} opened", conn);

    loop {
        tokio::select! {
            // Client -> Server
            msg = stream.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let client_msg = match serde_json::from_str::<ClientMsg>(&text) {
                            Ok(msg) => msg,
                            Err(err) => {
                                // Malformed traffic never tears down the
                                // connection.
                                tracing::debug!("connection {}: unparseable message ({})", conn, err);
                                continue;
                            }
                        };
                        match client_msg {
                            ClientMsg::Join(join) => {
                                let assigned = app_state.session.join(
                                    conn,
                                    join.room_id,
                                    join.client_id,
                                    out_tx.clone(),
                                ).await;
                                if assigned.is_none() {
                                    break;
                                }
                                joined = true;
                            }
                            // The room is the one this connection joined;
                            // the roomId field on later messages is not
                            // trusted.
                            ClientMsg::SpawnEntity(spawn) => {
                                if !joined { continue; }
                                app_state.session.send(SessionCommand::Spawn {
                                    conn,
                                    entity: spawn.entity,
                                }).await;
                            }
                            ClientMsg::UpdateEntity(update) => {
                                if !joined { continue; }
                                app_state.session.send(SessionCommand::Update {
                                    conn,
                                    entity_id: update.entity_id,
                                    transform: update.transform,
                                    physics: update.physics,
                                    asset_id: update.asset_id,
                                }).await;
                            }
                            ClientMsg::RemoveEntity(remove) => {
                                if !joined { continue; }
                                app_state.session.send(SessionCommand::Remove {
                                    conn,
                                    entity_id: remove.entity_id,
                                }).await;
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(_)) => break,
                    _ => {} // Ignore ping/pong/binary
                }
            }

            // Server -> Client
            out = out_rx.recv() => {
                match out {
                    Some(msg) => {
                        let json = match serde_json::to_string(&msg) {
                            Ok(json) => json,
                            Err(err) => {
                                tracing::error!("failed to encode server message: {}", err);
                                continue;
                            }
                        };
                        if sink.send(Message::Text(json.into())).await.is_err() {
                            break;
                        }
                    }
                    None => break,
                }
            }
        }
    }

    // Cleanup on disconnect
    if joined {
        app_state
            .session
            .send(SessionCommand::Disconnect { conn })
            .await;
    }
    tracing::info!("Connection {} closed", conn);
}
