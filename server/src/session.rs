//! Session loop: a single task owning the room registry.
//!
//! Every connection funnels its requests through one mpsc channel, so the
//! registry never needs a lock and all clients in a room observe events in
//! the order they were applied.

use forge_shared::{EntityState, PhysicsState, ServerMsg, TransformPatch};
use tokio::sync::{mpsc, oneshot};

use crate::config::ServerConfig;
use crate::registry::{ConnId, SessionManager};

/// Commands from client connections (and server-side jobs) to the session
/// loop.
pub enum SessionCommand {
    Join {
        conn: ConnId,
        room_id: String,
        client_id: Option<String>,
        tx: mpsc::UnboundedSender<ServerMsg>,
        response: oneshot::Sender<String>,
    },
    Spawn {
        conn: ConnId,
        entity: EntityState,
    },
    Update {
        conn: ConnId,
        entity_id: String,
        transform: Option<TransformPatch>,
        physics: Option<PhysicsState>,
        asset_id: Option<String>,
    },
    Remove {
        conn: ConnId,
        entity_id: String,
    },
    UpdateAsset {
        room_id: String,
        entity_id: String,
        asset_id: String,
    },
    Disconnect {
        conn: ConnId,
    },
}

/// Cloneable handle for sending commands into the session loop.
#[derive(Clone)]
pub struct SessionHandle {
    cmd_tx: mpsc::Sender<SessionCommand>,
}

impl SessionHandle {
    pub async fn send(&self, cmd: SessionCommand) {
        if self.cmd_tx.send(cmd).await.is_err() {
            tracing::error!("session loop is gone");
        }
    }

    /// Joins a room and waits for the assigned client id. The welcome
    /// snapshot arrives on `tx`.
    pub async fn join(
        &self,
        conn: ConnId,
        room_id: String,
        client_id: Option<String>,
        tx: mpsc::UnboundedSender<ServerMsg>,
    ) -> Option<String> {
        let (response, response_rx) = oneshot::channel();
        self.send(SessionCommand::Join {
            conn,
            room_id,
            client_id,
            tx,
            response,
        })
        .await;
        response_rx.await.ok()
    }

    /// Server-side asset swap for an entity, e.g. when an asynchronous
    /// asset generation job completes.
    pub async fn update_asset(&self, room_id: String, entity_id: String, asset_id: String) {
        self.send(SessionCommand::UpdateAsset {
            room_id,
            entity_id,
            asset_id,
        })
        .await;
    }
}

/// Spawns the session loop and returns its handle.
pub fn spawn_session_loop(config: &ServerConfig) -> SessionHandle {
    let (cmd_tx, cmd_rx) = mpsc::channel(config.command_capacity);
    tokio::spawn(run_session_loop(cmd_rx));
    SessionHandle { cmd_tx }
}

/// Runs the session loop. Owns all room state.
pub async fn run_session_loop(mut cmd_rx: mpsc::Receiver<SessionCommand>) {
    let mut sessions = SessionManager::new();

    while let Some(cmd) = cmd_rx.recv().await {
        match cmd {
            SessionCommand::Join {
                conn,
                room_id,
                client_id,
                tx,
                response,
            } => {
                let assigned = sessions.join(conn, room_id.clone(), client_id, tx);
                tracing::info!("Client {} joined room {}", assigned, room_id);
                let _ = response.send(assigned);
            }
            SessionCommand::Spawn { conn, entity } => {
                sessions.spawn(conn, entity);
            }
            SessionCommand::Update {
                conn,
                entity_id,
                transform,
                physics,
                asset_id,
            } => {
                sessions.update(conn, &entity_id, transform, physics, asset_id);
            }
            SessionCommand::Remove { conn, entity_id } => {
                sessions.remove(conn, &entity_id);
            }
            SessionCommand::UpdateAsset {
                room_id,
                entity_id,
                asset_id,
            } => {
                sessions.update_asset(&room_id, &entity_id, asset_id);
            }
            SessionCommand::Disconnect { conn } => {
                sessions.leave(conn);
            }
        }
    }

    tracing::info!("Session loop ended");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn join_resolves_with_assigned_id() {
        let config = ServerConfig::default();
        let handle = spawn_session_loop(&config);
        let (tx, mut rx) = mpsc::unbounded_channel();

        let assigned = handle
            .join(1, "r1".to_string(), Some("A".to_string()), tx)
            .await;
        assert_eq!(assigned.as_deref(), Some("A"));

        // Spawn broadcast for the player entity, then the welcome snapshot.
        assert!(matches!(rx.recv().await, Some(ServerMsg::EntitySpawned(_))));
        match rx.recv().await {
            Some(ServerMsg::Welcome(welcome)) => {
                assert_eq!(welcome.client_id, "A");
                assert_eq!(welcome.entities.len(), 1);
            }
            other => panic!("expected welcome, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn asset_update_reaches_room_members() {
        let config = ServerConfig::default();
        let handle = spawn_session_loop(&config);
        let (tx, mut rx) = mpsc::unbounded_channel();
        handle
            .join(1, "r1".to_string(), Some("A".to_string()), tx)
            .await;
        rx.recv().await; // player spawn
        rx.recv().await; // welcome

        handle
            .update_asset(
                "r1".to_string(),
                "player_A".to_string(),
                "generated_mesh_7".to_string(),
            )
            .await;

        match rx.recv().await {
            Some(ServerMsg::EntityUpdated(updated)) => {
                assert_eq!(updated.entity.asset_id, "generated_mesh_7");
            }
            other => panic!("expected entity_updated, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn disconnect_removes_the_player() {
        let config = ServerConfig::default();
        let handle = spawn_session_loop(&config);

        let (tx_a, mut rx_a) = mpsc::unbounded_channel();
        handle
            .join(1, "r1".to_string(), Some("A".to_string()), tx_a)
            .await;
        rx_a.recv().await;
        rx_a.recv().await;

        let (tx_b, _rx_b) = mpsc::unbounded_channel();
        handle
            .join(2, "r1".to_string(), Some("B".to_string()), tx_b)
            .await;
        assert!(matches!(
            rx_a.recv().await,
            Some(ServerMsg::EntitySpawned(_))
        ));

        handle.send(SessionCommand::Disconnect { conn: 2 }).await;
        match rx_a.recv().await {
            Some(ServerMsg::EntityRemoved(removed)) => {
                assert_eq!(removed.entity_id, "player_B");
            }
            other => panic!("expected entity_removed, got {:?}", other),
        }
    }
}
