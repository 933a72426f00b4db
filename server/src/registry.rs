//! Room registry: the authoritative entity state for every room.
//!
//! All mutations flow through one owner (the session loop task), so every
//! client in a room observes spawn/update/remove events in the order they
//! were applied. Ownership is a soft contract: requests touching an entity
//! owned by someone else are dropped silently, the connection stays open.

use std::collections::HashMap;

use forge_shared::protocol::{
    EntityRemovedMsg, EntitySpawnedMsg, EntityUpdatedMsg, WelcomeMsg,
};
use forge_shared::{EntityState, PhysicsState, ServerMsg, Transform, TransformPatch, Vec3};
use rand::distributions::Alphanumeric;
use rand::Rng;
use tokio::sync::mpsc;

/// Identifies a socket for the lifetime of its connection.
pub type ConnId = u64;

pub struct Client {
    pub conn: ConnId,
    pub client_id: String,
    pub tx: mpsc::UnboundedSender<ServerMsg>,
}

struct Room {
    id: String,
    entities: HashMap<String, EntityState>,
    clients: Vec<Client>,
}

impl Room {
    fn broadcast(&self, msg: ServerMsg) {
        for client in &self.clients {
            if client.tx.send(msg.clone()).is_err() {
                // Socket is going away; its disconnect will clean up.
                tracing::debug!("dropping broadcast to {}", client.client_id);
            }
        }
    }
}

#[derive(Default)]
pub struct SessionManager {
    rooms: HashMap<String, Room>,
    /// Which room and client id each connection joined as.
    conn_index: HashMap<ConnId, (String, String)>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub fn entity_count(&self, room_id: &str) -> usize {
        self.rooms.get(room_id).map_or(0, |room| room.entities.len())
    }

    pub fn entity(&self, room_id: &str, entity_id: &str) -> Option<&EntityState> {
        self.rooms.get(room_id)?.entities.get(entity_id)
    }

    /// Registers the connection in the room, ensures its player entity
    /// exists, and sends a full entity snapshot back. Returns the client id
    /// actually assigned.
    pub fn join(
        &mut self,
        conn: ConnId,
        room_id: String,
        client_id: Option<String>,
        tx: mpsc::UnboundedSender<ServerMsg>,
    ) -> String {
        // A second join moves the connection; leave the old room first.
        if self.conn_index.contains_key(&conn) {
            self.leave(conn);
        }

        let client_id = client_id.unwrap_or_else(generate_client_id);
        let room = self
            .rooms
            .entry(room_id.clone())
            .or_insert_with(|| Room {
                id: room_id.clone(),
                entities: HashMap::new(),
                clients: Vec::new(),
            });
        room.clients.push(Client {
            conn,
            client_id: client_id.clone(),
            tx: tx.clone(),
        });
        self.conn_index
            .insert(conn, (room_id.clone(), client_id.clone()));

        ensure_player_entity(room, &client_id);

        let welcome = ServerMsg::Welcome(WelcomeMsg {
            room_id,
            client_id: client_id.clone(),
            entities: room.entities.values().cloned().collect(),
        });
        let _ = tx.send(welcome);

        client_id
    }

    /// Inserts an entity and broadcasts it. A duplicate entity id is a
    /// no-op, not an error; a spawn claiming someone else's ownership is
    /// dropped.
    pub fn spawn(&mut self, conn: ConnId, mut entity: EntityState) {
        let Some((room_id, client_id)) = self.conn_index.get(&conn).cloned() else {
            return;
        };
        let Some(room) = self.rooms.get_mut(&room_id) else {
            return;
        };
        if room.entities.contains_key(&entity.entity_id) {
            tracing::debug!("ignoring duplicate spawn of {}", entity.entity_id);
            return;
        }
        if entity.owner_id.is_none() {
            entity.owner_id = Some(client_id.clone());
        }
        if entity.owner_id.as_deref() != Some(client_id.as_str()) {
            tracing::debug!(
                "dropping spawn of {} claiming foreign owner",
                entity.entity_id
            );
            return;
        }
        room.entities.insert(entity.entity_id.clone(), entity.clone());
        room.broadcast(ServerMsg::EntitySpawned(EntitySpawnedMsg {
            room_id: room.id.clone(),
            entity,
        }));
    }

    /// Client-originated update, ownership-checked.
    pub fn update(
        &mut self,
        conn: ConnId,
        entity_id: &str,
        transform: Option<TransformPatch>,
        physics: Option<PhysicsState>,
        asset_id: Option<String>,
    ) {
        let Some((room_id, client_id)) = self.conn_index.get(&conn).cloned() else {
            return;
        };
        self.apply_update(
            &room_id,
            entity_id,
            Some(&client_id),
            transform,
            physics,
            asset_id,
        );
    }

    /// Server-originated asset swap used by the generation pipeline once an
    /// asynchronous job completes. Bypasses ownership, touches only the
    /// asset id.
    pub fn update_asset(&mut self, room_id: &str, entity_id: &str, asset_id: String) {
        self.apply_update(room_id, entity_id, None, None, None, Some(asset_id));
    }

    /// Client-originated removal, ownership-checked.
    pub fn remove(&mut self, conn: ConnId, entity_id: &str) {
        let Some((room_id, client_id)) = self.conn_index.get(&conn).cloned() else {
            return;
        };
        self.apply_remove(&room_id, entity_id, Some(&client_id));
    }

    /// Tears the connection out of its room, removes its player entity, and
    /// destroys the room once the last client is gone. Entities owned by
    /// the departed client other than its player persist.
    pub fn leave(&mut self, conn: ConnId) {
        let Some((room_id, client_id)) = self.conn_index.remove(&conn) else {
            return;
        };
        if let Some(room) = self.rooms.get_mut(&room_id) {
            room.clients.retain(|client| client.conn != conn);
        }

        self.apply_remove(&room_id, &player_entity_id(&client_id), None);

        if self
            .rooms
            .get(&room_id)
            .is_some_and(|room| room.clients.is_empty())
        {
            self.rooms.remove(&room_id);
            tracing::info!("Room {} destroyed", room_id);
        }
    }

    fn apply_update(
        &mut self,
        room_id: &str,
        entity_id: &str,
        requester: Option<&str>,
        transform: Option<TransformPatch>,
        physics: Option<PhysicsState>,
        asset_id: Option<String>,
    ) {
        let Some(room) = self.rooms.get_mut(room_id) else {
            return;
        };
        let Some(entity) = room.entities.get_mut(entity_id) else {
            return;
        };
        if is_foreign(entity, requester) {
            tracing::debug!("dropping update of {} from non-owner", entity_id);
            return;
        }

        if let Some(asset_id) = asset_id {
            entity.asset_id = asset_id;
        }
        if let Some(patch) = transform {
            if let Some(position) = patch.position {
                entity.transform.position = position;
            }
            if let Some(rotation) = patch.rotation {
                entity.transform.rotation = rotation;
            }
            if let Some(scale) = patch.scale {
                entity.transform.scale = scale;
            }
        }
        if let Some(update) = physics {
            let stored = entity.physics.get_or_insert_with(PhysicsState::default);
            if update.mass.is_some() {
                stored.mass = update.mass;
            }
            if update.friction.is_some() {
                stored.friction = update.friction;
            }
            if update.restitution.is_some() {
                stored.restitution = update.restitution;
            }
        }

        let entity = entity.clone();
        room.broadcast(ServerMsg::EntityUpdated(EntityUpdatedMsg {
            room_id: room.id.clone(),
            entity,
        }));
    }

    fn apply_remove(&mut self, room_id: &str, entity_id: &str, requester: Option<&str>) {
        let Some(room) = self.rooms.get_mut(room_id) else {
            return;
        };
        let Some(entity) = room.entities.get(entity_id) else {
            return;
        };
        if is_foreign(entity, requester) {
            tracing::debug!("dropping removal of {} from non-owner", entity_id);
            return;
        }
        room.entities.remove(entity_id);
        room.broadcast(ServerMsg::EntityRemoved(EntityRemovedMsg {
            room_id: room.id.clone(),
            entity_id: entity_id.to_string(),
        }));
    }
}

/// Owned by someone other than the requester. A `None` requester is the
/// server itself and may mutate anything.
fn is_foreign(entity: &EntityState, requester: Option<&str>) -> bool {
    match (requester, entity.owner_id.as_deref()) {
        (Some(requester), Some(owner)) => owner != requester,
        _ => false,
    }
}

fn player_entity_id(client_id: &str) -> String {
    format!("player_{client_id}")
}

/// Creates the client's player entity if it doesn't exist yet and
/// broadcasts the spawn (the joining client receives it too, ahead of its
/// welcome snapshot).
fn ensure_player_entity(room: &mut Room, client_id: &str) {
    let player_id = player_entity_id(client_id);
    if room.entities.contains_key(&player_id) {
        return;
    }
    let entity = EntityState {
        entity_id: player_id.clone(),
        asset_id: "player_proxy".to_string(),
        owner_id: Some(client_id.to_string()),
        transform: Transform {
            position: Vec3::new(0.0, 1.6, 0.0),
            rotation: Vec3::ZERO,
            scale: Vec3::new(0.8, 1.8, 0.8),
        },
        physics: Some(PhysicsState {
            mass: Some(90.0),
            friction: Some(4.0),
            restitution: Some(0.1),
        }),
    };
    room.entities.insert(player_id, entity.clone());
    room.broadcast(ServerMsg::EntitySpawned(EntitySpawnedMsg {
        room_id: room.id.clone(),
        entity,
    }));
}

fn generate_client_id() -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(6)
        .map(char::from)
        .collect();
    format!("client_{suffix}")
}
