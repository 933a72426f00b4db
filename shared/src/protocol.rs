use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::vec3::Vec3;

/// Protocol version - increment when making breaking changes.
pub const PROTOCOL_VERSION: u32 = 1;

// === Entity state ===

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../clients/src/shared/generated/")]
#[serde(rename_all = "camelCase")]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::splat(1.0),
        }
    }
}

/// Partial transform carried by `update_entity`. Absent fields leave the
/// stored value untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../clients/src/shared/generated/")]
#[serde(rename_all = "camelCase")]
pub struct TransformPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Vec3>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<Vec3>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<Vec3>,
}

/// Physics overrides for an entity. All fields optional; merges are
/// field-wise.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../clients/src/shared/generated/")]
#[serde(rename_all = "camelCase")]
pub struct PhysicsState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mass: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub friction: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restitution: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../clients/src/shared/generated/")]
#[serde(rename_all = "camelCase")]
pub struct EntityState {
    pub entity_id: String,
    pub asset_id: String,
    /// Absent means unowned: any client may mutate the entity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,
    pub transform: Transform,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub physics: Option<PhysicsState>,
}

// === Client -> Server ===

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../clients/src/shared/generated/")]
#[serde(tag = "type")]
pub enum ClientMsg {
    #[serde(rename = "join")]
    Join(JoinMsg),
    #[serde(rename = "spawn_entity")]
    SpawnEntity(SpawnEntityMsg),
    #[serde(rename = "update_entity")]
    UpdateEntity(UpdateEntityMsg),
    #[serde(rename = "remove_entity")]
    RemoveEntity(RemoveEntityMsg),
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../clients/src/shared/generated/")]
#[serde(rename_all = "camelCase")]
pub struct JoinMsg {
    pub room_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../clients/src/shared/generated/")]
#[serde(rename_all = "camelCase")]
pub struct SpawnEntityMsg {
    pub room_id: String,
    pub entity: EntityState,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../clients/src/shared/generated/")]
#[serde(rename_all = "camelCase")]
pub struct UpdateEntityMsg {
    pub room_id: String,
    pub entity_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transform: Option<TransformPatch>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub physics: Option<PhysicsState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../clients/src/shared/generated/")]
#[serde(rename_all = "camelCase")]
pub struct RemoveEntityMsg {
    pub room_id: String,
    pub entity_id: String,
}

// === Server -> Client ===

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../clients/src/shared/generated/")]
#[serde(tag = "type")]
pub enum ServerMsg {
    #[serde(rename = "welcome")]
    Welcome(WelcomeMsg),
    #[serde(rename = "entity_spawned")]
    EntitySpawned(EntitySpawnedMsg),
    #[serde(rename = "entity_updated")]
    EntityUpdated(EntityUpdatedMsg),
    #[serde(rename = "entity_removed")]
    EntityRemoved(EntityRemovedMsg),
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../clients/src/shared/generated/")]
#[serde(rename_all = "camelCase")]
pub struct WelcomeMsg {
    pub room_id: String,
    pub client_id: String,
    pub entities: Vec<EntityState>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../clients/src/shared/generated/")]
#[serde(rename_all = "camelCase")]
pub struct EntitySpawnedMsg {
    pub room_id: String,
    pub entity: EntityState,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../clients/src/shared/generated/")]
#[serde(rename_all = "camelCase")]
pub struct EntityUpdatedMsg {
    pub room_id: String,
    pub entity: EntityState,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../clients/src/shared/generated/")]
#[serde(rename_all = "camelCase")]
pub struct EntityRemovedMsg {
    pub room_id: String,
    pub entity_id: String,
}
