//! Rigid-body data model mutated directly by game logic between steps.

use rapier3d::na::Vector3;
use rapier3d::prelude::{ColliderHandle, RigidBodyHandle};

use crate::material::MaterialId;

/// Threshold below which a field write is not considered a change.
pub(crate) const EPSILON: f32 = 1e-4;

/// Handle to a body registered with a [`crate::world::PhysicsWorld`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyId(pub(crate) u32);

/// Collision shape requested for (or resolved onto) a body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColliderKind {
    Box,
    ConvexHull,
    Mesh,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    Static,
    Dynamic,
    Kinematic,
}

/// Sampled visible geometry of an entity, expressed in the entity's local
/// frame and pre-scaled by its root scale. Flat xyz vertex buffer plus
/// triangle indices.
#[derive(Debug, Clone, Default)]
pub struct VisualGeometry {
    pub vertices: Vec<f32>,
    pub indices: Vec<u32>,
}

impl VisualGeometry {
    /// Too little data to build a hull or mesh from.
    pub fn is_degenerate(&self) -> bool {
        self.vertices.len() < 12 || self.indices.len() < 3
    }
}

/// Construction parameters for [`crate::world::PhysicsWorld::create_body`].
#[derive(Debug, Clone)]
pub struct BodySpec {
    pub position: Vector3<f32>,
    /// Euler XYZ, radians.
    pub rotation: Vector3<f32>,
    pub half_extents: Vector3<f32>,
    pub body_kind: BodyKind,
    pub mass: f32,
    pub friction: f32,
    pub restitution: f32,
    pub angular_damping: f32,
    pub collider: ColliderKind,
    pub geometry: Option<VisualGeometry>,
}

impl Default for BodySpec {
    fn default() -> Self {
        Self {
            position: Vector3::zeros(),
            rotation: Vector3::zeros(),
            half_extents: Vector3::new(0.5, 0.5, 0.5),
            body_kind: BodyKind::Dynamic,
            mass: 1.0,
            friction: 0.4,
            restitution: 0.1,
            angular_damping: 0.1,
            collider: ColliderKind::Box,
            geometry: None,
        }
    }
}

/// Last values pushed into the simulation, used only for dirty detection.
#[derive(Debug, Clone)]
pub(crate) struct SyncState {
    pub position: Vector3<f32>,
    pub rotation: Vector3<f32>,
    pub velocity: Vector3<f32>,
    pub angular_velocity: Vector3<f32>,
    pub sleeping: bool,
    pub mass: f32,
    pub friction: f32,
    pub restitution: f32,
    pub angular_damping: f32,
    pub body_kind: BodyKind,
}

/// Per-entity physical state. Owned by the physics world once registered;
/// game logic mutates the public fields directly between steps and the
/// world reconciles them on `step()`.
#[derive(Debug)]
pub struct RigidBody {
    pub position: Vector3<f32>,
    /// Euler XYZ, radians.
    pub rotation: Vector3<f32>,
    pub velocity: Vector3<f32>,
    pub angular_velocity: Vector3<f32>,
    pub half_extents: Vector3<f32>,
    pub body_kind: BodyKind,
    pub mass: f32,
    pub friction: f32,
    pub restitution: f32,
    pub angular_damping: f32,
    /// Recomputed every step from terrain contacts; never persists.
    pub grounded: bool,
    pub sleeping: bool,
    /// The shape actually in use. May differ from the requested kind after
    /// a fallback or downgrade.
    pub collider_kind: ColliderKind,

    pub(crate) handle: RigidBodyHandle,
    pub(crate) collider: ColliderHandle,
    pub(crate) material: MaterialId,
    pub(crate) sync: SyncState,
}

impl RigidBody {
    pub fn is_dynamic(&self) -> bool {
        self.body_kind == BodyKind::Dynamic
    }

    pub(crate) fn snapshot(&self) -> SyncState {
        SyncState {
            position: self.position,
            rotation: self.rotation,
            velocity: self.velocity,
            angular_velocity: self.angular_velocity,
            sleeping: self.sleeping,
            mass: self.mass,
            friction: self.friction,
            restitution: self.restitution,
            angular_damping: self.angular_damping,
            body_kind: self.body_kind,
        }
    }
}

pub(crate) fn vector_changed(a: &Vector3<f32>, b: &Vector3<f32>) -> bool {
    (a.x - b.x).abs() > EPSILON || (a.y - b.y).abs() > EPSILON || (a.z - b.z).abs() > EPSILON
}
