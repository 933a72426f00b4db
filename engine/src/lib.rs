//! Physics core for the collaborative sandbox.
//!
//! Game logic talks to a small rigid-body data model ([`body::RigidBody`])
//! and mutates its fields directly between frames; [`world::PhysicsWorld`]
//! bridges that model onto a fixed-timestep rapier simulation, reconciling
//! the two writers through a shadow snapshot of the last values pushed into
//! the simulation.

pub mod body;
pub mod collider;
pub mod material;
pub mod terrain;
pub mod world;

pub use body::{BodyId, BodyKind, BodySpec, ColliderKind, RigidBody, VisualGeometry};
pub use material::ContactMaterial;
pub use terrain::Terrain;
pub use world::PhysicsWorld;
