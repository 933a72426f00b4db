//! Wire types shared between the session server and its clients.
//!
//! Everything here serializes to the JSON the TypeScript clients speak;
//! `ts-rs` exports the matching type definitions.

pub mod protocol;
pub mod vec3;

pub use protocol::{
    ClientMsg, EntityState, PhysicsState, ServerMsg, Transform, TransformPatch, PROTOCOL_VERSION,
};
pub use vec3::Vec3;
