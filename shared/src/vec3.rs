use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// World-space vector as it appears on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../clients/src/shared/generated/")]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Uniform vector, mostly used for default scales.
    pub fn splat(v: f32) -> Self {
        Self::new(v, v, v)
    }
}

impl Default for Vec3 {
    fn default() -> Self {
        Self::ZERO
    }
}

/// Shorthand constructor matching the TypeScript `vec3()` helper.
pub fn vec3(x: f32, y: f32, z: f32) -> Vec3 {
    Vec3::new(x, y, z)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_as_object() {
        let v = vec3(1.0, -2.5, 0.25);
        let json = serde_json::to_string(&v).unwrap();
        assert_eq!(json, r#"{"x":1.0,"y":-2.5,"z":0.25}"#);
        let back: Vec3 = serde_json::from_str(&json).unwrap();
        assert_eq!(back, v);
    }
}
