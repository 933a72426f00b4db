//! Pairwise contact materials and the rapier hook that applies them.
//!
//! The simulation does not know about per-pair friction/restitution on its
//! own; every collider carries its body's [`MaterialId`] in `user_data` and
//! enables contact modification, and [`PairMaterialHook`] overrides the
//! solver contacts from the cache during each step.

use std::collections::HashMap;

use rapier3d::prelude::{ContactModificationContext, PhysicsHooks};

/// Identity of a body's material. Keys the contact-material cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MaterialId(pub(crate) u32);

/// Reserved pairing key for the terrain collider; never assigned to a body.
pub(crate) const TERRAIN_MATERIAL: MaterialId = MaterialId(0);

/// Friction/restitution shared by exactly one pair of participants.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactMaterial {
    pub friction: f32,
    pub restitution: f32,
}

/// Unordered pair of material identities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct PairKey(MaterialId, MaterialId);

impl PairKey {
    pub fn new(a: MaterialId, b: MaterialId) -> Self {
        if a <= b {
            Self(a, b)
        } else {
            Self(b, a)
        }
    }

    pub fn contains(&self, id: MaterialId) -> bool {
        self.0 == id || self.1 == id
    }
}

pub(crate) fn combine_friction(a: f32, b: f32) -> f32 {
    ((a + b) * 0.5).max(0.0)
}

pub(crate) fn combine_restitution(a: f32, b: f32) -> f32 {
    ((a + b) * 0.5).clamp(0.0, 1.0)
}

/// Cache of per-pair materials, keyed by the participants' material
/// identities. The world recomputes entries when a participant's
/// friction/restitution changes and evicts them when a participant is
/// removed.
#[derive(Debug, Default)]
pub(crate) struct ContactMaterialCache {
    materials: HashMap<PairKey, ContactMaterial>,
}

impl ContactMaterialCache {
    pub fn get(&self, key: PairKey) -> Option<&ContactMaterial> {
        self.materials.get(&key)
    }

    /// Creates or recomputes the material for a pair.
    pub fn put(&mut self, key: PairKey, material: ContactMaterial) {
        self.materials.insert(key, material);
    }

    /// Drops every material referencing `id`.
    pub fn evict(&mut self, id: MaterialId) {
        self.materials.retain(|key, _| !key.contains(id));
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }
}

/// Applies cached pair materials to the contact solver.
pub(crate) struct PairMaterialHook<'a> {
    pub materials: &'a ContactMaterialCache,
}

impl PhysicsHooks for PairMaterialHook<'_> {
    fn modify_solver_contacts(&self, context: &mut ContactModificationContext) {
        let a = MaterialId(context.colliders[context.collider1].user_data as u32);
        let b = MaterialId(context.colliders[context.collider2].user_data as u32);
        if let Some(material) = self.materials.get(PairKey::new(a, b)) {
            for contact in context.solver_contacts.iter_mut() {
                contact.friction = material.friction;
                contact.restitution = material.restitution;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pair_key_is_unordered() {
        let a = MaterialId(3);
        let b = MaterialId(7);
        assert_eq!(PairKey::new(a, b), PairKey::new(b, a));
    }

    #[test]
    fn friction_is_mean_clamped_at_zero() {
        assert!((combine_friction(0.4, 0.8) - 0.6).abs() < 1e-6);
        assert_eq!(combine_friction(-1.0, 0.2), 0.0);
    }

    #[test]
    fn restitution_is_mean_clamped_to_unit() {
        assert!((combine_restitution(0.2, 0.4) - 0.3).abs() < 1e-6);
        assert_eq!(combine_restitution(1.5, 1.5), 1.0);
        assert_eq!(combine_restitution(-0.5, 0.1), 0.0);
    }

    #[test]
    fn evict_only_touches_referencing_pairs() {
        let mut cache = ContactMaterialCache::default();
        let m = ContactMaterial {
            friction: 0.5,
            restitution: 0.1,
        };
        cache.put(PairKey::new(MaterialId(1), MaterialId(2)), m);
        cache.put(PairKey::new(MaterialId(2), MaterialId(3)), m);
        cache.put(PairKey::new(MaterialId(1), TERRAIN_MATERIAL), m);

        cache.evict(MaterialId(1));
        assert_eq!(cache.len(), 1);
        assert!(cache
            .get(PairKey::new(MaterialId(2), MaterialId(3)))
            .is_some());
        assert!(cache
            .get(PairKey::new(MaterialId(1), TERRAIN_MATERIAL))
            .is_none());
    }
}
