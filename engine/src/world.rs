//! Bridge between the rigid-body store and the rapier simulation.
//!
//! `PhysicsWorld` exclusively owns all simulation-internal state. Game code
//! mutates [`RigidBody`] fields between steps; `step()` diffs each body
//! against its shadow snapshot, pushes the changes into rapier, advances
//! the simulation on a fixed sub-step, then pulls the results back.

use std::collections::HashMap;

use rapier3d::na::{Isometry3, Translation3, UnitQuaternion, Vector3};
use rapier3d::prelude::{
    ActiveHooks, BroadPhaseBvh, CCDSolver, ColliderBuilder, ColliderHandle, ColliderSet,
    ImpulseJointSet, IntegrationParameters, IslandManager, MultibodyJointSet, NarrowPhase,
    PhysicsPipeline, RigidBodyBuilder, RigidBodyHandle, RigidBodySet, RigidBodyType,
};

use crate::body::{vector_changed, BodyId, BodyKind, BodySpec, RigidBody, SyncState, VisualGeometry};
use crate::collider::{build_shape, build_terrain_shape};
use crate::material::{
    combine_friction, combine_restitution, ContactMaterial, ContactMaterialCache, MaterialId,
    PairKey, PairMaterialHook, TERRAIN_MATERIAL,
};
use crate::terrain::Terrain;

const FIXED_TIME_STEP: f32 = 1.0 / 60.0;
const MAX_SUB_STEPS: u32 = 6;
/// Zero-mass dynamic bodies destabilize the solver.
const MIN_DYNAMIC_MASS: f32 = 0.001;
const TERRAIN_FRICTION: f32 = 0.4;
const TERRAIN_RESTITUTION: f32 = 0.1;

struct TerrainCollider {
    body: RigidBodyHandle,
    collider: ColliderHandle,
}

pub struct PhysicsWorld {
    gravity: Vector3<f32>,
    integration_parameters: IntegrationParameters,
    pipeline: PhysicsPipeline,
    islands: IslandManager,
    broad_phase: BroadPhaseBvh,
    narrow_phase: NarrowPhase,
    body_set: RigidBodySet,
    collider_set: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,

    bodies: HashMap<BodyId, RigidBody>,
    body_by_collider: HashMap<ColliderHandle, BodyId>,
    materials: ContactMaterialCache,
    terrain: Option<TerrainCollider>,
    accumulator: f32,
    next_body_id: u32,
    next_material_id: u32,
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl PhysicsWorld {
    pub fn new() -> Self {
        let integration_parameters = IntegrationParameters {
            dt: FIXED_TIME_STEP,
            ..IntegrationParameters::default()
        };
        Self {
            gravity: Vector3::new(0.0, -9.8, 0.0),
            integration_parameters,
            pipeline: PhysicsPipeline::new(),
            islands: IslandManager::new(),
            broad_phase: BroadPhaseBvh::new(),
            narrow_phase: NarrowPhase::new(),
            body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            bodies: HashMap::new(),
            body_by_collider: HashMap::new(),
            materials: ContactMaterialCache::default(),
            terrain: None,
            accumulator: 0.0,
            next_body_id: 1,
            // MaterialId(0) is reserved for the terrain.
            next_material_id: 1,
        }
    }

    pub fn with_terrain(terrain: &Terrain) -> Self {
        let mut world = Self::new();
        world.set_terrain(terrain);
        world
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    pub fn contains(&self, id: BodyId) -> bool {
        self.bodies.contains_key(&id)
    }

    pub fn body(&self, id: BodyId) -> Option<&RigidBody> {
        self.bodies.get(&id)
    }

    /// Fields written through this are reconciled with the simulation on the
    /// next `step()`.
    pub fn body_mut(&mut self, id: BodyId) -> Option<&mut RigidBody> {
        self.bodies.get_mut(&id)
    }

    pub fn body_ids(&self) -> impl Iterator<Item = BodyId> + '_ {
        self.bodies.keys().copied()
    }

    /// Builds a collision shape per the construction policy, registers the
    /// body with the simulation, and seeds its shadow snapshot. The collider
    /// kind actually built is recorded on the returned body.
    pub fn create_body(&mut self, spec: BodySpec) -> BodyId {
        let id = BodyId(self.next_body_id);
        self.next_body_id += 1;
        let material = MaterialId(self.next_material_id);
        self.next_material_id += 1;

        let (shape, resolved_kind) = build_shape(
            spec.collider,
            &spec.half_extents,
            spec.geometry.as_ref(),
            spec.body_kind,
        );

        let rotation =
            UnitQuaternion::from_euler_angles(spec.rotation.x, spec.rotation.y, spec.rotation.z);
        let pose = Isometry3::from_parts(Translation3::from(spec.position), rotation);
        let rb = match spec.body_kind {
            BodyKind::Dynamic => RigidBodyBuilder::dynamic(),
            BodyKind::Static => RigidBodyBuilder::fixed(),
            BodyKind::Kinematic => RigidBodyBuilder::kinematic_velocity_based(),
        }
        .pose(pose)
        .angular_damping(spec.angular_damping)
        .can_sleep(true)
        .build();
        let handle = self.body_set.insert(rb);

        let collider_mass = if spec.body_kind == BodyKind::Dynamic {
            spec.mass.max(MIN_DYNAMIC_MASS)
        } else {
            0.0
        };
        let collider = ColliderBuilder::new(shape)
            .friction(spec.friction)
            .restitution(spec.restitution)
            .mass(collider_mass)
            .user_data(material.0 as u128)
            .active_hooks(ActiveHooks::MODIFY_SOLVER_CONTACTS)
            .build();
        let collider_handle =
            self.collider_set
                .insert_with_parent(collider, handle, &mut self.body_set);

        let sync = SyncState {
            position: spec.position,
            rotation: spec.rotation,
            velocity: Vector3::zeros(),
            angular_velocity: Vector3::zeros(),
            sleeping: false,
            mass: spec.mass,
            friction: spec.friction,
            restitution: spec.restitution,
            angular_damping: spec.angular_damping,
            body_kind: spec.body_kind,
        };
        let body = RigidBody {
            position: spec.position,
            rotation: spec.rotation,
            velocity: Vector3::zeros(),
            angular_velocity: Vector3::zeros(),
            half_extents: spec.half_extents,
            body_kind: spec.body_kind,
            mass: spec.mass,
            friction: spec.friction,
            restitution: spec.restitution,
            angular_damping: spec.angular_damping,
            grounded: false,
            sleeping: false,
            collider_kind: resolved_kind,
            handle,
            collider: collider_handle,
            material,
            sync,
        };

        self.bodies.insert(id, body);
        self.body_by_collider.insert(collider_handle, id);
        self.refresh_contact_materials(id);
        id
    }

    /// Idempotent. Evicts every contact material referencing the body.
    pub fn remove_body(&mut self, id: BodyId) {
        let Some(body) = self.bodies.remove(&id) else {
            return;
        };
        self.materials.evict(body.material);
        self.body_by_collider.remove(&body.collider);
        self.body_set.remove(
            body.handle,
            &mut self.islands,
            &mut self.collider_set,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            true,
        );
    }

    /// Rebuilds the terrain collider wholesale and refreshes every body's
    /// terrain contact material (the previous pairing is stale once the
    /// collider is replaced).
    pub fn set_terrain(&mut self, terrain: &Terrain) {
        if let Some(old) = self.terrain.take() {
            self.body_set.remove(
                old.body,
                &mut self.islands,
                &mut self.collider_set,
                &mut self.impulse_joints,
                &mut self.multibody_joints,
                true,
            );
        }

        let Some(shape) = build_terrain_shape(terrain) else {
            return;
        };
        let rb = RigidBodyBuilder::fixed().build();
        let handle = self.body_set.insert(rb);
        let collider = ColliderBuilder::new(shape)
            .friction(TERRAIN_FRICTION)
            .restitution(TERRAIN_RESTITUTION)
            .user_data(TERRAIN_MATERIAL.0 as u128)
            .active_hooks(ActiveHooks::MODIFY_SOLVER_CONTACTS)
            .build();
        let collider_handle =
            self.collider_set
                .insert_with_parent(collider, handle, &mut self.body_set);
        self.terrain = Some(TerrainCollider {
            body: handle,
            collider: collider_handle,
        });

        let ids: Vec<BodyId> = self.bodies.keys().copied().collect();
        for id in ids {
            self.refresh_contact_materials(id);
        }
    }

    /// Rebuilds just this body's collision shape, used when an entity's
    /// visual mesh is replaced after an asynchronous asset swap. Contact
    /// materials are untouched; material identity survives the swap.
    pub fn update_body_collider(&mut self, id: BodyId, geometry: Option<&VisualGeometry>) {
        let Some(body) = self.bodies.get_mut(&id) else {
            return;
        };
        let (shape, resolved_kind) = build_shape(
            body.collider_kind,
            &body.half_extents,
            geometry,
            body.body_kind,
        );
        body.collider_kind = resolved_kind;
        if let Some(collider) = self.collider_set.get_mut(body.collider) {
            collider.set_shape(shape);
            if body.body_kind == BodyKind::Dynamic {
                collider.set_mass(body.mass.max(MIN_DYNAMIC_MASS));
            }
        }
    }

    /// Advances simulated time by `dt`, in fixed sub-steps of 1/60 s with at
    /// most six sub-steps per call; time beyond the cap is dropped. Pushes
    /// dirty body fields into the simulation first and pulls results back
    /// afterwards.
    pub fn step(&mut self, dt: f32) {
        let ids: Vec<BodyId> = self.bodies.keys().copied().collect();
        for &id in &ids {
            self.push_body_state(id);
        }

        if dt > 0.0 {
            self.accumulator += dt;
            let mut substeps = 0;
            while self.accumulator >= FIXED_TIME_STEP && substeps < MAX_SUB_STEPS {
                let hooks = PairMaterialHook {
                    materials: &self.materials,
                };
                self.pipeline.step(
                    &self.gravity,
                    &self.integration_parameters,
                    &mut self.islands,
                    &mut self.broad_phase,
                    &mut self.narrow_phase,
                    &mut self.body_set,
                    &mut self.collider_set,
                    &mut self.impulse_joints,
                    &mut self.multibody_joints,
                    &mut self.ccd_solver,
                    &hooks,
                    &(),
                );
                self.accumulator -= FIXED_TIME_STEP;
                substeps += 1;
            }
            // Anything still owed after the cap is dropped, keeping only the
            // sub-step phase remainder.
            self.accumulator %= FIXED_TIME_STEP;
        }

        self.update_grounded_states();

        for &id in &ids {
            self.pull_body_state(id);
        }
    }

    /// Recomputes every cached contact material referencing this body,
    /// including the terrain pairing when a terrain collider exists.
    fn refresh_contact_materials(&mut self, id: BodyId) {
        let Some(body) = self.bodies.get(&id) else {
            return;
        };
        let material = body.material;
        let friction = body.friction;
        let restitution = body.restitution;

        for other in self.bodies.values() {
            if other.material == material {
                continue;
            }
            self.materials.put(
                PairKey::new(material, other.material),
                ContactMaterial {
                    friction: combine_friction(friction, other.friction),
                    restitution: combine_restitution(restitution, other.restitution),
                },
            );
        }

        if self.terrain.is_some() {
            self.materials.put(
                PairKey::new(material, TERRAIN_MATERIAL),
                ContactMaterial {
                    friction: friction.max(0.0),
                    restitution: restitution.clamp(0.0, 1.0),
                },
            );
        }
    }

    fn push_body_state(&mut self, id: BodyId) {
        let mut needs_material_refresh = false;
        {
            let Some(body) = self.bodies.get_mut(&id) else {
                return;
            };
            let Some(rb) = self.body_set.get_mut(body.handle) else {
                return;
            };

            if body.body_kind != body.sync.body_kind {
                rb.set_body_type(body_type(body.body_kind), true);
                if let Some(collider) = self.collider_set.get_mut(body.collider) {
                    collider.set_mass(if body.body_kind == BodyKind::Dynamic {
                        body.mass.max(MIN_DYNAMIC_MASS)
                    } else {
                        0.0
                    });
                }
                body.sync.body_kind = body.body_kind;
                body.sync.mass = body.mass;
            }

            if body.mass != body.sync.mass {
                if let Some(collider) = self.collider_set.get_mut(body.collider) {
                    collider.set_mass(if body.body_kind == BodyKind::Dynamic {
                        body.mass.max(MIN_DYNAMIC_MASS)
                    } else {
                        0.0
                    });
                }
                body.sync.mass = body.mass;
            }

            if body.angular_damping != body.sync.angular_damping {
                rb.set_angular_damping(body.angular_damping);
                body.sync.angular_damping = body.angular_damping;
            }

            if body.friction != body.sync.friction || body.restitution != body.sync.restitution {
                if let Some(collider) = self.collider_set.get_mut(body.collider) {
                    collider.set_friction(body.friction);
                    collider.set_restitution(body.restitution);
                }
                needs_material_refresh = true;
                body.sync.friction = body.friction;
                body.sync.restitution = body.restitution;
            }

            let wake = !body.sleeping;
            if vector_changed(&body.position, &body.sync.position) {
                rb.set_translation(body.position, wake);
                body.sync.position = body.position;
            }

            if vector_changed(&body.rotation, &body.sync.rotation) {
                let rotation = UnitQuaternion::from_euler_angles(
                    body.rotation.x,
                    body.rotation.y,
                    body.rotation.z,
                );
                rb.set_rotation(rotation, wake);
                body.sync.rotation = body.rotation;
            }

            if vector_changed(&body.velocity, &body.sync.velocity) {
                rb.set_linvel(body.velocity, wake);
                body.sync.velocity = body.velocity;
            }

            if vector_changed(&body.angular_velocity, &body.sync.angular_velocity) {
                rb.set_angvel(body.angular_velocity, wake);
                body.sync.angular_velocity = body.angular_velocity;
            }

            if body.sleeping != body.sync.sleeping {
                if body.sleeping {
                    rb.sleep();
                } else {
                    rb.wake_up(true);
                }
                body.sync.sleeping = body.sleeping;
            }
        }

        if needs_material_refresh {
            self.refresh_contact_materials(id);
        }
    }

    fn pull_body_state(&mut self, id: BodyId) {
        let Some(body) = self.bodies.get_mut(&id) else {
            return;
        };
        let Some(rb) = self.body_set.get(body.handle) else {
            return;
        };

        body.position = *rb.translation();
        body.velocity = *rb.linvel();
        body.angular_velocity = *rb.angvel();
        let (roll, pitch, yaw) = rb.rotation().euler_angles();
        body.rotation = Vector3::new(roll, pitch, yaw);
        body.sleeping = rb.is_sleeping();

        // Close the dirty-detection loop.
        body.sync = body.snapshot();
    }

    fn update_grounded_states(&mut self) {
        for body in self.bodies.values_mut() {
            body.grounded = false;
        }
        let Some(terrain) = &self.terrain else {
            return;
        };
        let terrain_collider = terrain.collider;

        let mut grounded: Vec<BodyId> = Vec::new();
        for pair in self.narrow_phase.contact_pairs_with(terrain_collider) {
            let (other, terrain_is_first) = if pair.collider1 == terrain_collider {
                (pair.collider2, true)
            } else {
                (pair.collider1, false)
            };
            let Some(&id) = self.body_by_collider.get(&other) else {
                continue;
            };
            for manifold in &pair.manifolds {
                if !manifold.points.iter().any(|point| point.dist <= 0.0) {
                    continue;
                }
                // The manifold normal points from the first collider toward
                // the second; a sufficiently vertical normal means the body
                // is standing on the terrain.
                let vertical = if terrain_is_first {
                    manifold.data.normal.y
                } else {
                    -manifold.data.normal.y
                };
                if vertical > 0.5 {
                    grounded.push(id);
                    break;
                }
            }
        }
        for id in grounded {
            if let Some(body) = self.bodies.get_mut(&id) {
                body.grounded = true;
            }
        }
    }

    #[cfg(test)]
    fn contact_material(&self, a: BodyId, b: BodyId) -> Option<ContactMaterial> {
        let a = self.bodies.get(&a)?.material;
        let b = self.bodies.get(&b)?.material;
        self.materials.get(PairKey::new(a, b)).copied()
    }

    #[cfg(test)]
    fn terrain_material(&self, id: BodyId) -> Option<ContactMaterial> {
        let material = self.bodies.get(&id)?.material;
        self.materials
            .get(PairKey::new(material, TERRAIN_MATERIAL))
            .copied()
    }
}

fn body_type(kind: BodyKind) -> RigidBodyType {
    match kind {
        BodyKind::Static => RigidBodyType::Fixed,
        BodyKind::Dynamic => RigidBodyType::Dynamic,
        BodyKind::Kinematic => RigidBodyType::KinematicVelocityBased,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::ColliderKind;
    use crate::collider::cube_geometry;
    use rapier3d::prelude::ShapeType;

    fn box_spec(position: Vector3<f32>) -> BodySpec {
        BodySpec {
            position,
            ..BodySpec::default()
        }
    }

    fn step_seconds(world: &mut PhysicsWorld, seconds: f32) {
        let steps = (seconds * 60.0).round() as usize;
        for _ in 0..steps {
            world.step(1.0 / 60.0);
        }
    }

    #[test]
    fn dynamic_body_falls() {
        let mut world = PhysicsWorld::new();
        let id = world.create_body(box_spec(Vector3::new(0.0, 5.0, 0.0)));
        step_seconds(&mut world, 0.5);
        let body = world.body(id).unwrap();
        assert!(body.position.y < 5.0);
        assert!(body.velocity.y < 0.0);
    }

    #[test]
    fn static_body_never_moves() {
        let mut world = PhysicsWorld::new();
        let id = world.create_body(BodySpec {
            position: Vector3::new(0.0, 5.0, 0.0),
            body_kind: BodyKind::Static,
            ..BodySpec::default()
        });
        step_seconds(&mut world, 1.0);
        let body = world.body(id).unwrap();
        assert_eq!(body.position, Vector3::new(0.0, 5.0, 0.0));
    }

    #[test]
    fn stall_is_capped_at_six_substeps() {
        let mut world = PhysicsWorld::new();
        let id = world.create_body(box_spec(Vector3::new(0.0, 50.0, 0.0)));
        // A ten second stall must advance at most 6 * 1/60 s.
        world.step(10.0);
        let body = world.body(id).unwrap();
        let expected = -9.8 * 6.0 / 60.0;
        assert!(
            (body.velocity.y - expected).abs() < 0.05,
            "velocity {} should be near {}",
            body.velocity.y,
            expected
        );
    }

    #[test]
    fn teleport_pushes_through_to_simulation() {
        let mut world = PhysicsWorld::new();
        let id = world.create_body(box_spec(Vector3::new(0.0, 2.0, 0.0)));
        world.step(1.0 / 60.0);
        let body = world.body_mut(id).unwrap();
        body.position = Vector3::new(8.0, 3.0, -2.0);
        body.velocity = Vector3::zeros();
        world.step(1.0 / 60.0);
        let body = world.body(id).unwrap();
        assert!((body.position - Vector3::new(8.0, 3.0, -2.0)).norm() < 0.1);
    }

    #[test]
    fn friction_change_rebuilds_only_touching_materials() {
        let mut world = PhysicsWorld::with_terrain(&Terrain::new(40.0, 40.0, 10, 10));
        let a = world.create_body(box_spec(Vector3::new(-10.0, 3.0, 0.0)));
        let b = world.create_body(box_spec(Vector3::new(0.0, 3.0, 0.0)));
        let c = world.create_body(box_spec(Vector3::new(10.0, 3.0, 0.0)));
        world.step(1.0 / 60.0);

        let bc_before = world.contact_material(b, c).unwrap();
        let default_friction = world.body(b).unwrap().friction;

        world.body_mut(a).unwrap().friction = 0.9;
        world.step(1.0 / 60.0);

        let ab = world.contact_material(a, b).unwrap();
        assert!((ab.friction - combine_friction(0.9, default_friction)).abs() < 1e-6);
        let a_terrain = world.terrain_material(a).unwrap();
        assert!((a_terrain.friction - 0.9).abs() < 1e-6);

        // Untouched pair stays bit-identical.
        let bc_after = world.contact_material(b, c).unwrap();
        assert_eq!(bc_before.friction.to_bits(), bc_after.friction.to_bits());
        assert_eq!(
            bc_before.restitution.to_bits(),
            bc_after.restitution.to_bits()
        );
    }

    #[test]
    fn grounded_tracks_terrain_contact() {
        let mut world = PhysicsWorld::with_terrain(&Terrain::new(20.0, 20.0, 10, 10));
        let id = world.create_body(box_spec(Vector3::new(0.0, 0.6, 0.0)));

        step_seconds(&mut world, 2.0);
        assert!(world.body(id).unwrap().grounded, "resting box is grounded");

        // Lift the body clear of the terrain; the flag must not persist.
        let body = world.body_mut(id).unwrap();
        body.position = Vector3::new(0.0, 5.0, 0.0);
        body.velocity = Vector3::zeros();
        body.sleeping = false;
        world.step(1.0 / 60.0);
        assert!(!world.body(id).unwrap().grounded);
    }

    #[test]
    fn remove_body_evicts_its_materials() {
        let mut world = PhysicsWorld::with_terrain(&Terrain::new(20.0, 20.0, 10, 10));
        let a = world.create_body(box_spec(Vector3::new(0.0, 2.0, 0.0)));
        let b = world.create_body(box_spec(Vector3::new(3.0, 2.0, 0.0)));
        assert!(world.contact_material(a, b).is_some());
        assert!(world.terrain_material(a).is_some());

        world.remove_body(a);
        assert!(!world.contains(a));
        assert!(world.terrain_material(b).is_some());
        assert_eq!(world.materials.len(), 1);

        // Removal is idempotent.
        world.remove_body(a);
        assert_eq!(world.len(), 1);
    }

    #[test]
    fn uniform_terrain_uses_heightfield() {
        let mut world = PhysicsWorld::new();
        world.set_terrain(&Terrain::new(20.0, 20.0, 10, 10));
        let terrain = world.terrain.as_ref().unwrap();
        let shape = world.collider_set[terrain.collider].shape();
        assert_eq!(shape.shape_type(), ShapeType::HeightField);
    }

    #[test]
    fn non_uniform_terrain_uses_trimesh() {
        let mut world = PhysicsWorld::new();
        world.set_terrain(&Terrain::new(20.0, 20.0, 10, 20));
        let terrain = world.terrain.as_ref().unwrap();
        let shape = world.collider_set[terrain.collider].shape();
        assert_eq!(shape.shape_type(), ShapeType::TriMesh);
    }

    #[test]
    fn terrain_rebuild_refreshes_terrain_materials() {
        let mut world = PhysicsWorld::new();
        let id = world.create_body(box_spec(Vector3::new(0.0, 2.0, 0.0)));
        assert!(world.terrain_material(id).is_none());

        world.set_terrain(&Terrain::new(20.0, 20.0, 10, 10));
        let material = world.terrain_material(id).unwrap();
        let body = world.body(id).unwrap();
        assert!((material.friction - body.friction).abs() < 1e-6);
    }

    #[test]
    fn mesh_request_on_dynamic_body_downgrades() {
        let mut world = PhysicsWorld::new();
        let id = world.create_body(BodySpec {
            collider: ColliderKind::Mesh,
            geometry: Some(cube_geometry(0.5)),
            ..BodySpec::default()
        });
        assert_eq!(world.body(id).unwrap().collider_kind, ColliderKind::ConvexHull);
    }

    #[test]
    fn collider_hot_swap_after_asset_arrives() {
        let mut world = PhysicsWorld::new();
        // Placeholder body spawned before its generated mesh exists: the
        // hull request is remembered while a box stands in.
        let id = world.create_body(BodySpec {
            collider: ColliderKind::ConvexHull,
            geometry: None,
            ..BodySpec::default()
        });
        {
            let body = world.body(id).unwrap();
            assert_eq!(body.collider_kind, ColliderKind::ConvexHull);
            assert_eq!(
                world.collider_set[body.collider].shape().shape_type(),
                ShapeType::Cuboid
            );
        }

        let geometry = cube_geometry(0.5);
        world.update_body_collider(id, Some(&geometry));
        let body = world.body(id).unwrap();
        assert_eq!(body.collider_kind, ColliderKind::ConvexHull);
        assert_eq!(
            world.collider_set[body.collider].shape().shape_type(),
            ShapeType::ConvexPolyhedron
        );
    }

    #[test]
    fn sleeping_flag_round_trips() {
        let mut world = PhysicsWorld::new();
        let id = world.create_body(box_spec(Vector3::new(0.0, 5.0, 0.0)));
        world.step(1.0 / 60.0);
        world.body_mut(id).unwrap().sleeping = true;
        world.step(1.0 / 60.0);
        assert!(world.body(id).unwrap().sleeping);
    }
}
