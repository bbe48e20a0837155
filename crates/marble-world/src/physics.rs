//! Physics simulation using `Rapier3D`.

use std::fmt;

use bevy::prelude::{Quat, Vec3};
use rapier3d::prelude::*;

use crate::material::{ContactMaterialTable, PhysicsMaterial};

/// Default gravity vector (downward, in m/s²).
pub fn default_gravity() -> Vec3 {
    Vec3::new(0.0, -9.81, 0.0)
}

/// World-down unit vector.
pub const DOWN: Vec3 = Vec3::NEG_Y;

pub(crate) fn to_vector(v: Vec3) -> Vector {
    Vector::new(v.x, v.y, v.z)
}

pub(crate) fn from_vector(v: &Vector) -> Vec3 {
    Vec3::new(v.x, v.y, v.z)
}

pub(crate) fn to_rotation(q: Quat) -> Rotation {
    Rotation::from_xyzw(q.x, q.y, q.z, q.w)
}

pub(crate) fn from_rotation(r: &Rotation) -> Quat {
    Quat::from_xyzw(r.x, r.y, r.z, r.w)
}

/// What a collider stands for in the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColliderRole {
    Player,
    Obstacle,
    Collectible,
    StartPad,
    Finish,
}

impl ColliderRole {
    fn code(self) -> u32 {
        match self {
            Self::Player => 1,
            Self::Obstacle => 2,
            Self::Collectible => 3,
            Self::StartPad => 4,
            Self::Finish => 5,
        }
    }

    fn from_code(code: u32) -> Option<Self> {
        Some(match code {
            1 => Self::Player,
            2 => Self::Obstacle,
            3 => Self::Collectible,
            4 => Self::StartPad,
            5 => Self::Finish,
            _ => return None,
        })
    }
}

/// Role, material and index of a collider, packed into its `user_data`.
///
/// Layout: `role << 64 | material << 32 | index`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColliderTag {
    pub role: ColliderRole,
    pub material: PhysicsMaterial,
    pub index: u32,
}

impl ColliderTag {
    pub fn encode(self) -> u128 {
        (u128::from(self.role.code()) << 64)
            | (u128::from(self.material.code()) << 32)
            | u128::from(self.index)
    }

    /// Returns `None` for untagged (`user_data == 0`) or unknown colliders.
    #[allow(clippy::cast_possible_truncation)]
    pub fn decode(user_data: u128) -> Option<Self> {
        let role = ColliderRole::from_code((user_data >> 64) as u32)?;
        let material = PhysicsMaterial::from_code((user_data >> 32) as u32)?;
        Some(Self {
            role,
            material,
            index: user_data as u32,
        })
    }
}

/// Physics world containing all `Rapier3D` components.
pub struct PhysicsWorld {
    pub rigid_body_set: RigidBodySet,
    pub collider_set: ColliderSet,
    pub integration_parameters: IntegrationParameters,
    pub physics_pipeline: PhysicsPipeline,
    pub island_manager: IslandManager,
    pub broad_phase: DefaultBroadPhase,
    pub narrow_phase: NarrowPhase,
    pub impulse_joint_set: ImpulseJointSet,
    pub multibody_joint_set: MultibodyJointSet,
    pub ccd_solver: CCDSolver,
    pub gravity: Vec3,
    /// Contact-material pairs, passed to the pipeline as physics hooks.
    pub contact_materials: ContactMaterialTable,
    pub frame: u64,
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for PhysicsWorld {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PhysicsWorld")
            .field("frame", &self.frame)
            .field("rigid_body_count", &self.rigid_body_set.len())
            .field("collider_count", &self.collider_set.len())
            .field("contact_materials", &self.contact_materials.len())
            .field("gravity", &self.gravity)
            .finish_non_exhaustive()
    }
}

impl PhysicsWorld {
    /// Creates a new physics world with default settings.
    pub fn new() -> Self {
        Self::with_gravity(default_gravity())
    }

    /// Creates a new physics world with custom gravity.
    pub fn with_gravity(gravity: Vec3) -> Self {
        Self {
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            integration_parameters: IntegrationParameters::default(),
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            gravity,
            contact_materials: ContactMaterialTable::new(),
            frame: 0,
        }
    }

    /// Advances the simulation by `dt` seconds. Non-positive steps are skipped.
    pub fn step(&mut self, dt: f32) {
        if dt <= 0.0 {
            return;
        }
        self.integration_parameters.dt = dt;
        self.physics_pipeline.step(
            to_vector(self.gravity),
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            &self.contact_materials,
            &(),
        );
        self.frame += 1;
    }

    /// Adds a rigid body to the world and returns its handle.
    pub fn add_rigid_body(&mut self, rigid_body: RigidBody) -> RigidBodyHandle {
        self.rigid_body_set.insert(rigid_body)
    }

    /// Adds a collider attached to a rigid body.
    pub fn add_collider(&mut self, collider: Collider, parent: RigidBodyHandle) -> ColliderHandle {
        self.collider_set
            .insert_with_parent(collider, parent, &mut self.rigid_body_set)
    }

    /// Removes a rigid body and its attached colliders.
    pub fn remove_rigid_body(&mut self, handle: RigidBodyHandle) {
        self.rigid_body_set.remove(
            handle,
            &mut self.island_manager,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            true,
        );
    }

    /// Gets an immutable reference to a rigid body.
    pub fn get_rigid_body(&self, handle: RigidBodyHandle) -> Option<&RigidBody> {
        self.rigid_body_set.get(handle)
    }

    /// Gets a mutable reference to a rigid body.
    pub fn get_rigid_body_mut(&mut self, handle: RigidBodyHandle) -> Option<&mut RigidBody> {
        self.rigid_body_set.get_mut(handle)
    }

    /// World translation and rotation of a body.
    pub fn body_pose(&self, handle: RigidBodyHandle) -> Option<(Vec3, Quat)> {
        let body = self.rigid_body_set.get(handle)?;
        Some((
            from_vector(&body.translation()),
            from_rotation(&body.rotation()),
        ))
    }

    /// Contact normals of every touching manifold involving `collider`,
    /// oriented to point from `collider` towards the other shape.
    pub fn contact_normals(&self, collider: ColliderHandle) -> Vec<Vec3> {
        let mut normals = Vec::new();
        for pair in self.narrow_phase.contact_pairs_with(collider) {
            let flip = pair.collider2 == collider;
            for manifold in &pair.manifolds {
                if manifold.points.is_empty() {
                    continue;
                }
                let normal = from_vector(&manifold.data.normal);
                normals.push(if flip { -normal } else { normal });
            }
        }
        normals
    }

    /// Decoded tag of a collider, `None` if it is gone or untagged.
    pub fn collider_tag(&self, handle: ColliderHandle) -> Option<ColliderTag> {
        self.collider_set
            .get(handle)
            .and_then(|collider| ColliderTag::decode(collider.user_data))
    }

    /// Tags of every sensor collider currently overlapping `collider`.
    pub fn overlapping_tags(&self, collider: ColliderHandle) -> Vec<ColliderTag> {
        self.narrow_phase
            .intersection_pairs_with(collider)
            .filter(|(_, _, intersecting)| *intersecting)
            .filter_map(|(a, b, _)| self.collider_tag(if a == collider { b } else { a }))
            .collect()
    }

    /// Returns the current simulation frame number.
    pub fn current_frame(&self) -> u64 {
        self.frame
    }
}
