//! Rigid body / visual node pairing.
//!
//! A binding owns one body (with a single collider) and one visual node. The
//! body is authoritative: [`ObjectBinding::update`] copies its pose onto the
//! visual every frame, never the other way round.

use bevy::prelude::{Transform, Vec3};
use rapier3d::prelude::*;

use crate::material::{ContactParams, PhysicsMaterial, SurfaceMaterial};
use crate::physics::{ColliderRole, ColliderTag, PhysicsWorld, from_vector, to_rotation, to_vector};
use crate::scene::{NodeId, Scene, VisualNode, VisualShape};

/// Description of a binding before it is inserted anywhere.
#[derive(Debug, Clone)]
pub struct BindingDesc {
    shape: VisualShape,
    transform: Transform,
    color: u32,
    /// `None` builds a fixed body.
    mass: Option<f32>,
    material: PhysicsMaterial,
    role: ColliderRole,
    index: u32,
    sensor: bool,
    linear_damping: f32,
    angular_damping: f32,
}

impl BindingDesc {
    /// A fixed, solid, normal-material body shaped and placed by `transform`.
    pub fn new(shape: VisualShape, transform: Transform) -> Self {
        Self {
            shape,
            transform,
            color: SurfaceMaterial::Normal.default_color(),
            mass: None,
            material: PhysicsMaterial::Surface(SurfaceMaterial::Normal),
            role: ColliderRole::Obstacle,
            index: 0,
            sensor: false,
            linear_damping: 0.0,
            angular_damping: 0.0,
        }
    }

    /// Makes the body dynamic with the given mass.
    pub fn mass(mut self, mass: f32) -> Self {
        self.mass = Some(mass);
        self
    }

    pub fn material(mut self, material: PhysicsMaterial) -> Self {
        self.material = material;
        self
    }

    pub fn role(mut self, role: ColliderRole, index: u32) -> Self {
        self.role = role;
        self.index = index;
        self
    }

    pub fn color(mut self, color: u32) -> Self {
        self.color = color;
        self
    }

    pub fn sensor(mut self) -> Self {
        self.sensor = true;
        self
    }

    pub fn damping(mut self, linear: f32, angular: f32) -> Self {
        self.linear_damping = linear;
        self.angular_damping = angular;
        self
    }

    fn build_collider(&self) -> Collider {
        let scale = self.transform.scale;
        let builder = match self.shape {
            VisualShape::Box => ColliderBuilder::cuboid(scale.x * 0.5, scale.y * 0.5, scale.z * 0.5),
            VisualShape::Sphere => ColliderBuilder::ball(scale.max_element() * 0.5),
        };

        let tag = ColliderTag {
            role: self.role,
            material: self.material,
            index: self.index,
        };
        let mut builder = builder
            .friction(ContactParams::NORMAL.friction)
            .restitution(ContactParams::NORMAL.restitution)
            .user_data(tag.encode());

        if self.sensor {
            builder = builder.sensor(true);
        } else {
            builder = builder.active_hooks(ActiveHooks::MODIFY_SOLVER_CONTACTS);
        }
        if let Some(mass) = self.mass {
            builder = builder.mass(mass);
        }
        builder.build()
    }

    fn build_body(&self) -> RigidBody {
        let builder = match self.mass {
            Some(_) => RigidBodyBuilder::dynamic()
                .linear_damping(self.linear_damping)
                .angular_damping(self.angular_damping)
                .ccd_enabled(true),
            None => RigidBodyBuilder::fixed(),
        };
        let mut body = builder
            .translation(to_vector(self.transform.translation))
            .build();
        body.set_rotation(to_rotation(self.transform.rotation), false);
        body
    }

    /// Inserts both halves into their containers.
    pub fn add(self, scene: &mut Scene, world: &mut PhysicsWorld) -> ObjectBinding {
        let body = world.add_rigid_body(self.build_body());
        let collider = world.add_collider(self.build_collider(), body);
        let visual = scene.insert(VisualNode::new(self.shape, self.transform, self.color));

        ObjectBinding {
            visual,
            body,
            collider,
        }
    }
}

/// A live body/visual pair. Must be released with [`ObjectBinding::remove`].
#[must_use = "bindings must be removed from the scene and world explicitly"]
#[derive(Debug, PartialEq, Eq)]
pub struct ObjectBinding {
    visual: NodeId,
    body: RigidBodyHandle,
    collider: ColliderHandle,
}

impl ObjectBinding {
    pub fn visual(&self) -> NodeId {
        self.visual
    }

    pub fn body(&self) -> RigidBodyHandle {
        self.body
    }

    pub fn collider(&self) -> ColliderHandle {
        self.collider
    }

    /// Copies the body pose onto the visual node.
    pub fn update(&self, scene: &mut Scene, world: &PhysicsWorld) {
        if let Some((translation, rotation)) = world.body_pose(self.body) {
            scene.set_pose(self.visual, translation, rotation);
        }
    }

    /// Current body position.
    pub fn position(&self, world: &PhysicsWorld) -> Option<Vec3> {
        world
            .get_rigid_body(self.body)
            .map(|body| from_vector(&body.translation()))
    }

    /// Removes both halves.
    pub fn remove(self, scene: &mut Scene, world: &mut PhysicsWorld) {
        world.remove_rigid_body(self.body);
        scene.remove(self.visual);
    }
}
