//! Player ball controller.
//!
//! The ball rolls: steering becomes a torque impulse around the horizontal
//! axis perpendicular to the input direction. Jumping and air control depend
//! on whether any current contact counts as ground.

use bevy::prelude::{Transform, Vec3};

use crate::binding::{BindingDesc, ObjectBinding};
use crate::camera::OrbitCamera;
use crate::config::PlayerConfig;
use crate::material::PhysicsMaterial;
use crate::physics::{ColliderRole, DOWN, PhysicsWorld, from_vector, to_vector};
use crate::scene::{Scene, VisualShape};

/// Returns the jump direction of the first contact that counts as ground.
///
/// `normals` point from the player towards the touching shape. A contact is
/// ground when `normal · DOWN > steepness`.
pub fn find_ground_contact(normals: &[Vec3], steepness: f32) -> Option<Vec3> {
    normals
        .iter()
        .find(|normal| normal.dot(DOWN) > steepness)
        .map(|normal| -*normal)
}

/// Whether enough time has passed since the last jump for contacts to count.
pub fn cooldown_elapsed(now: f32, last_jump_at: Option<f32>, cooldown: f32) -> bool {
    last_jump_at.is_none_or(|at| now - at >= cooldown)
}

/// Per-frame player intent.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlayerIntent {
    /// Horizontal world-space direction, already camera-relative.
    pub direction: Vec3,
    pub jump: bool,
}

#[derive(Debug)]
pub struct PlayerController {
    binding: ObjectBinding,
    config: PlayerConfig,
    can_jump: bool,
    jump_direction: Vec3,
    last_jump_at: Option<f32>,
    /// Seconds of simulated time seen by this controller.
    clock: f32,
}

impl PlayerController {
    /// Spawns the player ball at `position`.
    pub fn new(scene: &mut Scene, world: &mut PhysicsWorld, config: PlayerConfig, position: Vec3) -> Self {
        let binding = BindingDesc::new(
            VisualShape::Sphere,
            Transform::from_translation(position).with_scale(Vec3::splat(config.radius * 2.0)),
        )
        .mass(config.mass)
        .material(PhysicsMaterial::Player)
        .role(ColliderRole::Player, 0)
        .color(config.color)
        .damping(config.linear_damping, config.angular_damping)
        .add(scene, world);

        Self {
            binding,
            config,
            can_jump: false,
            jump_direction: -DOWN,
            last_jump_at: None,
            clock: 0.0,
        }
    }

    pub fn binding(&self) -> &ObjectBinding {
        &self.binding
    }

    pub fn can_jump(&self) -> bool {
        self.can_jump
    }

    pub fn jump_direction(&self) -> Vec3 {
        self.jump_direction
    }

    pub fn position(&self, world: &PhysicsWorld) -> Option<Vec3> {
        self.binding.position(world)
    }

    /// Recomputes `can_jump` from the current contacts.
    fn detect_ground(&mut self, world: &PhysicsWorld) {
        self.can_jump = false;
        if !cooldown_elapsed(self.clock, self.last_jump_at, self.config.jump_cooldown) {
            return;
        }
        let normals = world.contact_normals(self.binding.collider());
        if let Some(direction) = find_ground_contact(&normals, self.config.steepness) {
            self.can_jump = true;
            self.jump_direction = direction;
        }
    }

    /// Advances the controller by one frame. Must run after the physics step.
    pub fn update(&mut self, world: &mut PhysicsWorld, dt: f32, intent: PlayerIntent, jump_height: f32) {
        self.clock += dt;
        self.detect_ground(world);

        let Some(body) = world.get_rigid_body_mut(self.binding.body()) else {
            return;
        };

        let torque = intent.direction.cross(DOWN) * self.config.roll_speed * dt;
        body.apply_torque_impulse(to_vector(torque), true);

        if intent.jump && self.can_jump {
            let velocity = from_vector(&body.linvel()) + self.jump_direction * jump_height;
            body.set_linvel(to_vector(velocity), true);
            self.can_jump = false;
            self.last_jump_at = Some(self.clock);
            tracing::debug!("[player] Jump along {:?}", self.jump_direction);
        } else if !self.can_jump {
            let velocity = from_vector(&body.linvel()) + intent.direction * self.config.air_control * dt;
            body.set_linvel(to_vector(velocity), true);
        }
    }

    /// Teleports the ball to `position` at rest and centers the camera on it.
    pub fn reset(&mut self, position: Vec3, world: &mut PhysicsWorld, camera: &mut OrbitCamera) {
        if let Some(body) = world.get_rigid_body_mut(self.binding.body()) {
            body.set_translation(to_vector(position), true);
            body.set_linvel(to_vector(Vec3::ZERO), true);
            body.set_angvel(to_vector(Vec3::ZERO), true);
        }
        self.can_jump = false;
        camera.set_target(position);
    }

    /// Freezes or releases the ball. A disabled body takes no part in the simulation.
    pub fn set_active(&self, world: &mut PhysicsWorld, active: bool) {
        if let Some(body) = world.get_rigid_body_mut(self.binding.body()) {
            body.set_enabled(active);
        }
    }

    /// Copies the body pose onto the ball visual.
    pub fn sync_visual(&self, scene: &mut Scene, world: &PhysicsWorld) {
        self.binding.update(scene, world);
    }

    /// Whether the ball has dropped below `height`.
    pub fn fell_below(&self, world: &PhysicsWorld, height: f32) -> bool {
        self.position(world).is_some_and(|position| position.y < height)
    }
}
