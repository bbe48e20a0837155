//! Orbit camera.
//!
//! The camera looks at an orbit target from a fixed offset. Play mode keeps
//! the target on the player; Edit mode pans it around the level.

use bevy::math::{Dir3, Ray3d};
use bevy::prelude::{Vec2, Vec3};

/// Perspective camera orbiting a target point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitCamera {
    pub target: Vec3,
    /// Eye position relative to the target.
    pub offset: Vec3,
    /// Vertical field of view in radians.
    pub fov_y: f32,
    /// Viewport width / height.
    pub aspect: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            target: Vec3::ZERO,
            offset: Vec3::new(0.0, 6.0, 10.0),
            fov_y: 60f32.to_radians(),
            aspect: 16.0 / 9.0,
        }
    }
}

impl OrbitCamera {
    pub fn eye(&self) -> Vec3 {
        self.target + self.offset
    }

    pub fn set_target(&mut self, target: Vec3) {
        self.target = target;
    }

    /// Unit view direction.
    pub fn forward(&self) -> Vec3 {
        (-self.offset).normalize_or(Vec3::NEG_Z)
    }

    /// Forward and right, projected onto the ground plane.
    fn ground_axes(&self) -> (Vec3, Vec3) {
        let forward = -Vec3::new(self.offset.x, 0.0, self.offset.z).normalize_or(Vec3::Z);
        let right = forward.cross(Vec3::Y);
        (forward, right)
    }

    /// Converts a 2D input axis (`x` right, `y` forward) into a horizontal
    /// world direction relative to the view. Not normalized.
    pub fn relative_direction(&self, axis: Vec2) -> Vec3 {
        let (forward, right) = self.ground_axes();
        right * axis.x + forward * axis.y
    }

    /// Moves the orbit target by `axis` in view-relative ground coordinates.
    pub fn pan(&mut self, axis: Vec2) {
        self.target += self.relative_direction(axis);
    }

    /// Ray from the eye through a pointer in normalized device coordinates
    /// (`[-1, 1]`, `y` up).
    pub fn ray_from_ndc(&self, ndc: Vec2) -> Option<Ray3d> {
        let forward = self.forward();
        let right = forward.cross(Vec3::Y).normalize_or(Vec3::X);
        let up = right.cross(forward);
        let half_height = (self.fov_y * 0.5).tan();

        let direction = forward + right * (ndc.x * half_height * self.aspect) + up * (ndc.y * half_height);
        let direction = Dir3::new(direction).ok()?;
        Some(Ray3d {
            origin: self.eye(),
            direction,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_ray_hits_target() {
        let camera = OrbitCamera {
            target: Vec3::new(3.0, 0.0, -2.0),
            ..OrbitCamera::default()
        };
        let ray = camera.ray_from_ndc(Vec2::ZERO).unwrap();

        let distance = camera.offset.length();
        let point = ray.origin + *ray.direction * distance;
        assert!((point - camera.target).length() < 1e-4);
    }

    #[test]
    fn test_pointer_right_bends_ray_right() {
        let camera = OrbitCamera::default();
        let center = camera.ray_from_ndc(Vec2::ZERO).unwrap();
        let right = camera.ray_from_ndc(Vec2::new(0.5, 0.0)).unwrap();
        assert!(right.direction.x > center.direction.x);
    }

    #[test]
    fn test_relative_direction_follows_view() {
        // Default camera looks towards -Z
        let camera = OrbitCamera::default();
        let forward = camera.relative_direction(Vec2::Y);
        assert!((forward - Vec3::NEG_Z).length() < 1e-5);
        let right = camera.relative_direction(Vec2::X);
        assert!((right - Vec3::X).length() < 1e-5);
    }

    #[test]
    fn test_pan_moves_target_only() {
        let mut camera = OrbitCamera::default();
        let offset = camera.offset;
        camera.pan(Vec2::new(2.0, 0.0));
        assert!((camera.target - Vec3::new(2.0, 0.0, 0.0)).length() < 1e-5);
        assert_eq!(camera.offset, offset);
    }
}
