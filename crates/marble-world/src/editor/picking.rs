//! Pointer ray intersection against visual nodes.

use bevy::math::Ray3d;
use bevy::prelude::Vec3;

use crate::scene::{VisualNode, VisualShape};

/// Distance along `ray` to the first intersection with `node`, if any.
/// Hidden nodes are never hit.
pub fn ray_hit(ray: &Ray3d, node: &VisualNode) -> Option<f32> {
    if !node.visible {
        return None;
    }
    let transform = &node.transform;
    match node.shape {
        VisualShape::Box => {
            let inverse = transform.rotation.inverse();
            let origin = inverse * (ray.origin - transform.translation);
            let direction = inverse * *ray.direction;
            ray_box(origin, direction, transform.scale.abs() * 0.5)
        }
        VisualShape::Sphere => ray_sphere(
            ray.origin - transform.translation,
            *ray.direction,
            node.bounding_radius(),
        ),
    }
}

/// Slab test against an axis-aligned box centered at the origin.
fn ray_box(origin: Vec3, direction: Vec3, half: Vec3) -> Option<f32> {
    let mut t_min = f32::NEG_INFINITY;
    let mut t_max = f32::INFINITY;

    for axis in 0..3 {
        let (o, d, h) = (origin[axis], direction[axis], half[axis]);
        if d.abs() < f32::EPSILON {
            if o.abs() > h {
                return None;
            }
            continue;
        }
        let t1 = (-h - o) / d;
        let t2 = (h - o) / d;
        t_min = t_min.max(t1.min(t2));
        t_max = t_max.min(t1.max(t2));
        if t_min > t_max {
            return None;
        }
    }

    if t_max < 0.0 {
        return None;
    }
    Some(t_min.max(0.0))
}

fn ray_sphere(origin: Vec3, direction: Vec3, radius: f32) -> Option<f32> {
    let b = origin.dot(direction);
    let c = origin.length_squared() - radius * radius;
    let discriminant = b * b - c;
    if discriminant < 0.0 {
        return None;
    }
    let root = discriminant.sqrt();
    let near = -b - root;
    let far = -b + root;
    if far < 0.0 {
        return None;
    }
    Some(near.max(0.0))
}

/// Picks the nearest hit among `candidates`.
pub fn nearest_hit<'a, K: Copy>(
    ray: &Ray3d,
    candidates: impl IntoIterator<Item = (K, &'a VisualNode)>,
) -> Option<K> {
    candidates
        .into_iter()
        .filter_map(|(key, node)| ray_hit(ray, node).map(|t| (key, t)))
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(key, _)| key)
}
