//! Retained visual scene.
//!
//! The scene is the list of things a renderer should draw. Bindings and the
//! editor insert nodes here; the Bevy bridge mirrors them into entities.

use std::collections::BTreeMap;

use bevy::prelude::{Quat, Transform, Vec3};

/// Identifier of a visual node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u64);

/// Mesh kind of a visual node. Unit-sized; the node transform scales it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisualShape {
    /// Unit cube (edge length 1).
    Box,
    /// Unit-diameter sphere.
    Sphere,
}

/// Emissive tint applied to hovered editor objects.
pub const HOVER_EMISSIVE: u32 = 0x0033_3333;

/// A drawable node.
#[derive(Debug, Clone, PartialEq)]
pub struct VisualNode {
    pub shape: VisualShape,
    pub transform: Transform,
    /// Packed `0xRRGGBB`.
    pub color: u32,
    /// Packed `0xRRGGBB`, 0 for none.
    pub emissive: u32,
    pub visible: bool,
}

impl VisualNode {
    pub fn new(shape: VisualShape, transform: Transform, color: u32) -> Self {
        Self {
            shape,
            transform,
            color,
            emissive: 0,
            visible: true,
        }
    }

    /// Bounding radius of the node in world units.
    pub fn bounding_radius(&self) -> f32 {
        match self.shape {
            VisualShape::Box => (self.transform.scale * 0.5).length(),
            VisualShape::Sphere => self.transform.scale.max_element() * 0.5,
        }
    }
}

/// Store of all visual nodes, ordered by creation.
#[derive(Debug, Default)]
pub struct Scene {
    nodes: BTreeMap<NodeId, VisualNode>,
    next_id: u64,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, node: VisualNode) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(id, node);
        id
    }

    pub fn remove(&mut self, id: NodeId) -> Option<VisualNode> {
        self.nodes.remove(&id)
    }

    pub fn get(&self, id: NodeId) -> Option<&VisualNode> {
        self.nodes.get(&id)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut VisualNode> {
        self.nodes.get_mut(&id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Sets translation and rotation, leaving scale untouched.
    pub fn set_pose(&mut self, id: NodeId, translation: Vec3, rotation: Quat) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.transform.translation = translation;
            node.transform.rotation = rotation;
        }
    }

    pub fn set_visible(&mut self, id: NodeId, visible: bool) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.visible = visible;
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &VisualNode)> {
        self.nodes.iter().map(|(id, node)| (*id, node))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_remove() {
        let mut scene = Scene::new();
        let a = scene.insert(VisualNode::new(VisualShape::Box, Transform::IDENTITY, 0xff0000));
        let b = scene.insert(VisualNode::new(VisualShape::Sphere, Transform::IDENTITY, 0x00ff00));

        assert_ne!(a, b);
        assert_eq!(scene.len(), 2);

        assert!(scene.remove(a).is_some());
        assert!(!scene.contains(a));
        assert!(scene.remove(a).is_none());
        assert_eq!(scene.len(), 1);
    }

    #[test]
    fn test_ids_are_not_reused() {
        let mut scene = Scene::new();
        let a = scene.insert(VisualNode::new(VisualShape::Box, Transform::IDENTITY, 0));
        scene.remove(a);
        let b = scene.insert(VisualNode::new(VisualShape::Box, Transform::IDENTITY, 0));
        assert!(b > a);
    }

    #[test]
    fn test_set_pose_keeps_scale() {
        let mut scene = Scene::new();
        let id = scene.insert(VisualNode::new(
            VisualShape::Box,
            Transform::from_scale(Vec3::new(2.0, 3.0, 4.0)),
            0,
        ));
        scene.set_pose(id, Vec3::new(1.0, 2.0, 3.0), Quat::from_rotation_y(1.0));

        let node = scene.get(id).unwrap();
        assert_eq!(node.transform.translation, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(node.transform.scale, Vec3::new(2.0, 3.0, 4.0));
    }
}
