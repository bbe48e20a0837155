//! ECS components mirroring the retained scene.

use bevy::prelude::*;

use crate::scene::{NodeId, VisualNode, VisualShape};

/// Links an entity to the scene node it mirrors.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SceneNodeLink(pub NodeId);

/// Everything a renderer needs besides the transform.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct NodeAppearance {
    pub shape: VisualShape,
    /// Packed `0xRRGGBB`.
    pub color: u32,
    /// Packed `0xRRGGBB`, 0 for none.
    pub emissive: u32,
    pub visible: bool,
}

impl From<&VisualNode> for NodeAppearance {
    fn from(node: &VisualNode) -> Self {
        Self {
            shape: node.shape,
            color: node.color,
            emissive: node.emissive,
            visible: node.visible,
        }
    }
}
