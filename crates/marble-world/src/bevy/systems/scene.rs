//! Mirrors the retained scene into entities.

use bevy::prelude::*;

use crate::bevy::components::{NodeAppearance, SceneNodeLink};
use crate::bevy::resources::{MarbleWorldRes, NodeEntityMap};

/// Spawns, updates and despawns [`SceneNodeLink`] entities so they match the
/// scene store.
pub fn mirror_scene(
    mut commands: Commands,
    world: Option<Res<MarbleWorldRes>>,
    mut entities: ResMut<NodeEntityMap>,
    mut nodes: Query<(&mut Transform, &mut NodeAppearance), With<SceneNodeLink>>,
) {
    let Some(world) = world else {
        return;
    };
    let scene = world.scene();

    entities.0.retain(|id, entity| {
        if scene.contains(*id) {
            return true;
        }
        commands.entity(*entity).despawn();
        false
    });

    for (id, node) in scene.iter() {
        let appearance = NodeAppearance::from(node);
        match entities.0.get(&id) {
            Some(entity) => {
                if let Ok((mut transform, mut current)) = nodes.get_mut(*entity) {
                    if *transform != node.transform {
                        *transform = node.transform;
                    }
                    if *current != appearance {
                        *current = appearance;
                    }
                }
            }
            None => {
                let entity = commands
                    .spawn((SceneNodeLink(id), node.transform, appearance))
                    .id();
                entities.0.insert(id, entity);
            }
        }
    }
}
