//! Bevy plugin for the marble world.
//!
//! `MarbleWorldPlugin` is logic only and runs under `MinimalPlugins`; a
//! renderer reads the mirrored `SceneNodeLink` entities.

use std::path::PathBuf;
use std::sync::Arc;

use bevy::prelude::*;

use crate::bevy::resources::{ButtonQueue, FrameInput, HudStore, MarbleWorldRes, NodeEntityMap};
use crate::bevy::systems;
use crate::config::WorldConfig;
use crate::level::{BuiltInLevel, Level};
use crate::store::{FileStore, KeyValueStore, MemoryStore};
use crate::world::WorldController;

/// System sets of the world frame, run in this order in `Update`.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum WorldSet {
    Input,
    Simulate,
    Mirror,
}

pub struct MarbleWorldPlugin {
    pub config: WorldConfig,
    /// Level played on startup.
    pub level: Level,
    /// Directory for save slots. `None` keeps saves in memory.
    pub store_dir: Option<PathBuf>,
    /// Shared handle for an external button source.
    pub button_queue: Option<ButtonQueue>,
}

impl Default for MarbleWorldPlugin {
    fn default() -> Self {
        Self {
            config: WorldConfig::default(),
            level: BuiltInLevel::Default.load(),
            store_dir: None,
            button_queue: None,
        }
    }
}

impl Plugin for MarbleWorldPlugin {
    fn build(&self, app: &mut App) {
        let hud = HudStore::default();
        let store: Box<dyn KeyValueStore + Send + Sync> = match &self.store_dir {
            Some(dir) => Box::new(FileStore::new(dir)),
            None => Box::new(MemoryStore::new()),
        };

        match WorldController::with_level(self.config.clone(), &self.level, store, Arc::new(hud.clone())) {
            Ok(controller) => {
                app.insert_resource(MarbleWorldRes(controller));
            }
            Err(err) => {
                tracing::error!("[plugin] Failed to create world: {}", err);
            }
        }

        app.insert_resource(hud)
            .insert_resource(self.button_queue.clone().unwrap_or_default())
            .init_resource::<FrameInput>()
            .init_resource::<NodeEntityMap>();

        app.configure_sets(
            Update,
            (WorldSet::Input, WorldSet::Simulate, WorldSet::Mirror).chain(),
        );
        app.add_systems(
            Update,
            (
                systems::gather_input.in_set(WorldSet::Input),
                systems::drive_world.in_set(WorldSet::Simulate),
                systems::mirror_scene.in_set(WorldSet::Mirror),
            ),
        );
    }
}
