//! Test utilities for headless Bevy integration tests.
//!
//! `TestApp` wraps an `App` built from `MinimalPlugins`, `InputPlugin` and
//! `MarbleWorldPlugin`, with a fixed frame time.

use std::time::Duration;

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;

use crate::bevy::plugin::MarbleWorldPlugin;
use crate::bevy::resources::MarbleWorldRes;
use crate::level::Level;
use crate::world::WorldController;

/// Frame time fed to the app on every update.
pub(crate) const FRAME_DT: f32 = 1.0 / 60.0;

pub(crate) struct TestApp {
    pub app: App,
}

impl TestApp {
    pub fn new(level: Level) -> Self {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_plugins(bevy::input::InputPlugin);
        app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f32(FRAME_DT)));
        app.add_plugins(MarbleWorldPlugin {
            level,
            ..Default::default()
        });
        // Run one update to initialize all resources
        app.update();
        Self { app }
    }

    /// Run `n` frame updates.
    pub fn run(&mut self, n: usize) {
        for _ in 0..n {
            self.app.update();
        }
    }

    pub fn controller(&self) -> &WorldController {
        &self.app.world().resource::<MarbleWorldRes>().0
    }

    pub fn world(&self) -> &World {
        self.app.world()
    }

    pub fn world_mut(&mut self) -> &mut World {
        self.app.world_mut()
    }
}
