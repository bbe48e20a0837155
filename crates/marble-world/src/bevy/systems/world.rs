//! Per-frame world update.

use bevy::prelude::*;

use crate::bevy::resources::{ButtonQueue, FrameInput, MarbleWorldRes};

/// Runs the controller for one frame with the gathered input and any
/// buttons queued by the UI shell.
pub fn drive_world(
    time: Res<Time>,
    windows: Query<&Window, With<bevy::window::PrimaryWindow>>,
    queue: Res<ButtonQueue>,
    mut input: ResMut<FrameInput>,
    world: Option<ResMut<MarbleWorldRes>>,
) {
    let Some(mut world) = world else {
        return;
    };

    if let Ok(window) = windows.single() {
        world.set_viewport(window.size());
    }

    let mut frame = std::mem::take(&mut input.0);
    frame.buttons.extend(queue.drain());
    world.update(time.delta_secs(), &frame);
}
