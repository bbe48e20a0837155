//! Bevy integration for the marble world.
//!
//! Drives the `WorldController` from Bevy's frame loop, translates keyboard
//! and mouse input, and mirrors the scene store into entities.

pub mod components;
pub mod plugin;
pub mod resources;
pub mod systems;

#[cfg(test)]
pub(crate) mod test_utils;

pub use components::*;
pub use plugin::{MarbleWorldPlugin, WorldSet};
pub use resources::*;
