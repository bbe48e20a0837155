//! Systems driving the marble world from Bevy's frame loop.
//!
//! - input: keyboard/mouse to normalized input
//! - world: per-frame controller update
//! - scene: scene store to entity mirroring

pub mod input;
pub mod scene;
pub mod world;

pub use input::*;
pub use scene::*;
pub use world::*;
