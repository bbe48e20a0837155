//! Marble World Library
//!
//! Physics-driven marble platformer world using `Rapier3D`: level model and
//! storage, an in-place level editor, a torque-rolling player ball and the
//! Play/Edit controller that ties them together.
//!
//! The core is engine-agnostic and driven by [`WorldController::update`]; the
//! [`bevy`] module plugs it into Bevy's frame loop.

#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::module_name_repetitions)]

pub mod binding;
pub mod camera;
pub mod config;
pub mod editor;
pub mod error;
pub mod hud;
pub mod input;
pub mod level;
pub mod material;
pub mod physics;
pub mod player;
pub mod run;
pub mod scene;
pub mod store;
pub mod world;

// Bevy integration
pub mod bevy;

pub use binding::{BindingDesc, ObjectBinding};
pub use camera::OrbitCamera;
pub use config::{PlayerConfig, Tunables, WorldConfig};
pub use editor::{EditableId, EditableKind, EditableObject, Editor, GizmoMode, GizmoSpace};
pub use error::{WorldError, WorldResult};
pub use hud::{HudSink, LogHud, NullHud};
pub use input::{InputState, NamedButton};
pub use level::{BuiltInLevel, Level, LevelIssue, LevelMetadata, Obstacle, UNSET_TIME};
pub use material::{ContactMaterialTable, ContactParams, PhysicsMaterial, SurfaceMaterial};
pub use physics::{DOWN, PhysicsWorld, default_gravity};
pub use player::PlayerController;
pub use run::{Medal, MedalResult, RunSummary, RunTracker};
pub use scene::{NodeId, Scene, VisualNode, VisualShape};
pub use store::{FileStore, KeyValueStore, MemoryStore, SaveSlot};
pub use world::{NOTICE_SECONDS, WorldController, WorldMode};
