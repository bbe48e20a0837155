//! ECS resources for the marble world.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use bevy::prelude::*;
use parking_lot::{Mutex, RwLock};

use crate::error::WorldResult;
use crate::hud::HudSink;
use crate::input::{InputState, NamedButton};
use crate::run::RunSummary;
use crate::scene::NodeId;
use crate::world::WorldController;

/// The world controller, driven once per frame.
#[derive(Resource, Deref, DerefMut)]
pub struct MarbleWorldRes(pub WorldController);

/// Input gathered for the current frame.
#[derive(Resource, Debug, Default, Deref, DerefMut)]
pub struct FrameInput(pub InputState);

/// Scene node to entity mapping maintained by the mirror system.
#[derive(Resource, Debug, Default)]
pub struct NodeEntityMap(pub HashMap<NodeId, Entity>);

/// Queue of named buttons pressed by an external UI shell.
///
/// Clones share the same queue, so the shell can keep a handle outside the
/// app.
#[derive(Resource, Debug, Clone, Default)]
pub struct ButtonQueue {
    inner: Arc<Mutex<VecDeque<NamedButton>>>,
}

impl ButtonQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, button: NamedButton) {
        self.inner.lock().push_back(button);
    }

    /// Parses and queues a button by name.
    pub fn push_named(&self, name: &str) -> WorldResult<()> {
        self.push(name.parse()?);
        Ok(())
    }

    pub fn drain(&self) -> Vec<NamedButton> {
        self.inner.lock().drain(..).collect()
    }
}

#[derive(Debug, Default)]
struct HudState {
    text: String,
    summary: Option<RunSummary>,
}

/// HUD sink readable from outside the app.
#[derive(Resource, Debug, Clone, Default)]
pub struct HudStore {
    inner: Arc<RwLock<HudState>>,
}

impl HudStore {
    pub fn text(&self) -> String {
        self.inner.read().text.clone()
    }

    pub fn summary(&self) -> Option<RunSummary> {
        self.inner.read().summary.clone()
    }
}

impl HudSink for HudStore {
    fn update_hud(&self, text: &str) {
        let mut state = self.inner.write();
        state.text = text.to_string();
        // A running HUD means the previous summary is stale
        if !text.is_empty() {
            state.summary = None;
        }
    }

    fn update_summary(&self, summary: &RunSummary) {
        self.inner.write().summary = Some(summary.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WorldError;

    #[test]
    fn test_button_queue_shared_between_clones() {
        let queue = ButtonQueue::new();
        let shell = queue.clone();
        shell.push_named("addBox").unwrap();
        shell.push(NamedButton::Play);

        assert!(matches!(shell.push_named("fly"), Err(WorldError::UnknownButton(_))));
        assert_eq!(queue.drain(), vec![NamedButton::AddBox, NamedButton::Play]);
        assert!(queue.drain().is_empty());
    }

    #[test]
    fn test_hud_store_clears_stale_summary() {
        let hud = HudStore::default();
        let summary = RunSummary::evaluate(3.0, &crate::level::LevelMetadata::default());
        hud.update_summary(&summary);
        hud.update_hud("");
        assert_eq!(hud.summary(), Some(summary));

        hud.update_hud("Time: 0.00s | Collectibles: 0/0");
        assert_eq!(hud.summary(), None);
        assert_eq!(hud.text(), "Time: 0.00s | Collectibles: 0/0");
    }
}
