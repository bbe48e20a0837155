//! Top-level world controller.
//!
//! Switches between editing a level and playing it. In Play mode the level
//! is turned into physics bindings; in Edit mode those bindings are gone and
//! the editor's own visuals are shown instead.

use std::path::Path;
use std::sync::Arc;

use bevy::prelude::{Transform, Vec2, Vec3};

use crate::binding::{BindingDesc, ObjectBinding};
use crate::camera::OrbitCamera;
use crate::config::{Tunables, WorldConfig};
use crate::editor::{
    COLLECTIBLE_COLOR, COLLECTIBLE_SIZE, Editor, FINISH_MARKER_COLOR, FINISH_SIZE, START_MARKER_COLOR,
};
use crate::error::WorldResult;
use crate::hud::HudSink;
use crate::input::{InputState, NamedButton};
use crate::level::{BuiltInLevel, Level, LevelMetadata};
use crate::material::{PhysicsMaterial, SurfaceMaterial};
use crate::physics::{ColliderRole, ColliderTag, PhysicsWorld};
use crate::player::{PlayerController, PlayerIntent};
use crate::run::{RunSummary, RunTracker};
use crate::scene::{Scene, VisualShape};
use crate::store::{self, KeyValueStore, SaveSlot};

/// Size of the fixed pad the player spawns on.
pub const START_PAD_SIZE: Vec3 = Vec3::new(3.0, 0.5, 3.0);

/// Seconds a notice replaces the run HUD.
pub const NOTICE_SECONDS: f32 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorldMode {
    Play,
    Edit,
}

/// Bindings that only exist while playing.
#[derive(Debug, Default)]
struct PlayObjects {
    obstacles: Vec<ObjectBinding>,
    collectibles: Vec<(u32, ObjectBinding)>,
    start_pad: Option<ObjectBinding>,
    finish: Option<ObjectBinding>,
}

impl PlayObjects {
    fn bindings(&self) -> impl Iterator<Item = &ObjectBinding> {
        self.obstacles
            .iter()
            .chain(self.collectibles.iter().map(|(_, binding)| binding))
            .chain(self.start_pad.iter())
            .chain(self.finish.iter())
    }

    fn len(&self) -> usize {
        self.bindings().count()
    }

    fn clear(&mut self, scene: &mut Scene, world: &mut PhysicsWorld) {
        let bindings = std::mem::take(&mut self.obstacles)
            .into_iter()
            .chain(std::mem::take(&mut self.collectibles).into_iter().map(|(_, binding)| binding))
            .chain(self.start_pad.take())
            .chain(self.finish.take());
        for binding in bindings {
            binding.remove(scene, world);
        }
    }
}

/// Owns the scene, the physics world, the editor and the player, and runs
/// them once per frame.
pub struct WorldController {
    config: WorldConfig,
    tunables: Tunables,
    scene: Scene,
    physics: PhysicsWorld,
    camera: OrbitCamera,
    editor: Editor,
    player: PlayerController,
    mode: WorldMode,
    metadata: LevelMetadata,
    play: PlayObjects,
    run: RunTracker,
    last_summary: Option<RunSummary>,
    /// Message shown on the HUD and its remaining display time.
    notice: Option<(String, f32)>,
    store: Box<dyn KeyValueStore + Send + Sync>,
    hud: Arc<dyn HudSink>,
}

impl WorldController {
    /// Starts in Play mode on the default built-in level.
    pub fn new(
        config: WorldConfig,
        store: Box<dyn KeyValueStore + Send + Sync>,
        hud: Arc<dyn HudSink>,
    ) -> WorldResult<Self> {
        Self::with_level(config, &BuiltInLevel::Default.load(), store, hud)
    }

    /// Starts in Play mode on `level`.
    pub fn with_level(
        config: WorldConfig,
        level: &Level,
        store: Box<dyn KeyValueStore + Send + Sync>,
        hud: Arc<dyn HudSink>,
    ) -> WorldResult<Self> {
        let tunables = config.tunables;
        let mut scene = Scene::new();
        let mut physics = PhysicsWorld::with_gravity(config.gravity());

        for material in [SurfaceMaterial::Slippery, SurfaceMaterial::Bouncy] {
            physics.contact_materials.register(
                PhysicsMaterial::Player,
                PhysicsMaterial::Surface(material),
                material.contact_params(&tunables),
            )?;
        }

        log_issues(level);
        let editor = Editor::new(&mut scene, level, config.edit_speed);
        let start = editor.start_position(&scene);
        let player = PlayerController::new(&mut scene, &mut physics, config.player, start);

        let mut controller = Self {
            config,
            tunables,
            scene,
            physics,
            camera: OrbitCamera::default(),
            editor,
            player,
            mode: WorldMode::Play,
            metadata: level.metadata.clone(),
            play: PlayObjects::default(),
            run: RunTracker::default(),
            last_summary: None,
            notice: None,
            store,
            hud,
        };
        controller.build_play();
        tracing::info!("[world] Playing '{}'", controller.metadata.name);
        Ok(controller)
    }

    /// Creates the Play bindings from the editor contents and starts a run.
    fn build_play(&mut self) {
        self.play.clear(&mut self.scene, &mut self.physics);

        let level = self.editor.save(&self.scene, self.metadata.clone());
        let scene = &mut self.scene;
        let physics = &mut self.physics;

        for (index, obstacle) in (0u32..).zip(&level.obstacles) {
            let transform = Transform {
                translation: obstacle.position.into(),
                rotation: obstacle.quaternion.into(),
                scale: obstacle.scale.into(),
            };
            let binding = BindingDesc::new(VisualShape::Box, transform)
                .material(PhysicsMaterial::Surface(obstacle.material))
                .role(ColliderRole::Obstacle, index)
                .color(obstacle.color)
                .add(scene, physics);
            self.play.obstacles.push(binding);
        }

        for (index, position) in (0u32..).zip(&level.collectibles) {
            let transform = Transform::from_translation((*position).into())
                .with_scale(Vec3::splat(COLLECTIBLE_SIZE));
            let binding = BindingDesc::new(VisualShape::Sphere, transform)
                .role(ColliderRole::Collectible, index)
                .color(COLLECTIBLE_COLOR)
                .sensor()
                .add(scene, physics);
            self.play.collectibles.push((index, binding));
        }

        let start: Vec3 = level.starting_position.into();
        let pad_center = start - Vec3::Y * (self.config.player.radius + START_PAD_SIZE.y * 0.5);
        self.play.start_pad = Some(
            BindingDesc::new(
                VisualShape::Box,
                Transform::from_translation(pad_center).with_scale(START_PAD_SIZE),
            )
            .role(ColliderRole::StartPad, 0)
            .color(START_MARKER_COLOR)
            .add(scene, physics),
        );

        self.play.finish = Some(
            BindingDesc::new(
                VisualShape::Box,
                Transform::from_translation(level.finishing_position.into())
                    .with_scale(Vec3::splat(FINISH_SIZE)),
            )
            .role(ColliderRole::Finish, 0)
            .color(FINISH_MARKER_COLOR)
            .sensor()
            .add(scene, physics),
        );

        self.player.set_active(physics, true);
        self.player.reset(start, physics, &mut self.camera);
        self.run.reset(level.collectibles.len());
        self.last_summary = None;
    }

    /// Switches from Edit to Play, rebuilding the level and autosaving it.
    pub fn enter_play_mode(&mut self) {
        if self.mode == WorldMode::Play {
            return;
        }
        self.editor.leave_edit_mode(&mut self.scene);
        self.build_play();
        self.mode = WorldMode::Play;
        tracing::info!(
            "[world] Enter play mode: '{}' ({} objects, {} collectibles)",
            self.metadata.name,
            self.play.len(),
            self.run.total()
        );

        let level = self.save_level();
        if let Err(err) = store::save_to_slot(self.store.as_mut(), SaveSlot::AutoSave, &level) {
            tracing::warn!("[world] Autosave failed: {}", err);
        }
    }

    /// Switches from Play to Edit. The player ball stays where it is, frozen.
    pub fn enter_edit_mode(&mut self) {
        if self.mode == WorldMode::Edit {
            return;
        }
        self.play.clear(&mut self.scene, &mut self.physics);
        self.player.set_active(&mut self.physics, false);
        self.editor.enter_edit_mode(&mut self.scene);
        self.mode = WorldMode::Edit;
        self.notice = None;
        self.hud.update_hud("");
        tracing::info!("[world] Enter edit mode");
    }

    /// Replaces the edited level. In Play mode the run restarts on it.
    pub fn load_level(&mut self, level: &Level) {
        log_issues(level);
        self.metadata = level.metadata.clone();
        self.editor.load(&mut self.scene, level);
        if self.mode == WorldMode::Play {
            self.build_play();
        }
    }

    /// Snapshot of the edited level with the current metadata.
    pub fn save_level(&self) -> Level {
        self.editor.save(&self.scene, self.metadata.clone())
    }

    pub fn set_metadata(&mut self, metadata: LevelMetadata) {
        self.metadata = metadata;
    }

    /// Restarts the current run. No-op in Edit mode.
    pub fn restart(&mut self) {
        if self.mode == WorldMode::Play {
            self.build_play();
            tracing::info!("[world] Restart '{}'", self.metadata.name);
        }
    }

    pub fn quick_save(&mut self) -> WorldResult<()> {
        let level = self.save_level();
        store::save_to_slot(self.store.as_mut(), SaveSlot::QuickSave, &level)
    }

    pub fn quick_load(&mut self) -> WorldResult<()> {
        self.load_slot(SaveSlot::QuickSave)
    }

    pub fn load_auto_save(&mut self) -> WorldResult<()> {
        self.load_slot(SaveSlot::AutoSave)
    }

    fn load_slot(&mut self, slot: SaveSlot) -> WorldResult<()> {
        match store::load_from_slot(self.store.as_ref(), slot) {
            Ok(level) => {
                self.load_level(&level);
                Ok(())
            }
            Err(err) => {
                tracing::warn!("[world] Load from {} failed: {}", slot, err);
                self.show_notice(err.to_string());
                Err(err)
            }
        }
    }

    /// Puts `text` on the HUD for [`NOTICE_SECONDS`].
    fn show_notice(&mut self, text: String) {
        self.hud.update_hud(&text);
        self.notice = Some((text, NOTICE_SECONDS));
    }

    /// Counts down the notice. Once it runs out in Edit mode the HUD is
    /// cleared; in Play mode the run HUD takes over on its own.
    fn tick_notice(&mut self, dt: f32) {
        let Some((_, remaining)) = self.notice.as_mut() else {
            return;
        };
        *remaining -= dt;
        if *remaining <= 0.0 {
            self.notice = None;
            if self.mode == WorldMode::Edit {
                self.hud.update_hud("");
            }
        }
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_ref().map(|(text, _)| text.as_str())
    }

    pub fn load_built_in(&mut self, level: BuiltInLevel) {
        self.load_level(&level.load());
    }

    pub fn save_file(&self, path: &Path) -> WorldResult<()> {
        store::save_to_file(path, &self.save_level())
    }

    /// Loads a user-picked file. Returns `false` when the pick was cancelled.
    pub fn load_file(&mut self, path: Option<&Path>) -> WorldResult<bool> {
        match store::load_from_file(path)? {
            Some(level) => {
                self.load_level(&level);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn tunables(&self) -> Tunables {
        self.tunables
    }

    pub fn set_jump_height(&mut self, jump_height: f32) {
        self.tunables.jump_height = jump_height;
    }

    pub fn set_slipperiness(&mut self, slipperiness: f32) {
        self.tunables.slipperiness = slipperiness;
        self.push_contact_params(SurfaceMaterial::Slippery);
    }

    pub fn set_bounciness(&mut self, bounciness: f32) {
        self.tunables.bounciness = bounciness;
        self.push_contact_params(SurfaceMaterial::Bouncy);
    }

    fn push_contact_params(&mut self, material: SurfaceMaterial) {
        let updated = self.physics.contact_materials.set(
            PhysicsMaterial::Player,
            PhysicsMaterial::Surface(material),
            material.contact_params(&self.tunables),
        );
        if !updated {
            tracing::warn!("[world] No contact material registered for {:?}", material);
        }
    }

    /// Handles one named button.
    pub fn press_button(&mut self, button: NamedButton) -> WorldResult<()> {
        tracing::debug!("[world] Button '{}'", button);
        match button {
            NamedButton::Play => self.enter_play_mode(),
            NamedButton::Edit => self.enter_edit_mode(),
            NamedButton::QuickSave => self.quick_save()?,
            NamedButton::QuickLoad => self.quick_load()?,
            NamedButton::Restart => self.restart(),
            NamedButton::Material(material) => {
                self.editor.set_material(material);
                if self.mode == WorldMode::Edit {
                    self.editor.apply_material_to_attached(&mut self.scene);
                }
            }
            _ if self.mode == WorldMode::Play => {
                tracing::debug!("[world] '{}' ignored outside edit mode", button);
            }
            NamedButton::AddBox => {
                self.editor.add_box(&mut self.scene, &self.camera);
            }
            NamedButton::AddCollectible => {
                self.editor.add_collectible(&mut self.scene, &self.camera);
            }
            NamedButton::Translate => {
                self.editor.change_to_translate_mode();
            }
            NamedButton::Rotate => {
                self.editor.change_to_rotate_mode();
            }
            NamedButton::Scale => {
                self.editor.change_to_scale_mode();
            }
            NamedButton::ToggleSpace => self.editor.toggle_space(),
            NamedButton::Clone => {
                self.editor.clone_attached(&mut self.scene);
            }
            NamedButton::Delete => {
                self.editor.delete_attached(&mut self.scene);
            }
            NamedButton::Recenter => self.editor.recenter(&self.scene, &mut self.camera),
        }
        Ok(())
    }

    /// Runs one frame.
    pub fn update(&mut self, dt: f32, input: &InputState) {
        for button in &input.buttons {
            if let Err(err) = self.press_button(*button) {
                tracing::warn!("[world] '{}' failed: {}", button, err);
            }
        }

        let dt = self.config.clamp_frame_dt(dt);
        if dt > 0.0 {
            self.physics.step(dt);
        }
        self.tick_notice(dt.max(0.0));

        self.player.sync_visual(&mut self.scene, &self.physics);
        for binding in self.play.bindings() {
            binding.update(&mut self.scene, &self.physics);
        }

        match self.mode {
            WorldMode::Edit => self.update_edit(dt, input),
            WorldMode::Play => self.update_play(dt.max(0.0), input),
        }
    }

    fn update_edit(&mut self, dt: f32, input: &InputState) {
        if let Some(pointer) = input.pointer.filter(|_| input.clicked) {
            self.editor.on_click(&self.scene, pointer, &self.camera);
        }
        self.editor
            .update(&mut self.scene, dt, input.movement, input.pointer, &mut self.camera);
    }

    fn update_play(&mut self, dt: f32, input: &InputState) {
        let intent = PlayerIntent {
            direction: self
                .camera
                .relative_direction(input.movement.clamp_length_max(1.0)),
            jump: input.jump_held,
        };
        self.player
            .update(&mut self.physics, dt, intent, self.tunables.jump_height);

        if self.player.fell_below(&self.physics, self.config.fall_reset_height) {
            let start = self.editor.start_position(&self.scene);
            self.player.reset(start, &mut self.physics, &mut self.camera);
            tracing::info!("[world] Player fell out, respawning at start");
        }
        if let Some(position) = self.player.position(&self.physics) {
            self.camera.set_target(position);
        }

        self.run.tick(dt);
        let overlaps = self.physics.overlapping_tags(self.player.binding().collider());
        self.collect_overlapping(&overlaps);

        let at_finish = overlaps.iter().any(|tag| tag.role == ColliderRole::Finish);
        let summary = if at_finish {
            self.run.finish(&self.metadata)
        } else {
            None
        };
        if let Some(summary) = summary {
            tracing::info!("[world] Finished '{}' in {:.2}s", summary.level_name, summary.time);
            self.hud.update_summary(&summary);
            self.last_summary = Some(summary);
        }

        if !self.run.is_finished() {
            let text = match &self.notice {
                Some((notice, _)) => notice.clone(),
                None => self.run.hud_text(),
            };
            self.hud.update_hud(&text);
        }
    }

    /// Collects and removes every collectible among `overlaps`.
    fn collect_overlapping(&mut self, overlaps: &[ColliderTag]) {
        let indices: Vec<u32> = overlaps
            .iter()
            .filter(|tag| tag.role == ColliderRole::Collectible)
            .map(|tag| tag.index)
            .collect();
        if indices.is_empty() {
            return;
        }
        let (touched, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.play.collectibles)
            .into_iter()
            .partition(|(index, _)| indices.contains(index));
        self.play.collectibles = kept;

        for (index, binding) in touched {
            if self.run.collect(index) {
                tracing::debug!(
                    "[world] Collected {} ({}/{})",
                    index,
                    self.run.collected(),
                    self.run.total()
                );
            }
            binding.remove(&mut self.scene, &mut self.physics);
        }
    }

    pub fn mode(&self) -> WorldMode {
        self.mode
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn physics(&self) -> &PhysicsWorld {
        &self.physics
    }

    pub fn camera(&self) -> &OrbitCamera {
        &self.camera
    }

    pub fn set_viewport(&mut self, size: Vec2) {
        if size.x > 0.0 && size.y > 0.0 {
            self.camera.aspect = size.x / size.y;
        }
    }

    pub fn editor(&self) -> &Editor {
        &self.editor
    }

    /// Mutable access to the editor together with what its operations act on.
    pub fn editor_context(&mut self) -> (&mut Editor, &mut Scene, &mut OrbitCamera) {
        (&mut self.editor, &mut self.scene, &mut self.camera)
    }

    pub fn player(&self) -> &PlayerController {
        &self.player
    }

    pub fn run(&self) -> &RunTracker {
        &self.run
    }

    pub fn metadata(&self) -> &LevelMetadata {
        &self.metadata
    }

    /// Summary of the finished run, if the current run is over.
    pub fn last_summary(&self) -> Option<&RunSummary> {
        self.last_summary.as_ref()
    }

    /// Number of live Play bindings.
    pub fn play_object_count(&self) -> usize {
        self.play.len()
    }
}

fn log_issues(level: &Level) {
    for issue in level.validate() {
        tracing::warn!("[world] Level '{}': {:?}", level.metadata.name, issue);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::EditableKind;
    use crate::error::WorldError;
    use crate::level::{Obstacle, QuatData};
    use crate::physics::from_vector;
    use crate::store::MemoryStore;
    use parking_lot::Mutex;

    const DT: f32 = 1.0 / 60.0;

    #[derive(Default)]
    struct Recorded {
        hud: Vec<String>,
        summaries: Vec<RunSummary>,
    }

    #[derive(Default, Clone)]
    struct RecordingHud(Arc<Mutex<Recorded>>);

    impl HudSink for RecordingHud {
        fn update_hud(&self, text: &str) {
            self.0.lock().hud.push(text.to_string());
        }

        fn update_summary(&self, summary: &RunSummary) {
            self.0.lock().summaries.push(summary.clone());
        }
    }

    fn controller(level: &Level) -> (WorldController, RecordingHud, MemoryStore) {
        let hud = RecordingHud::default();
        let store = MemoryStore::new();
        let controller = WorldController::with_level(
            WorldConfig::default(),
            level,
            Box::new(store.clone()),
            Arc::new(hud.clone()),
        )
        .unwrap();
        (controller, hud, store)
    }

    fn run_frames(controller: &mut WorldController, frames: usize) {
        for _ in 0..frames {
            controller.update(DT, &InputState::default());
        }
    }

    fn press(controller: &mut WorldController, button: NamedButton) {
        controller.update(DT, &InputState::with_buttons([button]));
    }

    fn far_finish() -> Level {
        Level::empty(Vec3::new(0.0, 0.5, 0.0), Vec3::new(0.0, 0.5, -50.0))
    }

    #[test]
    fn test_starts_playing_default_level() {
        let hud = RecordingHud::default();
        let controller = WorldController::new(
            WorldConfig::default(),
            Box::new(MemoryStore::new()),
            Arc::new(hud),
        )
        .unwrap();

        let level = BuiltInLevel::Default.load();
        assert_eq!(controller.mode(), WorldMode::Play);
        assert_eq!(controller.metadata().name, level.metadata.name);
        assert_eq!(controller.run().total(), level.collectibles.len());
        // Obstacles, collectibles, start pad and finish
        assert_eq!(
            controller.play_object_count(),
            level.obstacles.len() + level.collectibles.len() + 2
        );
        assert_eq!(controller.physics().contact_materials.len(), 2);
    }

    #[test]
    fn test_empty_level_finishes_once() {
        let start = Vec3::new(0.0, 0.5, 0.0);
        let (mut controller, hud, _store) = controller(&Level::empty(start, start));
        assert_eq!(controller.run().total(), 0);

        run_frames(&mut controller, 3);
        assert!(controller.run().is_finished());
        let frozen = controller.run().elapsed();

        run_frames(&mut controller, 30);
        assert_eq!(controller.run().elapsed(), frozen);
        assert_eq!(hud.0.lock().summaries.len(), 1);
        assert_eq!(controller.last_summary().unwrap().time, frozen);
    }

    #[test]
    fn test_finish_waits_for_collectibles() {
        let start = Vec3::new(0.0, 0.5, 0.0);
        let mut level = Level::empty(start, start);
        level.collectibles.push(Vec3::new(20.0, 0.5, 0.0).into());
        let (mut controller, hud, _store) = controller(&level);

        run_frames(&mut controller, 20);
        assert!(!controller.run().is_finished());
        assert!(hud.0.lock().summaries.is_empty());
        let last = hud.0.lock().hud.last().cloned().unwrap();
        assert!(last.ends_with("| Collectibles: 0/1"), "{last}");
    }

    #[test]
    fn test_overlapped_collectible_is_collected_and_removed() {
        let mut level = far_finish();
        level.collectibles.push(Vec3::new(0.0, 0.5, 0.0).into());
        let (mut controller, hud, _store) = controller(&level);
        let objects = controller.play_object_count();

        run_frames(&mut controller, 2);
        assert_eq!(controller.run().collected(), 1);
        assert_eq!(controller.play_object_count(), objects - 1);
        assert!(!controller.run().is_finished());
        let last = hud.0.lock().hud.last().cloned().unwrap();
        assert!(last.starts_with("Time: "));
        assert!(last.ends_with("| Collectibles: 1/1"));
    }

    #[test]
    fn test_collect_then_finish() {
        let start = Vec3::new(0.0, 0.5, 0.0);
        let mut level = Level::empty(start, start);
        level.collectibles.push(start.into());
        level.metadata.bronze_time = 30.0;
        let (mut controller, hud, _store) = controller(&level);

        run_frames(&mut controller, 3);
        let recorded = hud.0.lock();
        assert_eq!(recorded.summaries.len(), 1);
        assert!(recorded.summaries[0].medals[0].achieved);
    }

    #[test]
    fn test_edit_mode_removes_play_objects() {
        let (mut controller, hud, _store) = controller(&BuiltInLevel::Default.load());
        run_frames(&mut controller, 5);

        press(&mut controller, NamedButton::Edit);
        assert_eq!(controller.mode(), WorldMode::Edit);
        assert_eq!(controller.play_object_count(), 0);
        // Only the player ball remains in the physics world
        assert_eq!(controller.physics().rigid_body_set.len(), 1);
        assert!(controller.editor().is_visible());

        let updates = hud.0.lock().hud.len();
        assert_eq!(hud.0.lock().hud.last().map(String::as_str), Some(""));
        run_frames(&mut controller, 10);
        assert_eq!(hud.0.lock().hud.len(), updates);
    }

    #[test]
    fn test_player_frozen_while_editing() {
        let (mut controller, _hud, _store) = controller(&far_finish());
        run_frames(&mut controller, 10);
        press(&mut controller, NamedButton::Edit);

        // The start pad is gone, yet the ball does not fall
        let before = controller.player().position(controller.physics()).unwrap();
        run_frames(&mut controller, 30);
        let after = controller.player().position(controller.physics()).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn test_mode_round_trip_keeps_level() {
        let level = BuiltInLevel::Trampoline.load();
        let (mut controller, _hud, _store) = controller(&level);

        press(&mut controller, NamedButton::Edit);
        press(&mut controller, NamedButton::Play);
        assert_eq!(controller.mode(), WorldMode::Play);
        assert_eq!(controller.save_level(), level);
        assert_eq!(controller.run().collected(), 0);
    }

    #[test]
    fn test_enter_play_autosaves() {
        let (mut controller, _hud, store) = controller(&BuiltInLevel::Tutorial.load());
        assert!(store.get(SaveSlot::AutoSave.key()).unwrap().is_none());

        press(&mut controller, NamedButton::Edit);
        press(&mut controller, NamedButton::AddBox);
        press(&mut controller, NamedButton::Play);

        let saved = store::load_from_slot(&store, SaveSlot::AutoSave).unwrap();
        assert_eq!(saved, controller.save_level());
        assert_eq!(
            saved.obstacles.len(),
            BuiltInLevel::Tutorial.load().obstacles.len() + 1
        );
    }

    #[test]
    fn test_quick_save_and_load() {
        let (mut controller, hud, _store) = controller(&BuiltInLevel::Default.load());

        let err = controller.quick_load().unwrap_err();
        assert!(matches!(err, WorldError::NothingSaved { slot: SaveSlot::QuickSave }));
        assert_eq!(
            hud.0.lock().hud.last().map(String::as_str),
            Some("Nothing saved in slot MARBLE_QUICK_SAVE")
        );

        controller.quick_save().unwrap();
        controller.load_built_in(BuiltInLevel::Tutorial);
        assert_eq!(controller.metadata().name, "Tutorial");

        controller.load_built_in(BuiltInLevel::Trampoline);
        controller.quick_save().unwrap();
        controller.load_built_in(BuiltInLevel::Tutorial);

        press(&mut controller, NamedButton::QuickLoad);
        assert_eq!(controller.save_level(), BuiltInLevel::Trampoline.load());
    }

    #[test]
    fn test_failed_quick_load_notice_stays_on_hud() {
        let (mut controller, hud, _store) = controller(&BuiltInLevel::Default.load());
        let last_hud = || hud.0.lock().hud.last().cloned().unwrap();

        press(&mut controller, NamedButton::QuickLoad);
        assert_eq!(last_hud(), "Nothing saved in slot MARBLE_QUICK_SAVE");

        run_frames(&mut controller, 30);
        assert_eq!(controller.notice(), Some("Nothing saved in slot MARBLE_QUICK_SAVE"));
        assert_eq!(last_hud(), "Nothing saved in slot MARBLE_QUICK_SAVE");

        // Two seconds at 60 fps, plus margin
        run_frames(&mut controller, 100);
        assert_eq!(controller.notice(), None);
        assert!(last_hud().starts_with("Time: "), "{}", last_hud());
    }

    #[test]
    fn test_notice_clears_in_edit_mode() {
        let (mut controller, hud, _store) = controller(&BuiltInLevel::Default.load());
        press(&mut controller, NamedButton::Edit);

        press(&mut controller, NamedButton::QuickLoad);
        assert!(hud.0.lock().hud.last().unwrap().starts_with("Nothing saved"));

        run_frames(&mut controller, 130);
        assert_eq!(controller.notice(), None);
        assert_eq!(hud.0.lock().hud.last().map(String::as_str), Some(""));
    }

    #[test]
    fn test_load_level_in_play_rebuilds() {
        let (mut controller, _hud, _store) = controller(&BuiltInLevel::Default.load());
        run_frames(&mut controller, 10);

        let mut level = far_finish();
        level.obstacles.push(Obstacle {
            position: Vec3::new(0.0, -1.0, -5.0).into(),
            quaternion: QuatData::default(),
            scale: Vec3::new(4.0, 1.0, 4.0).into(),
            color: 0x0010_2030,
            material: SurfaceMaterial::Bouncy,
        });
        controller.load_level(&level);

        assert_eq!(controller.mode(), WorldMode::Play);
        assert_eq!(controller.play_object_count(), 3);
        assert_eq!(controller.run().elapsed(), 0.0);
        assert_eq!(controller.run().total(), 0);
        assert_eq!(
            controller.player().position(controller.physics()).unwrap(),
            Vec3::new(0.0, 0.5, 0.0)
        );
    }

    #[test]
    fn test_load_level_in_edit_stays_in_edit() {
        let (mut controller, _hud, _store) = controller(&BuiltInLevel::Default.load());
        press(&mut controller, NamedButton::Edit);

        controller.load_built_in(BuiltInLevel::Tutorial);
        assert_eq!(controller.mode(), WorldMode::Edit);
        assert_eq!(controller.play_object_count(), 0);
        assert_eq!(controller.editor().count(EditableKind::StartMarker), 1);
    }

    #[test]
    fn test_cancelled_file_pick_changes_nothing() {
        let (mut controller, _hud, _store) = controller(&BuiltInLevel::Default.load());
        assert!(!controller.load_file(None).unwrap());
        assert_eq!(controller.save_level(), BuiltInLevel::Default.load());
    }

    #[test]
    fn test_tunables_update_contact_pairs_in_place() {
        let (mut controller, _hud, _store) = controller(&far_finish());
        controller.set_bounciness(2.0);
        controller.set_slipperiness(0.05);
        controller.set_jump_height(8.0);

        let table = &controller.physics().contact_materials;
        assert_eq!(table.len(), 2);
        let bouncy = table
            .get(PhysicsMaterial::Player, PhysicsMaterial::Surface(SurfaceMaterial::Bouncy))
            .unwrap();
        assert_eq!(bouncy.restitution, 2.0);
        let slippery = table
            .get(PhysicsMaterial::Surface(SurfaceMaterial::Slippery), PhysicsMaterial::Player)
            .unwrap();
        assert_eq!(slippery.friction, 0.05);
        assert_eq!(controller.tunables().jump_height, 8.0);
    }

    const SLAB_X: f32 = 20.0;

    fn slab_level(material: SurfaceMaterial) -> Level {
        let mut level = far_finish();
        level.obstacles.push(Obstacle {
            position: Vec3::new(SLAB_X, -0.5, 0.0).into(),
            quaternion: QuatData::default(),
            scale: Vec3::new(10.0, 1.0, 10.0).into(),
            color: material.default_color(),
            material,
        });
        level
    }

    fn place_player(controller: &mut WorldController, position: Vec3) {
        controller
            .player
            .reset(position, &mut controller.physics, &mut controller.camera);
    }

    /// Drops the player onto the slab from y = 5 and returns the top of the
    /// first rebound.
    fn rebound_peak(controller: &mut WorldController) -> f32 {
        place_player(controller, Vec3::new(SLAB_X, 5.0, 0.0));
        let handle = controller.player().binding().body();
        let mut rising = false;
        let mut peak = 0.0f32;
        for _ in 0..240 {
            controller.update(DT, &InputState::default());
            let body = controller.physics().get_rigid_body(handle).unwrap();
            if body.linvel().y > 0.0 {
                rising = true;
                peak = peak.max(body.translation().y);
            } else if rising {
                break;
            }
        }
        peak
    }

    #[test]
    fn test_bouncy_surface_rebounds_higher() {
        let (mut normal, _hud, _store) = controller(&slab_level(SurfaceMaterial::Normal));
        let (mut bouncy, _hud, _store) = controller(&slab_level(SurfaceMaterial::Bouncy));

        let normal_peak = rebound_peak(&mut normal);
        let bouncy_peak = rebound_peak(&mut bouncy);
        assert!(normal_peak < 2.0, "normal rebound {normal_peak}");
        assert!(bouncy_peak > normal_peak + 3.0, "bouncy {bouncy_peak} vs normal {normal_peak}");
    }

    #[test]
    fn test_bounciness_change_applies_to_next_bounce() {
        let (mut controller, _hud, _store) = controller(&slab_level(SurfaceMaterial::Bouncy));
        let before = rebound_peak(&mut controller);

        controller.set_bounciness(0.3);
        let after = rebound_peak(&mut controller);
        assert!(after < before - 3.0, "before {before}, after {after}");
    }

    #[test]
    fn test_slippery_surface_does_not_spin_the_ball() {
        let spin_after_slide = |material| {
            let (mut controller, _hud, _store) = controller(&slab_level(material));
            place_player(&mut controller, Vec3::new(SLAB_X, 0.5, 0.0));
            let body = controller.player().binding().body();
            controller
                .physics
                .get_rigid_body_mut(body)
                .unwrap()
                .set_linvel(rapier3d::prelude::Vector::new(4.0, 0.0, 0.0), true);

            run_frames(&mut controller, 20);
            from_vector(&controller.physics().get_rigid_body(body).unwrap().angvel()).length()
        };

        let normal = spin_after_slide(SurfaceMaterial::Normal);
        let slippery = spin_after_slide(SurfaceMaterial::Slippery);
        assert!(normal > 1.0, "normal spin {normal}");
        assert!(slippery < 0.1, "slippery spin {slippery}");
    }

    #[test]
    fn test_frame_dt_is_clamped() {
        let (mut controller, _hud, _store) = controller(&far_finish());
        controller.update(1.0, &InputState::default());
        assert_eq!(controller.run().elapsed(), WorldConfig::default().max_frame_dt);

        let frame = controller.physics().current_frame();
        controller.update(0.0, &InputState::default());
        controller.update(-1.0, &InputState::default());
        assert_eq!(controller.physics().current_frame(), frame);
    }

    #[test]
    fn test_fall_out_respawns_at_start() {
        let level = Level::empty(Vec3::new(0.0, 0.5, 0.0), Vec3::new(0.0, 0.5, -50.0));
        let (mut controller, _hud, _store) = controller(&level);
        run_frames(&mut controller, 10);

        // Drop the player far below the level
        let body = controller.player().binding().body();
        controller
            .physics
            .get_rigid_body_mut(body)
            .unwrap()
            .set_translation(rapier3d::prelude::Vector::new(0.0, -100.0, 0.0), true);
        let elapsed = controller.run().elapsed();

        controller.update(DT, &InputState::default());
        let position = controller.player().position(controller.physics()).unwrap();
        assert_eq!(position, Vec3::new(0.0, 0.5, 0.0));
        assert!(controller.run().elapsed() > elapsed);
    }

    #[test]
    fn test_restart_restores_collectibles() {
        let mut level = far_finish();
        level.collectibles.push(Vec3::new(0.0, 0.5, 0.0).into());
        let (mut controller, _hud, _store) = controller(&level);
        run_frames(&mut controller, 2);
        assert_eq!(controller.run().collected(), 1);

        press(&mut controller, NamedButton::Restart);
        assert_eq!(controller.run().total(), 1);
        assert_eq!(controller.play_object_count(), 3);
    }

    #[test]
    fn test_editor_buttons_ignored_in_play() {
        let (mut controller, _hud, _store) = controller(&far_finish());
        press(&mut controller, NamedButton::AddBox);
        assert_eq!(controller.editor().count(EditableKind::Obstacle), 0);

        press(&mut controller, NamedButton::Edit);
        press(&mut controller, NamedButton::AddBox);
        press(&mut controller, NamedButton::Clone);
        assert_eq!(controller.editor().count(EditableKind::Obstacle), 2);
        press(&mut controller, NamedButton::Delete);
        assert_eq!(controller.editor().count(EditableKind::Obstacle), 1);
    }

    #[test]
    fn test_material_button_retags_attached() {
        let (mut controller, _hud, _store) = controller(&far_finish());
        press(&mut controller, NamedButton::Edit);
        press(&mut controller, NamedButton::AddBox);
        press(&mut controller, NamedButton::Material(SurfaceMaterial::Slippery));

        let level = controller.save_level();
        assert_eq!(level.obstacles[0].material, SurfaceMaterial::Slippery);
        assert_eq!(level.obstacles[0].color, SurfaceMaterial::Slippery.default_color());
    }
}
