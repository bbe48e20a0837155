//! In-place level editor.
//!
//! The editor owns the live editable objects of a level. Their transforms
//! live on scene nodes; the editor only keeps the kind, material and color
//! next to the node id. Exactly one start marker and one finish marker exist
//! for the whole lifetime of an editor.

mod gizmo;
pub mod picking;

use std::collections::BTreeMap;

use bevy::prelude::{Transform, Vec2, Vec3};

use crate::camera::OrbitCamera;
use crate::level::{Level, LevelMetadata, Obstacle};
use crate::material::SurfaceMaterial;
use crate::scene::{HOVER_EMISSIVE, NodeId, Scene, VisualNode, VisualShape};

pub use gizmo::{Gizmo, GizmoMode, GizmoSpace, MIN_SCALE};

pub const START_MARKER_COLOR: u32 = 0x0040_e040;
pub const FINISH_MARKER_COLOR: u32 = 0x00ff_d700;
pub const COLLECTIBLE_COLOR: u32 = 0x00ff_e066;
/// Diameter of collectible spheres.
pub const COLLECTIBLE_SIZE: f32 = 0.6;
/// Edge length of the finish trigger box.
pub const FINISH_SIZE: f32 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EditableId(u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditableKind {
    StartMarker,
    FinishMarker,
    Obstacle,
    Collectible,
}

impl EditableKind {
    pub fn is_marker(self) -> bool {
        matches!(self, Self::StartMarker | Self::FinishMarker)
    }
}

/// A live object of the level being edited.
#[derive(Debug, Clone, PartialEq)]
pub struct EditableObject {
    pub id: EditableId,
    pub kind: EditableKind,
    pub node: NodeId,
    pub material: SurfaceMaterial,
    pub color: u32,
}

/// Level editor.
#[derive(Debug)]
pub struct Editor {
    objects: BTreeMap<EditableId, EditableObject>,
    next_id: u32,
    start: EditableId,
    finish: EditableId,
    gizmo: Gizmo,
    material: SurfaceMaterial,
    color: u32,
    hovered: Option<EditableId>,
    visible: bool,
    edit_speed: f32,
}

impl Editor {
    /// Creates an editor holding `level`. Editable visuals start hidden.
    pub fn new(scene: &mut Scene, level: &Level, edit_speed: f32) -> Self {
        let mut editor = Self {
            objects: BTreeMap::new(),
            next_id: 0,
            start: EditableId(0),
            finish: EditableId(0),
            gizmo: Gizmo::default(),
            material: SurfaceMaterial::Normal,
            color: SurfaceMaterial::Normal.default_color(),
            hovered: None,
            visible: false,
            edit_speed,
        };
        editor.populate(scene, level);
        editor
    }

    fn populate(&mut self, scene: &mut Scene, level: &Level) {
        self.start = self.spawn(
            scene,
            EditableKind::StartMarker,
            VisualShape::Sphere,
            Transform::from_translation(level.starting_position.into()),
            SurfaceMaterial::Normal,
            START_MARKER_COLOR,
        );
        self.finish = self.spawn(
            scene,
            EditableKind::FinishMarker,
            VisualShape::Box,
            Transform::from_translation(level.finishing_position.into())
                .with_scale(Vec3::splat(FINISH_SIZE)),
            SurfaceMaterial::Normal,
            FINISH_MARKER_COLOR,
        );

        for obstacle in &level.obstacles {
            let transform = Transform {
                translation: obstacle.position.into(),
                rotation: obstacle.quaternion.into(),
                scale: obstacle.scale.into(),
            };
            self.spawn(
                scene,
                EditableKind::Obstacle,
                VisualShape::Box,
                transform,
                obstacle.material,
                obstacle.color,
            );
        }

        for position in &level.collectibles {
            self.spawn(
                scene,
                EditableKind::Collectible,
                VisualShape::Sphere,
                collectible_transform((*position).into()),
                SurfaceMaterial::Normal,
                COLLECTIBLE_COLOR,
            );
        }
    }

    fn spawn(
        &mut self,
        scene: &mut Scene,
        kind: EditableKind,
        shape: VisualShape,
        transform: Transform,
        material: SurfaceMaterial,
        color: u32,
    ) -> EditableId {
        let mut node = VisualNode::new(shape, transform, color);
        node.visible = self.visible;
        let node = scene.insert(node);

        let id = EditableId(self.next_id);
        self.next_id += 1;
        self.objects.insert(
            id,
            EditableObject {
                id,
                kind,
                node,
                material,
                color,
            },
        );
        id
    }

    fn attach(&mut self, id: EditableId) {
        if let Some(object) = self.objects.get(&id) {
            self.gizmo.attach(id, object.kind.is_marker());
            if self.hovered == Some(id) {
                self.hovered = None;
            }
        }
    }

    fn attached_object(&self) -> Option<&EditableObject> {
        self.gizmo.attached().and_then(|id| self.objects.get(&id))
    }

    /// Attached object, unless it is a marker.
    fn attached_regular(&self) -> Option<&EditableObject> {
        self.attached_object().filter(|object| !object.kind.is_marker())
    }

    /// Replaces every editable object with the contents of `level`.
    pub fn load(&mut self, scene: &mut Scene, level: &Level) {
        for object in std::mem::take(&mut self.objects).into_values() {
            scene.remove(object.node);
        }
        self.gizmo.detach();
        self.hovered = None;
        self.populate(scene, level);
        tracing::info!(
            "[editor] Loaded '{}' ({} obstacles, {} collectibles)",
            level.metadata.name,
            level.obstacles.len(),
            level.collectibles.len()
        );
    }

    /// Snapshot of the edited level.
    pub fn save(&self, scene: &Scene, metadata: LevelMetadata) -> Level {
        let mut level = Level::empty(
            self.translation(scene, self.start),
            self.translation(scene, self.finish),
        );
        level.metadata = metadata;

        for object in self.objects.values() {
            let Some(node) = scene.get(object.node) else {
                continue;
            };
            match object.kind {
                EditableKind::Obstacle => level.obstacles.push(Obstacle {
                    position: node.transform.translation.into(),
                    quaternion: node.transform.rotation.into(),
                    scale: node.transform.scale.into(),
                    color: object.color,
                    material: object.material,
                }),
                EditableKind::Collectible => level.collectibles.push(node.transform.translation.into()),
                EditableKind::StartMarker | EditableKind::FinishMarker => {}
            }
        }
        level
    }

    /// Adds a unit box at the camera target and attaches the gizmo to it.
    pub fn add_box(&mut self, scene: &mut Scene, camera: &OrbitCamera) -> EditableId {
        let id = self.spawn(
            scene,
            EditableKind::Obstacle,
            VisualShape::Box,
            Transform::from_translation(camera.target),
            self.material,
            self.color,
        );
        self.attach(id);
        tracing::debug!("[editor] Added box {:?}", id);
        id
    }

    /// Adds a collectible at the camera target and attaches the gizmo to it.
    pub fn add_collectible(&mut self, scene: &mut Scene, camera: &OrbitCamera) -> EditableId {
        let id = self.spawn(
            scene,
            EditableKind::Collectible,
            VisualShape::Sphere,
            collectible_transform(camera.target),
            self.material,
            COLLECTIBLE_COLOR,
        );
        self.attach(id);
        tracing::debug!("[editor] Added collectible {:?}", id);
        id
    }

    fn pick(&self, scene: &Scene, pointer: Vec2, camera: &OrbitCamera) -> Option<EditableId> {
        let ray = camera.ray_from_ndc(pointer)?;
        picking::nearest_hit(
            &ray,
            self.objects
                .values()
                .filter_map(|object| scene.get(object.node).map(|node| (object.id, node))),
        )
    }

    /// Attaches the gizmo to the nearest object under `pointer`. Ignored while
    /// dragging; a miss keeps the current attachment.
    pub fn on_click(&mut self, scene: &Scene, pointer: Vec2, camera: &OrbitCamera) -> Option<EditableId> {
        if self.gizmo.is_dragging() {
            return None;
        }
        let id = self.pick(scene, pointer, camera)?;
        self.attach(id);
        Some(id)
    }

    pub fn change_to_translate_mode(&mut self) -> bool {
        self.gizmo.set_mode(GizmoMode::Translate)
    }

    pub fn change_to_rotate_mode(&mut self) -> bool {
        self.gizmo.set_mode(GizmoMode::Rotate)
    }

    pub fn change_to_scale_mode(&mut self) -> bool {
        self.gizmo.set_mode(GizmoMode::Scale)
    }

    pub fn toggle_space(&mut self) {
        self.gizmo.toggle_space();
    }

    /// Duplicates the attached object and attaches to the copy. Markers are
    /// never cloned.
    pub fn clone_attached(&mut self, scene: &mut Scene) -> Option<EditableId> {
        let object = self.attached_regular()?.clone();
        let node = scene.get(object.node)?;
        let (shape, transform) = (node.shape, node.transform);

        let id = self.spawn(scene, object.kind, shape, transform, object.material, object.color);
        self.attach(id);
        tracing::debug!("[editor] Cloned {:?} into {:?}", object.id, id);
        Some(id)
    }

    /// Removes the attached object. Markers are never deleted.
    pub fn delete_attached(&mut self, scene: &mut Scene) -> Option<EditableId> {
        let id = self.attached_regular()?.id;
        let object = self.objects.remove(&id)?;
        scene.remove(object.node);
        self.gizmo.detach();
        if self.hovered == Some(id) {
            self.hovered = None;
        }
        tracing::debug!("[editor] Deleted {:?}", id);
        Some(id)
    }

    /// Moves the camera orbit target onto the attached object.
    pub fn recenter(&self, scene: &Scene, camera: &mut OrbitCamera) {
        if let Some(node) = self.attached_object().and_then(|object| scene.get(object.node)) {
            camera.set_target(node.transform.translation);
        }
    }

    /// Per-frame pan and hover highlight.
    pub fn update(
        &mut self,
        scene: &mut Scene,
        dt: f32,
        pan: Vec2,
        pointer: Option<Vec2>,
        camera: &mut OrbitCamera,
    ) {
        camera.pan(pan * self.edit_speed * dt);

        let hovered = match pointer {
            Some(pointer) => self.pick(scene, pointer, camera),
            None => None,
        };
        self.hovered = hovered.filter(|id| Some(*id) != self.gizmo.attached());

        for object in self.objects.values() {
            if let Some(node) = scene.get_mut(object.node) {
                node.emissive = if Some(object.id) == self.hovered {
                    HOVER_EMISSIVE
                } else {
                    0
                };
            }
        }
    }

    pub fn enter_edit_mode(&mut self, scene: &mut Scene) {
        self.set_visible(scene, true);
    }

    pub fn leave_edit_mode(&mut self, scene: &mut Scene) {
        self.gizmo.end_drag();
        self.hovered = None;
        for object in self.objects.values() {
            if let Some(node) = scene.get_mut(object.node) {
                node.emissive = 0;
            }
        }
        self.set_visible(scene, false);
    }

    fn set_visible(&mut self, scene: &mut Scene, visible: bool) {
        self.visible = visible;
        for object in self.objects.values() {
            scene.set_visible(object.node, visible);
        }
    }

    pub fn begin_drag(&mut self) -> bool {
        self.gizmo.begin_drag()
    }

    /// Applies one gizmo drag increment to the attached object.
    pub fn drag(&mut self, scene: &mut Scene, amount: Vec3) {
        if !self.gizmo.is_dragging() {
            return;
        }
        let Some(node) = self.attached_object().map(|object| object.node) else {
            return;
        };
        if let Some(node) = scene.get_mut(node) {
            self.gizmo.apply(&mut node.transform, amount);
        }
    }

    pub fn end_drag(&mut self) {
        self.gizmo.end_drag();
    }

    /// Sets the material (and its default color) used for new objects.
    pub fn set_material(&mut self, material: SurfaceMaterial) {
        self.material = material;
        self.color = material.default_color();
    }

    /// Sets the color used for new obstacles.
    pub fn set_color(&mut self, color: u32) {
        self.color = color;
    }

    /// Retags the attached obstacle with the current material and color.
    pub fn apply_material_to_attached(&mut self, scene: &mut Scene) -> bool {
        let Some(id) = self
            .attached_object()
            .filter(|object| object.kind == EditableKind::Obstacle)
            .map(|object| object.id)
        else {
            return false;
        };
        let (material, color) = (self.material, self.color);
        let Some(object) = self.objects.get_mut(&id) else {
            return false;
        };
        object.material = material;
        object.color = color;
        if let Some(node) = scene.get_mut(object.node) {
            node.color = color;
        }
        true
    }

    pub fn gizmo(&self) -> &Gizmo {
        &self.gizmo
    }

    pub fn attached(&self) -> Option<&EditableObject> {
        self.attached_object()
    }

    pub fn hovered(&self) -> Option<EditableId> {
        self.hovered
    }

    pub fn get(&self, id: EditableId) -> Option<&EditableObject> {
        self.objects.get(&id)
    }

    pub fn objects(&self) -> impl Iterator<Item = &EditableObject> {
        self.objects.values()
    }

    pub fn start_marker(&self) -> EditableId {
        self.start
    }

    pub fn finish_marker(&self) -> EditableId {
        self.finish
    }

    fn translation(&self, scene: &Scene, id: EditableId) -> Vec3 {
        self.objects
            .get(&id)
            .and_then(|object| scene.get(object.node))
            .map_or(Vec3::ZERO, |node| node.transform.translation)
    }

    /// Current start marker position.
    pub fn start_position(&self, scene: &Scene) -> Vec3 {
        self.translation(scene, self.start)
    }

    pub fn material(&self) -> SurfaceMaterial {
        self.material
    }

    pub fn color(&self) -> u32 {
        self.color
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn count(&self, kind: EditableKind) -> usize {
        self.objects.values().filter(|object| object.kind == kind).count()
    }
}

fn collectible_transform(position: Vec3) -> Transform {
    Transform::from_translation(position).with_scale(Vec3::splat(COLLECTIBLE_SIZE))
}
