//! Transform gizmo state and manipulation.

use bevy::math::EulerRot;
use bevy::prelude::{Quat, Transform, Vec3};

use super::EditableId;

/// Smallest extent a scale drag can shrink an axis to.
pub const MIN_SCALE: f32 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GizmoMode {
    #[default]
    Translate,
    Rotate,
    Scale,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GizmoSpace {
    #[default]
    World,
    Local,
}

/// Which object the gizmo is attached to and how it manipulates it.
///
/// While a marker is attached the mode is pinned to `Translate`; the mode in
/// effect before the lock comes back when a regular object is attached.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Gizmo {
    attached: Option<EditableId>,
    mode: GizmoMode,
    space: GizmoSpace,
    dragging: bool,
    locked_from: Option<GizmoMode>,
}

impl Gizmo {
    pub fn attached(&self) -> Option<EditableId> {
        self.attached
    }

    pub fn mode(&self) -> GizmoMode {
        self.mode
    }

    pub fn space(&self) -> GizmoSpace {
        self.space
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn is_locked(&self) -> bool {
        self.locked_from.is_some()
    }

    pub(crate) fn attach(&mut self, id: EditableId, marker: bool) {
        self.attached = Some(id);
        self.dragging = false;
        if marker {
            if self.locked_from.is_none() {
                self.locked_from = Some(self.mode);
            }
            self.mode = GizmoMode::Translate;
        } else if let Some(previous) = self.locked_from.take() {
            self.mode = previous;
        }
    }

    pub(crate) fn detach(&mut self) {
        self.attached = None;
        self.dragging = false;
        if let Some(previous) = self.locked_from.take() {
            self.mode = previous;
        }
    }

    /// Returns `false` when the change is refused.
    pub(crate) fn set_mode(&mut self, mode: GizmoMode) -> bool {
        if self.attached.is_none() || (self.is_locked() && mode != GizmoMode::Translate) {
            return false;
        }
        self.mode = mode;
        true
    }

    pub(crate) fn toggle_space(&mut self) {
        self.space = match self.space {
            GizmoSpace::World => GizmoSpace::Local,
            GizmoSpace::Local => GizmoSpace::World,
        };
    }

    pub(crate) fn begin_drag(&mut self) -> bool {
        self.dragging = self.attached.is_some();
        self.dragging
    }

    pub(crate) fn end_drag(&mut self) {
        self.dragging = false;
    }

    /// Applies one drag increment to `transform`.
    ///
    /// Translate moves by `amount`; Rotate applies XYZ euler angles in
    /// radians; Scale multiplies each axis by `1 + amount`.
    pub fn apply(&self, transform: &mut Transform, amount: Vec3) {
        match (self.mode, self.space) {
            (GizmoMode::Translate, GizmoSpace::World) => transform.translation += amount,
            (GizmoMode::Translate, GizmoSpace::Local) => {
                transform.translation += transform.rotation * amount;
            }
            (GizmoMode::Rotate, space) => {
                let delta = Quat::from_euler(EulerRot::XYZ, amount.x, amount.y, amount.z);
                transform.rotation = match space {
                    GizmoSpace::World => delta * transform.rotation,
                    GizmoSpace::Local => transform.rotation * delta,
                }
                .normalize();
            }
            (GizmoMode::Scale, _) => {
                transform.scale = (transform.scale * (Vec3::ONE + amount)).max(Vec3::splat(MIN_SCALE));
            }
        }
    }
}
