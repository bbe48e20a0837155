//! Normalized per-frame input.

use std::fmt;
use std::str::FromStr;

use bevy::prelude::Vec2;

use crate::error::WorldError;
use crate::material::SurfaceMaterial;

/// Discrete actions of the control panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NamedButton {
    Play,
    Edit,
    AddBox,
    AddCollectible,
    Translate,
    Rotate,
    Scale,
    ToggleSpace,
    Clone,
    Delete,
    Recenter,
    QuickSave,
    QuickLoad,
    Restart,
    Material(SurfaceMaterial),
}

impl NamedButton {
    pub fn name(self) -> &'static str {
        match self {
            Self::Play => "play",
            Self::Edit => "edit",
            Self::AddBox => "addBox",
            Self::AddCollectible => "addCollectible",
            Self::Translate => "translate",
            Self::Rotate => "rotate",
            Self::Scale => "scale",
            Self::ToggleSpace => "toggleSpace",
            Self::Clone => "clone",
            Self::Delete => "delete",
            Self::Recenter => "recenter",
            Self::QuickSave => "quickSave",
            Self::QuickLoad => "quickLoad",
            Self::Restart => "restart",
            Self::Material(SurfaceMaterial::Normal) => "material:normal",
            Self::Material(SurfaceMaterial::Slippery) => "material:slippery",
            Self::Material(SurfaceMaterial::Bouncy) => "material:bouncy",
        }
    }
}

impl fmt::Display for NamedButton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for NamedButton {
    type Err = WorldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "play" => Self::Play,
            "edit" => Self::Edit,
            "addBox" => Self::AddBox,
            "addCollectible" => Self::AddCollectible,
            "translate" => Self::Translate,
            "rotate" => Self::Rotate,
            "scale" => Self::Scale,
            "toggleSpace" => Self::ToggleSpace,
            "clone" => Self::Clone,
            "delete" => Self::Delete,
            "recenter" => Self::Recenter,
            "quickSave" => Self::QuickSave,
            "quickLoad" => Self::QuickLoad,
            "restart" => Self::Restart,
            "material:normal" => Self::Material(SurfaceMaterial::Normal),
            "material:slippery" => Self::Material(SurfaceMaterial::Slippery),
            "material:bouncy" => Self::Material(SurfaceMaterial::Bouncy),
            _ => return Err(WorldError::UnknownButton(s.to_string())),
        })
    }
}

/// Input gathered for one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputState {
    /// Movement axis, `x` right and `y` forward, each in `[-1, 1]`.
    pub movement: Vec2,
    pub jump_held: bool,
    /// Pointer in normalized device coordinates, `None` when outside the view.
    pub pointer: Option<Vec2>,
    /// Primary button pressed this frame.
    pub clicked: bool,
    /// Buttons pressed this frame, in press order.
    pub buttons: Vec<NamedButton>,
}

impl InputState {
    pub fn with_buttons(buttons: impl IntoIterator<Item = NamedButton>) -> Self {
        Self {
            buttons: buttons.into_iter().collect(),
            ..Self::default()
        }
    }
}
