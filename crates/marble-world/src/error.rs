//! Error types for the world controller.

use crate::material::PhysicsMaterial;
use crate::store::SaveSlot;

/// Errors surfaced by level I/O and world setup.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    #[error("Nothing saved in slot {slot}")]
    NothingSaved { slot: SaveSlot },

    #[error("Unknown built-in level: '{0}'")]
    UnknownBuiltIn(String),

    #[error("Contact material already registered for {0:?} x {1:?}")]
    DuplicateContactMaterial(PhysicsMaterial, PhysicsMaterial),

    #[error("Unknown button name: '{0}'")]
    UnknownButton(String),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type WorldResult<T> = Result<T, WorldError>;
