//! Surface materials and contact-material pairs.
//!
//! Rapier has no notion of material pairs, so the table below is installed as
//! the pipeline's physics hooks and overrides friction/restitution on every
//! solver contact between two registered materials.

use rapier3d::prelude::{ContactModificationContext, PhysicsHooks};
use serde::{Deserialize, Serialize};

use crate::config::Tunables;
use crate::error::{WorldError, WorldResult};
use crate::physics::ColliderTag;

/// Surface behavior of a level obstacle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SurfaceMaterial {
    #[default]
    Normal,
    Slippery,
    Bouncy,
}

impl SurfaceMaterial {
    /// Contact parameters of this surface against the player.
    pub fn contact_params(self, tunables: &Tunables) -> ContactParams {
        match self {
            Self::Normal => ContactParams::NORMAL,
            Self::Slippery => ContactParams {
                friction: tunables.slipperiness,
                restitution: ContactParams::NORMAL.restitution,
            },
            Self::Bouncy => ContactParams {
                friction: ContactParams::NORMAL.friction,
                restitution: tunables.bounciness,
            },
        }
    }

    pub(crate) fn code(self) -> u32 {
        match self {
            Self::Normal => 0,
            Self::Slippery => 1,
            Self::Bouncy => 2,
        }
    }

    /// Default editor color for objects created with this material.
    pub fn default_color(self) -> u32 {
        match self {
            Self::Normal => 0x008a_8a8a,
            Self::Slippery => 0x007f_d4ff,
            Self::Bouncy => 0x00ff_7f50,
        }
    }
}

/// Material attached to a collider for contact resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhysicsMaterial {
    Player,
    Surface(SurfaceMaterial),
}

impl PhysicsMaterial {
    pub(crate) fn code(self) -> u32 {
        match self {
            Self::Player => 0,
            Self::Surface(surface) => 1 + surface.code(),
        }
    }

    pub(crate) fn from_code(code: u32) -> Option<Self> {
        Some(match code {
            0 => Self::Player,
            1 => Self::Surface(SurfaceMaterial::Normal),
            2 => Self::Surface(SurfaceMaterial::Slippery),
            3 => Self::Surface(SurfaceMaterial::Bouncy),
            _ => return None,
        })
    }
}

/// Friction and restitution of a contact.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactParams {
    pub friction: f32,
    pub restitution: f32,
}

impl ContactParams {
    pub const NORMAL: ContactParams = ContactParams {
        friction: 0.3,
        restitution: 0.3,
    };
}

#[derive(Debug, Clone)]
struct ContactMaterialEntry {
    a: PhysicsMaterial,
    b: PhysicsMaterial,
    params: ContactParams,
}

impl ContactMaterialEntry {
    fn matches(&self, a: PhysicsMaterial, b: PhysicsMaterial) -> bool {
        (self.a == a && self.b == b) || (self.a == b && self.b == a)
    }
}

/// Registered contact-material pairs.
#[derive(Debug, Clone, Default)]
pub struct ContactMaterialTable {
    entries: Vec<ContactMaterialEntry>,
}

impl ContactMaterialTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a pair. A pair can only be registered once; later changes
    /// go through [`Self::set`].
    pub fn register(
        &mut self,
        a: PhysicsMaterial,
        b: PhysicsMaterial,
        params: ContactParams,
    ) -> WorldResult<()> {
        if self.entries.iter().any(|e| e.matches(a, b)) {
            return Err(WorldError::DuplicateContactMaterial(a, b));
        }
        self.entries.push(ContactMaterialEntry { a, b, params });
        Ok(())
    }

    /// Mutates the coefficients of a registered pair in place.
    /// Returns false if the pair was never registered.
    pub fn set(&mut self, a: PhysicsMaterial, b: PhysicsMaterial, params: ContactParams) -> bool {
        match self.entries.iter_mut().find(|e| e.matches(a, b)) {
            Some(entry) => {
                entry.params = params;
                true
            }
            None => false,
        }
    }

    pub fn get(&self, a: PhysicsMaterial, b: PhysicsMaterial) -> Option<ContactParams> {
        self.entries.iter().find(|e| e.matches(a, b)).map(|e| e.params)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl PhysicsHooks for ContactMaterialTable {
    fn modify_solver_contacts(&self, context: &mut ContactModificationContext) {
        let colliders = context.colliders;
        let material = |handle| {
            colliders
                .get(handle)
                .and_then(|c| ColliderTag::decode(c.user_data))
                .map(|tag| tag.material)
        };

        let (Some(a), Some(b)) = (material(context.collider1), material(context.collider2)) else {
            return;
        };
        let Some(params) = self.get(a, b) else {
            return;
        };

        for contact in context.solver_contacts.iter_mut() {
            contact.friction = params.friction;
            contact.restitution = params.restitution;
        }
    }
}
