//! Level data model and JSON codec.
//!
//! The on-disk shape is shared by downloaded files, the persistent store
//! slots, and the bundled built-in levels.

use bevy::prelude::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::error::{WorldError, WorldResult};
use crate::material::SurfaceMaterial;

/// Threshold value meaning "not set".
pub const UNSET_TIME: f32 = -1.0;

/// `{x, y, z}` position or scale.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3Data {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl From<Vec3> for Vec3Data {
    fn from(v: Vec3) -> Self {
        Self {
            x: v.x,
            y: v.y,
            z: v.z,
        }
    }
}

impl From<Vec3Data> for Vec3 {
    fn from(v: Vec3Data) -> Self {
        Vec3::new(v.x, v.y, v.z)
    }
}

/// `{x, y, z, w}` orientation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuatData {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Default for QuatData {
    fn default() -> Self {
        Quat::IDENTITY.into()
    }
}

impl From<Quat> for QuatData {
    fn from(q: Quat) -> Self {
        Self {
            x: q.x,
            y: q.y,
            z: q.z,
            w: q.w,
        }
    }
}

impl From<QuatData> for Quat {
    /// Components are taken as-is, without normalization.
    fn from(q: QuatData) -> Self {
        Quat::from_xyzw(q.x, q.y, q.z, q.w)
    }
}

/// A static obstacle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub position: Vec3Data,
    pub quaternion: QuatData,
    pub scale: Vec3Data,
    /// Packed `0xRRGGBB`.
    pub color: u32,
    pub material: SurfaceMaterial,
}

/// Level name and medal thresholds in seconds (`-1` when unset).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelMetadata {
    #[serde(rename = "Level Name")]
    pub name: String,
    #[serde(rename = "Bronze Time")]
    pub bronze_time: f32,
    #[serde(rename = "Silver Time")]
    pub silver_time: f32,
    #[serde(rename = "Gold Time")]
    pub gold_time: f32,
    #[serde(rename = "Diamond Time")]
    pub diamond_time: f32,
}

impl Default for LevelMetadata {
    fn default() -> Self {
        Self {
            name: "Untitled".to_string(),
            bronze_time: UNSET_TIME,
            silver_time: UNSET_TIME,
            gold_time: UNSET_TIME,
            diamond_time: UNSET_TIME,
        }
    }
}

/// Complete level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Level {
    pub starting_position: Vec3Data,
    pub finishing_position: Vec3Data,
    #[serde(default)]
    pub obstacles: Vec<Obstacle>,
    #[serde(default)]
    pub collectibles: Vec<Vec3Data>,
    #[serde(default)]
    pub metadata: LevelMetadata,
}

/// A schema violation found by [`Level::validate`].
#[derive(Debug, Clone, PartialEq)]
pub enum LevelIssue {
    NonPositiveScale { obstacle: usize },
    NonUnitQuaternion { obstacle: usize, length: f32 },
    NegativeThreshold { medal: &'static str, value: f32 },
}

impl Level {
    /// An empty level with start and finish markers only.
    pub fn empty(start: Vec3, finish: Vec3) -> Self {
        Self {
            starting_position: start.into(),
            finishing_position: finish.into(),
            obstacles: Vec::new(),
            collectibles: Vec::new(),
            metadata: LevelMetadata::default(),
        }
    }

    /// Loads a level from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serializes the level to a JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Reports schema violations. Loading never rejects a level; callers log these.
    pub fn validate(&self) -> Vec<LevelIssue> {
        let mut issues = Vec::new();

        for (i, obstacle) in self.obstacles.iter().enumerate() {
            let scale = obstacle.scale;
            if scale.x <= 0.0 || scale.y <= 0.0 || scale.z <= 0.0 {
                issues.push(LevelIssue::NonPositiveScale { obstacle: i });
            }
            let length = Quat::from(obstacle.quaternion).length();
            if (length - 1.0).abs() > 1e-3 {
                issues.push(LevelIssue::NonUnitQuaternion {
                    obstacle: i,
                    length,
                });
            }
        }

        let meta = &self.metadata;
        for (medal, value) in [
            ("bronze", meta.bronze_time),
            ("silver", meta.silver_time),
            ("gold", meta.gold_time),
            ("diamond", meta.diamond_time),
        ] {
            if value < 0.0 && value != UNSET_TIME {
                issues.push(LevelIssue::NegativeThreshold { medal, value });
            }
        }

        issues
    }
}

/// Curated levels bundled with the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltInLevel {
    Default,
    Tutorial,
    Trampoline,
}

impl BuiltInLevel {
    pub const ALL: [BuiltInLevel; 3] = [Self::Default, Self::Tutorial, Self::Trampoline];

    pub fn name(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Tutorial => "tutorial",
            Self::Trampoline => "trampoline",
        }
    }

    pub fn from_name(name: &str) -> WorldResult<Self> {
        Self::ALL
            .into_iter()
            .find(|level| level.name() == name)
            .ok_or_else(|| WorldError::UnknownBuiltIn(name.to_string()))
    }

    fn json(self) -> &'static str {
        match self {
            Self::Default => include_str!("../levels/default.json"),
            Self::Tutorial => include_str!("../levels/tutorial.json"),
            Self::Trampoline => include_str!("../levels/trampoline.json"),
        }
    }

    /// Parses the bundled level data.
    pub fn load(self) -> Level {
        Level::from_json(self.json()).expect("Failed to parse built-in level JSON")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_levels_parse() {
        for level in BuiltInLevel::ALL {
            let parsed = level.load();
            assert!(parsed.validate().is_empty(), "{} has issues", level.name());
        }
        assert_eq!(BuiltInLevel::Default.load().metadata.name, "First Roll");
    }

    #[test]
    fn test_unknown_builtin() {
        assert!(matches!(
            BuiltInLevel::from_name("nope"),
            Err(WorldError::UnknownBuiltIn(_))
        ));
        assert_eq!(BuiltInLevel::from_name("tutorial").unwrap(), BuiltInLevel::Tutorial);
    }

    #[test]
    fn test_json_field_names() {
        let json = r#"{
            "startingPosition": { "x": 0, "y": 1, "z": 0 },
            "finishingPosition": { "x": 0, "y": 1, "z": -20 },
            "obstacles": [
                {
                    "position": { "x": 0, "y": 0, "z": 0 },
                    "quaternion": { "x": 0, "y": 0, "z": 0, "w": 1 },
                    "scale": { "x": 10, "y": 1, "z": 10 },
                    "color": 16711680,
                    "material": "SLIPPERY"
                }
            ],
            "collectibles": [{ "x": 1, "y": 2, "z": 3 }],
            "metadata": {
                "Level Name": "Test",
                "Bronze Time": 30,
                "Silver Time": 20,
                "Gold Time": 10,
                "Diamond Time": -1
            }
        }"#;

        let level = Level::from_json(json).expect("Failed to parse JSON");
        assert_eq!(level.obstacles.len(), 1);
        assert_eq!(level.obstacles[0].material, SurfaceMaterial::Slippery);
        assert_eq!(level.obstacles[0].color, 0x00ff_0000);
        assert_eq!(level.collectibles[0], Vec3Data { x: 1.0, y: 2.0, z: 3.0 });
        assert_eq!(level.metadata.name, "Test");
        assert_eq!(level.metadata.diamond_time, UNSET_TIME);

        let out = level.to_json().unwrap();
        assert!(out.contains("\"startingPosition\""));
        assert!(out.contains("\"Level Name\""));
        assert!(out.contains("\"SLIPPERY\""));
    }

    #[test]
    fn test_unknown_material_is_rejected() {
        let json = r#"{
            "startingPosition": { "x": 0, "y": 0, "z": 0 },
            "finishingPosition": { "x": 0, "y": 0, "z": 0 },
            "obstacles": [{
                "position": { "x": 0, "y": 0, "z": 0 },
                "quaternion": { "x": 0, "y": 0, "z": 0, "w": 1 },
                "scale": { "x": 1, "y": 1, "z": 1 },
                "color": 0,
                "material": "GLUE"
            }],
            "collectibles": [],
            "metadata": { "Level Name": "", "Bronze Time": -1, "Silver Time": -1, "Gold Time": -1, "Diamond Time": -1 }
        }"#;
        assert!(Level::from_json(json).is_err());
    }

    #[test]
    fn test_validate_reports_but_keeps_garbage() {
        let mut level = Level::empty(Vec3::ZERO, Vec3::X);
        level.obstacles.push(Obstacle {
            position: Vec3Data::default(),
            quaternion: QuatData {
                x: 0.0,
                y: 0.0,
                z: 0.0,
                w: 2.0,
            },
            scale: Vec3Data {
                x: 1.0,
                y: 0.0,
                z: 1.0,
            },
            color: 0,
            material: SurfaceMaterial::Normal,
        });
        level.metadata.gold_time = -5.0;

        let issues = level.validate();
        assert_eq!(issues.len(), 3);
        assert!(issues.contains(&LevelIssue::NonPositiveScale { obstacle: 0 }));
        assert!(issues.contains(&LevelIssue::NegativeThreshold {
            medal: "gold",
            value: -5.0
        }));

        // The quaternion survives a round trip untouched
        let reloaded = Level::from_json(&level.to_json().unwrap()).unwrap();
        assert_eq!(reloaded.obstacles[0].quaternion.w, 2.0);
    }

    #[test]
    fn test_float_roundtrip_is_exact() {
        let q = Quat::from_euler(bevy::math::EulerRot::XYZ, 0.1, 0.7, -1.3);
        let mut level = Level::empty(Vec3::new(0.1, 0.2, 0.3), Vec3::new(1.0 / 3.0, 2.0, 5.5));
        level.obstacles.push(Obstacle {
            position: Vec3::new(1.234_567, -7.654_321, 1e-7).into(),
            quaternion: q.into(),
            scale: Vec3::new(0.3, 3.3, 33.3).into(),
            color: 0x0012_3456,
            material: SurfaceMaterial::Bouncy,
        });

        let reloaded = Level::from_json(&level.to_json().unwrap()).unwrap();
        assert_eq!(reloaded, level);
    }
}
