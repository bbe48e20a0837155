//! World configuration.
//!
//! Every field has a default, so a config file only needs the values it
//! overrides.

use std::path::Path;

use bevy::prelude::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::WorldResult;
use crate::physics::default_gravity;

/// Session-wide coefficients the control panel can change while playing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tunables {
    /// Velocity added along the ground normal on jump (m/s).
    pub jump_height: f32,
    /// Friction between the player and `Slippery` surfaces.
    pub slipperiness: f32,
    /// Restitution between the player and `Bouncy` surfaces.
    pub bounciness: f32,
}

impl Default for Tunables {
    fn default() -> Self {
        Self {
            jump_height: 5.0,
            slipperiness: 0.0,
            bounciness: 1.2,
        }
    }
}

/// Fixed parameters of the player ball.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub radius: f32,
    pub mass: f32,
    /// Torque impulse per second applied along the steering axis.
    pub roll_speed: f32,
    /// Velocity change per second applied while airborne.
    pub air_control: f32,
    /// Seconds after a jump during which contacts do not count as ground.
    pub jump_cooldown: f32,
    /// Minimum `normal · down` for a contact to count as ground.
    pub steepness: f32,
    pub linear_damping: f32,
    pub angular_damping: f32,
    pub color: u32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            radius: 0.5,
            mass: 1.0,
            roll_speed: 12.0,
            air_control: 2.0,
            jump_cooldown: 0.2,
            steepness: 0.7,
            linear_damping: 0.1,
            angular_damping: 0.4,
            color: 0x00e0_4040,
        }
    }
}

/// Top-level world configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    pub player: PlayerConfig,
    pub tunables: Tunables,
    /// Editor camera pan speed (m/s).
    pub edit_speed: f32,
    /// Longest frame the simulation will integrate in one step (s).
    pub max_frame_dt: f32,
    pub gravity: [f32; 3],
    /// Players falling below this height respawn at the start marker.
    pub fall_reset_height: f32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            player: PlayerConfig::default(),
            tunables: Tunables::default(),
            edit_speed: 10.0,
            max_frame_dt: 1.0 / 30.0,
            gravity: default_gravity().to_array(),
            fall_reset_height: -30.0,
        }
    }
}

impl WorldConfig {
    /// Loads a configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Loads a configuration from a JSON file.
    pub fn from_path(path: &Path) -> WorldResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Ok(Self::from_json(&json)?)
    }

    pub fn gravity(&self) -> Vec3 {
        Vec3::from_array(self.gravity)
    }

    /// Clamps a measured frame time to the simulation's stability limit.
    pub fn clamp_frame_dt(&self, dt: f32) -> f32 {
        dt.min(self.max_frame_dt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config = WorldConfig::from_json(r#"{ "edit_speed": 4.0, "player": { "radius": 0.75 } }"#)
            .expect("Failed to parse config");

        assert_eq!(config.edit_speed, 4.0);
        assert_eq!(config.player.radius, 0.75);
        assert_eq!(config.player.steepness, 0.7);
        assert_eq!(config.tunables, Tunables::default());
    }

    #[test]
    fn test_clamp_frame_dt() {
        let config = WorldConfig::default();
        assert_eq!(config.clamp_frame_dt(0.5), config.max_frame_dt);
        assert_eq!(config.clamp_frame_dt(0.01), 0.01);
    }

    #[test]
    fn test_config_json_roundtrip() {
        let config = WorldConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(WorldConfig::from_json(&json).unwrap(), config);
    }
}
