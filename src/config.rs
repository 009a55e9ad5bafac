//! Tunables for the screen, projection, player and enemy behavior.
//!
//! `GameConfig::default()` matches the stock level. A JSON file named by the
//! `RAYCASTER_CONFIG` environment variable may override any subset of fields.
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::core::animation::AnimationSet;
use crate::error::GameError;

pub const CONFIG_ENV_VAR: &str = "RAYCASTER_CONFIG";

/// World units per grid cell (and per wall texture).
pub const CELL_SIZE: f32 = 64.0;
/// Source sprite texture width in texels.
pub const TEX_WIDTH: usize = 64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub screen_width: u32,
    pub screen_height: u32,
    /// Horizontal field of view in degrees.
    pub fov: f32,
    pub map_path: Option<String>,

    pub player_health: i32,
    pub player_move_step: f32,
    pub player_turn_step: f32,
    pub player_weapon_damage: i32,

    pub enemy_health: i32,
    pub enemy_step_size: f32,
    pub enemy_shot_damage: i32,
    /// Per-tick chance that a visible enemy opens fire.
    pub enemy_fire_chance: f64,
    /// Countdown length is `rand(0..choices) * unit` ticks.
    pub enemy_fire_duration_choices: u32,
    pub enemy_fire_duration_unit: u32,
    /// Seconds between animation frames.
    pub animation_interval: f32,
    /// Frames per enemy state.
    pub enemy_animation: AnimationSet,

    /// Seconds an opened door waits before swinging shut.
    pub door_open_seconds: f32,
    /// Health restored by picking up an item.
    pub item_heal: i32,

    pub target_fps: u32,
    pub music_volume: f32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            screen_width: 640,
            screen_height: 480,
            fov: 60.0,
            map_path: None,
            player_health: 100,
            player_move_step: 6.0,
            player_turn_step: 3.0,
            player_weapon_damage: 5,
            enemy_health: 100,
            enemy_step_size: 3.0,
            enemy_shot_damage: 4,
            enemy_fire_chance: 0.04,
            enemy_fire_duration_choices: 4,
            enemy_fire_duration_unit: 6,
            animation_interval: 0.2,
            enemy_animation: AnimationSet::default(),
            door_open_seconds: 5.0,
            item_heal: 25,
            target_fps: 60,
            music_volume: 0.3,
        }
    }
}

impl GameConfig {
    /// Distance from the eye to the projection plane, in pixels.
    pub fn distance_to_projection(&self) -> f32 {
        (self.screen_width as f32 * 0.5) / (self.fov * 0.5).to_radians().tan()
    }

    pub fn from_json_str(raw: &str) -> Result<Self, GameError> {
        let cfg: GameConfig = serde_json::from_str(raw)?;
        cfg.validated()
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, GameError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| GameError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    /// Loads the file named by `RAYCASTER_CONFIG`, or defaults when unset.
    pub fn from_env() -> Result<Self, GameError> {
        match std::env::var(CONFIG_ENV_VAR) {
            Ok(path) if !path.trim().is_empty() => {
                info!(path = %path, "loading config");
                Self::load(path.trim())
            }
            _ => Ok(Self::default()),
        }
    }

    fn validated(self) -> Result<Self, GameError> {
        if self.screen_width == 0 || self.screen_height == 0 {
            return Err(GameError::InvalidConfig("screen dimensions must be non-zero".into()));
        }
        if !(self.fov > 0.0 && self.fov < 180.0) {
            return Err(GameError::InvalidConfig(format!("fov {} out of (0, 180)", self.fov)));
        }
        if !(0.0..=1.0).contains(&self.enemy_fire_chance) {
            return Err(GameError::InvalidConfig(format!(
                "enemy_fire_chance {} out of [0, 1]",
                self.enemy_fire_chance
            )));
        }
        if !(self.door_open_seconds >= 0.0) {
            return Err(GameError::InvalidConfig(format!(
                "door_open_seconds {} must be >= 0",
                self.door_open_seconds
            )));
        }
        if self.enemy_fire_duration_choices == 0 {
            return Err(GameError::InvalidConfig("enemy_fire_duration_choices must be >= 1".into()));
        }
        Ok(self)
    }
}
