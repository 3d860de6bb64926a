// src/config/mod.rs
use std::path::Path;
use serde::{Deserialize, Serialize};
use crate::crowd::DEFAULT_MAX_MEN;
use crate::errors::CrowdRunError;

pub const ROAD_WIDTH: f32 = 10.0;
pub const SCREEN_WIDTH: f32 = 1080.0;
pub const JUMP_HEIGHT: f32 = 2.0;
pub const JUMP_DURATION: f32 = 0.6;
pub const SLOW_DURATION: f32 = 2.0;
pub const SLOW_MULTIPLIER: f32 = 0.5;

// Missing fields in a config file take the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub road_width: f32,
    pub screen_width: f32,

    pub crowd_speed: f32,
    pub man_speed: f32,
    pub man_rot_speed: f32,

    pub jump_height: f32,
    pub jump_duration: f32,
    pub slow_duration: f32,
    pub slow_multiplier: f32,

    pub kill_reward: u32,
    pub man_hit_moment: f32,
    pub fight_animation_length: f32,

    pub formation_spacing: f32,
    pub enemy_engage_distance: f32,
    pub boss_engage_distance: f32,
    pub max_men: u32,

    pub target_fps: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            road_width: ROAD_WIDTH,
            screen_width: SCREEN_WIDTH,
            crowd_speed: 6.0,
            man_speed: 8.0,
            man_rot_speed: 1.5,
            jump_height: JUMP_HEIGHT,
            jump_duration: JUMP_DURATION,
            slow_duration: SLOW_DURATION,
            slow_multiplier: SLOW_MULTIPLIER,
            kill_reward: 5,
            man_hit_moment: 0.4,
            fight_animation_length: 0.5,
            formation_spacing: 0.5,
            enemy_engage_distance: 1.0,
            boss_engage_distance: 2.0,
            max_men: DEFAULT_MAX_MEN,
            target_fps: 60,
        }
    }
}

impl GameConfig {
    pub fn load(path: &Path) -> Result<Self, CrowdRunError> {
        if !path.exists() {
            log::info!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path)?;
        let config: GameConfig = serde_json::from_str(&raw)
            .map_err(|e| CrowdRunError::ConfigError(format!("Failed to parse {}: {}", path.display(), e)))?;
        config.validate()?;

        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<(), CrowdRunError> {
        let raw = serde_json::to_string_pretty(self)?;
        std::fs::write(path, raw)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), CrowdRunError> {
        let positive = [
            ("road_width", self.road_width),
            ("screen_width", self.screen_width),
            ("jump_duration", self.jump_duration),
            ("slow_duration", self.slow_duration),
        ];
        for (name, value) in positive {
            if !(value > 0.0) {
                return Err(CrowdRunError::ConfigError(format!("{} must be positive, got {}", name, value)));
            }
        }

        if !(0.0..=1.0).contains(&self.slow_multiplier) {
            return Err(CrowdRunError::ConfigError(format!(
                "slow_multiplier must be within [0, 1], got {}",
                self.slow_multiplier
            )));
        }

        if self.max_men == 0 {
            return Err(CrowdRunError::ConfigError("max_men must be non-zero".to_string()));
        }

        if self.target_fps == 0 {
            return Err(CrowdRunError::ConfigError("target_fps must be non-zero".to_string()));
        }

        Ok(())
    }

    pub fn road_half_width(&self) -> f32 {
        self.road_width * 0.5
    }

    // Seconds between two hits while crowds fight
    pub fn man_hit_delay(&self) -> f32 {
        self.man_hit_moment * self.fight_animation_length
    }
}
