// src/level/data.rs
use glam::Vec3;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{boss::BossData, gate::Gate};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelInfo {
    pub id: Uuid,
    pub title: String,
    pub version: String,
    pub checksum: String, // SHA-256 of the level data block
}

impl LevelInfo {
    pub fn new(title: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            title,
            version: "1.0.0".to_string(),
            checksum: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyCrowdData {
    pub position: Vec3,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelData {
    pub player_start_count: u32,
    #[serde(default)]
    pub player_start: Vec3,
    #[serde(default)]
    pub enemy_crowds: Vec<EnemyCrowdData>,
    #[serde(default)]
    pub gates: Vec<Gate>,
    #[serde(default)]
    pub finish_z: Option<f32>,
    #[serde(default)]
    pub boss: Option<BossData>,
}

impl LevelData {
    pub fn enemies_at_start(&self) -> u32 {
        self.enemy_crowds.iter().map(|crowd| crowd.count).sum()
    }
}
