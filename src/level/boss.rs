// src/level/boss.rs
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BossData {
    pub z: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Boss {
    z: f32,
    engaged: bool,
}

impl Boss {
    pub fn new(data: &BossData) -> Self {
        Self {
            z: data.z,
            engaged: false,
        }
    }

    pub fn initialize(&mut self) {
        self.engaged = false;
    }

    pub fn z(&self) -> f32 {
        self.z
    }

    pub fn is_engaged(&self) -> bool {
        self.engaged
    }

    // Latches the engagement when the lead man is within `engage_distance`.
    pub fn try_engage(&mut self, lead_z: f32, engage_distance: f32) -> bool {
        if self.engaged || lead_z < self.z - engage_distance {
            return false;
        }
        self.engaged = true;
        true
    }
}
