// src/demo/mod.rs
// Built-in tracks so the binary has something to run on a fresh checkout.

use std::fs;
use std::path::{Path, PathBuf};
use glam::Vec3;

use crate::errors::CrowdRunError;
use crate::level::{loader::{write_level_file, LEVEL_EXTENSION}, BossData, EnemyCrowdData, Gate, GateOp, LevelData};

pub fn demo_level() -> LevelData {
    LevelData {
        player_start_count: 6,
        player_start: Vec3::ZERO,
        enemy_crowds: vec![EnemyCrowdData {
            position: Vec3::new(0.0, 0.0, 45.0),
            count: 8,
        }],
        gates: vec![
            Gate::new(15.0, GateOp::Add(10), GateOp::Subtract(3)),
            Gate::new(30.0, GateOp::Multiply(2), GateOp::Divide(2)),
        ],
        finish_z: Some(70.0),
        boss: None,
    }
}

pub fn demo_boss_level() -> LevelData {
    LevelData {
        player_start_count: 10,
        player_start: Vec3::ZERO,
        enemy_crowds: vec![
            EnemyCrowdData { position: Vec3::new(-2.0, 0.0, 25.0), count: 4 },
            EnemyCrowdData { position: Vec3::new(2.0, 0.0, 50.0), count: 6 },
        ],
        gates: vec![
            Gate::new(12.0, GateOp::Multiply(3), GateOp::Add(5)),
            Gate::new(38.0, GateOp::Subtract(5), GateOp::Add(8)),
        ],
        finish_z: None,
        boss: Some(BossData { z: 80.0 }),
    }
}

pub fn write_demo_levels(dir: &Path) -> Result<Vec<PathBuf>, CrowdRunError> {
    log::info!("Creating demo levels in {}", dir.display());
    fs::create_dir_all(dir)?;

    let levels = [
        ("01_meadow", "Meadow Run", demo_level()),
        ("02_fortress", "Fortress", demo_boss_level()),
    ];

    let mut paths = Vec::with_capacity(levels.len());
    for (file_stem, title, data) in &levels {
        let path = dir.join(format!("{}.{}", file_stem, LEVEL_EXTENSION));
        write_level_file(&path, title, data)?;
        paths.push(path);
    }

    Ok(paths)
}
