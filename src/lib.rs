// ============================================================================
// FILE: src/lib.rs - Library Root
// ============================================================================
pub mod config;
pub mod crowd;
pub mod crypto;
pub mod demo;
pub mod engine;
pub mod errors;
pub mod events;
pub mod input;
pub mod level;
pub mod mover;
pub mod saves;

pub use config::GameConfig;
pub use engine::{CrowdRunEngine, EngineState};
pub use errors::CrowdRunError;
pub use events::{EventBus, GameEvent};
pub use level::{Level, LevelData, LevelLoader};
pub use mover::CrowdMover;
