// src/main.rs
use std::path::PathBuf;
use std::time::Duration;
use glam::Vec2;
use log::info;

use crowdrun::{
    demo,
    input::{InputEvent, Key},
    saves::SaveManager,
    CrowdRunEngine, CrowdRunError, EngineState, GameConfig, LevelLoader,
};

// Frames a level may run before the autopilot gives up on it.
const MAX_LEVEL_FRAMES: u64 = 60 * 120;
const BOSS_WIN_COUNT: u32 = 10;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    info!("Starting Crowd Run...");

    let root = std::env::current_dir()?;
    let config = GameConfig::load(&root.join("crowdrun.json"))?;

    let levels_dir = root.join("levels");
    let loader = LevelLoader::new(levels_dir.clone());
    let mut levels = loader.load_all().unwrap_or_default();
    if levels.is_empty() {
        demo::write_demo_levels(&levels_dir)?;
        levels = loader.load_all()?;
    }

    let mut saves = SaveManager::new(root.join("saves"));
    let secret_key = std::env::var("CROWDRUN_SECRET").unwrap_or_else(|_| "default_key".to_string());
    saves.set_game_context("crowdrun".to_string(), &secret_key)?;
    info!("Completed levels so far: {:?}", saves.completed_levels(levels.len() as u32));

    let mut engine = CrowdRunEngine::new(config, Box::new(saves));
    for (index, (level_info, data)) in levels.iter().enumerate() {
        info!(
            "Playing {} ({}), {} enemies on the track",
            level_info.title,
            level_info.id,
            data.enemies_at_start()
        );
        engine.load_level(index as u32, data);

        let outcome = run_level(&mut engine).await?;
        info!("{} finished: {:?}", level_info.title, outcome);
    }

    engine.shutdown();
    Ok(())
}

async fn run_level(engine: &mut CrowdRunEngine) -> Result<EngineState, CrowdRunError> {
    let fps = engine.config().target_fps.max(1);
    let delta_time = 1.0 / fps as f32;
    let mut interval = tokio::time::interval(Duration::from_secs_f64(1.0 / fps as f64));

    let start_frame = engine.frames();
    loop {
        interval.tick().await;

        let frame = engine.frames() - start_frame;
        for event in autopilot(frame, engine.config().screen_width) {
            engine.submit_input(event);
        }
        engine.tick(delta_time);

        let boss_waiting = engine.state() == EngineState::Running
            && engine.mover().is_stopped()
            && engine.level().and_then(|level| level.boss()).map_or(false, |boss| boss.is_engaged());
        if boss_waiting {
            let men = engine.level().map_or(0, |level| level.player_crowd().men_count());
            engine.finish_boss_fight(men >= BOSS_WIN_COUNT);
        }

        if engine.state().is_finished() {
            return Ok(engine.state());
        }
        if frame >= MAX_LEVEL_FRAMES {
            log::warn!("Level did not finish within {} frames", MAX_LEVEL_FRAMES);
            return Ok(engine.state());
        }
    }
}

fn autopilot(frame: u64, screen_width: f32) -> Vec<InputEvent> {
    let centre = Vec2::new(screen_width * 0.5, 0.0);
    match frame {
        0 => vec![InputEvent::KeyPressed(Key::Return)],
        1 => vec![InputEvent::KeyReleased(Key::Return)],
        60 => vec![InputEvent::PointerPressed(centre)],
        61..=90 => vec![InputEvent::PointerMoved(centre - Vec2::new(8.0 * (frame - 60) as f32, 0.0))],
        91..=150 => vec![InputEvent::PointerMoved(centre + Vec2::new(4.0 * (frame as f32 - 120.0), 0.0))],
        151 => vec![InputEvent::PointerReleased],
        180 => vec![InputEvent::KeyPressed(Key::Space)],
        181 => vec![InputEvent::KeyReleased(Key::Space)],
        300 => vec![InputEvent::KeyPressed(Key::LShift)],
        301 => vec![InputEvent::KeyReleased(Key::LShift)],
        _ => Vec::new(),
    }
}
