// src/engine/mod.rs
use crate::{
    config::GameConfig,
    events::{Channel, EventBus, GameEvent, SubscriberId},
    input::{InputEvent, InputManager},
    level::{Level, LevelData, PLAYER_CROWD_ID},
    mover::CrowdMover,
    saves::PreferenceStore,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Idle,
    Ready,
    Running,
    Won { reward: u32 },
    Lost,
}

impl EngineState {
    pub fn is_finished(&self) -> bool {
        matches!(self, EngineState::Won { .. } | EngineState::Lost)
    }
}

pub struct CrowdRunEngine {
    config: GameConfig,
    bus: EventBus,
    mover: CrowdMover,
    level: Option<Level>,
    saves: Box<dyn PreferenceStore>,
    input: InputManager,

    state: EngineState,
    frames: u64,
}

impl CrowdRunEngine {
    pub fn new(config: GameConfig, saves: Box<dyn PreferenceStore>) -> Self {
        log::info!("Initializing crowd run engine...");

        let mut bus = EventBus::new();
        let mut mover = CrowdMover::new(&config);
        mover.initialize(&config, &mut bus);

        Self {
            config,
            bus,
            mover,
            level: None,
            saves,
            input: InputManager::new(),
            state: EngineState::Idle,
            frames: 0,
        }
    }

    pub fn load_level(&mut self, lvl_num: u32, data: &LevelData) {
        self.unload_level();
        log::info!("Loading level {}", lvl_num);

        // A lost round unbinds the mover but keeps it subscribed; a manual
        // shutdown does not, so make sure it is listening again.
        self.mover.initialize(&self.config, &mut self.bus);

        let mut level = Level::new(data, &self.config);
        level.initialize(lvl_num, &mut self.bus);
        let origin = level.player_origin();
        self.level = Some(level);

        self.bus.publish(GameEvent::LevelLoad { crowd: PLAYER_CROWD_ID, origin });
        self.dispatch();
        self.state = EngineState::Ready;
    }

    pub fn unload_level(&mut self) {
        if let Some(mut level) = self.level.take() {
            if level.is_initialized() {
                level.deinitialize(&mut self.bus);
            }
            log::info!("Unloaded level {}", level.lvl_num());
        }
        self.state = EngineState::Idle;
    }

    pub fn start_level(&mut self) {
        if self.state != EngineState::Ready {
            log::warn!("Start requested in state {:?}, ignoring", self.state);
            return;
        }
        self.bus.publish(GameEvent::LevelStartClick);
        self.dispatch();
    }

    pub fn finish_boss_fight(&mut self, player_won: bool) {
        self.bus.publish(GameEvent::BossFightEnd { player_won });
        self.dispatch();
    }

    pub fn submit_input(&mut self, event: InputEvent) {
        self.input.handle_input_event(&event);
    }

    // Input notifications, then the mover, then the level
    pub fn tick(&mut self, delta_time: f32) {
        self.frames += 1;

        for event in self.input.poll_game_events() {
            if event == GameEvent::LevelStartClick && self.state != EngineState::Ready {
                continue;
            }
            self.bus.publish(event);
        }
        self.input.update();
        self.dispatch();

        if self.bus.is_subscribed(SubscriberId::CrowdMover, Channel::GameUpdate) {
            let crowd = self.level.as_mut().map(|level| level.player_crowd_mut());
            self.mover.advance(delta_time, crowd);
            self.dispatch();
        }

        if self.bus.is_subscribed(SubscriberId::Level, Channel::GameUpdate) {
            if let Some(level) = self.level.as_mut() {
                level.advance(delta_time, &mut self.bus, self.saves.as_mut());
            }
            self.dispatch();
        }
    }

    fn dispatch(&mut self) {
        while let Some(event) = self.bus.next_event() {
            let channel = event.channel();

            if self.bus.is_subscribed(SubscriberId::CrowdMover, channel) {
                let crowd = self.level.as_mut().map(|level| level.player_crowd_mut());
                self.mover.handle_event(&event, crowd);
            }

            if self.bus.is_subscribed(SubscriberId::Level, channel) {
                if let Some(level) = self.level.as_mut() {
                    level.handle_event(&event, &mut self.bus, self.saves.as_mut());
                }
            }

            self.observe(&event);
        }
    }

    fn observe(&mut self, event: &GameEvent) {
        match event {
            GameEvent::LevelStartClick if self.state == EngineState::Ready => {
                log::info!("Level started");
                self.state = EngineState::Running;
            }
            GameEvent::LevelEnd { reward } => {
                log::info!("Level won, reward: {}", reward);
                self.state = EngineState::Won { reward: *reward };
            }
            GameEvent::GameLoose => {
                log::info!("Level lost");
                self.state = EngineState::Lost;
            }
            _ => {}
        }
    }

    pub fn shutdown(&mut self) {
        self.unload_level();
        self.mover.deinitialize(&mut self.bus);
        log::info!("Engine shut down after {} frames", self.frames);
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn mover(&self) -> &CrowdMover {
        &self.mover
    }

    pub fn level(&self) -> Option<&Level> {
        self.level.as_ref()
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn saves(&self) -> &dyn PreferenceStore {
        self.saves.as_ref()
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}
