// src/level/mod.rs

pub mod boss;
pub mod data;
pub mod fight;
pub mod gate;
pub mod loader;

use glam::Vec3;

use crate::{
    config::GameConfig,
    crowd::{AnimationType, Crowd, CrowdId},
    events::{Channel, EventBus, GameEvent, SubscriberId},
    saves::{level_done_key, PreferenceStore},
};

pub use boss::{Boss, BossData};
pub use data::{EnemyCrowdData, LevelData, LevelInfo};
pub use fight::{CrowdFight, FightOutcome};
pub use gate::{Gate, GateOp};
pub use loader::LevelLoader;

pub const LEVEL_CHANNELS: [Channel; 2] = [Channel::GameUpdate, Channel::BossFightEnd];

pub const PLAYER_CROWD_ID: CrowdId = CrowdId(0);

// Finish line tracked outside the player crowd, e.g. a race mode.
pub trait FinishCounter {
    fn finish_count(&self) -> u32;

    fn finish_race(&mut self, _player_won: bool) {}
}

pub struct Level {
    lvl_num: u32,
    kill_reward: u32,
    hit_delay: f32,
    enemy_engage_distance: f32,
    boss_engage_distance: f32,

    player_start_count: u32,
    player_crowd: Crowd,
    enemy_start_counts: Vec<u32>,
    enemy_crowds: Vec<Crowd>,
    gates: Vec<Gate>,
    gate_ind: usize,
    finish_z: Option<f32>,
    boss: Option<Boss>,
    finish_counter: Option<Box<dyn FinishCounter>>,
    fight: Option<CrowdFight>,

    enemies_defeated: u32,
    players_finished: u32,
    lvl_reward: u32,

    level_ended: bool,
    initialized: bool,
}

impl Level {
    pub fn new(data: &LevelData, config: &GameConfig) -> Self {
        let spacing = config.formation_spacing;
        let enemy_crowds = data
            .enemy_crowds
            .iter()
            .enumerate()
            .map(|(i, enemy)| {
                Crowd::new(CrowdId(i as u32 + 1), enemy.position, spacing).with_max_men(config.max_men)
            })
            .collect();

        Self {
            lvl_num: 0,
            kill_reward: config.kill_reward,
            hit_delay: config.man_hit_delay(),
            enemy_engage_distance: config.enemy_engage_distance,
            boss_engage_distance: config.boss_engage_distance,
            player_start_count: data.player_start_count,
            player_crowd: Crowd::new(PLAYER_CROWD_ID, data.player_start, spacing).with_max_men(config.max_men),
            enemy_start_counts: data.enemy_crowds.iter().map(|enemy| enemy.count).collect(),
            enemy_crowds,
            gates: data.gates.clone(),
            gate_ind: 0,
            finish_z: data.finish_z,
            boss: data.boss.as_ref().map(Boss::new),
            finish_counter: None,
            fight: None,
            enemies_defeated: 0,
            players_finished: 0,
            lvl_reward: 0,
            level_ended: false,
            initialized: false,
        }
    }

    pub fn initialize(&mut self, lvl_num: u32, bus: &mut EventBus) {
        self.lvl_num = lvl_num;
        self.level_ended = false;
        self.gate_ind = 0;
        self.fight = None;

        if let Some(boss) = self.boss.as_mut() {
            boss.initialize();
        }

        self.player_crowd.initialize(self.player_start_count, true);

        self.enemies_defeated = 0;
        for (crowd, count) in self.enemy_crowds.iter_mut().zip(&self.enemy_start_counts) {
            crowd.initialize(*count, false);
            self.enemies_defeated += crowd.men_count();
        }
        log::info!("Initial enemies count: {}", self.enemies_defeated);

        self.lvl_reward = self.enemies_defeated.saturating_mul(self.kill_reward);
        log::info!("Initial reward set to: {}", self.lvl_reward);

        bus.subscribe_all(SubscriberId::Level, &LEVEL_CHANNELS);
        self.initialized = true;
    }

    pub fn deinitialize(&mut self, bus: &mut EventBus) {
        bus.unsubscribe_all(SubscriberId::Level, &LEVEL_CHANNELS);

        self.lvl_reward = 0;
        self.enemies_defeated = 0;
        self.players_finished = 0;
        self.fight = None;

        self.player_crowd.deinitialize();
        for crowd in &mut self.enemy_crowds {
            crowd.deinitialize();
        }
        self.initialized = false;
    }

    pub fn attach_finish_counter(&mut self, counter: Box<dyn FinishCounter>) {
        self.finish_counter = Some(counter);
    }

    pub fn handle_event(&mut self, event: &GameEvent, bus: &mut EventBus, saves: &mut dyn PreferenceStore) {
        if let GameEvent::BossFightEnd { player_won } = event {
            log::info!("Boss fight over, player won: {}", player_won);
            self.end_level(*player_won, bus, saves);
        }
    }

    pub fn advance(&mut self, delta_time: f32, bus: &mut EventBus, saves: &mut dyn PreferenceStore) {
        if !self.initialized {
            return;
        }

        if self.check_finish_achieved(bus, saves) {
            return;
        }
        if self.check_gates_achieved(bus, saves) {
            return;
        }
        self.reconcile_finish_counter();

        self.check_enemy_engagement(bus);
        if self.update_fight(delta_time, bus, saves) {
            return;
        }
        self.check_boss_reached(bus);
    }

    fn check_finish_achieved(&mut self, bus: &mut EventBus, saves: &mut dyn PreferenceStore) -> bool {
        let Some(finish_z) = self.finish_z else {
            return false;
        };
        if self.level_ended || self.player_crowd.world_pos().z <= finish_z {
            return false;
        }

        self.player_crowd.set_animation(AnimationType::Win);
        self.players_finished = self.player_crowd.men_count();
        if let Some(counter) = self.finish_counter.as_mut() {
            counter.finish_race(true);
        }
        self.recompute_reward();

        bus.publish(GameEvent::FinishAchieved);
        self.end_level(true, bus, saves);
        true
    }

    // Returns true when the gate wiped out the crowd and ended the level.
    fn check_gates_achieved(&mut self, bus: &mut EventBus, saves: &mut dyn PreferenceStore) -> bool {
        let Some(gate) = self.gates.get(self.gate_ind) else {
            return false;
        };

        let man_pos = self.player_crowd.forward_man_world_pos();
        if man_pos.z < gate.z {
            return false;
        }

        let value = gate.catalyse(man_pos, self.player_crowd.men_count());
        self.gate_ind += 1;
        self.player_crowd.change_men_count(value);
        log::debug!(
            "Gate {} passed: {:+} men, now {}",
            self.gate_ind,
            value,
            self.player_crowd.men_count()
        );

        if self.player_crowd.is_defeated() {
            log::info!("Crowd wiped out at gate {}", self.gate_ind);
            self.end_level(false, bus, saves);
            return true;
        }
        false
    }

    fn reconcile_finish_counter(&mut self) {
        let Some(counter) = self.finish_counter.as_ref() else {
            return;
        };
        let current_finished = counter.finish_count();
        if current_finished != self.players_finished {
            self.players_finished = current_finished;
            self.recompute_reward();
        }
    }

    fn check_enemy_engagement(&mut self, bus: &mut EventBus) {
        if self.fight.is_some() {
            return;
        }

        let lead_z = self.player_crowd.forward_man_world_pos().z;
        let engage_distance = self.enemy_engage_distance;
        let target = self
            .enemy_crowds
            .iter()
            .position(|enemy| !enemy.is_defeated() && lead_z >= enemy.world_pos().z - engage_distance);

        if let Some(index) = target {
            log::info!(
                "Crowd fight: {} vs {} men",
                self.player_crowd.men_count(),
                self.enemy_crowds[index].men_count()
            );
            self.fight = Some(CrowdFight::new(index, self.hit_delay));
            self.enemy_crowds[index].set_animation(AnimationType::Fight);
            bus.publish(GameEvent::CrowdFightStart);
        }
    }

    // Returns true when the fight ended the level.
    fn update_fight(&mut self, delta_time: f32, bus: &mut EventBus, saves: &mut dyn PreferenceStore) -> bool {
        let Some(fight) = self.fight.as_mut() else {
            return false;
        };
        let enemy = &mut self.enemy_crowds[fight.enemy_index()];

        match fight.advance(delta_time, &mut self.player_crowd, enemy) {
            FightOutcome::Ongoing => false,
            FightOutcome::PlayerWon => {
                log::info!("Crowd fight won with {} men left", self.player_crowd.men_count());
                enemy.deinitialize();
                self.fight = None;
                bus.publish(GameEvent::CrowdFightEnd);
                false
            }
            FightOutcome::PlayerLost => {
                log::info!("Crowd fight lost");
                self.fight = None;
                self.end_level(false, bus, saves);
                true
            }
        }
    }

    fn check_boss_reached(&mut self, bus: &mut EventBus) {
        let lead_z = self.player_crowd.forward_man_world_pos().z;
        let engage_distance = self.boss_engage_distance;
        if let Some(boss) = self.boss.as_mut() {
            if boss.try_engage(lead_z, engage_distance) {
                log::info!("Boss reached at z = {}", boss.z());
                bus.publish(GameEvent::BossFightStart);
            }
        }
    }

    fn recompute_reward(&mut self) {
        self.lvl_reward = self
            .enemies_defeated
            .saturating_add(self.players_finished)
            .saturating_mul(self.kill_reward);
    }

    fn end_level(&mut self, is_player_win: bool, bus: &mut EventBus, saves: &mut dyn PreferenceStore) {
        if !self.initialized {
            return;
        }

        if is_player_win && !self.level_ended {
            self.level_ended = true;

            saves.set_int(&level_done_key(self.lvl_num), 1);
            if let Err(e) = saves.flush() {
                log::warn!("Failed to persist completion of level {}: {}", self.lvl_num, e);
            }

            log::info!("Sending final reward: {}", self.lvl_reward);
            bus.publish(GameEvent::LevelEnd { reward: self.lvl_reward });
        } else if !is_player_win {
            bus.publish(GameEvent::GameLoose);
        }

        self.deinitialize(bus);
    }

    pub fn lvl_num(&self) -> u32 {
        self.lvl_num
    }

    pub fn player_crowd(&self) -> &Crowd {
        &self.player_crowd
    }

    pub fn player_crowd_mut(&mut self) -> &mut Crowd {
        &mut self.player_crowd
    }

    pub fn player_origin(&self) -> Vec3 {
        self.player_crowd.anchor()
    }

    pub fn enemy_crowds(&self) -> &[Crowd] {
        &self.enemy_crowds
    }

    pub fn boss(&self) -> Option<&Boss> {
        self.boss.as_ref()
    }

    pub fn gates_consumed(&self) -> usize {
        self.gate_ind
    }

    pub fn reward(&self) -> u32 {
        self.lvl_reward
    }

    pub fn enemies_defeated(&self) -> u32 {
        self.enemies_defeated
    }

    pub fn players_finished(&self) -> u32 {
        self.players_finished
    }

    pub fn is_fighting(&self) -> bool {
        self.fight.is_some()
    }

    pub fn is_ended(&self) -> bool {
        self.level_ended
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::saves::MemoryStore;
    use std::cell::Cell;
    use std::rc::Rc;

    fn config() -> GameConfig {
        GameConfig {
            kill_reward: 5,
            ..Default::default()
        }
    }

    fn level(data: &LevelData, bus: &mut EventBus) -> Level {
        let mut level = Level::new(data, &config());
        level.initialize(3, bus);
        level
    }

    fn walk_crowd_to(level: &mut Level, z: f32) {
        for man in level.player_crowd_mut().men_mut() {
            man.position.z = z + man.target_local_pos.z;
        }
    }

    fn drain(bus: &mut EventBus) -> Vec<GameEvent> {
        std::iter::from_fn(|| bus.next_event()).collect()
    }

    fn empty_track(count: u32) -> LevelData {
        LevelData {
            player_start_count: count,
            player_start: Vec3::ZERO,
            enemy_crowds: Vec::new(),
            gates: Vec::new(),
            finish_z: None,
            boss: None,
        }
    }

    #[test]
    fn initial_reward_counts_every_enemy() {
        let mut data = empty_track(4);
        data.enemy_crowds = vec![
            EnemyCrowdData { position: Vec3::new(0.0, 0.0, 500.0), count: 6 },
            EnemyCrowdData { position: Vec3::new(0.0, 0.0, 600.0), count: 4 },
        ];
        let mut bus = EventBus::new();
        let level = level(&data, &mut bus);
        assert_eq!(level.enemies_defeated(), 10);
        assert_eq!(level.reward(), 50);
        assert_eq!(level.player_crowd().men_count(), 4);
        assert!(bus.is_subscribed(SubscriberId::Level, Channel::GameUpdate));
    }

    #[test]
    fn finish_pays_out_once_and_persists() {
        let mut data = empty_track(4);
        data.enemy_crowds = vec![EnemyCrowdData { position: Vec3::new(0.0, 0.0, 900.0), count: 10 }];
        data.finish_z = Some(30.0);
        let mut bus = EventBus::new();
        let mut saves = MemoryStore::default();
        let mut level = level(&data, &mut bus);

        walk_crowd_to(&mut level, 31.0);
        level.advance(0.016, &mut bus, &mut saves);
        level.advance(0.016, &mut bus, &mut saves);

        assert_eq!(
            drain(&mut bus),
            vec![GameEvent::FinishAchieved, GameEvent::LevelEnd { reward: 70 }]
        );
        assert!(level.is_ended());
        assert!(!level.is_initialized());
        assert_eq!(saves.get_int(&level_done_key(3), 0), 1);
        assert!(bus.channels_of(SubscriberId::Level).is_empty());
    }

    #[test]
    fn missing_finish_never_ends_the_level() {
        let mut bus = EventBus::new();
        let mut saves = MemoryStore::default();
        let mut level = level(&empty_track(3), &mut bus);
        walk_crowd_to(&mut level, 10_000.0);
        level.advance(0.016, &mut bus, &mut saves);
        assert!(!level.is_ended());
        assert!(drain(&mut bus).is_empty());
    }

    #[test]
    fn gates_are_consumed_one_at_a_time_in_order() {
        let mut data = empty_track(2);
        data.gates = vec![
            Gate::new(5.0, GateOp::Add(3), GateOp::Add(3)),
            Gate::new(6.0, GateOp::Multiply(2), GateOp::Multiply(2)),
        ];
        let mut bus = EventBus::new();
        let mut saves = MemoryStore::default();
        let mut level = level(&data, &mut bus);

        level.advance(0.016, &mut bus, &mut saves);
        assert_eq!(level.gates_consumed(), 0);

        walk_crowd_to(&mut level, 10.0);
        level.advance(0.016, &mut bus, &mut saves);
        assert_eq!(level.gates_consumed(), 1);
        assert_eq!(level.player_crowd().men_count(), 5);

        walk_crowd_to(&mut level, 10.0);
        level.advance(0.016, &mut bus, &mut saves);
        assert_eq!(level.gates_consumed(), 2);
        assert_eq!(level.player_crowd().men_count(), 10);

        level.advance(0.016, &mut bus, &mut saves);
        assert_eq!(level.gates_consumed(), 2);
    }

    #[test]
    fn gate_that_empties_the_crowd_loses_the_level() {
        let mut data = empty_track(4);
        data.gates = vec![Gate::new(3.0, GateOp::Subtract(10), GateOp::Subtract(10))];
        data.finish_z = Some(20.0);
        let mut bus = EventBus::new();
        let mut saves = MemoryStore::default();
        let mut level = level(&data, &mut bus);

        walk_crowd_to(&mut level, 3.5);
        level.advance(0.016, &mut bus, &mut saves);

        assert_eq!(drain(&mut bus), vec![GameEvent::GameLoose]);
        assert_eq!(level.gates_consumed(), 1);
        assert!(!level.is_ended());
        assert!(!level.is_initialized());
        assert!(bus.channels_of(SubscriberId::Level).is_empty());
        assert_eq!(saves.get_int(&level_done_key(3), 0), 0);
        assert_eq!(saves.flush_count(), 0);

        level.advance(0.016, &mut bus, &mut saves);
        assert!(drain(&mut bus).is_empty());
    }

    #[test]
    fn huge_multiplier_is_capped_by_config() {
        let mut data = empty_track(4);
        data.gates = vec![Gate::new(3.0, GateOp::Multiply(u32::MAX), GateOp::Multiply(u32::MAX))];
        data.finish_z = Some(20.0);
        let config = GameConfig { max_men: 50, ..config() };
        let mut bus = EventBus::new();
        let mut saves = MemoryStore::default();
        let mut level = Level::new(&data, &config);
        level.initialize(3, &mut bus);

        walk_crowd_to(&mut level, 3.5);
        level.advance(0.016, &mut bus, &mut saves);

        assert_eq!(level.gates_consumed(), 1);
        assert_eq!(level.player_crowd().men_count(), 50);
        assert!(drain(&mut bus).is_empty());
    }

    struct SharedCounter(Rc<Cell<u32>>, Rc<Cell<bool>>);

    impl FinishCounter for SharedCounter {
        fn finish_count(&self) -> u32 {
            self.0.get()
        }

        fn finish_race(&mut self, player_won: bool) {
            self.1.set(player_won);
        }
    }

    #[test]
    fn finish_counter_drives_the_reward() {
        let mut data = empty_track(3);
        data.enemy_crowds = vec![EnemyCrowdData { position: Vec3::new(0.0, 0.0, 900.0), count: 2 }];
        data.finish_z = Some(50.0);
        let mut bus = EventBus::new();
        let mut saves = MemoryStore::default();
        let mut level = level(&data, &mut bus);

        let finished = Rc::new(Cell::new(0));
        let raced = Rc::new(Cell::new(false));
        level.attach_finish_counter(Box::new(SharedCounter(finished.clone(), raced.clone())));

        finished.set(6);
        level.advance(0.016, &mut bus, &mut saves);
        assert_eq!(level.players_finished(), 6);
        assert_eq!(level.reward(), 40);

        walk_crowd_to(&mut level, 60.0);
        level.advance(0.016, &mut bus, &mut saves);
        assert!(raced.get());
        assert!(drain(&mut bus).contains(&GameEvent::LevelEnd { reward: 25 }));
    }

    #[test]
    fn losing_a_crowd_fight_ends_without_reward() {
        let mut data = empty_track(2);
        data.enemy_crowds = vec![EnemyCrowdData { position: Vec3::new(0.0, 0.0, 10.0), count: 8 }];
        data.finish_z = Some(100.0);
        let mut bus = EventBus::new();
        let mut saves = MemoryStore::default();
        let mut level = level(&data, &mut bus);

        walk_crowd_to(&mut level, 9.5);
        level.advance(0.016, &mut bus, &mut saves);
        assert!(level.is_fighting());
        assert_eq!(drain(&mut bus), vec![GameEvent::CrowdFightStart]);

        for _ in 0..10 {
            level.advance(0.25, &mut bus, &mut saves);
        }
        assert_eq!(drain(&mut bus), vec![GameEvent::GameLoose]);
        assert!(!level.is_ended());
        assert!(!level.is_initialized());
        assert_eq!(saves.get_int(&level_done_key(3), 0), 0);
    }

    #[test]
    fn winning_a_crowd_fight_resumes_the_run() {
        let mut data = empty_track(6);
        data.enemy_crowds = vec![EnemyCrowdData { position: Vec3::new(0.0, 0.0, 10.0), count: 2 }];
        let mut bus = EventBus::new();
        let mut saves = MemoryStore::default();
        let mut level = level(&data, &mut bus);

        walk_crowd_to(&mut level, 9.5);
        level.advance(0.016, &mut bus, &mut saves);
        level.advance(1.0, &mut bus, &mut saves);

        assert_eq!(drain(&mut bus), vec![GameEvent::CrowdFightStart, GameEvent::CrowdFightEnd]);
        assert!(!level.is_fighting());
        assert_eq!(level.player_crowd().men_count(), 4);
        assert!(level.enemy_crowds()[0].is_defeated());

        // A defeated crowd does not start a second fight.
        level.advance(0.016, &mut bus, &mut saves);
        assert!(drain(&mut bus).is_empty());
    }

    #[test]
    fn boss_engages_once_and_its_outcome_ends_the_level() {
        let mut data = empty_track(5);
        data.boss = Some(BossData { z: 40.0 });
        let mut bus = EventBus::new();
        let mut saves = MemoryStore::default();
        let mut level = level(&data, &mut bus);

        walk_crowd_to(&mut level, 39.0);
        level.advance(0.016, &mut bus, &mut saves);
        level.advance(0.016, &mut bus, &mut saves);
        assert_eq!(drain(&mut bus), vec![GameEvent::BossFightStart]);

        level.handle_event(&GameEvent::BossFightEnd { player_won: true }, &mut bus, &mut saves);
        level.handle_event(&GameEvent::BossFightEnd { player_won: true }, &mut bus, &mut saves);
        assert_eq!(drain(&mut bus), vec![GameEvent::LevelEnd { reward: 0 }]);
        assert_eq!(saves.get_int(&level_done_key(3), 0), 1);
    }
}
