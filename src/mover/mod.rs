// src/mover/mod.rs
pub mod effects;

use glam::{Mat3, Quat, Vec2, Vec3};

use crate::{
    config::GameConfig,
    crowd::{AnimationType, Crowd, CrowdId},
    events::{Channel, EventBus, GameEvent, SubscriberId},
};

pub use effects::{JumpEffect, SlowEffect};

// Channels the mover listens on. Registration and teardown both walk this list.
pub const MOVER_CHANNELS: [Channel; 11] = [
    Channel::GameUpdate,
    Channel::Drag,
    Channel::Jump,
    Channel::SlowDown,
    Channel::LevelLoad,
    Channel::LevelStartClick,
    Channel::CrowdFightStart,
    Channel::BossFightStart,
    Channel::CrowdFightEnd,
    Channel::FinishAchieved,
    Channel::GameLoose,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoverState {
    Stopped,
    Running,
    Fighting,
}

pub struct CrowdMover {
    crowd: Option<CrowdId>,
    leash_pos: Vec3,
    initial_y: f32,
    orientation: Quat,

    jump: JumpEffect,
    slow: SlowEffect,

    crowd_speed: f32,
    man_speed: f32,
    man_rot_speed: f32,
    road_width: f32,
    road_half_width: f32,
    screen_width: f32,

    state: MoverState,
    initialized: bool,
}

impl CrowdMover {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            crowd: None,
            leash_pos: Vec3::ZERO,
            initial_y: 0.0,
            orientation: Quat::IDENTITY,
            jump: JumpEffect::new(config.jump_height, config.jump_duration),
            slow: SlowEffect::new(config.slow_duration, config.slow_multiplier),
            crowd_speed: config.crowd_speed,
            man_speed: config.man_speed,
            man_rot_speed: config.man_rot_speed,
            road_width: config.road_width,
            road_half_width: config.road_half_width(),
            screen_width: config.screen_width,
            state: MoverState::Stopped,
            initialized: false,
        }
    }

    pub fn initialize(&mut self, config: &GameConfig, bus: &mut EventBus) {
        self.road_width = config.road_width;
        self.road_half_width = config.road_half_width();
        self.screen_width = config.screen_width;
        self.crowd_speed = config.crowd_speed;
        self.man_speed = config.man_speed;
        self.man_rot_speed = config.man_rot_speed;
        self.jump = JumpEffect::new(config.jump_height, config.jump_duration);
        self.slow = SlowEffect::new(config.slow_duration, config.slow_multiplier);

        if !self.initialized {
            bus.subscribe_all(SubscriberId::CrowdMover, &MOVER_CHANNELS);
            self.initialized = true;
        }
    }

    pub fn deinitialize(&mut self, bus: &mut EventBus) {
        self.stop_the_crowd();
        bus.unsubscribe_all(SubscriberId::CrowdMover, &MOVER_CHANNELS);
        self.initialized = false;
    }

    pub fn handle_event(&mut self, event: &GameEvent, crowd: Option<&mut Crowd>) {
        match event {
            GameEvent::Drag(direction) => self.move_leash_x(*direction),
            GameEvent::Jump => self.jump(),
            GameEvent::SlowDown => self.slow_down(),
            GameEvent::LevelLoad { crowd: id, origin } => self.get_level_data(*id, *origin),
            GameEvent::LevelStartClick | GameEvent::CrowdFightEnd => self.run_the_crowd(crowd),
            GameEvent::CrowdFightStart | GameEvent::BossFightStart => self.set_crowd_fight_mode(crowd),
            GameEvent::FinishAchieved => self.stop_the_crowd(),
            GameEvent::GameLoose => self.re_init(),
            GameEvent::BossFightEnd { .. } | GameEvent::LevelEnd { .. } => {}
        }
    }

    fn get_level_data(&mut self, crowd: CrowdId, origin: Vec3) {
        self.crowd = Some(crowd);
        self.leash_pos = origin;
        self.initial_y = origin.y;
    }

    pub fn move_leash_x(&mut self, drag_direction: Vec2) {
        let step = self.road_width * (drag_direction.x / self.screen_width);
        self.leash_pos.x = (self.leash_pos.x + step).clamp(-self.road_half_width, self.road_half_width);
    }

    pub fn jump(&mut self) {
        if self.is_stopped() {
            return;
        }
        if self.jump.start() {
            log::debug!("jump");
        }
    }

    pub fn slow_down(&mut self) {
        if self.is_stopped() {
            return;
        }
        self.slow.start();
        log::debug!("slow down for {}s", self.slow.duration);
    }

    fn stop_the_crowd(&mut self) {
        self.state = MoverState::Stopped;
    }

    fn run_the_crowd(&mut self, crowd: Option<&mut Crowd>) {
        self.state = MoverState::Running;
        if let Some(crowd) = self.bound(crowd) {
            crowd.set_animation(AnimationType::Run);
        }
    }

    fn set_crowd_fight_mode(&mut self, crowd: Option<&mut Crowd>) {
        self.state = MoverState::Fighting;
        if let Some(crowd) = self.bound(crowd) {
            crowd.set_animation(AnimationType::Fight);
        }
    }

    fn re_init(&mut self) {
        self.stop_the_crowd();
        self.crowd = None;
        self.leash_pos = Vec3::ZERO;
        self.jump.reset();
        self.slow.reset();
    }

    fn bound<'a>(&self, crowd: Option<&'a mut Crowd>) -> Option<&'a mut Crowd> {
        crowd.filter(|crowd| Some(crowd.id()) == self.crowd)
    }

    pub fn advance(&mut self, delta_time: f32, crowd: Option<&mut Crowd>) {
        if self.is_stopped() {
            return;
        }
        let Some(crowd) = self.bound(crowd) else {
            return;
        };

        self.slow.advance(delta_time);
        if self.slow.is_active() {
            let degrees = self.slow.spin_degrees_per_second() * delta_time;
            self.orientation = (self.orientation * Quat::from_rotation_y(degrees.to_radians())).normalize();
        }

        let speed_multiplier = self.slow.speed_multiplier();
        let delta_crowd_speed = self.crowd_speed * delta_time * speed_multiplier;
        let delta_man_speed = self.man_speed * delta_time * speed_multiplier;

        if self.jump.is_active() {
            let lift = self.jump.advance(delta_time);
            self.leash_pos.y = self.initial_y + lift;
        }

        self.leash_pos.z += delta_crowd_speed;
        self.move_men(crowd, delta_man_speed);
        self.update_label_positioning(crowd, delta_crowd_speed);
    }

    fn move_men(&self, crowd: &mut Crowd, delta_speed: f32) {
        let t = delta_speed.clamp(0.0, 1.0);
        let rot_t = (delta_speed * self.man_rot_speed).clamp(0.0, 1.0);

        for man in crowd.men_mut() {
            let target_pos = self.leash_pos + man.target_local_pos;
            let target_rot = look_rotation(target_pos - man.position);

            man.position = man.position.lerp(target_pos, t);
            man.rotation = man.rotation.lerp(target_rot, rot_t);
        }
    }

    fn update_label_positioning(&self, crowd: &mut Crowd, delta_speed: f32) {
        let Some(label) = crowd.label_mut() else {
            return;
        };
        let target = Vec3::new(self.leash_pos.x, label.position.y, self.leash_pos.z);
        label.position = label.position.lerp(target, delta_speed.clamp(0.0, 1.0));
    }

    pub fn leash_pos(&self) -> Vec3 {
        self.leash_pos
    }

    pub fn orientation(&self) -> Quat {
        self.orientation
    }

    pub fn state(&self) -> MoverState {
        self.state
    }

    pub fn is_stopped(&self) -> bool {
        self.state != MoverState::Running
    }

    pub fn is_jumping(&self) -> bool {
        self.jump.is_active()
    }

    pub fn is_slowed(&self) -> bool {
        self.slow.is_active()
    }

    pub fn bound_crowd(&self) -> Option<CrowdId> {
        self.crowd
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }
}

// Rotation whose forward (+Z) axis points along `direction`, with +Y up.
// A zero direction yields the identity.
pub fn look_rotation(direction: Vec3) -> Quat {
    let forward = direction.normalize_or_zero();
    if forward == Vec3::ZERO {
        return Quat::IDENTITY;
    }

    let right = Vec3::Y.cross(forward);
    if right.length_squared() < 1e-8 {
        // Straight up or down: no unique roll, take the shortest arc.
        return Quat::from_rotation_arc(Vec3::Z, forward);
    }
    let right = right.normalize();
    let up = forward.cross(right);
    Quat::from_mat3(&Mat3::from_cols(right, up, forward))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> GameConfig {
        GameConfig {
            road_width: 10.0,
            screen_width: 1000.0,
            crowd_speed: 4.0,
            man_speed: 5.0,
            ..Default::default()
        }
    }

    fn running_mover(crowd: &mut Crowd) -> (CrowdMover, EventBus) {
        let config = config();
        let mut bus = EventBus::new();
        let mut mover = CrowdMover::new(&config);
        mover.initialize(&config, &mut bus);
        mover.handle_event(
            &GameEvent::LevelLoad { crowd: crowd.id(), origin: crowd.anchor() },
            Some(&mut *crowd),
        );
        mover.handle_event(&GameEvent::LevelStartClick, Some(&mut *crowd));
        (mover, bus)
    }

    fn player_crowd() -> Crowd {
        let mut crowd = Crowd::new(CrowdId(0), Vec3::ZERO, 0.5);
        crowd.initialize(5, true);
        crowd
    }

    #[test]
    fn drag_is_clamped_to_half_the_road() {
        let mut mover = CrowdMover::new(&config());
        mover.move_leash_x(Vec2::new(300.0, 0.0));
        assert!((mover.leash_pos().x - 3.0).abs() < 1e-5);
        mover.move_leash_x(Vec2::new(300.0, 0.0));
        assert_eq!(mover.leash_pos().x, 5.0);
        for _ in 0..50 {
            mover.move_leash_x(Vec2::new(-900.0, 12.0));
        }
        assert_eq!(mover.leash_pos().x, -5.0);
    }

    #[test]
    fn jump_and_slow_are_ignored_while_stopped() {
        let mut mover = CrowdMover::new(&config());
        mover.jump();
        mover.slow_down();
        assert!(!mover.is_jumping());
        assert!(!mover.is_slowed());
    }

    #[test]
    fn advance_without_crowd_is_a_no_op() {
        let config = config();
        let mut bus = EventBus::new();
        let mut mover = CrowdMover::new(&config);
        mover.initialize(&config, &mut bus);
        mover.handle_event(&GameEvent::LevelStartClick, None);
        mover.advance(0.5, None);
        assert_eq!(mover.leash_pos(), Vec3::ZERO);

        let mut stranger = Crowd::new(CrowdId(9), Vec3::ZERO, 0.5);
        stranger.initialize(2, false);
        mover.advance(0.5, Some(&mut stranger));
        assert_eq!(mover.leash_pos(), Vec3::ZERO);
    }

    #[test]
    fn autorun_moves_leash_and_men_forward() {
        let mut crowd = player_crowd();
        let (mut mover, _bus) = running_mover(&mut crowd);
        assert_eq!(crowd.animation(), AnimationType::Run);

        mover.advance(0.1, Some(&mut crowd));
        assert!((mover.leash_pos().z - 0.4).abs() < 1e-5);

        // Exponential approach: half of the gap closes with t = 0.5.
        let lead = &crowd.men()[0];
        assert!((lead.position.z - 0.2).abs() < 1e-5, "z = {}", lead.position.z);
    }

    #[test]
    fn slow_halves_speed_and_spins() {
        let mut crowd = player_crowd();
        let (mut mover, _bus) = running_mover(&mut crowd);
        mover.slow_down();
        mover.advance(0.5, Some(&mut crowd));
        assert!((mover.leash_pos().z - 1.0).abs() < 1e-5);
        assert!(mover.orientation().angle_between(Quat::IDENTITY) > 1.0);

        mover.advance(1.5, Some(&mut crowd));
        assert!(!mover.is_slowed());
        // The tick that expires the effect already runs at full speed.
        assert!((mover.leash_pos().z - 7.0).abs() < 1e-4);
    }

    #[test]
    fn fight_mode_stops_and_sets_animation() {
        let mut crowd = player_crowd();
        let (mut mover, _bus) = running_mover(&mut crowd);
        mover.handle_event(&GameEvent::CrowdFightStart, Some(&mut crowd));
        assert_eq!(mover.state(), MoverState::Fighting);
        assert_eq!(crowd.animation(), AnimationType::Fight);

        let before = mover.leash_pos();
        mover.advance(1.0, Some(&mut crowd));
        assert_eq!(mover.leash_pos(), before);

        mover.handle_event(&GameEvent::CrowdFightEnd, Some(&mut crowd));
        assert_eq!(mover.state(), MoverState::Running);
        assert_eq!(crowd.animation(), AnimationType::Run);
    }

    #[test]
    fn round_loss_clears_everything() {
        let mut crowd = player_crowd();
        let (mut mover, _bus) = running_mover(&mut crowd);
        mover.move_leash_x(Vec2::new(200.0, 0.0));
        mover.jump();
        mover.slow_down();
        mover.handle_event(&GameEvent::GameLoose, Some(&mut crowd));

        assert!(mover.is_stopped());
        assert_eq!(mover.bound_crowd(), None);
        assert_eq!(mover.leash_pos(), Vec3::ZERO);
        assert!(!mover.is_jumping());
        assert!(!mover.is_slowed());
    }

    #[test]
    fn teardown_drops_every_registered_channel() {
        let config = config();
        let mut bus = EventBus::new();
        let mut mover = CrowdMover::new(&config);
        mover.initialize(&config, &mut bus);
        let registered = bus.channels_of(SubscriberId::CrowdMover);
        assert_eq!(registered.len(), MOVER_CHANNELS.len());

        mover.deinitialize(&mut bus);
        assert!(bus.channels_of(SubscriberId::CrowdMover).is_empty());
    }

    #[test]
    fn look_rotation_points_forward_axis() {
        let dir = Vec3::new(1.0, 0.0, 1.0);
        let rot = look_rotation(dir);
        let forward = rot * Vec3::Z;
        assert!(forward.distance(dir.normalize()) < 1e-5);
        assert_eq!(look_rotation(Vec3::ZERO), Quat::IDENTITY);
        let up = look_rotation(Vec3::Y) * Vec3::Z;
        assert!(up.distance(Vec3::Y) < 1e-5);
    }
}
