// src/events/mod.rs

use std::collections::{HashMap, HashSet, VecDeque};
use glam::{Vec2, Vec3};
use crate::crowd::CrowdId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    GameUpdate,
    Drag,
    Jump,
    SlowDown,
    LevelLoad,
    LevelStartClick,
    CrowdFightStart,
    CrowdFightEnd,
    BossFightStart,
    BossFightEnd,
    FinishAchieved,
    GameLoose,
    LevelEnd,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    Drag(Vec2),
    Jump,
    SlowDown,
    LevelLoad { crowd: CrowdId, origin: Vec3 },
    LevelStartClick,
    CrowdFightStart,
    CrowdFightEnd,
    BossFightStart,
    BossFightEnd { player_won: bool },
    FinishAchieved,
    GameLoose,
    LevelEnd { reward: u32 },
}

impl GameEvent {
    pub fn channel(&self) -> Channel {
        match self {
            GameEvent::Drag(_) => Channel::Drag,
            GameEvent::Jump => Channel::Jump,
            GameEvent::SlowDown => Channel::SlowDown,
            GameEvent::LevelLoad { .. } => Channel::LevelLoad,
            GameEvent::LevelStartClick => Channel::LevelStartClick,
            GameEvent::CrowdFightStart => Channel::CrowdFightStart,
            GameEvent::CrowdFightEnd => Channel::CrowdFightEnd,
            GameEvent::BossFightStart => Channel::BossFightStart,
            GameEvent::BossFightEnd { .. } => Channel::BossFightEnd,
            GameEvent::FinishAchieved => Channel::FinishAchieved,
            GameEvent::GameLoose => Channel::GameLoose,
            GameEvent::LevelEnd { .. } => Channel::LevelEnd,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubscriberId {
    CrowdMover,
    Level,
}

#[derive(Debug, Default)]
pub struct EventBus {
    subscriptions: HashMap<Channel, HashSet<SubscriberId>>,
    // Drained by the engine in publish order, never re-entrantly
    pending: VecDeque<GameEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, subscriber: SubscriberId, channel: Channel) {
        self.subscriptions.entry(channel).or_default().insert(subscriber);
    }

    pub fn unsubscribe(&mut self, subscriber: SubscriberId, channel: Channel) {
        if let Some(subscribers) = self.subscriptions.get_mut(&channel) {
            subscribers.remove(&subscriber);
            if subscribers.is_empty() {
                self.subscriptions.remove(&channel);
            }
        }
    }

    pub fn subscribe_all(&mut self, subscriber: SubscriberId, channels: &[Channel]) {
        for channel in channels {
            self.subscribe(subscriber, *channel);
        }
    }

    pub fn unsubscribe_all(&mut self, subscriber: SubscriberId, channels: &[Channel]) {
        for channel in channels {
            self.unsubscribe(subscriber, *channel);
        }
    }

    pub fn is_subscribed(&self, subscriber: SubscriberId, channel: Channel) -> bool {
        self.subscriptions
            .get(&channel)
            .map_or(false, |subscribers| subscribers.contains(&subscriber))
    }

    pub fn channels_of(&self, subscriber: SubscriberId) -> Vec<Channel> {
        self.subscriptions
            .iter()
            .filter(|(_, subscribers)| subscribers.contains(&subscriber))
            .map(|(channel, _)| *channel)
            .collect()
    }

    pub fn publish(&mut self, event: GameEvent) {
        log::trace!("publish {:?}", event);
        self.pending.push_back(event);
    }

    pub fn next_event(&mut self) -> Option<GameEvent> {
        self.pending.pop_front()
    }
}
