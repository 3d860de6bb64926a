// src/level/fight.rs
use crate::crowd::Crowd;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FightOutcome {
    Ongoing,
    PlayerWon,
    PlayerLost,
}

// Attrition between the player crowd and one enemy crowd: every `hit_delay`
// seconds both sides lose a man.
#[derive(Debug, Clone, PartialEq)]
pub struct CrowdFight {
    enemy_index: usize,
    hit_delay: f32,
    timer: f32,
}

impl CrowdFight {
    pub fn new(enemy_index: usize, hit_delay: f32) -> Self {
        Self {
            enemy_index,
            hit_delay: hit_delay.max(0.0),
            timer: 0.0,
        }
    }

    pub fn enemy_index(&self) -> usize {
        self.enemy_index
    }

    pub fn advance(&mut self, delta_time: f32, player: &mut Crowd, enemy: &mut Crowd) -> FightOutcome {
        self.timer += delta_time;
        while self.timer >= self.hit_delay && !player.is_defeated() && !enemy.is_defeated() {
            self.timer -= self.hit_delay;
            player.change_men_count(-1);
            enemy.change_men_count(-1);
        }

        if player.is_defeated() {
            FightOutcome::PlayerLost
        } else if enemy.is_defeated() {
            FightOutcome::PlayerWon
        } else {
            FightOutcome::Ongoing
        }
    }
}
