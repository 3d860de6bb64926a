// src/crowd/mod.rs
pub mod formation;

use glam::{Quat, Vec3};

pub use formation::hexagon_positions;

pub const LABEL_HEIGHT: f32 = 2.0;
pub const DEFAULT_MAX_MEN: u32 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CrowdId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationType {
    Idle,
    Run,
    Fight,
    Win,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Man {
    pub position: Vec3,
    pub rotation: Quat,
    pub target_local_pos: Vec3,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CountLabel {
    pub position: Vec3,
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct Crowd {
    id: CrowdId,
    anchor: Vec3,
    spacing: f32,
    men: Vec<Man>,
    animation: AnimationType,
    label: Option<CountLabel>,
    max_men: u32,
}

impl Crowd {
    pub fn new(id: CrowdId, anchor: Vec3, spacing: f32) -> Self {
        Self {
            id,
            anchor,
            spacing,
            men: Vec::new(),
            animation: AnimationType::Idle,
            label: None,
            max_men: DEFAULT_MAX_MEN,
        }
    }

    pub fn with_max_men(mut self, max_men: u32) -> Self {
        self.max_men = max_men;
        self
    }

    pub fn initialize(&mut self, men_count: u32, with_label: bool) {
        self.men.clear();
        self.animation = AnimationType::Idle;
        self.label = if with_label {
            Some(CountLabel {
                position: self.anchor + Vec3::Y * LABEL_HEIGHT,
                text: String::new(),
            })
        } else {
            None
        };
        self.change_men_count(men_count as i32);
    }

    pub fn deinitialize(&mut self) {
        self.men.clear();
        self.label = None;
        self.animation = AnimationType::Idle;
    }

    pub fn id(&self) -> CrowdId {
        self.id
    }

    pub fn anchor(&self) -> Vec3 {
        self.anchor
    }

    pub fn men(&self) -> &[Man] {
        &self.men
    }

    pub fn men_mut(&mut self) -> &mut [Man] {
        &mut self.men
    }

    pub fn men_count(&self) -> u32 {
        self.men.len() as u32
    }

    pub fn max_men(&self) -> u32 {
        self.max_men
    }

    pub fn is_defeated(&self) -> bool {
        self.men.is_empty()
    }

    pub fn animation(&self) -> AnimationType {
        self.animation
    }

    pub fn set_animation(&mut self, animation: AnimationType) {
        if self.animation != animation {
            log::debug!("crowd {:?}: {:?} -> {:?}", self.id, self.animation, animation);
        }
        self.animation = animation;
    }

    pub fn label(&self) -> Option<&CountLabel> {
        self.label.as_ref()
    }

    pub fn label_mut(&mut self) -> Option<&mut CountLabel> {
        self.label.as_mut()
    }

    // Centroid of the men, or the anchor when empty
    pub fn world_pos(&self) -> Vec3 {
        if self.men.is_empty() {
            return self.anchor;
        }
        let sum: Vec3 = self.men.iter().map(|man| man.position).sum();
        sum / self.men.len() as f32
    }

    pub fn forward_man_world_pos(&self) -> Vec3 {
        self.men
            .iter()
            .map(|man| man.position)
            .fold(None, |best: Option<Vec3>, pos| match best {
                Some(b) if b.z >= pos.z => Some(b),
                _ => Some(pos),
            })
            .unwrap_or(self.anchor)
    }

    // Count stays within [0, max_men]
    pub fn change_men_count(&mut self, delta: i32) {
        let current = self.men.len();
        let wanted = current as i64 + delta as i64;
        let target = wanted.clamp(0, self.max_men as i64) as usize;
        if wanted > self.max_men as i64 {
            log::debug!("crowd {:?} capped at {} men", self.id, self.max_men);
        }

        if target > current {
            let origin = self.world_pos();
            let offsets = hexagon_positions(target, self.spacing);
            for offset in &offsets[current..] {
                self.men.push(Man {
                    position: origin + *offset,
                    rotation: Quat::IDENTITY,
                    target_local_pos: *offset,
                });
            }
        } else {
            self.men.truncate(target);
        }

        self.refresh_label();
    }

    fn refresh_label(&mut self) {
        let count = self.men.len();
        if let Some(label) = self.label.as_mut() {
            label.text = count.to_string();
        }
    }
}
