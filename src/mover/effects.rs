// src/mover/effects.rs
use std::f32::consts::PI;

// Parabolic hop of the leash: `height * sin(pi * progress)` over `duration`.
#[derive(Debug, Clone, PartialEq)]
pub struct JumpEffect {
    pub height: f32,
    pub duration: f32,
    active: bool,
    timer: f32,
}

impl JumpEffect {
    pub fn new(height: f32, duration: f32) -> Self {
        Self {
            height,
            duration,
            active: false,
            timer: 0.0,
        }
    }

    pub fn start(&mut self) -> bool {
        if self.active {
            return false;
        }
        self.active = true;
        self.timer = 0.0;
        true
    }

    pub fn advance(&mut self, delta_time: f32) -> f32 {
        if !self.active {
            return 0.0;
        }

        self.timer += delta_time;
        let progress = self.progress();
        if progress >= 1.0 {
            self.active = false;
            0.0
        } else {
            self.height * (progress * PI).sin()
        }
    }

    pub fn progress(&self) -> f32 {
        self.timer / self.duration
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn reset(&mut self) {
        self.active = false;
        self.timer = 0.0;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SlowEffect {
    pub duration: f32,
    pub multiplier: f32,
    active: bool,
    timer: f32,
}

impl SlowEffect {
    pub fn new(duration: f32, multiplier: f32) -> Self {
        Self {
            duration,
            multiplier,
            active: false,
            timer: 0.0,
        }
    }

    pub fn start(&mut self) {
        self.active = true;
        self.timer = 0.0;
    }

    pub fn advance(&mut self, delta_time: f32) {
        if !self.active {
            return;
        }
        self.timer += delta_time;
        if self.timer >= self.duration {
            self.active = false;
        }
    }

    pub fn speed_multiplier(&self) -> f32 {
        if self.active {
            self.multiplier
        } else {
            1.0
        }
    }

    pub fn spin_degrees_per_second(&self) -> f32 {
        360.0 / self.duration
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn elapsed(&self) -> f32 {
        self.timer
    }

    pub fn reset(&mut self) {
        self.active = false;
        self.timer = 0.0;
    }
}
