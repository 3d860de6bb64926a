// src/input/mod.rs
use std::collections::{HashMap, HashSet};
use glam::Vec2;
use crate::events::GameEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Space,
    Return,
    Up,
    Down,
    W,
    S,
    LShift,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    PointerPressed(Vec2),
    PointerMoved(Vec2),
    PointerReleased,
    KeyPressed(Key),
    KeyReleased(Key),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputButton {
    Key(Key),
    Pointer,
}

pub struct InputManager {
    // Keyboard state
    keys_pressed: HashSet<Key>,
    keys_just_pressed: HashSet<Key>,

    // Pointer state
    pointer_down: bool,
    pointer_just_pressed: bool,
    pointer_position: Vec2,
    drag_delta: Vec2,

    // Input mapping
    input_map: HashMap<String, Vec<InputButton>>,
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new()
    }
}

impl InputManager {
    pub fn new() -> Self {
        let mut input = Self {
            keys_pressed: HashSet::new(),
            keys_just_pressed: HashSet::new(),
            pointer_down: false,
            pointer_just_pressed: false,
            pointer_position: Vec2::ZERO,
            drag_delta: Vec2::ZERO,
            input_map: HashMap::new(),
        };
        input.setup_default_mappings();
        input
    }

    pub fn handle_input_event(&mut self, event: &InputEvent) {
        match event {
            InputEvent::KeyPressed(key) => {
                if !self.keys_pressed.contains(key) {
                    self.keys_just_pressed.insert(*key);
                }
                self.keys_pressed.insert(*key);
            }
            InputEvent::KeyReleased(key) => {
                self.keys_pressed.remove(key);
            }
            InputEvent::PointerPressed(position) => {
                if !self.pointer_down {
                    self.pointer_just_pressed = true;
                }
                self.pointer_down = true;
                self.pointer_position = *position;
            }
            InputEvent::PointerMoved(position) => {
                // Only a held pointer drags the crowd
                if self.pointer_down {
                    self.drag_delta += *position - self.pointer_position;
                }
                self.pointer_position = *position;
            }
            InputEvent::PointerReleased => {
                self.pointer_down = false;
            }
        }
    }

    // Order is fixed: start, drag, jump, slow.
    pub fn poll_game_events(&self) -> Vec<GameEvent> {
        let mut events = Vec::new();

        if self.is_action_just_pressed("start") {
            events.push(GameEvent::LevelStartClick);
        }
        if self.drag_delta != Vec2::ZERO {
            events.push(GameEvent::Drag(self.drag_delta));
        }
        if self.is_action_just_pressed("jump") {
            events.push(GameEvent::Jump);
        }
        if self.is_action_just_pressed("slow_down") {
            events.push(GameEvent::SlowDown);
        }

        events
    }

    pub fn update(&mut self) {
        // Clear "just pressed" states
        self.keys_just_pressed.clear();
        self.pointer_just_pressed = false;

        self.drag_delta = Vec2::ZERO;
    }

    pub fn is_key_just_pressed(&self, key: Key) -> bool {
        self.keys_just_pressed.contains(&key)
    }

    // Input mapping system
    pub fn map_input(&mut self, action_name: String, buttons: Vec<InputButton>) {
        self.input_map.insert(action_name, buttons);
    }

    pub fn is_action_just_pressed(&self, action_name: &str) -> bool {
        if let Some(buttons) = self.input_map.get(action_name) {
            buttons.iter().any(|button| self.is_input_button_just_pressed(*button))
        } else {
            false
        }
    }

    fn is_input_button_just_pressed(&self, button: InputButton) -> bool {
        match button {
            InputButton::Key(key) => self.is_key_just_pressed(key),
            InputButton::Pointer => self.pointer_just_pressed,
        }
    }

    pub fn setup_default_mappings(&mut self) {
        self.map_input("jump".to_string(), vec![
            InputButton::Key(Key::Space),
            InputButton::Key(Key::Up),
            InputButton::Key(Key::W),
        ]);

        self.map_input("slow_down".to_string(), vec![
            InputButton::Key(Key::LShift),
            InputButton::Key(Key::Down),
            InputButton::Key(Key::S),
        ]);

        self.map_input("start".to_string(), vec![
            InputButton::Key(Key::Return),
        ]);
    }
}
