use macroquad::prelude::*;

use crate::game::{Direction, OverworldInput};

/// Longest text accepted in a single text field
pub const MAX_TEXT_LEN: usize = 40;

/// Everything the screens read from the keyboard, sampled once per frame
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputFrame {
    // Held movement keys
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,

    // Pressed this frame
    pub nav_up: bool,
    pub nav_down: bool,
    pub nav_left: bool,
    pub nav_right: bool,
    pub confirm: bool,
    pub interact: bool,
    pub cancel: bool,
    pub tab: bool,
    pub backspace: bool,
    pub settings: bool,
    /// Number keys 1-9 pressed this frame
    pub number: Option<usize>,
    /// Printable characters typed this frame
    pub typed: Vec<char>,
}

impl InputFrame {
    /// Single cardinal direction from the held keys (Up, Down, Right, Left priority)
    pub fn held_direction(&self) -> Option<Direction> {
        Direction::from_held(self.up, self.down, self.right, self.left)
    }

    pub fn overworld(&self) -> OverworldInput {
        OverworldInput {
            direction: self.held_direction(),
            interact: self.interact || self.confirm,
            cancel: self.cancel,
        }
    }
}

/// Polls macroquad's keyboard state
#[derive(Default)]
pub struct InputHandler {
    // Text entry screens want typed characters; the overworld uses letters as keys
    text_mode: bool,
}

impl InputHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_text_mode(&mut self, enabled: bool) {
        self.text_mode = enabled;
    }

    pub fn poll(&mut self) -> InputFrame {
        let mut frame = InputFrame {
            up: is_key_down(KeyCode::Up),
            down: is_key_down(KeyCode::Down),
            left: is_key_down(KeyCode::Left),
            right: is_key_down(KeyCode::Right),
            nav_up: is_key_pressed(KeyCode::Up),
            nav_down: is_key_pressed(KeyCode::Down),
            nav_left: is_key_pressed(KeyCode::Left),
            nav_right: is_key_pressed(KeyCode::Right),
            confirm: is_key_pressed(KeyCode::Enter) || is_key_pressed(KeyCode::KpEnter),
            interact: false,
            cancel: is_key_pressed(KeyCode::Escape),
            tab: is_key_pressed(KeyCode::Tab),
            backspace: is_key_pressed(KeyCode::Backspace),
            settings: false,
            number: None,
            typed: Vec::new(),
        };

        // Drain the char queue every frame so text does not pile up between screens
        while let Some(c) = get_char_pressed() {
            if self.text_mode && !c.is_control() {
                frame.typed.push(c);
            }
        }

        if !self.text_mode {
            frame.up |= is_key_down(KeyCode::W);
            frame.down |= is_key_down(KeyCode::S);
            frame.left |= is_key_down(KeyCode::A);
            frame.right |= is_key_down(KeyCode::D);
            frame.interact = is_key_pressed(KeyCode::Space) || is_key_pressed(KeyCode::E);
            frame.settings = is_key_pressed(KeyCode::O);

            const NUMBER_KEYS: [KeyCode; 9] = [
                KeyCode::Key1,
                KeyCode::Key2,
                KeyCode::Key3,
                KeyCode::Key4,
                KeyCode::Key5,
                KeyCode::Key6,
                KeyCode::Key7,
                KeyCode::Key8,
                KeyCode::Key9,
            ];
            frame.number = NUMBER_KEYS.iter().position(|&key| is_key_pressed(key));
        }

        frame
    }
}
