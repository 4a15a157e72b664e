//! Keyboard input.
//!
//! Games see physical key codes (layout independent, the way the key sits
//! on the keyboard) through [`Game::key_down`](crate::core::Game::key_down)
//! and [`Game::key_up`](crate::core::Game::key_up), and can poll held keys
//! through [`KeyboardState`].

mod state;

pub use state::{KeyState, KeyTransition, KeyboardState};
pub use winit::keyboard::KeyCode;

use winit::event::ElementState;
use winit::keyboard::PhysicalKey;

/// Translates a winit keyboard event; keys without a code are dropped.
pub fn translate_key_event(event: &winit::event::KeyEvent) -> Option<(KeyCode, KeyState)> {
    let PhysicalKey::Code(code) = event.physical_key else {
        return None;
    };
    let state = match event.state {
        ElementState::Pressed => KeyState::Pressed,
        ElementState::Released => KeyState::Released,
    };
    Some((code, state))
}
