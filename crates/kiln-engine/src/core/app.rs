use crate::input::KeyCode;
use crate::resources::Resources;

use super::ctx::{DrawCtx, TickCtx};

/// Control directive returned by game callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum GameControl {
    Continue,
    Exit,
}

/// Game contract driven by the frame loop.
///
/// Every callback runs on the game thread. `tick` runs zero or more times
/// per frame at the fixed tick rate; `draw` runs once per frame and records
/// render commands.
pub trait Game {
    /// Called once before the first frame; load resources here.
    fn start(&mut self, resources: &Resources) {
        let _ = resources;
    }

    /// Advances the simulation by one fixed step.
    fn tick(&mut self, ctx: &mut TickCtx<'_>) -> GameControl;

    /// Records this frame's render commands.
    fn draw(&mut self, ctx: &mut DrawCtx<'_>);

    fn key_down(&mut self, key: KeyCode) -> GameControl {
        let _ = key;
        GameControl::Continue
    }

    fn key_up(&mut self, key: KeyCode) {
        let _ = key;
    }

    /// Drawable size changed, in physical pixels.
    fn resized(&mut self, width: u32, height: u32) {
        let _ = (width, height);
    }
}
