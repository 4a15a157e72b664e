use crate::command::CommandRecorder;
use crate::coords::Vec2;
use crate::input::KeyboardState;
use crate::resources::Resources;

/// Context of one fixed simulation step.
pub struct TickCtx<'a> {
    pub resources: &'a Resources,
    pub keyboard: &'a KeyboardState,
    /// Seconds per tick.
    pub step: f64,
    /// Simulated time before this tick, in seconds.
    pub time: f64,
    pub tick_index: u64,
}

/// Context of one frame's command recording.
pub struct DrawCtx<'a> {
    pub commands: CommandRecorder<'a>,
    pub resources: &'a Resources,
    /// Drawable size in pixels.
    pub viewport: Vec2,
    pub frame_index: u64,
}
