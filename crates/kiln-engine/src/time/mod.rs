//! Frame timing.
//!
//! - [`FrameClock`]: one per loop; `tick()` once per presented frame
//! - [`FixedTimestep`]: turns frame time into a whole number of game ticks

mod fixed_step;
mod frame_clock;

pub use fixed_step::{FixedTimestep, MAX_TICKS_PER_CALL};
pub use frame_clock::{FrameClock, FrameTime};
