//! Frame orchestration.
//!
//! Two command buffers alternate between recording and execution. Inline,
//! they flip on one thread ([`CommandBufferPair`]); with a render thread they
//! change owner through [`RenderThread`], so the game thread never touches a
//! buffer that is being executed.

mod executor;
mod frame_loop;
mod headless;
mod pair;
mod render_thread;

pub use executor::FrameExecutor;
pub use frame_loop::{FrameLoop, FrameReport};
pub use headless::{run_headless, HeadlessSummary};
pub use pair::CommandBufferPair;
pub use render_thread::RenderThread;
