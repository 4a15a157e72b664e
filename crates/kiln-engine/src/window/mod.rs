//! Window + runtime loop.
//!
//! Owns the `winit` EventLoop and the game window, and wires them to the GPU
//! back end and the frame loop.

mod runtime;

pub use runtime::{Runtime, RuntimeConfig};
