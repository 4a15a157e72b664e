//! Kiln engine crate.
//!
//! A small 2D runtime built around a double-buffered render command buffer:
//! games record type-erased commands into an arena, the frame loop sorts and
//! executes them against a [`render::Renderer`] (wgpu or headless), inline or
//! on a dedicated render thread.

pub mod command;
pub mod config;
pub mod coords;
pub mod core;
pub mod device;
pub mod frame;
pub mod input;
pub mod logging;
pub mod paint;
pub mod render;
pub mod resources;
pub mod text;
pub mod time;
pub mod window;
