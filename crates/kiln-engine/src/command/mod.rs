//! Render command recording.
//!
//! Responsibilities:
//! - own the arena-backed [`CommandBuffer`] and its type-erased dispatch
//! - define the built-in command payloads ([`DrawCommand`], [`DrawTextCommand`])
//! - expose [`CommandRecorder`], the producer-facing API handed to game code
//!
//! Extending the command set:
//! 1) define a `#[repr(C)]` `Pod` payload (arena data referenced by [`ArenaSlice`])
//! 2) implement [`RenderCommand`] for it
//! 3) add a recorder helper that fills defaults and copies auxiliary data

mod arena;
mod buffer;
mod key;
mod recorder;

pub mod commands;

pub use arena::{align_up, ArenaSlice, ArenaView, ARENA_ALIGN};
pub use buffer::{CommandBuffer, CommandPayload, Dispatcher, RenderCommand, RAW_PAYLOAD_ALIGN};
pub use commands::{DrawCommand, DrawTextCommand};
pub use key::SortKey;
pub use recorder::{CommandRecorder, DrawParams, TextParams};
