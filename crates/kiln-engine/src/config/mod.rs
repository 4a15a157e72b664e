//! Engine-wide configuration.
//!
//! Sizing is static: command buffers and streaming buffers never grow, so the
//! embedding application picks capacities up front. Defaults are generous for
//! a small 2D game.

use crate::paint::PackedColor;

/// Default arena size per command buffer (2 MiB).
pub const DEFAULT_COMMAND_BUFFER_BYTES: usize = 2 * 1024 * 1024;

/// Default command count limit per command buffer.
pub const DEFAULT_MAX_COMMANDS: usize = 4096;

/// Default size of each GPU streaming buffer (32 MiB).
pub const DEFAULT_STREAMING_BUFFER_BYTES: u32 = 32 * 1024 * 1024;

/// Default simulation rate in ticks per second.
pub const DEFAULT_TICK_RATE: f64 = 60.0;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct CommandBufferConfig {
    /// Arena capacity in bytes; payloads and auxiliary data share it.
    ///
    /// A reservation is padded in front up to its alignment (4 for the
    /// built-in payloads and `push_raw`, 8 for `alloc`), so the usable total
    /// can fall short of the sum of the requested sizes when aligned and
    /// unaligned data interleave.
    pub byte_capacity: usize,
    pub max_commands: usize,
}

impl Default for CommandBufferConfig {
    fn default() -> Self {
        Self {
            byte_capacity: DEFAULT_COMMAND_BUFFER_BYTES,
            max_commands: DEFAULT_MAX_COMMANDS,
        }
    }
}

/// Capacities of the per-frame vertex and index streaming buffers.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct StreamingConfig {
    pub vertex_bytes: u32,
    pub index_bytes: u32,
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            vertex_bytes: DEFAULT_STREAMING_BUFFER_BYTES,
            index_bytes: DEFAULT_STREAMING_BUFFER_BYTES,
        }
    }
}

/// Where recorded command buffers are executed.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Threading {
    /// Record, sort and execute on the calling thread.
    #[default]
    Inline,
    /// Execute on a dedicated render thread while the next frame records.
    RenderThread,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub command_buffer: CommandBufferConfig,
    pub streaming: StreamingConfig,
    /// Fixed simulation ticks per second.
    pub tick_rate: f64,
    pub threading: Threading,
    pub clear_color: PackedColor,
}

impl EngineConfig {
    /// Seconds per simulation tick.
    pub fn tick_interval(&self) -> f64 {
        1.0 / self.tick_rate.max(1.0)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            command_buffer: CommandBufferConfig::default(),
            streaming: StreamingConfig::default(),
            tick_rate: DEFAULT_TICK_RATE,
            threading: Threading::Inline,
            clear_color: PackedColor::BLACK,
        }
    }
}
