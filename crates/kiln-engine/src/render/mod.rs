//! Command execution: the back-end contract, the per-frame draw context and
//! the dispatchers of the built-in commands.
//!
//! Convention:
//! - CPU geometry is in drawable pixels (top-left origin, +Y down).
//! - Back ends stream positions and texcoords as `[f32; 2]` and indices as `u16`.
//! - Every back end offers one vertex and one index streaming buffer,
//!   written front to back within a frame.

mod backend;
mod commands;
mod ctx;
mod gpu;
mod headless;

pub use backend::{
    BlendState, FillMode, InstanceConstants, MapMode, PrimitiveTopology, Renderer, SamplerState,
    ShaderProgram, StreamingBuffer, TextureKey, TextureSource, VertexStreams,
};
pub use commands::blend_for;
pub use ctx::{DrawContext, STREAM_ALIGN};
pub use gpu::WgpuRenderer;
pub use headless::{FrameStats, HeadlessRenderer, RenderOp};
