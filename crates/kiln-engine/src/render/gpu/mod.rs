//! wgpu back end.
//!
//! Dispatchers talk to [`WgpuRenderer`] through the [`Renderer`](super::Renderer)
//! trait during command execution; nothing touches the GPU until
//! `end_frame`, which uploads the streamed data once and encodes every
//! recorded draw into a single render pass.
//!
//! Layout:
//! - group 0: per-draw constants (dynamic-offset uniform ring)
//! - group 1: texture + sampler (Texture and Text programs only)
//! - vertex buffer 0: positions, vertex buffer 1: texcoords

mod constants;
mod pipelines;
mod renderer;
mod textures;

pub use renderer::WgpuRenderer;
