use bytemuck::{Pod, Zeroable};

use crate::coords::Transform;
use crate::resources::{FontHandle, TextureData, TextureHandle};
use crate::text::GlyphAtlas;

// ── pipeline state ────────────────────────────────────────────────────────

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ShaderProgram {
    /// Flat colour, positions only.
    Color,
    /// RGBA texture modulated by colour.
    Texture,
    /// Single-channel glyph atlas used as coverage.
    Text,
}

/// Output merge chosen per draw by [`blend_for`](super::blend_for).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum BlendState {
    Opaque,
    /// Straight-alpha "over".
    Transparent,
}

/// Primitive assembly for a draw.
///
/// Stored as a raw `u32` inside command payloads.
#[repr(u32)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub enum PrimitiveTopology {
    LineList = 0,
    LineStrip = 1,
    #[default]
    TriangleList = 2,
    TriangleStrip = 3,
}

impl PrimitiveTopology {
    #[inline]
    pub const fn as_raw(self) -> u32 {
        self as u32
    }

    pub const fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            0 => Some(Self::LineList),
            1 => Some(Self::LineStrip),
            2 => Some(Self::TriangleList),
            3 => Some(Self::TriangleStrip),
            _ => None,
        }
    }

    #[inline]
    pub const fn is_strip(self) -> bool {
        matches!(self, Self::LineStrip | Self::TriangleStrip)
    }
}

#[repr(u32)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub enum FillMode {
    #[default]
    Solid = 0,
    Wireframe = 1,
}

impl FillMode {
    #[inline]
    pub const fn as_raw(self) -> u32 {
        self as u32
    }

    pub const fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            0 => Some(Self::Solid),
            1 => Some(Self::Wireframe),
            _ => None,
        }
    }
}

#[repr(u32)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub enum SamplerState {
    #[default]
    Point = 0,
    Linear = 1,
}

impl SamplerState {
    #[inline]
    pub const fn as_raw(self) -> u32 {
        self as u32
    }

    pub const fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            0 => Some(Self::Point),
            1 => Some(Self::Linear),
            _ => None,
        }
    }
}

// ── streaming ─────────────────────────────────────────────────────────────

/// The two per-frame streaming buffers every back end provides.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum StreamingBuffer {
    Vertex,
    Index,
}

/// How a streaming range is mapped.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum MapMode {
    /// Previous contents may be thrown away (first write of the frame).
    Discard,
    /// Caller promises not to touch ranges already written this frame.
    NoOverwrite,
}

/// Byte offsets of the vertex streams for the next draw, inside the vertex
/// streaming buffer. Positions are `[f32; 2]`, texcoords `[f32; 2]`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct VertexStreams {
    pub positions: u32,
    pub texcoords: Option<u32>,
}

/// Per-draw constants: world transform and unpacked colour.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct InstanceConstants {
    pub transform: Transform,
    pub color: [f32; 4],
}

// ── textures ──────────────────────────────────────────────────────────────

/// Texture to bind, with the CPU data a back end needs to upload it.
///
/// Back ends cache uploads by [`key`](Self::key); the generation changes
/// whenever the registry replaces the pixels.
#[derive(Debug, Copy, Clone)]
pub enum TextureSource<'a> {
    Image { handle: TextureHandle, data: &'a TextureData },
    FontAtlas { handle: FontHandle, atlas: &'a GlyphAtlas },
}

/// Identity of an uploaded texture.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TextureKey {
    Image(TextureHandle),
    FontAtlas(FontHandle),
}

impl TextureSource<'_> {
    pub fn key(&self) -> TextureKey {
        match *self {
            TextureSource::Image { handle, .. } => TextureKey::Image(handle),
            TextureSource::FontAtlas { handle, .. } => TextureKey::FontAtlas(handle),
        }
    }

    pub fn generation(&self) -> u32 {
        match self {
            TextureSource::Image { data, .. } => data.generation,
            TextureSource::FontAtlas { .. } => 0,
        }
    }
}

// ── renderer ──────────────────────────────────────────────────────────────

/// Back-end contract consumed by command dispatchers.
///
/// Calls arrive in the order a dispatcher issues them; state set by `bind_*`
/// persists until changed. A draw uses whatever program, blend, constants,
/// streams and texture are bound at the time of the call.
///
/// Implementations must not block inside these calls.
pub trait Renderer {
    /// Called once before the first command of a frame executes.
    fn begin_frame(&mut self) {}

    /// Called once after the last command of a frame executed; presents.
    fn end_frame(&mut self) -> anyhow::Result<()> {
        Ok(())
    }

    /// Drawable size changed, in physical pixels.
    fn resize(&mut self, width: u32, height: u32) {
        let _ = (width, height);
    }

    /// Capacity in bytes of a streaming buffer.
    fn streaming_capacity(&self, buffer: StreamingBuffer) -> u32;

    fn bind_shader_program(&mut self, program: ShaderProgram);

    fn bind_blend_state(&mut self, blend: BlendState);

    fn set_fill_mode(&mut self, fill: FillMode);

    /// Maps `len` bytes at `offset` of a streaming buffer for writing.
    fn map_streaming_buffer(
        &mut self,
        buffer: StreamingBuffer,
        offset: u32,
        len: u32,
        mode: MapMode,
    ) -> &mut [u8];

    fn unmap_streaming_buffer(&mut self, buffer: StreamingBuffer);

    fn set_instance_constants(&mut self, constants: &InstanceConstants);

    fn bind_vertex_streams(&mut self, streams: VertexStreams);

    fn bind_texture(&mut self, texture: TextureSource<'_>, sampler: SamplerState);

    fn draw(&mut self, topology: PrimitiveTopology, vertex_count: u32);

    /// Draws `index_count` u16 indices starting `index_offset` bytes into the
    /// index streaming buffer.
    fn draw_indexed(&mut self, topology: PrimitiveTopology, index_offset: u32, index_count: u32);
}
