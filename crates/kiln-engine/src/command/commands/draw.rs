use bytemuck::{Pod, Zeroable};

use crate::command::ArenaSlice;
use crate::coords::Transform;
use crate::paint::PackedColor;
use crate::render::{FillMode, PrimitiveTopology, SamplerState};
use crate::resources::TextureHandle;

/// Geometry draw: positions, optional texcoords and optional `u16` indices,
/// all referenced from the command arena.
///
/// Enumerations are stored as raw `u32` so the payload stays `Pod`; use the
/// accessors to read them back.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct DrawCommand {
    /// `[Vec2]` positions.
    pub vertices: ArenaSlice,
    /// `[Vec2]` texcoords; empty or one per vertex.
    pub texcoords: ArenaSlice,
    /// `[u16]` indices; empty for non-indexed draws.
    pub indices: ArenaSlice,
    pub vertex_count: u32,
    pub index_count: u32,
    pub topology: u32,
    pub fill_mode: u32,
    pub texture: TextureHandle,
    pub color: PackedColor,
    pub sampler: u32,
    pub _pad: u32,
    pub transform: Transform,
}

impl Default for DrawCommand {
    fn default() -> Self {
        Self {
            vertices: ArenaSlice::EMPTY,
            texcoords: ArenaSlice::EMPTY,
            indices: ArenaSlice::EMPTY,
            vertex_count: 0,
            index_count: 0,
            topology: PrimitiveTopology::TriangleList.as_raw(),
            fill_mode: FillMode::Solid.as_raw(),
            texture: TextureHandle::INVALID,
            color: PackedColor::WHITE,
            sampler: SamplerState::Point.as_raw(),
            _pad: 0,
            transform: Transform::IDENTITY,
        }
    }
}

impl DrawCommand {
    /// Unknown raw values read as `TriangleList`.
    pub fn topology(&self) -> PrimitiveTopology {
        PrimitiveTopology::from_raw(self.topology).unwrap_or_default()
    }

    pub fn fill_mode(&self) -> FillMode {
        FillMode::from_raw(self.fill_mode).unwrap_or_default()
    }

    pub fn sampler(&self) -> SamplerState {
        SamplerState::from_raw(self.sampler).unwrap_or_default()
    }

    #[inline]
    pub fn is_indexed(&self) -> bool {
        self.index_count > 0
    }

    #[inline]
    pub fn has_texcoords(&self) -> bool {
        !self.texcoords.is_empty()
    }
}
