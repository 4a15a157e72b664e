use crate::coords::{Transform, Vec2};
use crate::paint::PackedColor;
use crate::render::{FillMode, PrimitiveTopology, SamplerState};
use crate::resources::{FontHandle, TextureHandle};

use super::{CommandBuffer, DrawCommand, DrawTextCommand, SortKey};

/// Arguments of [`CommandRecorder::draw`]. Unset fields take the command
/// defaults.
#[derive(Debug, Copy, Clone)]
pub struct DrawParams<'a> {
    pub vertices: &'a [Vec2],
    /// One per vertex when present.
    pub texcoords: Option<&'a [Vec2]>,
    pub indices: Option<&'a [u16]>,
    pub topology: PrimitiveTopology,
    pub fill_mode: FillMode,
    pub color: PackedColor,
    pub texture: Option<TextureHandle>,
    pub sampler: SamplerState,
    pub transform: Transform,
    pub key: SortKey,
}

impl<'a> DrawParams<'a> {
    pub fn new(vertices: &'a [Vec2]) -> Self {
        Self {
            vertices,
            texcoords: None,
            indices: None,
            topology: PrimitiveTopology::TriangleList,
            fill_mode: FillMode::Solid,
            color: PackedColor::WHITE,
            texture: None,
            sampler: SamplerState::Point,
            transform: Transform::IDENTITY,
            key: SortKey::DEFAULT,
        }
    }
}

/// Arguments of [`CommandRecorder::draw_text`].
#[derive(Debug, Copy, Clone)]
pub struct TextParams<'a> {
    pub font: FontHandle,
    pub text: &'a str,
    pub position: Vec2,
    pub width: f32,
    pub scale: f32,
    pub line_spacing: f32,
    pub color: PackedColor,
    /// Character range that produces glyphs; `None` shows everything.
    pub range: Option<(u32, u32)>,
    pub key: SortKey,
}

impl<'a> TextParams<'a> {
    pub fn new(font: FontHandle, text: &'a str) -> Self {
        Self {
            font,
            text,
            position: Vec2::zero(),
            width: f32::MAX,
            scale: 1.0,
            line_spacing: 1.0,
            color: PackedColor::WHITE,
            range: None,
            key: SortKey::DEFAULT,
        }
    }
}

/// Producer-side API: fills command defaults and copies caller data into the
/// buffer's arena, so nothing the caller owns is referenced after the call.
pub struct CommandRecorder<'a> {
    buffer: &'a mut CommandBuffer,
}

impl<'a> CommandRecorder<'a> {
    pub fn new(buffer: &'a mut CommandBuffer) -> Self {
        Self { buffer }
    }

    /// Records a geometry draw.
    ///
    /// # Panics
    /// Panics if texcoords are given and their count differs from the vertex
    /// count, or if the buffer runs out of room.
    #[track_caller]
    pub fn draw(&mut self, params: DrawParams<'_>) -> &mut DrawCommand {
        if let Some(uv) = params.texcoords {
            assert_eq!(
                uv.len(),
                params.vertices.len(),
                "texcoord count must match vertex count"
            );
        }

        let vertices = self.buffer.alloc_slice(params.vertices);
        let texcoords = params
            .texcoords
            .map_or(super::ArenaSlice::EMPTY, |uv| self.buffer.alloc_slice(uv));
        let indices = params
            .indices
            .map_or(super::ArenaSlice::EMPTY, |idx| self.buffer.alloc_slice(idx));

        let cmd = DrawCommand {
            vertices,
            texcoords,
            indices,
            vertex_count: params.vertices.len() as u32,
            index_count: params.indices.map_or(0, |idx| idx.len() as u32),
            topology: params.topology.as_raw(),
            fill_mode: params.fill_mode.as_raw(),
            texture: params.texture.unwrap_or(TextureHandle::INVALID),
            color: params.color,
            sampler: params.sampler.as_raw(),
            transform: params.transform,
            ..DrawCommand::default()
        };
        self.buffer.push_keyed(params.key, cmd)
    }

    /// Records a text draw; the string is copied into the arena.
    #[track_caller]
    pub fn draw_text(&mut self, params: TextParams<'_>) -> &mut DrawTextCommand {
        let text = self.buffer.alloc_str(params.text);
        let (range_start, range_end) = params.range.unwrap_or((0, u32::MAX));

        let cmd = DrawTextCommand {
            text,
            font: params.font,
            color: params.color,
            x: params.position.x,
            y: params.position.y,
            width: params.width,
            scale: params.scale,
            line_spacing: params.line_spacing,
            range_start,
            range_end,
        };
        self.buffer.push_keyed(params.key, cmd)
    }

    /// Records a closed polygon outline as a line strip (debug drawing).
    #[track_caller]
    pub fn draw_outline(&mut self, points: &[Vec2], color: PackedColor) -> &mut DrawCommand {
        let closed = points.len() + usize::from(!points.is_empty());
        let vertices = self.buffer.alloc(closed * size_of::<Vec2>());
        let dst = self.buffer.slice_mut::<Vec2>(vertices);
        dst[..points.len()].copy_from_slice(points);
        if let Some(&first) = points.first() {
            dst[points.len()] = first;
        }

        let cmd = DrawCommand {
            vertices,
            vertex_count: closed as u32,
            topology: PrimitiveTopology::LineStrip.as_raw(),
            color,
            ..DrawCommand::default()
        };
        self.buffer.push(cmd)
    }

    pub fn buffer(&mut self) -> &mut CommandBuffer {
        self.buffer
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload<C: bytemuck::Pod>(buffer: &CommandBuffer, i: usize) -> C {
        *buffer.payload(i).unwrap().read::<C>()
    }

    #[test]
    fn draw_copies_geometry_into_arena() {
        let mut buffer = CommandBuffer::new(4096, 8);
        let verts = [Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0), Vec2::new(0.0, 1.0)];
        let uv = [Vec2::zero(); 3];
        let idx = [0u16, 1, 2];

        let mut rec = CommandRecorder::new(&mut buffer);
        let mut params = DrawParams::new(&verts);
        params.texcoords = Some(&uv);
        params.indices = Some(&idx);
        params.color = PackedColor::from_rgba_u8(10, 20, 30, 40);
        rec.draw(params);

        let cmd: DrawCommand = payload(&buffer, 0);
        let arena = buffer.payload(0).unwrap().arena();
        assert_eq!(arena.slice::<Vec2>(cmd.vertices), &verts);
        assert_eq!(arena.slice::<u16>(cmd.indices), &idx);
        assert_eq!(cmd.vertex_count, 3);
        assert_eq!(cmd.index_count, 3);
        assert!(cmd.has_texcoords());
        assert_eq!(cmd.color.to_rgba_u8(), [10, 20, 30, 40]);
        assert_eq!(cmd.texture, TextureHandle::INVALID);
    }

    #[test]
    #[should_panic(expected = "texcoord count must match vertex count")]
    fn mismatched_texcoords_panic() {
        let mut buffer = CommandBuffer::new(4096, 8);
        let verts = [Vec2::zero(); 3];
        let uv = [Vec2::zero(); 2];
        let mut params = DrawParams::new(&verts);
        params.texcoords = Some(&uv);
        CommandRecorder::new(&mut buffer).draw(params);
    }

    #[test]
    fn outline_closes_the_loop() {
        let mut buffer = CommandBuffer::new(4096, 8);
        let square = [
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(0.0, 1.0),
        ];
        CommandRecorder::new(&mut buffer).draw_outline(&square, PackedColor::BLACK);

        let cmd: DrawCommand = payload(&buffer, 0);
        assert_eq!(cmd.topology(), PrimitiveTopology::LineStrip);
        assert_eq!(cmd.vertex_count, 5);
        let verts = buffer.payload(0).unwrap().arena().slice::<Vec2>(cmd.vertices);
        assert_eq!(verts[4], verts[0]);
    }

    #[test]
    fn text_is_copied_with_range() {
        let mut buffer = CommandBuffer::new(4096, 8);
        let owned = String::from("hello world");
        let mut params = TextParams::new(FontHandle(0), &owned);
        params.range = Some((2, 5));
        params.position = Vec2::new(8.0, 16.0);
        CommandRecorder::new(&mut buffer).draw_text(params);
        drop(owned);

        let cmd: DrawTextCommand = payload(&buffer, 0);
        assert_eq!(buffer.payload(0).unwrap().arena().str(cmd.text), "hello world");
        assert_eq!((cmd.range_start, cmd.range_end), (2, 5));
        assert_eq!((cmd.x, cmd.y), (8.0, 16.0));
        assert_eq!(cmd.width, f32::MAX);
    }

    #[test]
    fn sort_key_reorders_execution() {
        let mut buffer = CommandBuffer::new(4096, 8);
        let verts = [Vec2::zero(); 3];
        let mut rec = CommandRecorder::new(&mut buffer);
        let mut top = DrawParams::new(&verts);
        top.key = SortKey::layer(1);
        rec.draw(top);
        rec.draw(DrawParams::new(&verts));
        buffer.sort();
        assert_eq!(buffer.execution_order(), &[1, 0]);
    }
}
