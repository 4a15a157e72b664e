use crate::resources::Resources;
use crate::text::TextMesh;

use super::{MapMode, Renderer, StreamingBuffer};

/// Alignment of every streamed range (GPU copy and vertex offsets need 4).
pub const STREAM_ALIGN: u32 = 4;

/// Per-frame execution state threaded through every dispatcher.
///
/// Holds the back end, read access to resources, and the write cursors of the
/// vertex and index streaming buffers. Cursors only move forward within a
/// frame, so draws share the streaming buffers without overwriting each
/// other's data.
pub struct DrawContext<'a> {
    renderer: &'a mut dyn Renderer,
    resources: &'a Resources,
    text_mesh: &'a mut TextMesh,
    vertex_offset: u32,
    index_offset: u32,
}

impl<'a> DrawContext<'a> {
    /// Starts a frame: both streaming cursors reset to zero.
    ///
    /// `text_mesh` is scratch storage reused by text dispatch across frames.
    pub fn begin(
        renderer: &'a mut dyn Renderer,
        resources: &'a Resources,
        text_mesh: &'a mut TextMesh,
    ) -> Self {
        Self {
            renderer,
            resources,
            text_mesh,
            vertex_offset: 0,
            index_offset: 0,
        }
    }

    #[inline]
    pub fn renderer(&mut self) -> &mut dyn Renderer {
        &mut *self.renderer
    }

    #[inline]
    pub fn resources(&self) -> &'a Resources {
        self.resources
    }

    #[inline]
    pub fn vertex_offset(&self) -> u32 {
        self.vertex_offset
    }

    #[inline]
    pub fn index_offset(&self) -> u32 {
        self.index_offset
    }

    /// Copies `bytes` into a streaming buffer and returns the offset written.
    ///
    /// Maps with [`MapMode::Discard`] when the cursor is at zero, otherwise
    /// with [`MapMode::NoOverwrite`], then advances the cursor (rounded up to
    /// [`STREAM_ALIGN`]). Empty input maps nothing.
    ///
    /// # Panics
    /// Panics when the frame's data exceeds the streaming buffer capacity.
    #[track_caller]
    pub fn stream(&mut self, buffer: StreamingBuffer, bytes: &[u8]) -> u32 {
        let offset = match buffer {
            StreamingBuffer::Vertex => self.vertex_offset,
            StreamingBuffer::Index => self.index_offset,
        };
        if bytes.is_empty() {
            return offset;
        }

        let capacity = self.renderer.streaming_capacity(buffer);
        let len = u32::try_from(bytes.len()).ok();
        let end = len
            .and_then(|len| offset.checked_add(len))
            .filter(|&end| end <= capacity);
        let (Some(len), Some(end)) = (len, end) else {
            panic!(
                "{buffer:?} streaming buffer overflow: {} bytes at offset {offset}, capacity {capacity}",
                bytes.len()
            );
        };

        let mode = if offset == 0 {
            MapMode::Discard
        } else {
            MapMode::NoOverwrite
        };

        let mapped = self.renderer.map_streaming_buffer(buffer, offset, len, mode);
        mapped.copy_from_slice(bytes);
        self.renderer.unmap_streaming_buffer(buffer);

        let next = end.next_multiple_of(STREAM_ALIGN).min(capacity);
        match buffer {
            StreamingBuffer::Vertex => self.vertex_offset = next,
            StreamingBuffer::Index => self.index_offset = next,
        }
        offset
    }

    /// Moves the text scratch mesh out so it can be filled while the context
    /// is borrowed mutably; hand it back with [`restore_text_mesh`](Self::restore_text_mesh).
    pub(crate) fn take_text_mesh(&mut self) -> TextMesh {
        std::mem::take(self.text_mesh)
    }

    pub(crate) fn restore_text_mesh(&mut self, mesh: TextMesh) {
        *self.text_mesh = mesh;
    }
}
