use std::sync::Arc;

use crate::command::{ArenaView, DrawCommand, RenderCommand};
use crate::render::{
    DrawContext, InstanceConstants, ShaderProgram, StreamingBuffer, TextureSource, VertexStreams,
};
use crate::resources::TextureData;

use super::blend_for;

impl RenderCommand for DrawCommand {
    fn execute(&self, ctx: &mut DrawContext<'_>, arena: ArenaView<'_>) {
        if self.vertex_count == 0 {
            return;
        }

        let texture = self.resolve_texture(ctx);
        let semitransparent = texture.as_ref().is_some_and(|t| t.semitransparent);
        let program = if texture.is_some() {
            ShaderProgram::Texture
        } else {
            ShaderProgram::Color
        };

        let renderer = ctx.renderer();
        renderer.bind_shader_program(program);
        renderer.bind_blend_state(blend_for(self.color, semitransparent));
        renderer.set_fill_mode(self.fill_mode());

        let positions = ctx.stream(StreamingBuffer::Vertex, arena.bytes(self.vertices));
        let texcoords = texture
            .is_some()
            .then(|| ctx.stream(StreamingBuffer::Vertex, arena.bytes(self.texcoords)));
        let index_offset = self
            .is_indexed()
            .then(|| ctx.stream(StreamingBuffer::Index, arena.bytes(self.indices)));

        let renderer = ctx.renderer();
        renderer.bind_vertex_streams(VertexStreams { positions, texcoords });
        renderer.set_instance_constants(&InstanceConstants {
            transform: self.transform,
            color: self.color.to_rgba_f32(),
        });
        if let Some(data) = texture.as_deref() {
            renderer.bind_texture(TextureSource::Image { handle: self.texture, data }, self.sampler());
        }

        match index_offset {
            Some(offset) => renderer.draw_indexed(self.topology(), offset, self.index_count),
            None => renderer.draw(self.topology(), self.vertex_count),
        }
    }
}

impl DrawCommand {
    /// Texture to sample, or `None` to draw untextured.
    fn resolve_texture(&self, ctx: &DrawContext<'_>) -> Option<Arc<TextureData>> {
        if !self.texture.is_valid() {
            return None;
        }
        let Some(data) = ctx.resources().textures().get(self.texture) else {
            log::warn!("draw: texture {:?} is not loaded, drawing untextured", self.texture);
            return None;
        };
        if !self.has_texcoords() {
            log::warn!("draw: texture {:?} bound without texcoords, drawing untextured", self.texture);
            return None;
        }
        Some(data)
    }
}

#[cfg(test)]
mod tests {
    use crate::command::{CommandBuffer, CommandRecorder, DrawParams};
    use crate::coords::Vec2;
    use crate::paint::PackedColor;
    use crate::render::{
        BlendState, DrawContext, FillMode, MapMode, PrimitiveTopology, RenderOp, ShaderProgram,
        StreamingBuffer, TextureKey, HeadlessRenderer, SamplerState,
    };
    use crate::resources::{Resources, TextureHandle};
    use crate::text::TextMesh;

    fn execute(buffer: &mut CommandBuffer, resources: &Resources) -> HeadlessRenderer {
        let mut renderer = HeadlessRenderer::with_call_log(4096, 1024);
        let mut mesh = TextMesh::default();
        buffer.sort();
        let mut ctx = DrawContext::begin(&mut renderer, resources, &mut mesh);
        buffer.execute(&mut ctx);
        renderer
    }

    const TRI: [Vec2; 3] = [Vec2::new(0.0, 0.0), Vec2::new(10.0, 0.0), Vec2::new(0.0, 10.0)];

    #[test]
    fn three_draws_stream_into_one_vertex_buffer() {
        // Exactly three draws' worth of arena.
        let payload = size_of::<crate::command::DrawCommand>();
        let verts = size_of::<[Vec2; 3]>();
        let mut buffer = CommandBuffer::new(3 * (payload + verts), 3);

        let mut rec = CommandRecorder::new(&mut buffer);
        for _ in 0..3 {
            rec.draw(DrawParams::new(&TRI));
        }
        assert_eq!(buffer.bytes_used(), buffer.byte_capacity());

        let renderer = execute(&mut buffer, &Resources::new());
        let maps: Vec<_> = renderer
            .calls()
            .iter()
            .filter_map(|op| match op {
                RenderOp::Map { offset, len, mode, .. } => Some((*offset, *len, *mode)),
                _ => None,
            })
            .collect();
        assert_eq!(
            maps,
            vec![(0, 24, MapMode::Discard), (24, 24, MapMode::NoOverwrite), (48, 24, MapMode::NoOverwrite)]
        );

        let draws = renderer
            .calls()
            .iter()
            .filter(|op| matches!(op, RenderOp::Draw { topology: PrimitiveTopology::TriangleList, vertex_count: 3 }))
            .count();
        assert_eq!(draws, 3);
        let last: Vec<Vec2> =
            bytemuck::pod_collect_to_vec(&renderer.streaming_contents(StreamingBuffer::Vertex)[48..72]);
        assert_eq!(last, TRI.to_vec());
    }

    #[test]
    fn untextured_draw_call_sequence() {
        let mut buffer = CommandBuffer::new(4096, 4);
        let mut params = DrawParams::new(&TRI);
        params.color = PackedColor::from_rgba_u8(255, 0, 0, 255);
        params.fill_mode = FillMode::Wireframe;
        CommandRecorder::new(&mut buffer).draw(params);

        let renderer = execute(&mut buffer, &Resources::new());
        let calls = renderer.calls();
        assert_eq!(calls[0], RenderOp::BindProgram(ShaderProgram::Color));
        assert_eq!(calls[1], RenderOp::BindBlend(BlendState::Opaque));
        assert_eq!(calls[2], RenderOp::SetFill(FillMode::Wireframe));
        assert!(matches!(calls.last(), Some(RenderOp::Draw { vertex_count: 3, .. })));
        assert!(!calls.iter().any(|op| matches!(op, RenderOp::BindTexture { .. })));
    }

    #[test]
    fn indexed_draw_streams_indices() {
        let mut buffer = CommandBuffer::new(4096, 4);
        let indices = [0u16, 1, 2, 2, 1, 0];
        let mut params = DrawParams::new(&TRI);
        params.indices = Some(&indices);
        CommandRecorder::new(&mut buffer).draw(params);

        let renderer = execute(&mut buffer, &Resources::new());
        assert!(renderer.calls().contains(&RenderOp::Map {
            buffer: StreamingBuffer::Index,
            offset: 0,
            len: 12,
            mode: MapMode::Discard,
        }));
        assert!(matches!(
            renderer.calls().last(),
            Some(RenderOp::DrawIndexed { index_offset: 0, index_count: 6, .. })
        ));
        assert_eq!(&renderer.streaming_contents(StreamingBuffer::Index)[..12], bytemuck::cast_slice::<u16, u8>(&indices));
    }

    #[test]
    fn semitransparent_texture_selects_transparent_blend() {
        let resources = Resources::new();
        let texture = resources
            .textures()
            .insert_rgba8("glass", 1, 1, vec![255, 255, 255, 100])
            .unwrap();
        let uv = [Vec2::zero(); 3];

        let mut buffer = CommandBuffer::new(4096, 4);
        let mut params = DrawParams::new(&TRI);
        params.texcoords = Some(&uv);
        params.texture = Some(texture);
        params.sampler = SamplerState::Linear;
        CommandRecorder::new(&mut buffer).draw(params);

        let renderer = execute(&mut buffer, &resources);
        let calls = renderer.calls();
        assert!(calls.contains(&RenderOp::BindProgram(ShaderProgram::Texture)));
        assert!(calls.contains(&RenderOp::BindBlend(BlendState::Transparent)));
        assert!(calls.contains(&RenderOp::BindTexture {
            key: TextureKey::Image(texture),
            sampler: SamplerState::Linear,
        }));
    }

    #[test]
    fn loaded_texture_without_texcoords_draws_untextured() {
        let resources = Resources::new();
        let texture = resources
            .textures()
            .insert_rgba8("solid", 1, 1, vec![255, 255, 255, 255])
            .unwrap();

        let mut buffer = CommandBuffer::new(4096, 4);
        let params = DrawParams { texture: Some(texture), ..DrawParams::new(&TRI) };
        CommandRecorder::new(&mut buffer).draw(params);

        let renderer = execute(&mut buffer, &resources);
        let calls = renderer.calls();
        assert_eq!(calls[0], RenderOp::BindProgram(ShaderProgram::Color));
        assert!(!calls.iter().any(|op| matches!(op, RenderOp::BindTexture { .. })));
        assert!(matches!(calls.last(), Some(RenderOp::Draw { vertex_count: 3, .. })));
    }

    #[test]
    fn missing_texture_degrades_to_color() {
        let uv = [Vec2::zero(); 3];
        let mut buffer = CommandBuffer::new(4096, 4);
        let mut params = DrawParams::new(&TRI);
        params.texcoords = Some(&uv);
        params.texture = Some(TextureHandle(42));
        CommandRecorder::new(&mut buffer).draw(params);

        let renderer = execute(&mut buffer, &Resources::new());
        assert_eq!(renderer.calls()[0], RenderOp::BindProgram(ShaderProgram::Color));
        assert!(renderer.calls().iter().any(|op| matches!(op, RenderOp::Draw { .. })));
    }

    #[test]
    fn partially_transparent_color_blends() {
        let mut buffer = CommandBuffer::new(4096, 4);
        let mut params = DrawParams::new(&TRI);
        params.color = PackedColor::from_rgba_u8(0, 0, 0, 128);
        CommandRecorder::new(&mut buffer).draw(params);

        let renderer = execute(&mut buffer, &Resources::new());
        assert_eq!(renderer.calls()[1], RenderOp::BindBlend(BlendState::Transparent));
    }
}
