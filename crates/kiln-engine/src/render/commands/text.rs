use crate::command::{ArenaView, DrawTextCommand, RenderCommand};
use crate::coords::Transform;
use crate::render::{
    BlendState, DrawContext, FillMode, InstanceConstants, PrimitiveTopology, SamplerState,
    ShaderProgram, StreamingBuffer, TextureSource, VertexStreams,
};
use crate::text::layout_text;

impl RenderCommand for DrawTextCommand {
    fn execute(&self, ctx: &mut DrawContext<'_>, arena: ArenaView<'_>) {
        let Some(font) = ctx.resources().fonts().get(self.font) else {
            log::warn!("draw_text: font {:?} is not loaded, skipping", self.font);
            return;
        };
        let text = arena.str(self.text);
        if text.is_empty() {
            return;
        }

        let mut mesh = ctx.take_text_mesh();
        let layout = layout_text(&font.metrics, text, &self.layout_params(), &mut mesh);
        log::trace!("draw_text: {} glyphs on {} lines", layout.glyphs, layout.lines);

        if !mesh.indices.is_empty() {
            let renderer = ctx.renderer();
            renderer.bind_shader_program(ShaderProgram::Text);
            renderer.bind_blend_state(BlendState::Transparent);
            renderer.set_fill_mode(FillMode::Solid);

            let positions = ctx.stream(StreamingBuffer::Vertex, bytemuck::cast_slice(&mesh.positions));
            let texcoords = ctx.stream(StreamingBuffer::Vertex, bytemuck::cast_slice(&mesh.texcoords));
            let indices = ctx.stream(StreamingBuffer::Index, bytemuck::cast_slice(&mesh.indices));

            let renderer = ctx.renderer();
            renderer.bind_vertex_streams(VertexStreams { positions, texcoords: Some(texcoords) });
            renderer.set_instance_constants(&InstanceConstants {
                transform: Transform::IDENTITY,
                color: self.color.to_rgba_f32(),
            });
            renderer.bind_texture(
                TextureSource::FontAtlas { handle: self.font, atlas: &font.atlas },
                SamplerState::Point,
            );
            renderer.draw_indexed(
                PrimitiveTopology::TriangleStrip,
                indices,
                mesh.indices.len() as u32,
            );
        }

        ctx.restore_text_mesh(mesh);
    }
}

#[cfg(test)]
mod tests {
    use crate::command::{CommandBuffer, CommandRecorder, TextParams};
    use crate::coords::Vec2;
    use crate::render::{
        BlendState, DrawContext, HeadlessRenderer, PrimitiveTopology, RenderOp, ShaderProgram,
        StreamingBuffer, TextureKey,
    };
    use crate::resources::{FontHandle, Resources};
    use crate::text::{FontAsset, FontMetrics, GlyphAtlas, GlyphInfo, TextMesh, STRIP_RESTART};

    fn resources_with_font() -> (Resources, FontHandle) {
        let mut metrics = FontMetrics::new(20.0, 16.0);
        for c in 'a'..='z' {
            metrics.insert(
                c,
                GlyphInfo {
                    uv_max: Vec2::new(1.0, 1.0),
                    size: Vec2::new(8.0, 12.0),
                    bearing: Vec2::new(1.0, 12.0),
                    advance: 10.0,
                    has_bitmap: true,
                    ..GlyphInfo::default()
                },
            );
        }
        metrics.insert(' ', GlyphInfo::blank(5.0));
        let asset = FontAsset { metrics, atlas: GlyphAtlas::default(), size: 16 };

        let resources = Resources::new();
        let font = resources.fonts().insert("test", asset).unwrap();
        (resources, font)
    }

    fn execute(buffer: &mut CommandBuffer, resources: &Resources, mesh: &mut TextMesh) -> HeadlessRenderer {
        let mut renderer = HeadlessRenderer::with_call_log(1 << 16, 1 << 14);
        buffer.sort();
        let mut ctx = DrawContext::begin(&mut renderer, resources, mesh);
        buffer.execute(&mut ctx);
        renderer
    }

    fn indexed_count(renderer: &HeadlessRenderer) -> Option<u32> {
        renderer.calls().iter().find_map(|op| match op {
            RenderOp::DrawIndexed { topology: PrimitiveTopology::TriangleStrip, index_count, .. } => {
                Some(*index_count)
            }
            _ => None,
        })
    }

    #[test]
    fn range_reveals_only_selected_glyphs() {
        let (resources, font) = resources_with_font();
        let mut buffer = CommandBuffer::new(4096, 4);
        let mut params = TextParams::new(font, "abcdefghij");
        params.range = Some((2, 5));
        CommandRecorder::new(&mut buffer).draw_text(params);

        let mut mesh = TextMesh::default();
        let renderer = execute(&mut buffer, &resources, &mut mesh);
        assert_eq!(indexed_count(&renderer), Some(15));

        // Quads sit where 'c', 'd', 'e' would be drawn with the full string.
        let positions: Vec<Vec2> =
            bytemuck::pod_collect_to_vec(&renderer.streaming_contents(StreamingBuffer::Vertex)[..12 * 8]);
        assert_eq!(positions[0].x, 21.0);
        assert_eq!(positions[4].x, 31.0);
        assert_eq!(positions[8].x, 41.0);
    }

    #[test]
    fn text_binds_atlas_with_point_sampling() {
        let (resources, font) = resources_with_font();
        let mut buffer = CommandBuffer::new(4096, 4);
        CommandRecorder::new(&mut buffer).draw_text(TextParams::new(font, "hi there"));

        let mut mesh = TextMesh::default();
        let renderer = execute(&mut buffer, &resources, &mut mesh);
        let calls = renderer.calls();
        assert_eq!(calls[0], RenderOp::BindProgram(ShaderProgram::Text));
        assert_eq!(calls[1], RenderOp::BindBlend(BlendState::Transparent));
        assert!(calls.contains(&RenderOp::BindTexture {
            key: TextureKey::FontAtlas(font),
            sampler: crate::render::SamplerState::Point,
        }));
        assert_eq!(indexed_count(&renderer), Some(7 * 5));

        let indices: Vec<u16> =
            bytemuck::pod_collect_to_vec(&renderer.streaming_contents(StreamingBuffer::Index)[..10]);
        assert_eq!(indices, vec![0, 1, 2, 3, STRIP_RESTART]);

        // Scratch mesh is handed back for the next frame.
        assert_eq!(mesh.glyph_count(), 7);
    }

    #[test]
    fn unknown_font_is_skipped() {
        let (resources, _) = resources_with_font();
        let mut buffer = CommandBuffer::new(4096, 4);
        CommandRecorder::new(&mut buffer).draw_text(TextParams::new(FontHandle::INVALID, "hidden"));
        CommandRecorder::new(&mut buffer).draw_text(TextParams::new(FontHandle(9), "hidden"));

        let mut mesh = TextMesh::default();
        let renderer = execute(&mut buffer, &resources, &mut mesh);
        assert!(renderer.calls().is_empty());
    }

    #[test]
    fn identical_frames_stream_identical_bytes() {
        let (resources, font) = resources_with_font();
        let mut mesh = TextMesh::default();
        let mut frames = Vec::new();
        for _ in 0..2 {
            let mut buffer = CommandBuffer::new(4096, 4);
            let mut params = TextParams::new(font, "same text every frame");
            params.width = 60.0;
            CommandRecorder::new(&mut buffer).draw_text(params);
            let renderer = execute(&mut buffer, &resources, &mut mesh);
            frames.push(renderer.streaming_contents(StreamingBuffer::Vertex).to_vec());
        }
        assert_eq!(frames[0], frames[1]);
    }
}
