use crate::command::CommandBuffer;
use crate::render::{DrawContext, Renderer};
use crate::resources::Resources;
use crate::text::TextMesh;

/// Runs a recorded buffer against a renderer: one call is one presented frame.
///
/// Owns the text scratch mesh so its allocation survives across frames.
#[derive(Debug, Default)]
pub struct FrameExecutor {
    text_mesh: TextMesh,
}

impl FrameExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// `begin_frame`, sort, execute every command, `end_frame`.
    pub fn execute(
        &mut self,
        buffer: &mut CommandBuffer,
        renderer: &mut dyn Renderer,
        resources: &Resources,
    ) -> anyhow::Result<()> {
        renderer.begin_frame();
        buffer.sort();
        {
            let mut ctx = DrawContext::begin(renderer, resources, &mut self.text_mesh);
            buffer.execute(&mut ctx);
            log::trace!(
                "frame streamed {} vertex / {} index bytes",
                ctx.vertex_offset(),
                ctx.index_offset()
            );
        }
        renderer.end_frame()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{CommandRecorder, DrawParams};
    use crate::coords::Vec2;
    use crate::render::{HeadlessRenderer, RenderOp};

    #[test]
    fn frame_is_bracketed_by_begin_and_end() {
        let mut buffer = CommandBuffer::new(4096, 8);
        let tri = [Vec2::zero(); 3];
        CommandRecorder::new(&mut buffer).draw(DrawParams::new(&tri));

        let mut renderer = HeadlessRenderer::with_call_log(1024, 1024);
        FrameExecutor::new()
            .execute(&mut buffer, &mut renderer, &Resources::new())
            .unwrap();

        assert_eq!(renderer.calls().first(), Some(&RenderOp::BeginFrame));
        assert_eq!(renderer.calls().last(), Some(&RenderOp::EndFrame));
        assert_eq!(renderer.frames_presented(), 1);
        assert_eq!(renderer.last_frame().draw_calls, 1);
    }

    #[test]
    fn streaming_restarts_with_discard_each_frame() {
        let mut buffer = CommandBuffer::new(4096, 8);
        let tri = [Vec2::zero(); 3];
        let mut renderer = HeadlessRenderer::with_call_log(1024, 1024);
        let resources = Resources::new();
        let mut executor = FrameExecutor::new();

        for _ in 0..2 {
            buffer.begin();
            CommandRecorder::new(&mut buffer).draw(DrawParams::new(&tri));
            renderer.clear_calls();
            executor.execute(&mut buffer, &mut renderer, &resources).unwrap();
            let first_map = renderer.calls().iter().find_map(|op| match op {
                RenderOp::Map { offset, mode, .. } => Some((*offset, *mode)),
                _ => None,
            });
            assert_eq!(first_map, Some((0, crate::render::MapMode::Discard)));
        }
    }
}
