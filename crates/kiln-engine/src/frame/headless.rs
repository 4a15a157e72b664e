use std::sync::Arc;

use crate::config::EngineConfig;
use crate::coords::Vec2;
use crate::core::Game;
use crate::input::KeyboardState;
use crate::render::HeadlessRenderer;
use crate::resources::Resources;

use super::FrameLoop;

/// Totals of a [`run_headless`] session.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct HeadlessSummary {
    pub frames: u64,
    pub ticks: u64,
    pub commands: u64,
    /// Largest arena use of any frame.
    pub peak_bytes: usize,
    pub exited: bool,
}

/// Runs `game` for up to `frames` frames against a [`HeadlessRenderer`],
/// advancing exactly one tick interval per frame.
pub fn run_headless<G: Game + ?Sized>(
    game: &mut G,
    config: &EngineConfig,
    resources: Arc<Resources>,
    viewport: Vec2,
    frames: u64,
) -> anyhow::Result<HeadlessSummary> {
    let renderer = HeadlessRenderer::new(config.streaming.vertex_bytes, config.streaming.index_bytes);
    let mut frame_loop = FrameLoop::new(config, Box::new(renderer), resources)?;
    frame_loop.start(game);

    let keyboard = KeyboardState::new();
    let dt = config.tick_interval();
    let mut summary = HeadlessSummary::default();

    for _ in 0..frames {
        let report = frame_loop.run_frame(game, dt, &keyboard, viewport)?;
        summary.ticks += u64::from(report.ticks);
        if report.exit {
            summary.exited = true;
            break;
        }
        summary.frames += 1;
        summary.commands += report.commands as u64;
        summary.peak_bytes = summary.peak_bytes.max(report.bytes_used);
    }

    frame_loop.shutdown()?;
    log::info!(
        "headless run: {} frames, {} ticks, {} commands, peak {} arena bytes",
        summary.frames,
        summary.ticks,
        summary.commands,
        summary.peak_bytes
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::DrawParams;
    use crate::config::{CommandBufferConfig, StreamingConfig, Threading};
    use crate::core::{DrawCtx, GameControl, TickCtx};
    use crate::render::PrimitiveTopology;

    struct Frame;

    impl Game for Frame {
        fn tick(&mut self, ctx: &mut TickCtx<'_>) -> GameControl {
            if ctx.tick_index == 4 {
                GameControl::Exit
            } else {
                GameControl::Continue
            }
        }

        fn draw(&mut self, ctx: &mut DrawCtx<'_>) {
            let v = ctx.viewport;
            let axes = [Vec2::zero(), Vec2::new(v.x, 0.0), Vec2::zero(), Vec2::new(0.0, v.y)];
            ctx.commands.draw(DrawParams {
                topology: PrimitiveTopology::LineList,
                ..DrawParams::new(&axes)
            });
        }
    }

    #[test]
    fn runs_until_the_game_exits() {
        let config = EngineConfig {
            command_buffer: CommandBufferConfig { byte_capacity: 4096, max_commands: 4 },
            streaming: StreamingConfig { vertex_bytes: 4096, index_bytes: 4096 },
            threading: Threading::RenderThread,
            ..EngineConfig::default()
        };
        let summary =
            run_headless(&mut Frame, &config, Arc::new(Resources::new()), Vec2::new(8.0, 8.0), 100)
                .unwrap();

        assert_eq!(summary.frames, 4);
        assert_eq!(summary.ticks, 5);
        assert_eq!(summary.commands, 4);
        assert!(summary.exited);
        assert!(summary.peak_bytes > 0);
    }
}
