use std::sync::Arc;

use crate::command::{CommandBuffer, CommandRecorder};
use crate::config::{EngineConfig, Threading};
use crate::coords::Vec2;
use crate::core::{DrawCtx, Game, GameControl, TickCtx};
use crate::input::KeyboardState;
use crate::render::Renderer;
use crate::resources::Resources;
use crate::time::FixedTimestep;

use super::{CommandBufferPair, FrameExecutor, RenderThread};

/// What one [`FrameLoop::run_frame`] did.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct FrameReport {
    pub ticks: u32,
    /// Commands recorded by `draw`.
    pub commands: usize,
    /// Arena bytes those commands used.
    pub bytes_used: usize,
    /// A tick asked to exit; nothing was drawn.
    pub exit: bool,
}

enum Mode {
    Inline {
        renderer: Box<dyn Renderer + Send>,
        buffers: CommandBufferPair,
        executor: FrameExecutor,
    },
    Threaded {
        thread: RenderThread,
        recording: CommandBuffer,
    },
}

/// Drives a [`Game`]: fixed-rate ticks, one recorded frame per call, then
/// execution inline or on the render thread.
pub struct FrameLoop {
    mode: Mode,
    resources: Arc<Resources>,
    timestep: FixedTimestep,
    sim_time: f64,
    tick_index: u64,
    frame_index: u64,
}

impl FrameLoop {
    pub fn new(
        config: &EngineConfig,
        renderer: Box<dyn Renderer + Send>,
        resources: Arc<Resources>,
    ) -> anyhow::Result<Self> {
        anyhow::ensure!(
            config.tick_rate.is_finite() && config.tick_rate > 0.0,
            "tick rate must be positive, got {}",
            config.tick_rate
        );

        let mode = match config.threading {
            Threading::Inline => Mode::Inline {
                renderer,
                buffers: CommandBufferPair::new(&config.command_buffer),
                executor: FrameExecutor::new(),
            },
            Threading::RenderThread => {
                let spare = CommandBuffer::from_config(&config.command_buffer);
                Mode::Threaded {
                    thread: RenderThread::spawn(renderer, resources.clone(), spare)?,
                    recording: CommandBuffer::from_config(&config.command_buffer),
                }
            }
        };
        log::info!(
            "frame loop ready: {:?}, {} Hz, {} bytes x {} commands per buffer",
            config.threading,
            config.tick_rate,
            config.command_buffer.byte_capacity,
            config.command_buffer.max_commands
        );

        Ok(Self {
            mode,
            resources,
            timestep: FixedTimestep::new(config.tick_rate),
            sim_time: 0.0,
            tick_index: 0,
            frame_index: 0,
        })
    }

    pub fn resources(&self) -> &Arc<Resources> {
        &self.resources
    }

    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    /// Simulated seconds so far.
    pub fn sim_time(&self) -> f64 {
        self.sim_time
    }

    pub fn start<G: Game + ?Sized>(&mut self, game: &mut G) {
        game.start(&self.resources);
    }

    /// Runs the ticks `dt` seconds make due, records the frame and hands it
    /// off for execution.
    pub fn run_frame<G: Game + ?Sized>(
        &mut self,
        game: &mut G,
        dt: f64,
        keyboard: &KeyboardState,
        viewport: Vec2,
    ) -> anyhow::Result<FrameReport> {
        let mut report = FrameReport::default();

        let due = self.timestep.accumulate(dt);
        for _ in 0..due {
            let mut ctx = TickCtx {
                resources: &self.resources,
                keyboard,
                step: self.timestep.step(),
                time: self.sim_time,
                tick_index: self.tick_index,
            };
            let control = game.tick(&mut ctx);
            self.sim_time += self.timestep.step();
            self.tick_index += 1;
            report.ticks += 1;

            if control == GameControl::Exit {
                report.exit = true;
                return Ok(report);
            }
        }

        let frame_index = self.frame_index;
        let resources = &self.resources;
        let record = |buffer: &mut CommandBuffer, game: &mut G| {
            buffer.begin();
            let mut ctx = DrawCtx {
                commands: CommandRecorder::new(buffer),
                resources,
                viewport,
                frame_index,
            };
            game.draw(&mut ctx);
            (buffer.len(), buffer.bytes_used())
        };

        (report.commands, report.bytes_used) = match &mut self.mode {
            Mode::Inline { renderer, buffers, executor } => {
                let recorded = record(buffers.flip(), game);
                executor.execute(buffers.active_mut(), renderer.as_mut(), resources)?;
                recorded
            }
            Mode::Threaded { thread, recording } => {
                let recorded = record(recording, game);
                let filled = std::mem::replace(recording, CommandBuffer::new(0, 0));
                *recording = thread.submit(filled)?;
                recorded
            }
        };

        self.frame_index += 1;
        log::trace!(
            "frame {frame_index}: {} ticks, {} commands, {} bytes",
            report.ticks,
            report.commands,
            report.bytes_used
        );
        Ok(report)
    }

    pub fn resize(&mut self, width: u32, height: u32) -> anyhow::Result<()> {
        match &mut self.mode {
            Mode::Inline { renderer, .. } => {
                renderer.resize(width, height);
                Ok(())
            }
            Mode::Threaded { thread, .. } => thread.resize(width, height),
        }
    }

    /// Waits for the frame in flight and stops the render thread, if any.
    pub fn shutdown(self) -> anyhow::Result<()> {
        match self.mode {
            Mode::Inline { .. } => Ok(()),
            Mode::Threaded { thread, .. } => thread.shutdown(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::DrawParams;
    use crate::config::CommandBufferConfig;
    use crate::render::HeadlessRenderer;

    /// Draws one triangle per tick seen so far; exits after `exit_after` ticks.
    struct Counter {
        started: bool,
        ticks: u64,
        exit_after: u64,
        last_time: f64,
    }

    impl Counter {
        fn new(exit_after: u64) -> Self {
            Self { started: false, ticks: 0, exit_after, last_time: -1.0 }
        }
    }

    impl Game for Counter {
        fn start(&mut self, _: &Resources) {
            self.started = true;
        }

        fn tick(&mut self, ctx: &mut TickCtx<'_>) -> GameControl {
            assert!(ctx.time > self.last_time);
            self.last_time = ctx.time;
            self.ticks += 1;
            if self.ticks >= self.exit_after {
                GameControl::Exit
            } else {
                GameControl::Continue
            }
        }

        fn draw(&mut self, ctx: &mut DrawCtx<'_>) {
            let tri = [Vec2::zero(), Vec2::new(1.0, 0.0), Vec2::new(0.0, 1.0)];
            for _ in 0..self.ticks {
                ctx.commands.draw(DrawParams::new(&tri));
            }
        }
    }

    fn config(threading: Threading) -> EngineConfig {
        EngineConfig {
            command_buffer: CommandBufferConfig { byte_capacity: 64 * 1024, max_commands: 64 },
            tick_rate: 10.0,
            threading,
            ..EngineConfig::default()
        }
    }

    fn frame_loop(threading: Threading) -> FrameLoop {
        FrameLoop::new(
            &config(threading),
            Box::new(HeadlessRenderer::new(64 * 1024, 64 * 1024)),
            Arc::new(Resources::new()),
        )
        .unwrap()
    }

    fn run(threading: Threading) -> Vec<FrameReport> {
        let mut frames = frame_loop(threading);
        let mut game = Counter::new(u64::MAX);
        frames.start(&mut game);
        assert!(game.started);

        let keyboard = KeyboardState::new();
        let reports = [0.25, 0.05, 0.06, 0.0]
            .into_iter()
            .map(|dt| frames.run_frame(&mut game, dt, &keyboard, Vec2::new(64.0, 64.0)).unwrap())
            .collect();
        frames.shutdown().unwrap();
        reports
    }

    #[test]
    fn ticks_follow_the_accumulator() {
        let reports = run(Threading::Inline);
        let ticks: Vec<u32> = reports.iter().map(|r| r.ticks).collect();
        assert_eq!(ticks, vec![2, 0, 1, 0]);

        let commands: Vec<usize> = reports.iter().map(|r| r.commands).collect();
        assert_eq!(commands, vec![2, 2, 3, 3]);
    }

    #[test]
    fn non_positive_tick_rate_is_an_error() {
        for (rate, threading) in [(0.0, Threading::Inline), (-5.0, Threading::RenderThread), (f64::NAN, Threading::Inline)] {
            let config = EngineConfig { tick_rate: rate, ..config(threading) };
            let result = FrameLoop::new(
                &config,
                Box::new(HeadlessRenderer::new(1024, 1024)),
                Arc::new(Resources::new()),
            );
            let Err(err) = result else { panic!("tick rate {rate} was accepted") };
            assert!(err.to_string().contains("tick rate must be positive"));
        }
    }

    #[test]
    fn threaded_frames_record_the_same_work() {
        assert_eq!(run(Threading::Inline), run(Threading::RenderThread));
    }

    #[test]
    fn exit_stops_before_drawing() {
        let mut frames = frame_loop(Threading::RenderThread);
        let mut game = Counter::new(3);
        let keyboard = KeyboardState::new();

        let report = frames.run_frame(&mut game, 1.0, &keyboard, Vec2::zero()).unwrap();
        assert!(report.exit);
        assert_eq!(report.ticks, 3);
        assert_eq!(report.commands, 0);
        assert_eq!(frames.frame_index(), 0);
        frames.shutdown().unwrap();
    }

    #[test]
    fn resize_reaches_the_render_thread() {
        let mut frames = frame_loop(Threading::RenderThread);
        frames.resize(320, 200).unwrap();
        frames.shutdown().unwrap();
    }
}
