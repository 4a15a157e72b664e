use std::sync::Arc;

use anyhow::{Context, Result};
use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalSize};
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::config::EngineConfig;
use crate::coords::Vec2;
use crate::core::{Game, GameControl};
use crate::device::{Gpu, GpuInit};
use crate::frame::FrameLoop;
use crate::input::{translate_key_event, KeyTransition, KeyboardState};
use crate::render::WgpuRenderer;
use crate::resources::Resources;
use crate::time::FrameClock;

/// Window configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub logical_size: LogicalSize<f64>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "kiln".to_string(),
            logical_size: LogicalSize::new(1280.0, 720.0),
        }
    }
}

/// Entry point for windowed games.
pub struct Runtime;

impl Runtime {
    /// Opens the window and drives `game` until it exits or the window closes.
    ///
    /// Errors raised inside the event loop (GPU setup, a failed frame) end the
    /// loop and are returned here.
    pub fn run<G>(
        config: RuntimeConfig,
        gpu_init: GpuInit,
        engine: EngineConfig,
        resources: Arc<Resources>,
        game: G,
    ) -> Result<()>
    where
        G: Game + 'static,
    {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = AppState {
            config,
            gpu_init,
            engine,
            resources,
            game,
            keyboard: KeyboardState::new(),
            session: None,
            started: false,
            failure: None,
        };

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        if let Some(session) = state.session.take() {
            session.frames.shutdown()?;
        }
        match state.failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// Window plus everything that renders into it.
struct Session {
    window: Arc<Window>,
    frames: FrameLoop,
    clock: FrameClock,
    size: PhysicalSize<u32>,
}

struct AppState<G: Game> {
    config: RuntimeConfig,
    gpu_init: GpuInit,
    engine: EngineConfig,
    resources: Arc<Resources>,
    game: G,

    keyboard: KeyboardState,
    session: Option<Session>,
    started: bool,
    failure: Option<anyhow::Error>,
}

impl<G: Game> AppState<G> {
    fn create_session(&self, event_loop: &ActiveEventLoop) -> Result<Session> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.logical_size);

        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .context("failed to create window")?,
        );

        let gpu = pollster::block_on(Gpu::new(window.clone(), self.gpu_init.clone()))
            .context("GPU initialization failed for window")?;
        let size = gpu.size();
        let renderer = WgpuRenderer::new(gpu, &self.engine);
        let frames = FrameLoop::new(&self.engine, Box::new(renderer), self.resources.clone())?;

        log::info!("window {}x{} ready", size.width, size.height);
        Ok(Session { window, frames, clock: FrameClock::new(), size })
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        log::error!("{err:#}");
        self.failure.get_or_insert(err);
        event_loop.exit();
    }

    fn redraw(&mut self) -> Result<GameControl> {
        let Some(session) = self.session.as_mut() else {
            return Ok(GameControl::Continue);
        };

        let time = session.clock.tick();
        let viewport = Vec2::new(session.size.width as f32, session.size.height as f32);
        let report =
            session
                .frames
                .run_frame(&mut self.game, f64::from(time.dt), &self.keyboard, viewport)?;

        Ok(if report.exit { GameControl::Exit } else { GameControl::Continue })
    }

    fn resize(&mut self, size: PhysicalSize<u32>) -> Result<()> {
        let Some(session) = self.session.as_mut() else {
            return Ok(());
        };
        if size.width == 0 || size.height == 0 {
            // Minimized; keep the last drawable.
            return Ok(());
        }
        session.size = size;
        session.frames.resize(size.width, size.height)?;
        self.game.resized(size.width, size.height);
        session.window.request_redraw();
        Ok(())
    }

    fn key_transition(&mut self, transition: KeyTransition) -> GameControl {
        match transition {
            KeyTransition::Down(key) => self.game.key_down(key),
            KeyTransition::Up(key) => {
                self.game.key_up(key);
                GameControl::Continue
            }
        }
    }
}

impl<G: Game> ApplicationHandler for AppState<G> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.session.is_some() {
            return;
        }

        match self.create_session(event_loop) {
            Ok(session) => {
                session.window.request_redraw();
                self.session = Some(session);
            }
            Err(err) => {
                self.fail(event_loop, err.context("failed to create initial window"));
                return;
            }
        }

        if !self.started {
            self.started = true;
            self.game.start(&self.resources);
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        event_loop.set_control_flow(ControlFlow::Poll);
        if let Some(session) = &self.session {
            session.window.request_redraw();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let control = match event {
            WindowEvent::CloseRequested => GameControl::Exit,

            WindowEvent::Resized(size) => match self.resize(size) {
                Ok(()) => GameControl::Continue,
                Err(err) => return self.fail(event_loop, err),
            },

            WindowEvent::ScaleFactorChanged { .. } => {
                let size = self.session.as_ref().map(|s| s.window.inner_size());
                match size.map(|size| self.resize(size)) {
                    Some(Err(err)) => return self.fail(event_loop, err),
                    _ => GameControl::Continue,
                }
            }

            WindowEvent::Focused(false) => {
                for transition in self.keyboard.release_all() {
                    self.key_transition(transition);
                }
                GameControl::Continue
            }

            WindowEvent::KeyboardInput { event, .. } => translate_key_event(&event)
                .and_then(|(key, state)| self.keyboard.apply(key, state))
                .map_or(GameControl::Continue, |t| self.key_transition(t)),

            WindowEvent::RedrawRequested => match self.redraw() {
                Ok(control) => control,
                Err(err) => return self.fail(event_loop, err.context("frame failed")),
            },

            _ => GameControl::Continue,
        };

        if control == GameControl::Exit {
            log::info!("exit requested");
            event_loop.exit();
        }
    }
}
