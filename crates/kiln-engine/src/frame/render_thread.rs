use std::sync::Arc;
use std::thread::{self, JoinHandle};

use anyhow::{anyhow, Context};
use crossbeam_channel::{Receiver, Sender};

use crate::command::CommandBuffer;
use crate::render::Renderer;
use crate::resources::Resources;

use super::FrameExecutor;

enum RenderMessage {
    Execute(CommandBuffer),
    Resize(u32, u32),
    Shutdown,
}

/// Dedicated thread executing recorded frames.
///
/// Buffers change hands through two single-slot channels: the game thread
/// sends a filled buffer on one and receives an executed (reusable) buffer
/// on the other. A buffer is only ever reachable from one thread, so no lock
/// guards it. The game thread runs at most one frame ahead of the GPU.
pub struct RenderThread {
    filled: Sender<RenderMessage>,
    submitted: Receiver<CommandBuffer>,
    handle: Option<JoinHandle<anyhow::Result<()>>>,
}

impl RenderThread {
    /// Starts the thread. `spare` is the buffer handed back by the first
    /// [`submit`](Self::submit).
    pub fn spawn(
        mut renderer: Box<dyn Renderer + Send>,
        resources: Arc<Resources>,
        spare: CommandBuffer,
    ) -> anyhow::Result<Self> {
        let (filled, filled_rx) = crossbeam_channel::bounded::<RenderMessage>(1);
        let (submitted_tx, submitted) = crossbeam_channel::bounded::<CommandBuffer>(1);
        submitted_tx
            .send(spare)
            .map_err(|_| anyhow!("render thread channel closed before start"))?;

        let handle = thread::Builder::new()
            .name("kiln-render".into())
            .spawn(move || -> anyhow::Result<()> {
                log::debug!("render thread started");
                let mut executor = FrameExecutor::new();

                for message in filled_rx.iter() {
                    match message {
                        RenderMessage::Execute(mut buffer) => {
                            executor.execute(&mut buffer, renderer.as_mut(), &resources)?;
                            if submitted_tx.send(buffer).is_err() {
                                break;
                            }
                        }
                        RenderMessage::Resize(width, height) => renderer.resize(width, height),
                        RenderMessage::Shutdown => break,
                    }
                }

                log::debug!("render thread stopped");
                Ok(())
            })
            .context("failed to spawn render thread")?;

        Ok(Self { filled, submitted, handle: Some(handle) })
    }

    /// Hands `buffer` to the render thread and returns the buffer to record
    /// the next frame into.
    ///
    /// Blocks until the render thread has finished the frame before.
    pub fn submit(&mut self, buffer: CommandBuffer) -> anyhow::Result<CommandBuffer> {
        let Ok(next) = self.submitted.recv() else {
            return Err(self.stopped());
        };
        if self.filled.send(RenderMessage::Execute(buffer)).is_err() {
            return Err(self.stopped());
        }
        Ok(next)
    }

    pub fn resize(&mut self, width: u32, height: u32) -> anyhow::Result<()> {
        if self.filled.send(RenderMessage::Resize(width, height)).is_err() {
            return Err(self.stopped());
        }
        Ok(())
    }

    /// Stops the thread after it finished the frame in flight.
    pub fn shutdown(mut self) -> anyhow::Result<()> {
        self.join()
    }

    fn join(&mut self) -> anyhow::Result<()> {
        let Some(handle) = self.handle.take() else {
            return Ok(());
        };
        // Fails only if the thread already exited.
        let _ = self.filled.send(RenderMessage::Shutdown);
        match handle.join() {
            Ok(result) => result.context("render thread failed"),
            Err(_) => Err(anyhow!("render thread panicked")),
        }
    }

    /// Error describing why the thread is gone.
    fn stopped(&mut self) -> anyhow::Error {
        match self.join() {
            Ok(()) => anyhow!("render thread stopped"),
            Err(err) => err,
        }
    }
}

impl Drop for RenderThread {
    fn drop(&mut self) {
        if let Err(err) = self.join() {
            log::error!("{err:#}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{CommandRecorder, DrawParams};
    use crate::coords::Vec2;
    use crate::render::{
        BlendState, FillMode, InstanceConstants, MapMode, PrimitiveTopology, SamplerState,
        ShaderProgram, StreamingBuffer, TextureSource, VertexStreams,
    };

    /// Forwards the vertex count of every draw to the test thread.
    struct DrawTap {
        draws: Sender<u32>,
        scratch: Vec<u8>,
    }

    impl Renderer for DrawTap {
        fn streaming_capacity(&self, _: StreamingBuffer) -> u32 {
            self.scratch.len() as u32
        }
        fn bind_shader_program(&mut self, _: ShaderProgram) {}
        fn bind_blend_state(&mut self, _: BlendState) {}
        fn set_fill_mode(&mut self, _: FillMode) {}
        fn map_streaming_buffer(&mut self, _: StreamingBuffer, offset: u32, len: u32, _: MapMode) -> &mut [u8] {
            &mut self.scratch[offset as usize..(offset + len) as usize]
        }
        fn unmap_streaming_buffer(&mut self, _: StreamingBuffer) {}
        fn set_instance_constants(&mut self, _: &InstanceConstants) {}
        fn bind_vertex_streams(&mut self, _: VertexStreams) {}
        fn bind_texture(&mut self, _: TextureSource<'_>, _: SamplerState) {}
        fn draw(&mut self, _: PrimitiveTopology, vertex_count: u32) {
            let _ = self.draws.send(vertex_count);
        }
        fn draw_indexed(&mut self, _: PrimitiveTopology, _: u32, _: u32) {}
    }

    fn record(buffer: &mut CommandBuffer, vertices: usize) {
        buffer.begin();
        let points = vec![Vec2::zero(); vertices];
        CommandRecorder::new(buffer).draw(DrawParams::new(&points));
    }

    #[test]
    fn buffers_alternate_between_threads() {
        let (draws_tx, draws) = crossbeam_channel::unbounded();
        let tap = DrawTap { draws: draws_tx, scratch: vec![0; 4096] };
        let mut thread = RenderThread::spawn(
            Box::new(tap),
            Arc::new(Resources::new()),
            CommandBuffer::new(4096, 8),
        )
        .unwrap();

        let mut recording = CommandBuffer::new(4096, 8);
        for frame in 1..=4 {
            record(&mut recording, frame * 3);
            recording = thread.submit(recording).unwrap();
        }
        thread.shutdown().unwrap();

        let seen: Vec<u32> = draws.try_iter().collect();
        assert_eq!(seen, vec![3, 6, 9, 12]);
    }

    #[test]
    fn dropping_joins_the_thread() {
        let (draws_tx, draws) = crossbeam_channel::unbounded();
        let tap = DrawTap { draws: draws_tx, scratch: vec![0; 4096] };
        let mut thread = RenderThread::spawn(
            Box::new(tap),
            Arc::new(Resources::new()),
            CommandBuffer::new(4096, 8),
        )
        .unwrap();

        let mut recording = CommandBuffer::new(4096, 8);
        record(&mut recording, 3);
        let _next = thread.submit(recording).unwrap();
        drop(thread);

        // The frame in flight still executed before shutdown.
        assert_eq!(draws.try_iter().collect::<Vec<_>>(), vec![3]);
    }
}
