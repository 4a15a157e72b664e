use anyhow::bail;
use winit::dpi::PhysicalSize;

use crate::config::EngineConfig;
use crate::coords::Transform;
use crate::device::{Gpu, SurfaceErrorAction};
use crate::render::{
    BlendState, FillMode, InstanceConstants, MapMode, PrimitiveTopology, Renderer, SamplerState,
    ShaderProgram, StreamingBuffer, TextureKey, TextureSource, VertexStreams,
};

use super::constants::{ConstantRing, GpuConstants};
use super::pipelines::{PipelineKey, Pipelines};
use super::textures::Textures;

#[derive(Debug, Copy, Clone)]
enum DrawKind {
    Vertices(u32),
    Indexed { offset: u32, count: u32 },
}

#[derive(Debug, Copy, Clone)]
struct DrawOp {
    pipeline: PipelineKey,
    constants: u32,
    streams: VertexStreams,
    texture: Option<(TextureKey, SamplerState)>,
    kind: DrawKind,
}

#[derive(Debug, Copy, Clone)]
struct BoundState {
    program: ShaderProgram,
    blend: BlendState,
    fill: FillMode,
    streams: VertexStreams,
    constants: Option<u32>,
    texture: Option<(TextureKey, SamplerState)>,
}

impl Default for BoundState {
    fn default() -> Self {
        Self {
            program: ShaderProgram::Color,
            blend: BlendState::Opaque,
            fill: FillMode::Solid,
            streams: VertexStreams { positions: 0, texcoords: None },
            constants: None,
            texture: None,
        }
    }
}

/// CPU copy of one streaming buffer plus its GPU counterpart.
struct Stream {
    staging: Vec<u8>,
    /// Bytes written this frame.
    written: usize,
    buffer: wgpu::Buffer,
}

impl Stream {
    fn new(device: &wgpu::Device, label: &str, bytes: u32, usage: wgpu::BufferUsages) -> Self {
        // Queue writes must be multiples of 4 bytes.
        let bytes = bytes - bytes % 4;
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: u64::from(bytes.max(4)),
            usage: usage | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        Self { staging: vec![0; bytes as usize], written: 0, buffer }
    }

    fn upload(&mut self, queue: &wgpu::Queue) {
        let len = self.written.next_multiple_of(4).min(self.staging.len());
        if len > 0 {
            queue.write_buffer(&self.buffer, 0, &self.staging[..len]);
        }
        self.written = 0;
    }
}

/// [`Renderer`] on top of wgpu.
///
/// Dispatch-time calls only touch CPU state: streaming writes land in
/// staging memory, draws are recorded as [`DrawOp`]s with the state bound at
/// the time of the call. `end_frame` uploads and encodes everything in one
/// render pass.
///
/// Wireframe fill is drawn solid: line polygon mode is an optional device
/// feature this back end does not request.
pub struct WgpuRenderer {
    gpu: Gpu,
    clear_color: wgpu::Color,

    vertices: Stream,
    indices: Stream,
    mapped: Option<StreamingBuffer>,

    constants: ConstantRing,
    pipelines: Pipelines,
    textures: Textures,

    state: BoundState,
    ops: Vec<DrawOp>,
    warned_wireframe: bool,
}

impl WgpuRenderer {
    pub fn new(gpu: Gpu, config: &EngineConfig) -> Self {
        let device = gpu.device();

        let vertices = Stream::new(
            device,
            "kiln vertex stream",
            config.streaming.vertex_bytes,
            wgpu::BufferUsages::VERTEX,
        );
        let indices = Stream::new(
            device,
            "kiln index stream",
            config.streaming.index_bytes,
            wgpu::BufferUsages::INDEX,
        );

        let capacity = u32::try_from(config.command_buffer.max_commands).unwrap_or(u32::MAX);
        let constants = ConstantRing::new(device, capacity);
        let textures = Textures::new(device);
        let pipelines = Pipelines::new(
            device,
            gpu.surface_format(),
            constants.layout(),
            textures.layout(),
        );

        let [r, g, b, a] = config.clear_color.to_rgba_f32();
        let clear_color = wgpu::Color {
            r: f64::from(r),
            g: f64::from(g),
            b: f64::from(b),
            a: f64::from(a),
        };

        Self {
            gpu,
            clear_color,
            vertices,
            indices,
            mapped: None,
            constants,
            pipelines,
            textures,
            state: BoundState::default(),
            ops: Vec::new(),
            warned_wireframe: false,
        }
    }

    pub fn gpu(&self) -> &Gpu {
        &self.gpu
    }

    fn stream_mut(&mut self, buffer: StreamingBuffer) -> &mut Stream {
        match buffer {
            StreamingBuffer::Vertex => &mut self.vertices,
            StreamingBuffer::Index => &mut self.indices,
        }
    }

    fn projection(&self) -> Transform {
        let size = self.gpu.size();
        Transform::ortho_top_left(size.width.max(1) as f32, size.height.max(1) as f32)
    }

    fn record(&mut self, topology: PrimitiveTopology, kind: DrawKind) {
        let state = self.state;
        let Some(constants) = state.constants else {
            log::debug!("draw without instance constants; skipped");
            return;
        };

        let pipeline = PipelineKey { program: state.program, blend: state.blend, topology };
        let texture = if pipeline.is_textured() {
            let (Some(texture), Some(_)) = (state.texture, state.streams.texcoords) else {
                log::debug!("{:?} draw without texture or texcoords; skipped", state.program);
                return;
            };
            Some(texture)
        } else {
            None
        };

        if state.fill == FillMode::Wireframe && !self.warned_wireframe {
            log::debug!("wireframe fill is drawn solid by the wgpu back end");
            self.warned_wireframe = true;
        }

        self.pipelines.ensure(self.gpu.device(), pipeline);
        self.ops.push(DrawOp {
            pipeline,
            constants,
            streams: state.streams,
            texture,
            kind,
        });
    }

    fn encode(&self, pass: &mut wgpu::RenderPass<'_>, op: &DrawOp) {
        let Some(pipeline) = self.pipelines.get(&op.pipeline) else {
            return;
        };
        pass.set_pipeline(pipeline);
        pass.set_bind_group(0, self.constants.bind_group(), &[op.constants]);

        if let Some((key, sampler)) = op.texture {
            let Some(group) = self.textures.bind_group(key, sampler) else {
                return;
            };
            pass.set_bind_group(1, group, &[]);
        }

        let vertex_buffer = &self.vertices.buffer;
        pass.set_vertex_buffer(0, vertex_buffer.slice(u64::from(op.streams.positions)..));
        if let Some(texcoords) = op.streams.texcoords {
            pass.set_vertex_buffer(1, vertex_buffer.slice(u64::from(texcoords)..));
        }

        match op.kind {
            DrawKind::Vertices(count) => pass.draw(0..count, 0..1),
            DrawKind::Indexed { offset, count } => {
                pass.set_index_buffer(
                    self.indices.buffer.slice(u64::from(offset)..),
                    wgpu::IndexFormat::Uint16,
                );
                pass.draw_indexed(0..count, 0, 0..1);
            }
        }
    }

    fn reset_frame(&mut self) {
        self.ops.clear();
        self.constants.reset();
        self.state = BoundState::default();
    }
}

impl Renderer for WgpuRenderer {
    fn begin_frame(&mut self) {
        self.reset_frame();
    }

    fn end_frame(&mut self) -> anyhow::Result<()> {
        let device = self.gpu.device();
        let queue = self.gpu.queue();
        self.vertices.upload(queue);
        self.indices.upload(queue);
        self.constants.upload(device, queue);

        let mut frame = match self.gpu.acquire_frame() {
            Ok(frame) => frame,
            Err(err) => {
                let message = err.to_string();
                match self.gpu.recover(err) {
                    SurfaceErrorAction::Fatal => bail!("surface error: {message}"),
                    action => {
                        log::debug!("surface error ({message}): {action:?}, frame dropped");
                        self.reset_frame();
                        return Ok(());
                    }
                }
            }
        };

        {
            let mut pass = frame.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("kiln frame pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &frame.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            for op in &self.ops {
                self.encode(&mut pass, op);
            }
        }

        log::trace!("wgpu frame: {} draws", self.ops.len());
        self.gpu.present(frame);
        self.reset_frame();
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.gpu.resize(PhysicalSize::new(width, height));
    }

    fn streaming_capacity(&self, buffer: StreamingBuffer) -> u32 {
        let stream = match buffer {
            StreamingBuffer::Vertex => &self.vertices,
            StreamingBuffer::Index => &self.indices,
        };
        stream.staging.len() as u32
    }

    fn bind_shader_program(&mut self, program: ShaderProgram) {
        self.state.program = program;
    }

    fn bind_blend_state(&mut self, blend: BlendState) {
        self.state.blend = blend;
    }

    fn set_fill_mode(&mut self, fill: FillMode) {
        self.state.fill = fill;
    }

    fn map_streaming_buffer(
        &mut self,
        buffer: StreamingBuffer,
        offset: u32,
        len: u32,
        mode: MapMode,
    ) -> &mut [u8] {
        debug_assert!(self.mapped.is_none(), "streaming buffer mapped twice");
        self.mapped = Some(buffer);

        let (start, end) = (offset as usize, (offset + len) as usize);
        let stream = self.stream_mut(buffer);
        stream.written = match mode {
            MapMode::Discard => end,
            MapMode::NoOverwrite => stream.written.max(end),
        };
        &mut stream.staging[start..end]
    }

    fn unmap_streaming_buffer(&mut self, buffer: StreamingBuffer) {
        debug_assert_eq!(self.mapped, Some(buffer), "unmapping a buffer that is not mapped");
        self.mapped = None;
    }

    fn set_instance_constants(&mut self, constants: &InstanceConstants) {
        let mvp = self.projection() * constants.transform;
        let slot = self.constants.push(&GpuConstants { mvp: mvp.m, color: constants.color });
        self.state.constants = Some(slot);
    }

    fn bind_vertex_streams(&mut self, streams: VertexStreams) {
        self.state.streams = streams;
    }

    fn bind_texture(&mut self, texture: TextureSource<'_>, sampler: SamplerState) {
        let resident = self
            .textures
            .prepare(self.gpu.device(), self.gpu.queue(), texture);
        self.state.texture = resident.then(|| (texture.key(), sampler));
    }

    fn draw(&mut self, topology: PrimitiveTopology, vertex_count: u32) {
        self.record(topology, DrawKind::Vertices(vertex_count));
    }

    fn draw_indexed(&mut self, topology: PrimitiveTopology, index_offset: u32, index_count: u32) {
        self.record(topology, DrawKind::Indexed { offset: index_offset, count: index_count });
    }
}
