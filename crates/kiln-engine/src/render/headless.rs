use super::{
    BlendState, FillMode, InstanceConstants, MapMode, PrimitiveTopology, Renderer, SamplerState,
    ShaderProgram, StreamingBuffer, TextureKey, TextureSource, VertexStreams,
};

/// One call received by a [`HeadlessRenderer`] with call logging enabled.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderOp {
    BeginFrame,
    EndFrame,
    BindProgram(ShaderProgram),
    BindBlend(BlendState),
    SetFill(FillMode),
    Map { buffer: StreamingBuffer, offset: u32, len: u32, mode: MapMode },
    Unmap(StreamingBuffer),
    Constants(InstanceConstants),
    Streams(VertexStreams),
    BindTexture { key: TextureKey, sampler: SamplerState },
    Draw { topology: PrimitiveTopology, vertex_count: u32 },
    DrawIndexed { topology: PrimitiveTopology, index_offset: u32, index_count: u32 },
}

/// Counters for one executed frame.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub draw_calls: u32,
    pub vertices: u32,
    pub indices: u32,
    pub vertex_bytes: u32,
    pub index_bytes: u32,
}

/// CPU-only back end.
///
/// Keeps real streaming buffers in memory and counts work, which makes it
/// useful both for running a game without a window and as a recording mock:
/// with [`with_call_log`](Self::with_call_log) every trait call is appended
/// to [`calls`](Self::calls).
#[derive(Debug)]
pub struct HeadlessRenderer {
    vertex_data: Vec<u8>,
    index_data: Vec<u8>,
    mapped: Option<(StreamingBuffer, usize, usize)>,

    log_calls: bool,
    calls: Vec<RenderOp>,

    frame: FrameStats,
    last_frame: FrameStats,
    frames_presented: u64,
}

impl HeadlessRenderer {
    pub fn new(vertex_bytes: u32, index_bytes: u32) -> Self {
        Self {
            vertex_data: vec![0; vertex_bytes as usize],
            index_data: vec![0; index_bytes as usize],
            mapped: None,
            log_calls: false,
            calls: Vec::new(),
            frame: FrameStats::default(),
            last_frame: FrameStats::default(),
            frames_presented: 0,
        }
    }

    pub fn with_call_log(vertex_bytes: u32, index_bytes: u32) -> Self {
        Self {
            log_calls: true,
            ..Self::new(vertex_bytes, index_bytes)
        }
    }

    pub fn calls(&self) -> &[RenderOp] {
        &self.calls
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    /// Full contents of a streaming buffer.
    pub fn streaming_contents(&self, buffer: StreamingBuffer) -> &[u8] {
        match buffer {
            StreamingBuffer::Vertex => &self.vertex_data,
            StreamingBuffer::Index => &self.index_data,
        }
    }

    /// Counters of the frame in progress.
    pub fn current_frame(&self) -> FrameStats {
        self.frame
    }

    /// Counters of the last frame that reached `end_frame`.
    pub fn last_frame(&self) -> FrameStats {
        self.last_frame
    }

    pub fn frames_presented(&self) -> u64 {
        self.frames_presented
    }

    #[inline]
    fn record(&mut self, op: RenderOp) {
        if self.log_calls {
            self.calls.push(op);
        }
    }

    fn storage(&mut self, buffer: StreamingBuffer) -> &mut Vec<u8> {
        match buffer {
            StreamingBuffer::Vertex => &mut self.vertex_data,
            StreamingBuffer::Index => &mut self.index_data,
        }
    }
}

impl Renderer for HeadlessRenderer {
    fn begin_frame(&mut self) {
        self.frame = FrameStats::default();
        self.record(RenderOp::BeginFrame);
    }

    fn end_frame(&mut self) -> anyhow::Result<()> {
        self.record(RenderOp::EndFrame);
        self.last_frame = self.frame;
        self.frames_presented += 1;
        Ok(())
    }

    fn streaming_capacity(&self, buffer: StreamingBuffer) -> u32 {
        self.streaming_contents(buffer).len() as u32
    }

    fn bind_shader_program(&mut self, program: ShaderProgram) {
        self.record(RenderOp::BindProgram(program));
    }

    fn bind_blend_state(&mut self, blend: BlendState) {
        self.record(RenderOp::BindBlend(blend));
    }

    fn set_fill_mode(&mut self, fill: FillMode) {
        self.record(RenderOp::SetFill(fill));
    }

    fn map_streaming_buffer(
        &mut self,
        buffer: StreamingBuffer,
        offset: u32,
        len: u32,
        mode: MapMode,
    ) -> &mut [u8] {
        debug_assert!(self.mapped.is_none(), "streaming buffer mapped twice");
        self.record(RenderOp::Map { buffer, offset, len, mode });

        match buffer {
            StreamingBuffer::Vertex => self.frame.vertex_bytes += len,
            StreamingBuffer::Index => self.frame.index_bytes += len,
        }

        let (start, end) = (offset as usize, (offset + len) as usize);
        self.mapped = Some((buffer, start, end));

        &mut self.storage(buffer)[start..end]
    }

    fn unmap_streaming_buffer(&mut self, buffer: StreamingBuffer) {
        debug_assert!(
            matches!(self.mapped, Some((b, ..)) if b == buffer),
            "unmapping a buffer that is not mapped"
        );
        self.mapped = None;
        self.record(RenderOp::Unmap(buffer));
    }

    fn set_instance_constants(&mut self, constants: &InstanceConstants) {
        self.record(RenderOp::Constants(*constants));
    }

    fn bind_vertex_streams(&mut self, streams: VertexStreams) {
        self.record(RenderOp::Streams(streams));
    }

    fn bind_texture(&mut self, texture: TextureSource<'_>, sampler: SamplerState) {
        self.record(RenderOp::BindTexture { key: texture.key(), sampler });
    }

    fn draw(&mut self, topology: PrimitiveTopology, vertex_count: u32) {
        self.frame.draw_calls += 1;
        self.frame.vertices += vertex_count;
        self.record(RenderOp::Draw { topology, vertex_count });
    }

    fn draw_indexed(&mut self, topology: PrimitiveTopology, index_offset: u32, index_count: u32) {
        self.frame.draw_calls += 1;
        self.frame.indices += index_count;
        self.record(RenderOp::DrawIndexed { topology, index_offset, index_count });
    }
}
