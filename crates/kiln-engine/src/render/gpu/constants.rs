use bytemuck::{Pod, Zeroable};

/// Uniform block shared by every shader.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(super) struct GpuConstants {
    pub mvp: [f32; 16],
    pub color: [f32; 4],
}

const CONSTANTS_SIZE: u64 = size_of::<GpuConstants>() as u64;

/// Per-draw constants, written to CPU staging during execution and uploaded
/// once per frame. Draws select their slot with a dynamic offset.
pub(super) struct ConstantRing {
    layout: wgpu::BindGroupLayout,
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    stride: u32,
    capacity: u32,
    staging: Vec<u8>,
}

impl ConstantRing {
    pub(super) fn new(device: &wgpu::Device, capacity: u32) -> Self {
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("kiln constants bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: wgpu::BufferSize::new(CONSTANTS_SIZE),
                },
                count: None,
            }],
        });

        let alignment = device.limits().min_uniform_buffer_offset_alignment;
        let stride = (CONSTANTS_SIZE as u32).next_multiple_of(alignment);
        let capacity = capacity.max(1);
        let (buffer, bind_group) = Self::allocate(device, &layout, stride, capacity);

        Self {
            layout,
            buffer,
            bind_group,
            stride,
            capacity,
            staging: Vec::with_capacity((stride * capacity) as usize),
        }
    }

    fn allocate(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        stride: u32,
        capacity: u32,
    ) -> (wgpu::Buffer, wgpu::BindGroup) {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("kiln constants ubo"),
            size: u64::from(stride) * u64::from(capacity),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("kiln constants bind group"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(CONSTANTS_SIZE),
                }),
            }],
        });

        (buffer, bind_group)
    }

    pub(super) fn layout(&self) -> &wgpu::BindGroupLayout {
        &self.layout
    }

    pub(super) fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }

    /// Appends a slot and returns its dynamic offset.
    pub(super) fn push(&mut self, constants: &GpuConstants) -> u32 {
        let offset = self.staging.len() as u32;
        self.staging.extend_from_slice(bytemuck::bytes_of(constants));
        self.staging.resize((offset + self.stride) as usize, 0);
        offset
    }

    /// Uploads this frame's slots, growing the GPU buffer first if needed.
    pub(super) fn upload(&mut self, device: &wgpu::Device, queue: &wgpu::Queue) {
        if self.staging.is_empty() {
            return;
        }

        let slots = self.staging.len() as u32 / self.stride;
        if slots > self.capacity {
            let capacity = slots.next_power_of_two();
            log::debug!("constant ring: growing from {} to {capacity} slots", self.capacity);
            let (buffer, bind_group) = Self::allocate(device, &self.layout, self.stride, capacity);
            self.buffer = buffer;
            self.bind_group = bind_group;
            self.capacity = capacity;
        }

        queue.write_buffer(&self.buffer, 0, &self.staging);
    }

    pub(super) fn reset(&mut self) {
        self.staging.clear();
    }
}
