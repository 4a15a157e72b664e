use std::collections::HashMap;

use crate::render::{SamplerState, TextureKey, TextureSource};

struct GpuTexture {
    generation: u32,
    _texture: wgpu::Texture,
    /// Indexed by [`sampler_slot`].
    bind_groups: [wgpu::BindGroup; 2],
}

fn sampler_slot(sampler: SamplerState) -> usize {
    match sampler {
        SamplerState::Point => 0,
        SamplerState::Linear => 1,
    }
}

/// GPU copies of registry textures and font atlases, uploaded on first bind
/// and again whenever the source generation changes.
pub(super) struct Textures {
    layout: wgpu::BindGroupLayout,
    samplers: [wgpu::Sampler; 2],
    entries: HashMap<TextureKey, GpuTexture>,
}

impl Textures {
    pub(super) fn new(device: &wgpu::Device) -> Self {
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("kiln texture bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let sampler = |label: &str, filter: wgpu::FilterMode| {
            device.create_sampler(&wgpu::SamplerDescriptor {
                label: Some(label),
                address_mode_u: wgpu::AddressMode::ClampToEdge,
                address_mode_v: wgpu::AddressMode::ClampToEdge,
                address_mode_w: wgpu::AddressMode::ClampToEdge,
                mag_filter: filter,
                min_filter: filter,
                mipmap_filter: wgpu::MipmapFilterMode::Nearest,
                ..Default::default()
            })
        };

        Self {
            layout,
            samplers: [
                sampler("kiln point sampler", wgpu::FilterMode::Nearest),
                sampler("kiln linear sampler", wgpu::FilterMode::Linear),
            ],
            entries: HashMap::new(),
        }
    }

    pub(super) fn layout(&self) -> &wgpu::BindGroupLayout {
        &self.layout
    }

    /// Makes `source` resident. Returns false for empty images.
    pub(super) fn prepare(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        source: TextureSource<'_>,
    ) -> bool {
        let key = source.key();
        let generation = source.generation();
        if self.entries.get(&key).is_some_and(|t| t.generation == generation) {
            return true;
        }

        let (format, width, height, pixels, bytes_per_pixel) = match source {
            TextureSource::Image { data, .. } => {
                (wgpu::TextureFormat::Rgba8Unorm, data.width, data.height, &data.pixels[..], 4)
            }
            TextureSource::FontAtlas { atlas, .. } => {
                (wgpu::TextureFormat::R8Unorm, atlas.width, atlas.height, &atlas.pixels[..], 1)
            }
        };
        if width == 0 || height == 0 {
            return false;
        }

        let size = wgpu::Extent3d { width, height, depth_or_array_layers: 1 };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("kiln texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            pixels,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(width * bytes_per_pixel),
                rows_per_image: Some(height),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group = |sampler: &wgpu::Sampler| {
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("kiln texture bind group"),
                layout: &self.layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(&view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::Sampler(sampler),
                    },
                ],
            })
        };
        let bind_groups = [bind_group(&self.samplers[0]), bind_group(&self.samplers[1])];

        log::debug!("uploaded {key:?} ({width}x{height}, generation {generation})");
        self.entries.insert(
            key,
            GpuTexture { generation, _texture: texture, bind_groups },
        );
        true
    }

    pub(super) fn bind_group(&self, key: TextureKey, sampler: SamplerState) -> Option<&wgpu::BindGroup> {
        self.entries
            .get(&key)
            .map(|t| &t.bind_groups[sampler_slot(sampler)])
    }
}
