use std::collections::HashMap;

use crate::render::{BlendState, PrimitiveTopology, ShaderProgram};

/// Everything that selects a pipeline object.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub(super) struct PipelineKey {
    pub program: ShaderProgram,
    pub blend: BlendState,
    pub topology: PrimitiveTopology,
}

impl PipelineKey {
    pub(super) fn is_textured(&self) -> bool {
        !matches!(self.program, ShaderProgram::Color)
    }
}

const POSITION_ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x2];
const TEXCOORD_ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![1 => Float32x2];

fn stream_layout(attributes: &'static [wgpu::VertexAttribute]) -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: size_of::<[f32; 2]>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes,
    }
}

fn blend_state(blend: BlendState) -> Option<wgpu::BlendState> {
    match blend {
        BlendState::Opaque => None,
        BlendState::Transparent => Some(wgpu::BlendState::ALPHA_BLENDING),
    }
}

fn primitive_topology(topology: PrimitiveTopology) -> wgpu::PrimitiveTopology {
    match topology {
        PrimitiveTopology::LineList => wgpu::PrimitiveTopology::LineList,
        PrimitiveTopology::LineStrip => wgpu::PrimitiveTopology::LineStrip,
        PrimitiveTopology::TriangleList => wgpu::PrimitiveTopology::TriangleList,
        PrimitiveTopology::TriangleStrip => wgpu::PrimitiveTopology::TriangleStrip,
    }
}

/// Lazily built pipelines, one per [`PipelineKey`].
pub(super) struct Pipelines {
    format: wgpu::TextureFormat,
    color_shader: wgpu::ShaderModule,
    texture_shader: wgpu::ShaderModule,
    text_shader: wgpu::ShaderModule,
    untextured_layout: wgpu::PipelineLayout,
    textured_layout: wgpu::PipelineLayout,
    cache: HashMap<PipelineKey, wgpu::RenderPipeline>,
}

impl Pipelines {
    pub(super) fn new(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        constants: &wgpu::BindGroupLayout,
        texture: &wgpu::BindGroupLayout,
    ) -> Self {
        let shader = |label: &str, source: &'static str| {
            device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(label),
                source: wgpu::ShaderSource::Wgsl(source.into()),
            })
        };

        let untextured_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("kiln untextured pipeline layout"),
            bind_group_layouts: &[constants],
            immediate_size: 0,
        });
        let textured_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("kiln textured pipeline layout"),
            bind_group_layouts: &[constants, texture],
            immediate_size: 0,
        });

        Self {
            format,
            color_shader: shader("kiln color shader", include_str!("shaders/color.wgsl")),
            texture_shader: shader("kiln texture shader", include_str!("shaders/texture.wgsl")),
            text_shader: shader("kiln text shader", include_str!("shaders/text.wgsl")),
            untextured_layout,
            textured_layout,
            cache: HashMap::new(),
        }
    }

    pub(super) fn get(&self, key: &PipelineKey) -> Option<&wgpu::RenderPipeline> {
        self.cache.get(key)
    }

    pub(super) fn ensure(&mut self, device: &wgpu::Device, key: PipelineKey) {
        if self.cache.contains_key(&key) {
            return;
        }
        log::debug!("building pipeline {key:?}");

        let (shader, layout) = match key.program {
            ShaderProgram::Color => (&self.color_shader, &self.untextured_layout),
            ShaderProgram::Texture => (&self.texture_shader, &self.textured_layout),
            ShaderProgram::Text => (&self.text_shader, &self.textured_layout),
        };

        let textured_streams = [stream_layout(&POSITION_ATTRS), stream_layout(&TEXCOORD_ATTRS)];
        let buffers = if key.is_textured() {
            &textured_streams[..]
        } else {
            &textured_streams[..1]
        };

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("kiln pipeline"),
            layout: Some(layout),

            vertex: wgpu::VertexState {
                module: shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers,
            },

            fragment: Some(wgpu::FragmentState {
                module: shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: self.format,
                    blend: blend_state(key.blend),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),

            primitive: wgpu::PrimitiveState {
                topology: primitive_topology(key.topology),
                strip_index_format: key
                    .topology
                    .is_strip()
                    .then_some(wgpu::IndexFormat::Uint16),
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },

            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        self.cache.insert(key, pipeline);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opaque_disables_blending() {
        assert!(blend_state(BlendState::Opaque).is_none());
        assert_eq!(blend_state(BlendState::Transparent), Some(wgpu::BlendState::ALPHA_BLENDING));
    }

    #[test]
    fn only_color_program_is_untextured() {
        let key = |program| PipelineKey {
            program,
            blend: BlendState::Opaque,
            topology: PrimitiveTopology::TriangleList,
        };
        assert!(!key(ShaderProgram::Color).is_textured());
        assert!(key(ShaderProgram::Texture).is_textured());
        assert!(key(ShaderProgram::Text).is_textured());
    }
}
