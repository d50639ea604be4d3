use crate::data::types::CardGpu;
use particle_image::GridVertex;
use wgpu::util::DeviceExt;

/// Draws particle images: one camera-facing sprite per grid point, with the
/// shared grid as the instance buffer.
pub struct ParticlePipeline {
    pub pipeline: wgpu::RenderPipeline,
    pub card_layout: wgpu::BindGroupLayout,
    pub cover_sampler: wgpu::Sampler,
    sprite_vb: wgpu::Buffer,
    grid_vb: wgpu::Buffer,
    grid_len: u32,
}

impl ParticlePipeline {
    pub fn new(
        device: &wgpu::Device,
        color_fmt: wgpu::TextureFormat,
        grid: &[GridVertex],
    ) -> Self {
        // Uniforms are read by both stages; the cover is only fetched in the vertex stage.
        let card_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Card Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: wgpu::BufferSize::new(std::mem::size_of::<
                            crate::data::types::CardUniformStd140,
                        >() as u64),
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let cover_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Cover Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("shaders/particle_image.wgsl"),
            source: wgpu::ShaderSource::Wgsl(
                include_str!("../../../shaders/particle_image.wgsl").into(),
            ),
        });

        // Sprite corners, two triangles.
        let sprite_corners: [[f32; 2]; 6] = [
            [-1.0, -1.0],
            [1.0, -1.0],
            [1.0, 1.0],
            [-1.0, -1.0],
            [1.0, 1.0],
            [-1.0, 1.0],
        ];

        let sprite_vb = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Particle Sprite VB"),
            contents: bytemuck::cast_slice(&sprite_corners),
            usage: wgpu::BufferUsages::VERTEX,
        });

        // Written once; every card reads the same grid.
        let grid_vb = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Particle Grid Instances"),
            contents: bytemuck::cast_slice(grid),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let vbuf_layouts = [
            wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<[f32; 2]>() as u64,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &[wgpu::VertexAttribute {
                    shader_location: 0,
                    offset: 0,
                    format: wgpu::VertexFormat::Float32x2,
                }],
            },
            wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<GridVertex>() as u64,
                step_mode: wgpu::VertexStepMode::Instance,
                attributes: &[
                    // Base position (vec3)
                    wgpu::VertexAttribute {
                        shader_location: 1,
                        offset: 0,
                        format: wgpu::VertexFormat::Float32x3,
                    },
                    // Texture coordinate (vec2)
                    wgpu::VertexAttribute {
                        shader_location: 2,
                        offset: 12,
                        format: wgpu::VertexFormat::Float32x2,
                    },
                ],
            },
        ];

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Particle PipelineLayout"),
            bind_group_layouts: &[&card_layout],
            push_constant_ranges: &[],
        });

        // Additive: overlapping points brighten instead of occluding.
        let additive = wgpu::BlendComponent {
            src_factor: wgpu::BlendFactor::SrcAlpha,
            dst_factor: wgpu::BlendFactor::One,
            operation: wgpu::BlendOperation::Add,
        };

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Particle Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: "vs_main",
                buffers: &vbuf_layouts,
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            // Order-independent blending, no depth writes.
            depth_stencil: None,
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: "fs_main",
                targets: &[Some(wgpu::ColorTargetState {
                    format: color_fmt,
                    blend: Some(wgpu::BlendState {
                        color: additive,
                        alpha: additive,
                    }),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
        });

        Self {
            pipeline,
            card_layout,
            cover_sampler,
            sprite_vb,
            grid_vb,
            grid_len: grid.len() as u32,
        }
    }

    pub fn points_per_card(&self) -> u32 {
        self.grid_len
    }

    pub fn draw_card<'a>(&'a self, rpass: &mut wgpu::RenderPass<'a>, card: &'a CardGpu) {
        rpass.set_pipeline(&self.pipeline);
        rpass.set_bind_group(0, &card.bind, &[]);
        rpass.set_vertex_buffer(0, self.sprite_vb.slice(..));
        rpass.set_vertex_buffer(1, self.grid_vb.slice(..));
        rpass.draw(0..6, 0..self.grid_len);
    }
}
