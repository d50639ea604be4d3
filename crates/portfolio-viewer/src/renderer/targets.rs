//! Offscreen target the particle pass accumulates into.
//!
//! Additive blending can push values past 1.0, so the scene is rendered
//! into a float target and resolved to the swapchain afterwards.

pub struct Targets {
    // Private texture – keep alive for the lifetime of the view.
    _scene_tex: wgpu::Texture,

    pub scene: wgpu::TextureView,
    pub scene_fmt: wgpu::TextureFormat,
}

impl Targets {
    pub fn new(device: &wgpu::Device, size: winit::dpi::PhysicalSize<u32>) -> Self {
        let scene_fmt = wgpu::TextureFormat::Rgba16Float;

        let scene_tex = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Scene HDR Target"),
            size: wgpu::Extent3d {
                width: size.width.max(1),
                height: size.height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: scene_fmt,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });

        Self {
            scene: scene_tex.create_view(&wgpu::TextureViewDescriptor::default()),
            _scene_tex: scene_tex,
            scene_fmt,
        }
    }

    pub fn resize(&mut self, device: &wgpu::Device, size: winit::dpi::PhysicalSize<u32>) {
        *self = Self::new(device, size);
    }
}
