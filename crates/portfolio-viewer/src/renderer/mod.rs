//! The rendering orchestrator. Owns the GPU context, the offscreen scene
//! target and the two render passes.

pub mod context;
pub mod pipelines;
pub mod targets;

use self::{
    context::GfxContext,
    pipelines::{particles::ParticlePipeline, present::PresentPass},
    targets::Targets,
};
use crate::data::types::CardSlot;
use particle_image::GridVertex;
use std::sync::Arc;
use winit::window::Window;

/// Owns all rendering-related state.
pub struct Renderer {
    pub gfx: GfxContext,
    pub targets: Targets,
    pub particles: ParticlePipeline,
    pub present: PresentPass,
    pub egui_renderer: egui_wgpu::Renderer,
}

impl Renderer {
    pub async fn new(
        window: Arc<Window>,
        vsync: bool,
        grid: &[GridVertex],
    ) -> anyhow::Result<Self> {
        let gfx = GfxContext::new(window, vsync).await?;
        let size = gfx.size;

        let targets = Targets::new(&gfx.device, size);
        let particles = ParticlePipeline::new(&gfx.device, targets.scene_fmt, grid);
        let present = PresentPass::new(&gfx.device, gfx.config.format);

        let egui_renderer = egui_wgpu::Renderer::new(&gfx.device, gfx.config.format, None, 1);

        log::info!(
            "Renderer ready: {}x{} {:?}, {} points per card",
            size.width,
            size.height,
            gfx.config.format,
            particles.points_per_card()
        );

        Ok(Self {
            gfx,
            targets,
            particles,
            present,
            egui_renderer,
        })
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.gfx.resize(new_size);
            self.targets.resize(&self.gfx.device, new_size);
        }
    }

    /// Draws every card whose cover loaded into the scene target, then
    /// resolves the scene to `swap_view`. Blending is additive, so draw
    /// order does not matter.
    pub fn render(&mut self, swap_view: &wgpu::TextureView, slots: &[CardSlot]) {
        let mut encoder = self
            .gfx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        // Pass 1: particles, additively accumulated
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Particle Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &self.targets.scene,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            for card in slots.iter().filter_map(CardSlot::gpu) {
                self.particles.draw_card(&mut pass, card);
            }
        }

        // Pass 2: resolve to the swapchain
        self.present.draw(
            &self.gfx.device,
            &mut encoder,
            swap_view,
            &self.targets.scene,
        );

        self.gfx.queue.submit(std::iter::once(encoder.finish()));
    }
}
