use crate::{
    assistant::{AssistantWorker, HttpTransport, OfflineGenerator, RemoteGenerator},
    camera::{pick_card, Camera},
    config::ViewerConfig,
    data::{cover::slot_from_decoded, CardSlot, CardUniformStd140, CoverLoader},
    input::PointerRouter,
    renderer::Renderer,
    ui::{self, DetailPanel, UiState},
};
use anyhow::Result;
use glam::Vec2;
use particle_image::{CarouselScene, Catalog, FrameClock, ParticleParams};
use std::sync::Arc;
use winit::{
    event::{ElementState, MouseButton, WindowEvent},
    keyboard::{KeyCode, PhysicalKey},
    window::Window,
};

pub struct App {
    pub renderer: Renderer,
    pub camera: Camera,
    pub scene: CarouselScene,
    pub catalog: Catalog,
    pub params: ParticleParams,
    pub egui_ctx: egui::Context,
    pub egui_state: egui_winit::State,
    slots: Vec<CardSlot>,
    loader: CoverLoader,
    router: PointerRouter,
    clock: FrameClock,
    ui: UiState,
    assistant: AssistantWorker,
}

impl App {
    pub async fn new(window: Arc<Window>, config: ViewerConfig) -> Result<Self> {
        let catalog = config.catalog;
        let scene = CarouselScene::new(catalog.len(), config.resolution)?;

        let renderer =
            Renderer::new(window.clone(), config.vsync, scene.geometry().vertices()).await?;
        let [width, height] = renderer.gfx.viewport_size();
        let camera = Camera::new(width / height.max(1.0));

        // Decoding runs on the rayon pool; cards show a loading state until
        // their cover arrives.
        let loader = CoverLoader::spawn(catalog.projects());
        let slots = catalog.projects().iter().map(|_| CardSlot::Loading).collect();

        let assistant = match &config.assistant {
            Some(backend) => {
                let generator = RemoteGenerator::new(
                    HttpTransport::new()?,
                    &backend.endpoint,
                    &backend.model,
                    backend.api_key.clone(),
                );
                log::info!("Assistant: {}", generator.url());
                AssistantWorker::spawn(generator)?
            }
            None => {
                log::info!("Assistant: demo mode, no API key configured");
                AssistantWorker::spawn(OfflineGenerator)?
            }
        };

        let egui_ctx = egui::Context::default();
        egui_ctx.set_visuals(egui::Visuals::dark());
        let max_texture_side = renderer.gfx.device.limits().max_texture_dimension_2d as usize;
        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui_ctx.viewport_id(),
            &*window,
            None,
            Some(max_texture_side),
        );

        Ok(Self {
            renderer,
            camera,
            scene,
            catalog,
            params: ParticleParams::default(),
            egui_ctx,
            egui_state,
            slots,
            loader,
            router: PointerRouter::new(),
            clock: FrameClock::new(),
            ui: UiState {
                detail: None,
                show_tuning: config.show_tuning,
            },
            assistant,
        })
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.renderer.resize(new_size);
            self.camera.set_viewport(self.renderer.gfx.viewport_size());
        }
    }

    /// Card under a cursor position (physical pixels). Nothing is pickable
    /// while the project window is open.
    fn pick(&self, cursor: Vec2) -> Option<usize> {
        if self.ui.detail.is_some() {
            return None;
        }
        let ray = self
            .camera
            .ray_through(cursor, self.renderer.gfx.viewport_size());
        pick_card(&ray, self.scene.frames().map(|f| (f.index, f.model)))
    }

    fn open_project(&mut self, index: usize) {
        if let Some(project) = self.catalog.get(index) {
            self.ui.detail = Some(DetailPanel::open(index, project));
        }
    }

    /// Returns `true` when the event was consumed and should not reach the
    /// default window handling.
    pub fn handle_event(&mut self, window: &Window, event: &WindowEvent) -> bool {
        let response = self.egui_state.on_window_event(window, event);

        match event {
            WindowEvent::Resized(physical_size) => {
                self.resize(*physical_size);
            }
            WindowEvent::CursorMoved { position, .. } => {
                let at = Vec2::new(position.x as f32, position.y as f32);
                let hit = if response.consumed { None } else { self.pick(at) };
                self.router.on_cursor_moved(&mut self.scene, at, hit);
            }
            WindowEvent::CursorLeft { .. } | WindowEvent::Focused(false) => {
                self.router.on_leave(&mut self.scene);
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => {
                let hit = if response.consumed {
                    None
                } else {
                    self.router.cursor().and_then(|c| self.pick(c))
                };
                match state {
                    ElementState::Pressed => self.router.on_press(&mut self.scene, hit),
                    // A release always reaches the router so a drag never
                    // outlives the button.
                    ElementState::Released => {
                        if let Some(index) = self.router.on_release(&mut self.scene, hit) {
                            self.open_project(index);
                        }
                    }
                }
            }
            WindowEvent::KeyboardInput { event, .. }
                if event.state == ElementState::Pressed && !response.consumed =>
            {
                match event.physical_key {
                    PhysicalKey::Code(KeyCode::ArrowLeft) if self.ui.detail.is_none() => {
                        self.scene.prev();
                        return true;
                    }
                    PhysicalKey::Code(KeyCode::ArrowRight) if self.ui.detail.is_none() => {
                        self.scene.next();
                        return true;
                    }
                    PhysicalKey::Code(KeyCode::Escape) if self.ui.detail.is_some() => {
                        self.ui.detail = None;
                        return true;
                    }
                    _ => {}
                }
            }
            _ => {}
        }

        response.consumed
    }

    fn poll_covers(&mut self) {
        if self.loader.is_done() {
            return;
        }
        for (index, decoded) in self.loader.poll() {
            let (Some(project), Some(slot)) = (self.catalog.get(index), self.slots.get_mut(index))
            else {
                continue;
            };
            *slot = slot_from_decoded(
                &self.renderer.gfx.device,
                &self.renderer.gfx.queue,
                &self.renderer.particles.card_layout,
                &self.renderer.particles.cover_sampler,
                project,
                decoded,
            );
        }
        if self.loader.is_done() {
            let failed = self
                .slots
                .iter()
                .filter(|s| matches!(s, CardSlot::Failed(_)))
                .count();
            log::info!(
                "Covers loaded: {} ready, {} failed",
                self.slots.len() - failed,
                failed
            );
        }
    }

    fn poll_assistant(&mut self) {
        while let Some(reply) = self.assistant.poll() {
            let accepted = self
                .ui
                .detail
                .as_mut()
                .is_some_and(|panel| panel.chat_mut().receive(&reply));
            if !accepted {
                log::debug!("Dropping assistant reply {} for a closed chat", reply.ticket);
            }
        }
    }

    fn loaded_cards(&self) -> usize {
        self.slots
            .iter()
            .filter(|s| !matches!(s, CardSlot::Loading))
            .count()
    }

    pub fn render(&mut self, window: &Window) -> Result<(), wgpu::SurfaceError> {
        let time = self.clock.tick();
        self.poll_covers();
        self.poll_assistant();

        // Re-evaluated every frame: the card under a still cursor changes
        // while the carousel slides.
        let hit = self.router.cursor().and_then(|c| self.pick(c));
        self.scene.hover(hit);
        self.scene.advance(time);

        let viewport_size = self.renderer.gfx.viewport_size();
        let view = self.camera.view();
        let proj = self.camera.proj();
        let base_point_size = self
            .params
            .base_point_size(self.scene.geometry().resolution());

        for frame in self.scene.frames() {
            let Some(card) = self.slots.get(frame.index).and_then(CardSlot::gpu) else {
                continue;
            };
            let ubo_data = CardUniformStd140::new(
                view * frame.model,
                proj,
                viewport_size,
                &frame.uniforms,
                &self.params,
                base_point_size,
            );
            self.renderer
                .gfx
                .queue
                .write_buffer(&card.ubo, 0, bytemuck::bytes_of(&ubo_data));
        }
        log::trace!(
            "t={:.3} dt={:.4} smoothed={:.3}",
            time.elapsed,
            time.delta,
            self.scene.carousel().smoothed()
        );

        let frame = self.renderer.gfx.surface.get_current_texture()?;
        let swap_view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.renderer.render(&swap_view, &self.slots);

        let egui_input = self.egui_state.take_egui_input(window);
        self.egui_ctx.begin_frame(egui_input);

        ui::draw_header(&self.egui_ctx, self.loaded_cards(), self.slots.len());
        ui::draw_card_labels(
            &self.egui_ctx,
            &self.camera,
            &self.scene,
            &self.catalog,
            &self.slots,
            viewport_size,
        );
        ui::draw_navigation(&self.egui_ctx, &mut self.scene);

        if let Some(panel) = self.ui.detail.as_mut() {
            let still_open = match self.catalog.get(panel.project) {
                Some(project) => {
                    ui::draw_detail(&self.egui_ctx, panel, project, &mut self.assistant)
                }
                None => false,
            };
            if !still_open {
                self.ui.detail = None;
            }
        }

        if self.ui.show_tuning {
            ui::draw_tuning(
                &self.egui_ctx,
                &mut self.ui.show_tuning,
                &mut self.params,
                &mut self.scene,
            );
        }

        let egui_output = self.egui_ctx.end_frame();
        self.egui_state
            .handle_platform_output(window, egui_output.platform_output);
        let shapes = self
            .egui_ctx
            .tessellate(egui_output.shapes, self.egui_ctx.pixels_per_point());

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [
                self.renderer.gfx.config.width,
                self.renderer.gfx.config.height,
            ],
            pixels_per_point: self.egui_ctx.pixels_per_point(),
        };

        let mut encoder = self
            .renderer
            .gfx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("UI Encoder"),
            });

        for (id, delta) in &egui_output.textures_delta.set {
            self.renderer.egui_renderer.update_texture(
                &self.renderer.gfx.device,
                &self.renderer.gfx.queue,
                *id,
                delta,
            );
        }

        self.renderer.egui_renderer.update_buffers(
            &self.renderer.gfx.device,
            &self.renderer.gfx.queue,
            &mut encoder,
            &shapes,
            &screen_descriptor,
        );

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("EGUI Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &swap_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            self.renderer
                .egui_renderer
                .render(&mut render_pass, &shapes, &screen_descriptor);
        }

        for id in &egui_output.textures_delta.free {
            self.renderer.egui_renderer.free_texture(id);
        }

        self.renderer
            .gfx
            .queue
            .submit(std::iter::once(encoder.finish()));
        frame.present();

        Ok(())
    }
}
