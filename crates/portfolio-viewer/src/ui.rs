//! egui overlay: header, navigation, card labels, the project detail window,
//! the assistant chat and the tuning panel.

use crate::{
    assistant::{AssistantWorker, ChatSession, Role},
    camera::Camera,
    data::{CardSlot, GalleryImage, GalleryLoader},
};
use egui::{Align2, Color32, FontId, RichText};
use glam::Vec3;
use particle_image::{CarouselScene, Catalog, ParticleParams, Project};

pub const BRAND: &str = "ZHANLIN";

const ACCENT: Color32 = Color32::from_rgb(59, 130, 246);
const MUTED: Color32 = Color32::from_rgb(156, 163, 175);

/// Label anchors in card-local units, below the particle plane.
const TITLE_ANCHOR: Vec3 = Vec3::new(0.0, -2.8, 0.5);
const SUBTITLE_ANCHOR: Vec3 = Vec3::new(0.0, -3.2, 0.5);
const CTA_ANCHOR: Vec3 = Vec3::new(0.0, -3.6, 0.5);
const TITLE_SIZE: f32 = 0.25;
const SUBTITLE_SIZE: f32 = 0.12;
const CTA_SIZE: f32 = 0.08;

/// Text fill of a card's caption.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelStyle {
    pub title_alpha: f32,
    pub subtitle_alpha: f32,
    pub call_to_action: bool,
}

impl LabelStyle {
    pub fn for_card(active: bool) -> Self {
        if active {
            Self {
                title_alpha: 0.95,
                subtitle_alpha: 0.8,
                call_to_action: true,
            }
        } else {
            Self {
                title_alpha: 0.3,
                subtitle_alpha: 0.2,
                call_to_action: false,
            }
        }
    }
}

/// `index` moved one step through `len` items, wrapping at both ends.
pub fn wrap_step(index: usize, len: usize, forward: bool) -> usize {
    if len == 0 {
        return 0;
    }
    if forward {
        (index + 1) % len
    } else {
        (index + len - 1) % len
    }
}

/// State of the open project window.
pub struct DetailPanel {
    pub project: usize,
    gallery: GalleryLoader,
    gallery_index: usize,
    feedback: String,
    notice: Option<&'static str>,
    chat_open: bool,
    chat_input: String,
    chat: ChatSession,
}

impl DetailPanel {
    pub fn open(index: usize, project: &Project) -> Self {
        log::info!("Opened project '{}'", project.id);
        Self {
            project: index,
            gallery: GalleryLoader::spawn(project),
            gallery_index: 0,
            feedback: String::new(),
            notice: None,
            chat_open: false,
            chat_input: String::new(),
            chat: ChatSession::new(&project.title, &project.ai_context),
        }
    }

    pub fn gallery_index(&self) -> usize {
        self.gallery_index
    }

    pub fn next_image(&mut self, len: usize) {
        self.gallery_index = wrap_step(self.gallery_index, len, true);
    }

    pub fn prev_image(&mut self, len: usize) {
        self.gallery_index = wrap_step(self.gallery_index, len, false);
    }

    pub fn show_image(&mut self, index: usize, len: usize) {
        if index < len {
            self.gallery_index = index;
        }
    }

    pub fn gallery(&self) -> &GalleryLoader {
        &self.gallery
    }

    pub fn chat(&self) -> &ChatSession {
        &self.chat
    }

    pub fn chat_mut(&mut self) -> &mut ChatSession {
        &mut self.chat
    }

    /// Feedback has nowhere to go; it is logged and acknowledged.
    pub fn submit_feedback(&mut self, project: &Project) -> bool {
        let text = self.feedback.trim();
        if text.is_empty() {
            return false;
        }
        log::info!("Feedback for '{}': {}", project.id, text);
        self.feedback.clear();
        self.notice = Some("Feedback transmission simulated. Thank you.");
        true
    }
}

#[derive(Default)]
pub struct UiState {
    pub detail: Option<DetailPanel>,
    pub show_tuning: bool,
}

pub fn draw_header(ctx: &egui::Context, loaded: usize, total: usize) {
    egui::Area::new(egui::Id::new("header"))
        .anchor(Align2::LEFT_TOP, egui::vec2(32.0, 28.0))
        .show(ctx, |ui| {
            ui.label(
                RichText::new(BRAND)
                    .size(20.0)
                    .strong()
                    .color(Color32::from_white_alpha(204)),
            );
            if loaded < total {
                ui.label(
                    RichText::new(format!("LOADING DATA... {}/{}", loaded, total))
                        .monospace()
                        .size(10.0)
                        .color(ACCENT.gamma_multiply(0.5)),
                );
            }
        });
}

/// Prev/next arrows at the sides and index dots along the bottom.
pub fn draw_navigation(ctx: &egui::Context, scene: &mut CarouselScene) {
    egui::Area::new(egui::Id::new("nav_prev"))
        .anchor(Align2::LEFT_CENTER, egui::vec2(24.0, 0.0))
        .show(ctx, |ui| {
            if ui.button(RichText::new("<").size(24.0)).clicked() {
                scene.prev();
            }
        });

    egui::Area::new(egui::Id::new("nav_next"))
        .anchor(Align2::RIGHT_CENTER, egui::vec2(-24.0, 0.0))
        .show(ctx, |ui| {
            if ui.button(RichText::new(">").size(24.0)).clicked() {
                scene.next();
            }
        });

    let count = scene.len();
    let active = scene.carousel().active();
    egui::Area::new(egui::Id::new("nav_dots"))
        .anchor(Align2::CENTER_BOTTOM, egui::vec2(0.0, -32.0))
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(RichText::new("01").monospace().size(10.0).color(MUTED));
                for i in 0..count {
                    let (width, fill) = if i == active {
                        (32.0, ACCENT.gamma_multiply(0.8))
                    } else {
                        (8.0, Color32::from_gray(40))
                    };
                    let dot = egui::Button::new("")
                        .min_size(egui::vec2(width, 3.0))
                        .fill(fill);
                    if ui.add(dot).clicked() {
                        scene.jump_to(i);
                    }
                }
                ui.label(
                    RichText::new(format!("{:02}", count))
                        .monospace()
                        .size(10.0)
                        .color(MUTED),
                );
            });
        });
}

/// Height in points of a world-space glyph of `size` units at `anchor`.
fn projected_size(
    camera: &Camera,
    anchor: Vec3,
    size: f32,
    viewport: [f32; 2],
    ppp: f32,
) -> Option<f32> {
    let a = camera.project_to_screen(anchor, viewport)?;
    let b = camera.project_to_screen(anchor + Vec3::Y * size, viewport)?;
    Some((a.y - b.y).abs() / ppp)
}

/// Titles and status under each card, painted behind every window.
pub fn draw_card_labels(
    ctx: &egui::Context,
    camera: &Camera,
    scene: &CarouselScene,
    catalog: &Catalog,
    slots: &[CardSlot],
    viewport: [f32; 2],
) {
    let ppp = ctx.pixels_per_point();
    let painter = ctx.layer_painter(egui::LayerId::background());

    for frame in scene.frames() {
        let Some(project) = catalog.get(frame.index) else {
            continue;
        };
        let style = LabelStyle::for_card(frame.active);
        let to_world = |local: Vec3| frame.model.transform_point3(local);
        let scale = frame.layout.scale;

        let put = |local: Vec3, world_size: f32, text: String, color: Color32| {
            let world = to_world(local);
            let Some(px) = camera.project_to_screen(world, viewport) else {
                return;
            };
            let Some(size) = projected_size(camera, world, world_size * scale, viewport, ppp) else {
                return;
            };
            painter.text(
                egui::pos2(px.x / ppp, px.y / ppp),
                Align2::CENTER_TOP,
                text,
                FontId::proportional(size.max(1.0)),
                color,
            );
        };

        put(
            TITLE_ANCHOR,
            TITLE_SIZE,
            project.title.to_uppercase(),
            Color32::WHITE.gamma_multiply(style.title_alpha),
        );
        put(
            SUBTITLE_ANCHOR,
            SUBTITLE_SIZE,
            project.subtitle.to_uppercase(),
            MUTED.gamma_multiply(style.subtitle_alpha),
        );
        if style.call_to_action {
            put(CTA_ANCHOR, CTA_SIZE, "[ VIEW PROJECT ]".into(), ACCENT);
        }

        let status = match slots.get(frame.index) {
            Some(CardSlot::Loading) => Some(("LOADING DATA...".to_string(), ACCENT)),
            Some(CardSlot::Failed(reason)) => {
                Some((format!("SIGNAL LOST\n{}", reason), Color32::from_rgb(239, 68, 68)))
            }
            _ => None,
        };
        if let Some((text, color)) = status {
            let alpha = if frame.active { 0.9 } else { 0.3 };
            put(Vec3::ZERO, SUBTITLE_SIZE, text, color.gamma_multiply(alpha));
        }
    }
}

/// Project window with gallery, tags, description and feedback, plus the
/// assistant chat. Returns `false` once the user closed it.
pub fn draw_detail(
    ctx: &egui::Context,
    panel: &mut DetailPanel,
    project: &Project,
    worker: &mut AssistantWorker,
) -> bool {
    let mut open = true;

    egui::Window::new(RichText::new(&project.title).strong())
        .id(egui::Id::new("project_detail"))
        .open(&mut open)
        .collapsible(false)
        .resizable(true)
        .default_width(560.0)
        .anchor(Align2::CENTER_CENTER, egui::Vec2::ZERO)
        .show(ctx, |ui| {
            ui.label(RichText::new(&project.subtitle).size(16.0).color(MUTED));
            ui.separator();

            panel.gallery.poll(ctx);
            let len = panel.gallery.len();
            if len == 0 {
                ui.label(RichText::new("No gallery images").italics().color(MUTED));
            } else {
                draw_gallery(ui, panel, len);
            }

            ui.add_space(8.0);
            ui.horizontal_wrapped(|ui| {
                for tag in &project.tags {
                    ui.label(RichText::new(tag).size(11.0).color(ACCENT));
                }
            });

            ui.add_space(8.0);
            ui.label(&project.description);

            ui.add_space(12.0);
            ui.separator();
            ui.label(RichText::new("Visitor Feedback").strong().color(MUTED));
            ui.horizontal(|ui| {
                let edit = ui.add(
                    egui::TextEdit::singleline(&mut panel.feedback).hint_text("Leave a comment..."),
                );
                let submitted = edit.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
                if ui.button("SEND").clicked() || submitted {
                    panel.submit_feedback(project);
                }
            });
            if let Some(notice) = panel.notice {
                ui.label(RichText::new(notice).size(11.0).color(ACCENT));
            }

            ui.add_space(8.0);
            ui.toggle_value(&mut panel.chat_open, "Ask AI Architect");
        });

    if open && panel.chat_open {
        draw_assistant(ctx, panel, worker);
    }
    open
}

const GALLERY_HEIGHT: f32 = 320.0;

/// Current gallery image with prev/next arrows and position dots.
fn draw_gallery(ui: &mut egui::Ui, panel: &mut DetailPanel, len: usize) {
    let size = egui::vec2(ui.available_width(), GALLERY_HEIGHT);
    let layout = egui::Layout::centered_and_justified(egui::Direction::TopDown);
    ui.allocate_ui_with_layout(size, layout, |ui| {
        match panel.gallery.get(panel.gallery_index) {
            Some(GalleryImage::Ready(texture)) => {
                ui.add(
                    egui::Image::from_texture(egui::load::SizedTexture::from_handle(texture))
                        .max_size(size)
                        .maintain_aspect_ratio(true)
                        .rounding(8.0),
                );
            }
            Some(GalleryImage::Failed(reason)) => {
                ui.label(
                    RichText::new(format!("IMAGE UNAVAILABLE\n{}", reason))
                        .monospace()
                        .size(11.0)
                        .color(Color32::from_rgb(239, 68, 68)),
                );
            }
            Some(GalleryImage::Loading) | None => {
                ui.spinner();
            }
        }
    });

    ui.horizontal(|ui| {
        if ui.button("<").clicked() {
            panel.prev_image(len);
        }
        for i in 0..len {
            let (width, fill) = if i == panel.gallery_index {
                (24.0, ACCENT)
            } else {
                (8.0, Color32::from_gray(75))
            };
            let dot = egui::Button::new("")
                .min_size(egui::vec2(width, 6.0))
                .fill(fill);
            if ui.add(dot).clicked() {
                panel.show_image(i, len);
            }
        }
        if ui.button(">").clicked() {
            panel.next_image(len);
        }
    });
}

fn draw_assistant(ctx: &egui::Context, panel: &mut DetailPanel, worker: &mut AssistantWorker) {
    let mut open = panel.chat_open;
    egui::Window::new("AI ARCHITECT")
        .id(egui::Id::new("assistant"))
        .open(&mut open)
        .collapsible(false)
        .default_width(360.0)
        .anchor(Align2::RIGHT_BOTTOM, egui::vec2(-32.0, -32.0))
        .show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .max_height(320.0)
                .stick_to_bottom(true)
                .show(ui, |ui| {
                    for message in panel.chat.messages() {
                        let (who, color) = match message.role {
                            Role::Model => ("AI", ACCENT),
                            Role::User => ("YOU", MUTED),
                        };
                        ui.label(RichText::new(who).monospace().size(10.0).color(color));
                        ui.label(&message.text);
                        ui.add_space(6.0);
                    }
                    if panel.chat.is_waiting() {
                        ui.spinner();
                    }
                });

            ui.separator();
            ui.horizontal(|ui| {
                let edit = ui.add(
                    egui::TextEdit::singleline(&mut panel.chat_input)
                        .hint_text("Ask about materials, structure..."),
                );
                let submitted = edit.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
                let can_send = !panel.chat_input.trim().is_empty() && !panel.chat.is_waiting();
                let clicked = ui.add_enabled(can_send, egui::Button::new("Send")).clicked();
                if (clicked || submitted) && panel.chat.send(worker, &panel.chat_input) {
                    panel.chat_input.clear();
                }
            });
        });
    panel.chat_open = open;
}

fn slider(
    ui: &mut egui::Ui,
    value: &mut f32,
    range: std::ops::RangeInclusive<f32>,
    text: &str,
) {
    ui.add(egui::Slider::new(value, range).text(text));
}

/// Live sliders for the shader, layout and blend constants.
pub fn draw_tuning(
    ctx: &egui::Context,
    open: &mut bool,
    params: &mut ParticleParams,
    scene: &mut CarouselScene,
) {
    egui::Window::new("Tuning")
        .open(open)
        .default_width(280.0)
        .anchor(Align2::RIGHT_TOP, egui::vec2(-16.0, 16.0))
        .show(ctx, |ui| {
            egui::CollapsingHeader::new("Particles")
                .default_open(true)
                .show(ui, |ui| {
                    slider(ui, &mut params.depth_strength, 0.0..=8.0, "depth");
                    slider(ui, &mut params.breath_speed, 0.0..=3.0, "breath speed");
                    slider(ui, &mut params.breath_amplitude, 0.0..=0.5, "breath amplitude");
                    slider(ui, &mut params.turbulence_amplitude, 0.0..=1.0, "turbulence");
                    slider(ui, &mut params.turbulence_speed, 0.0..=15.0, "turbulence speed");
                    slider(ui, &mut params.scatter_strength, 0.0..=6.0, "edge scatter");
                    slider(ui, &mut params.luminance_cutoff, 0.0..=0.5, "luminance cutoff");
                    slider(ui, &mut params.point_size, 0.5..=10.0, "point size");
                    slider(ui, &mut params.interaction_growth, 0.0..=1.0, "hover growth");
                    if ui.button("Reset").clicked() {
                        *params = ParticleParams::default();
                    }
                });

            egui::CollapsingHeader::new("Carousel").show(ui, |ui| {
                let layout = &mut scene.layout;
                slider(ui, &mut layout.spacing, 2.0..=15.0, "spacing");
                slider(ui, &mut layout.curve_depth, 0.0..=8.0, "curve");
                slider(ui, &mut layout.rotation_gain, 0.0..=0.6, "rotation");
                slider(ui, &mut layout.damping, 0.5..=10.0, "damping");
            });

            egui::CollapsingHeader::new("Blending").show(ui, |ui| {
                let rates = &mut scene.rates;
                slider(ui, &mut rates.hover, 0.01..=0.5, "hover rate");
                slider(ui, &mut rates.interaction, 0.01..=0.5, "interaction rate");
                slider(ui, &mut rates.opacity, 0.01..=0.5, "opacity rate");
                slider(ui, &mut scene.inactive_opacity, 0.0..=1.0, "inactive opacity");
            });
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gallery_wraps_both_ways() {
        assert_eq!(wrap_step(2, 3, true), 0);
        assert_eq!(wrap_step(0, 3, false), 2);
        assert_eq!(wrap_step(0, 0, true), 0);
        assert_eq!(wrap_step(0, 1, false), 0);
    }

    #[test]
    fn label_style_follows_active_flag() {
        let active = LabelStyle::for_card(true);
        let idle = LabelStyle::for_card(false);
        assert_eq!(active.title_alpha, 0.95);
        assert_eq!(active.subtitle_alpha, 0.8);
        assert!(active.call_to_action);
        assert_eq!(idle.title_alpha, 0.3);
        assert_eq!(idle.subtitle_alpha, 0.2);
        assert!(!idle.call_to_action);
    }

    #[test]
    fn detail_panel_gallery_and_feedback() {
        let catalog = Catalog::builtin();
        let project = catalog.get(1).unwrap();
        let mut panel = DetailPanel::open(1, project);
        let len = project.gallery_images.len();

        assert_eq!(panel.gallery().len(), len);

        panel.prev_image(len);
        assert_eq!(panel.gallery_index(), len - 1);
        panel.next_image(len);
        assert_eq!(panel.gallery_index(), 0);
        panel.show_image(2, len);
        assert_eq!(panel.gallery_index(), 2);
        panel.show_image(len, len);
        assert_eq!(panel.gallery_index(), 2);

        assert!(!panel.submit_feedback(project));
        panel.feedback = "Stunning".into();
        assert!(panel.submit_feedback(project));
        assert!(panel.feedback.is_empty());
        assert!(panel.notice.is_some());
        assert_eq!(panel.chat().messages().len(), 1);
    }
}
