//! The carousel scene: one carousel, one visual per project.
//!
//! The rendering backend drives this once per displayed frame:
//! `advance` with the frame time, then `frames` to read back each card's
//! transform and uniform snapshot. Pointer callbacks arrive between frames.

use crate::animate::{BlendRates, BlendTargets, CardUniforms};
use crate::carousel::{CardLayout, Carousel, LayoutParams};
use crate::displace::UniformSnapshot;
use crate::error::Result;
use crate::geometry::PlaneGrid;
use crate::interaction::{CardInteraction, ClickOutcome};
use glam::{Mat4, Quat, Vec2};
use std::sync::Arc;
use std::time::Instant;

/// Longest frame step fed to the layout damping, in seconds.
pub const MAX_FRAME_DELTA: f32 = 0.1;
/// Opacity target of background cards.
pub const INACTIVE_OPACITY: f32 = 0.15;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTime {
    /// Seconds since the clock started.
    pub elapsed: f32,
    /// Seconds since the previous frame.
    pub delta: f32,
}

#[derive(Debug, Clone)]
pub struct FrameClock {
    start: Instant,
    last: Instant,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last: now,
        }
    }

    pub fn tick(&mut self) -> FrameTime {
        let now = Instant::now();
        let delta = (now - self.last).as_secs_f32().min(MAX_FRAME_DELTA);
        self.last = now;
        FrameTime {
            elapsed: (now - self.start).as_secs_f32(),
            delta,
        }
    }
}

/// Per-project visual state. The grid is shared: it never changes, so every
/// card reads the same points.
#[derive(Debug, Clone)]
pub struct CardVisual {
    pub geometry: Arc<PlaneGrid>,
    pub uniforms: CardUniforms,
    pub interaction: CardInteraction,
}

/// Everything the backend needs to draw one card this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CardFrame {
    pub index: usize,
    pub active: bool,
    pub layout: CardLayout,
    /// Carousel transform followed by the card's own drag rotation.
    pub model: Mat4,
    pub uniforms: UniformSnapshot,
}

pub struct CarouselScene {
    carousel: Carousel,
    cards: Vec<CardVisual>,
    pub layout: LayoutParams,
    pub rates: BlendRates,
    pub inactive_opacity: f32,
}

impl CarouselScene {
    pub fn new(card_count: usize, resolution: u32) -> Result<Self> {
        let carousel = Carousel::new(card_count)?;
        let geometry = Arc::new(PlaneGrid::new(resolution)?);
        log::info!(
            "Scene: {} cards, {} points each (resolution {})",
            card_count,
            geometry.len(),
            resolution
        );

        let cards = (0..card_count)
            .map(|_| CardVisual {
                geometry: Arc::clone(&geometry),
                uniforms: CardUniforms::new(),
                interaction: CardInteraction::new(),
            })
            .collect();

        Ok(Self {
            carousel,
            cards,
            layout: LayoutParams::default(),
            rates: BlendRates::default(),
            inactive_opacity: INACTIVE_OPACITY,
        })
    }

    pub fn carousel(&self) -> &Carousel {
        &self.carousel
    }

    pub fn cards(&self) -> &[CardVisual] {
        &self.cards
    }

    pub fn geometry(&self) -> &Arc<PlaneGrid> {
        &self.cards[0].geometry
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn next(&mut self) {
        self.carousel.next();
        log::debug!("Carousel -> {}", self.carousel.active());
    }

    pub fn prev(&mut self) {
        self.carousel.prev();
        log::debug!("Carousel -> {}", self.carousel.active());
    }

    pub fn jump_to(&mut self, index: usize) -> bool {
        self.carousel.jump_to(index)
    }

    /// Per-frame update: damp the layout, blend every card's uniforms.
    pub fn advance(&mut self, time: FrameTime) {
        self.carousel.tick(time.delta, &self.layout);

        let active = self.carousel.active();
        for (i, card) in self.cards.iter_mut().enumerate() {
            let is_active = i == active;
            let targets = BlendTargets {
                active: is_active,
                pointer_over: card.interaction.is_hovered(),
                opacity: if is_active { 1.0 } else { self.inactive_opacity },
            };
            card.uniforms.advance(time.elapsed, &targets, &self.rates);
        }
    }

    pub fn card_frame(&self, index: usize) -> Option<CardFrame> {
        let card = self.cards.get(index)?;
        let layout = self.carousel.layout(index, &self.layout);
        let rotation = card.interaction.rotation();
        let local = Mat4::from_quat(
            Quat::from_rotation_x(rotation.x) * Quat::from_rotation_y(rotation.y),
        );
        Some(CardFrame {
            index,
            active: self.carousel.is_active(index),
            layout,
            model: layout.model_matrix() * local,
            uniforms: card.uniforms.snapshot(),
        })
    }

    pub fn frames(&self) -> impl Iterator<Item = CardFrame> + '_ {
        (0..self.cards.len()).filter_map(move |i| self.card_frame(i))
    }

    /// Reports which card (if any) is under the pointer. Cards that are not
    /// active never become hovered. Idempotent; call it whenever the pointer
    /// or the active card changes.
    pub fn hover(&mut self, hit: Option<usize>) {
        let active = self.carousel.active();
        for (i, card) in self.cards.iter_mut().enumerate() {
            if hit == Some(i) && i == active {
                card.interaction.pointer_enter(true);
            } else if card.interaction.is_hovered() {
                card.interaction.pointer_leave();
            }
        }
    }

    /// Returns `true` when the card captured the pointer.
    pub fn pointer_down(&mut self, index: usize, at: Vec2) -> bool {
        let active = self.carousel.is_active(index);
        self.cards
            .get_mut(index)
            .is_some_and(|card| card.interaction.pointer_down(active, at))
    }

    pub fn pointer_move(&mut self, index: usize, at: Vec2) {
        if !self.carousel.is_active(index) {
            return;
        }
        if let Some(card) = self.cards.get_mut(index) {
            card.interaction.pointer_move(at);
        }
    }

    /// Always honoured, even if the card lost its active status mid-drag.
    pub fn pointer_up(&mut self, index: usize, at: Vec2) -> bool {
        self.cards
            .get_mut(index)
            .is_some_and(|card| card.interaction.pointer_up(at))
    }

    pub fn pointer_cancel(&mut self) {
        for card in &mut self.cards {
            card.interaction.pointer_cancel();
        }
    }

    /// A click landed on `index`. Returns the card to open, unless the click
    /// ended a drag.
    pub fn click(&mut self, index: usize) -> Option<usize> {
        let card = self.cards.get_mut(index)?;
        match card.interaction.click() {
            ClickOutcome::Select => {
                log::debug!("Selected card {}", index);
                Some(index)
            }
            ClickOutcome::Suppressed => {
                log::debug!("Click on card {} swallowed after drag", index);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    const STEP: FrameTime = FrameTime {
        elapsed: 0.0,
        delta: 1.0 / 60.0,
    };

    fn scene() -> CarouselScene {
        CarouselScene::new(3, 8).unwrap()
    }

    #[test]
    fn cards_share_one_grid() {
        let s = scene();
        assert!(Arc::ptr_eq(&s.cards()[0].geometry, &s.cards()[2].geometry));
        assert_eq!(s.geometry().len(), 81);
    }

    #[test]
    fn active_flag_is_exact_while_layout_glides() {
        let mut s = scene();
        s.next();
        s.advance(STEP);
        let f0 = s.card_frame(0).unwrap();
        let f1 = s.card_frame(1).unwrap();
        assert!(!f0.active && f1.active);
        assert!(f1.layout.offset > 0.5);
    }

    #[test]
    fn opacity_targets_follow_membership() {
        let mut s = scene();
        for _ in 0..600 {
            s.advance(STEP);
        }
        let active = s.card_frame(0).unwrap().uniforms;
        let background = s.card_frame(1).unwrap().uniforms;
        assert!((active.opacity - 1.0).abs() < 1e-3);
        assert!((background.opacity - INACTIVE_OPACITY).abs() < 1e-3);
        assert!(active.hover_blend > 0.99);
        assert!(background.hover_blend < 1e-3);
    }

    #[test]
    fn hover_only_sticks_to_active_card() {
        let mut s = scene();
        s.hover(Some(1));
        assert!(!s.cards()[1].interaction.is_hovered());
        s.hover(Some(0));
        assert!(s.cards()[0].interaction.is_hovered());
        s.advance(STEP);
        assert!(s.card_frame(0).unwrap().uniforms.interaction_blend > 0.0);
        s.hover(None);
        assert!(!s.cards()[0].interaction.is_hovered());
    }

    #[test]
    fn drag_then_click_is_swallowed_once() {
        let mut s = scene();
        s.hover(Some(0));
        assert!(s.pointer_down(0, Vec2::new(200.0, 200.0)));
        s.pointer_move(0, Vec2::new(210.0, 200.0));
        assert!(s.pointer_up(0, Vec2::new(210.0, 200.0)));
        assert_eq!(s.click(0), None);
        assert_eq!(s.click(0), Some(0));
    }

    #[test]
    fn background_cards_do_not_capture_or_rotate() {
        let mut s = scene();
        assert!(!s.pointer_down(2, Vec2::ZERO));
        s.pointer_move(2, Vec2::new(100.0, 0.0));
        assert_eq!(s.cards()[2].interaction.rotation(), Vec2::ZERO);
        assert_eq!(s.click(2), Some(2));
    }

    #[test]
    fn drag_rotation_is_applied_on_top_of_layout() {
        let mut s = scene();
        s.pointer_down(0, Vec2::ZERO);
        s.pointer_move(0, Vec2::new(100.0, 0.0));
        let frame = s.card_frame(0).unwrap();
        let edge = frame.model.transform_point3(Vec3::new(4.0, 0.0, 0.0));
        assert!(edge.z < -1.0, "card should be turned about y, got {edge:?}");
    }

    #[test]
    fn navigating_away_mid_drag_still_releases() {
        let mut s = scene();
        s.pointer_down(0, Vec2::ZERO);
        s.next();
        assert!(s.pointer_up(0, Vec2::ZERO));
        assert!(!s.cards()[0].interaction.is_dragging());
    }

    #[test]
    fn clock_clamps_long_frames() {
        let mut clock = FrameClock::new();
        let t = clock.tick();
        assert!(t.delta <= MAX_FRAME_DELTA);
        assert!(t.elapsed >= 0.0);
    }
}
