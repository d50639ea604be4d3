//! Carousel layout: a discrete active index plus a damped continuous index
//! that the card transforms are derived from.
//!
//! Selection is always exact (`active`); motion is always smooth
//! (`smoothed`).

use crate::error::{ParticleError, Result};
use glam::{Mat4, Quat, Vec3};

/// Frame-rate independent exponential approach of `current` toward `target`
/// with rate `lambda` over `dt` seconds.
#[inline]
pub fn damp(current: f32, target: f32, lambda: f32, dt: f32) -> f32 {
    current + (target - current) * (1.0 - (-lambda * dt).exp())
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutParams {
    /// Horizontal distance between neighbouring cards.
    pub spacing: f32,
    /// How far each step away from the centre recedes.
    pub curve_depth: f32,
    /// Y rotation per step, turning cards toward the direction of travel.
    pub rotation_gain: f32,
    pub scale_step: f32,
    /// Cap on how much a card may shrink.
    pub max_shrink: f32,
    /// Damping rate of the smoothed index, per second.
    pub damping: f32,
}

impl Default for LayoutParams {
    fn default() -> Self {
        Self {
            spacing: 7.5,
            curve_depth: 3.0,
            rotation_gain: 0.15,
            scale_step: 0.15,
            max_shrink: 0.3,
            damping: 2.5,
        }
    }
}

/// Transform of one card for this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CardLayout {
    pub offset: f32,
    pub position: Vec3,
    pub rotation_y: f32,
    pub scale: f32,
}

impl CardLayout {
    pub fn from_offset(offset: f32, params: &LayoutParams) -> Self {
        let distance = offset.abs();
        Self {
            offset,
            position: Vec3::new(offset * params.spacing, 0.0, -distance * params.curve_depth),
            rotation_y: -offset * params.rotation_gain,
            scale: 1.0 - (distance * params.scale_step).min(params.max_shrink),
        }
    }

    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            Vec3::splat(self.scale),
            Quat::from_rotation_y(self.rotation_y),
            self.position,
        )
    }
}

#[derive(Debug, Clone)]
pub struct Carousel {
    len: usize,
    active: usize,
    smoothed: f32,
}

impl Carousel {
    pub fn new(len: usize) -> Result<Self> {
        if len == 0 {
            return Err(ParticleError::EmptyCarousel);
        }
        Ok(Self {
            len,
            active: 0,
            smoothed: 0.0,
        })
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn active(&self) -> usize {
        self.active
    }

    pub fn smoothed(&self) -> f32 {
        self.smoothed
    }

    pub fn is_active(&self, index: usize) -> bool {
        index == self.active
    }

    pub fn next(&mut self) {
        self.active = (self.active + 1) % self.len;
    }

    pub fn prev(&mut self) {
        self.active = (self.active + self.len - 1) % self.len;
    }

    /// Moves to `index`; out-of-range indices are ignored. Returns whether
    /// the active index was set.
    pub fn jump_to(&mut self, index: usize) -> bool {
        if index >= self.len {
            log::debug!("Ignoring jump to {} (carousel has {})", index, self.len);
            return false;
        }
        self.active = index;
        true
    }

    /// Advances the smoothed index by `dt` seconds.
    pub fn tick(&mut self, dt: f32, params: &LayoutParams) {
        self.smoothed = damp(self.smoothed, self.active as f32, params.damping, dt);
    }

    pub fn layout(&self, index: usize, params: &LayoutParams) -> CardLayout {
        CardLayout::from_offset(index as f32 - self.smoothed, params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_both_ways() {
        let mut c = Carousel::new(3).unwrap();
        c.prev();
        assert_eq!(c.active(), 2);
        c.next();
        assert_eq!(c.active(), 0);

        for _ in 0..10 {
            c.next();
            assert!(c.active() < 3);
        }
        for _ in 0..10 {
            c.prev();
            assert!(c.active() < 3);
        }
    }

    #[test]
    fn jump_ignores_out_of_range() {
        let mut c = Carousel::new(3).unwrap();
        assert!(c.jump_to(2));
        assert!(!c.jump_to(3));
        assert_eq!(c.active(), 2);
    }

    #[test]
    fn empty_carousel_is_rejected() {
        assert!(matches!(Carousel::new(0), Err(ParticleError::EmptyCarousel)));
    }

    #[test]
    fn smoothed_index_converges_monotonically() {
        let params = LayoutParams::default();
        let mut c = Carousel::new(3).unwrap();
        c.jump_to(2);

        let dt = 1.0 / 60.0;
        let mut distance = (c.smoothed() - 2.0).abs();
        let mut steps = 0;
        while distance > 0.01 {
            c.tick(dt, &params);
            let d = (c.smoothed() - 2.0).abs();
            assert!(d < distance);
            distance = d;
            steps += 1;
            assert!(steps < 200, "did not settle");
        }
        // ln(200) / (2.5 / 60) ≈ 127 frames.
        assert!(steps > 100);
    }

    #[test]
    fn damping_is_frame_rate_independent() {
        let a = damp(0.0, 1.0, 2.5, 0.1);
        let mut b = 0.0;
        for _ in 0..10 {
            b = damp(b, 1.0, 2.5, 0.01);
        }
        assert!((a - b).abs() < 1e-5);
    }

    #[test]
    fn centred_card_is_at_origin_full_size() {
        let layout = CardLayout::from_offset(0.0, &LayoutParams::default());
        assert_eq!(layout.position, Vec3::ZERO);
        assert_eq!(layout.scale, 1.0);
        assert_eq!(layout.rotation_y, 0.0);
    }

    #[test]
    fn shrink_is_clamped() {
        let params = LayoutParams::default();
        let two = CardLayout::from_offset(2.0, &params);
        assert!((two.scale - 0.7).abs() < 1e-6);
        assert!((CardLayout::from_offset(-5.0, &params).scale - 0.7).abs() < 1e-6);
        assert!((CardLayout::from_offset(1.0, &params).scale - 0.85).abs() < 1e-6);
    }

    #[test]
    fn neighbours_recede_on_an_arc() {
        let params = LayoutParams::default();
        let left = CardLayout::from_offset(-1.0, &params);
        let right = CardLayout::from_offset(1.0, &params);
        assert_eq!(left.position, Vec3::new(-7.5, 0.0, -3.0));
        assert_eq!(right.position, Vec3::new(7.5, 0.0, -3.0));
        assert!(left.rotation_y > 0.0 && right.rotation_y < 0.0);
    }

    #[test]
    fn layout_follows_smoothed_not_active() {
        let params = LayoutParams::default();
        let mut c = Carousel::new(3).unwrap();
        c.next();
        assert!(c.is_active(1));
        // No time has passed, so card 0 is still centred.
        assert_eq!(c.layout(0, &params).position, Vec3::ZERO);
    }
}
