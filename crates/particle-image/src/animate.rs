//! Uniform animation: per-card blends that chase their targets every frame.
//!
//! All three blends follow the same law, `current += (target - current) * k`,
//! applied once per rendered frame. Targets may change at any time; the
//! value simply bends toward the new one.

use crate::displace::UniformSnapshot;

/// One exponential interpolation step. `factor` is clamped to [0, 1] so the
/// value can never overshoot its target.
#[inline]
pub fn approach(current: f32, target: f32, factor: f32) -> f32 {
    current + (target - current) * factor.clamp(0.0, 1.0)
}

/// Per-frame interpolation factors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlendRates {
    pub hover: f32,
    pub interaction: f32,
    pub opacity: f32,
}

impl Default for BlendRates {
    fn default() -> Self {
        Self {
            hover: 0.05,
            interaction: 0.08,
            opacity: 0.05,
        }
    }
}

/// What a card is animating toward this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlendTargets {
    pub active: bool,
    pub pointer_over: bool,
    pub opacity: f32,
}

/// The animated uniform set of one card. Starts fully faded out.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CardUniforms {
    time: f32,
    hover_blend: f32,
    interaction_blend: f32,
    opacity: f32,
}

impl CardUniforms {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&mut self, time: f32, targets: &BlendTargets, rates: &BlendRates) {
        self.time = time;

        let hover = if targets.active { 1.0 } else { 0.0 };
        self.hover_blend = approach(self.hover_blend, hover, rates.hover);

        let interaction = if targets.active && targets.pointer_over {
            1.0
        } else {
            0.0
        };
        self.interaction_blend = approach(self.interaction_blend, interaction, rates.interaction);

        self.opacity = approach(self.opacity, targets.opacity.clamp(0.0, 1.0), rates.opacity);
    }

    pub fn snapshot(&self) -> UniformSnapshot {
        UniformSnapshot {
            time: self.time,
            hover_blend: self.hover_blend,
            interaction_blend: self.interaction_blend,
            opacity: self.opacity,
        }
    }
}
