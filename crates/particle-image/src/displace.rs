//! Vertex displacement & visibility.
//!
//! CPU reference of `vs_main` in `particle_image.wgsl`. The two must stay in
//! lock-step: every term here has a line-for-line counterpart in the shader.
//! The stage is a pure function of the static grid vertex, its texel and a
//! [`UniformSnapshot`]; depth, breathing, turbulence and scatter are
//! independent additive terms.

use crate::geometry::GridVertex;
use crate::sampler::luminance;
use crate::smoothstep;
use glam::{Vec2, Vec3};

/// Grid resolution the default point size was tuned at.
pub const REFERENCE_RESOLUTION: u32 = 384;

/// The four per-card scalars animated every frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct UniformSnapshot {
    /// Seconds since start.
    pub time: f32,
    /// 1 while the card is the active one, 0 in the background.
    pub hover_blend: f32,
    /// 1 while the active card is under the pointer.
    pub interaction_blend: f32,
    pub opacity: f32,
}

/// Tunable constants of both shader stages.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleParams {
    pub depth_strength: f32,
    pub breath_speed: f32,
    pub breath_amplitude: f32,
    /// Amplitude of the uniform XY scale oscillation.
    pub breath_xy_scale: f32,

    pub turbulence_amplitude: f32,
    pub turbulence_depth: f32,
    pub turbulence_speed: f32,
    /// Added to elevation when scaling turbulence, so dim points still move.
    pub turbulence_bias: f32,

    pub scatter_start: f32,
    pub scatter_end: f32,
    pub scatter_strength: f32,

    pub luminance_cutoff: f32,
    pub luminance_feather: f32,
    pub fade_start: f32,
    pub fade_end: f32,

    /// Point size in pixels at `REFERENCE_RESOLUTION`.
    pub point_size: f32,
    pub size_floor: f32,
    pub perspective_reference: f32,
    pub interaction_growth: f32,
}

impl Default for ParticleParams {
    fn default() -> Self {
        Self {
            depth_strength: 3.5,
            breath_speed: 0.8,
            breath_amplitude: 0.1,
            breath_xy_scale: 0.01,

            turbulence_amplitude: 0.2,
            turbulence_depth: 0.5,
            turbulence_speed: 5.0,
            turbulence_bias: 0.5,

            scatter_start: 0.35,
            scatter_end: 0.55,
            scatter_strength: 2.0,

            luminance_cutoff: 0.15,
            luminance_feather: 0.1,
            fade_start: 0.4,
            fade_end: 0.5,

            point_size: 3.5,
            size_floor: 0.2,
            perspective_reference: 15.0,
            interaction_growth: 0.3,
        }
    }
}

impl ParticleParams {
    /// Base point size for a grid resolution. Fewer points get bigger ones so
    /// the image keeps roughly the same coverage.
    pub fn base_point_size(&self, resolution: u32) -> f32 {
        self.point_size * REFERENCE_RESOLUTION as f32 / resolution.max(1) as f32
    }

    /// Point size in pixels. `view_depth` is the distance in front of the
    /// camera; points at or behind the eye get no size.
    pub fn point_size_px(
        &self,
        base: f32,
        elevation: f32,
        view_depth: f32,
        interaction_blend: f32,
    ) -> f32 {
        if view_depth <= 0.0 {
            return 0.0;
        }
        base * (elevation + self.size_floor)
            * (self.perspective_reference / view_depth)
            * (1.0 + interaction_blend * self.interaction_growth)
    }
}

/// Output of the vertex stage for one point, in card-local space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplacedPoint {
    pub position: Vec3,
    pub elevation: f32,
    pub visibility: f32,
    pub scatter: f32,
}

#[inline]
fn fract(x: f32) -> f32 {
    x - x.floor()
}

/// Stable per-coordinate pseudo-random value in [0, 1).
#[inline]
pub fn hash12(st: Vec2) -> f32 {
    fract(st.dot(Vec2::new(12.9898, 78.233)).sin() * 43758.547)
}

/// Cheap separable "noise" used for the fluid turbulence.
#[inline]
pub fn noise3(p: Vec3) -> f32 {
    (p.x * 0.5).sin() * (p.y * 0.5).sin() * (p.z * 0.5).sin()
}

/// Outward mist direction of a point; z is halved to keep the rim thin.
pub fn scatter_direction(uv: Vec2) -> Vec3 {
    Vec3::new(
        hash12(uv) - 0.5,
        hash12(uv + Vec2::splat(1.0)) - 0.5,
        (hash12(uv + Vec2::splat(2.0)) - 0.5) * 0.5,
    )
}

fn turbulence(pos: Vec3, time: f32, params: &ParticleParams) -> Vec3 {
    let n = noise3(Vec3::new(pos.x * 2.0, pos.y * 2.0, time * 2.0));
    let phase = time * params.turbulence_speed + pos.z;
    Vec3::new(
        phase.cos() * params.turbulence_amplitude,
        phase.sin() * params.turbulence_amplitude,
        n * params.turbulence_depth,
    )
}

/// Visibility of a point from its elevation and distance to the image centre.
pub fn visibility(elevation: f32, dist_from_centre: f32, params: &ParticleParams) -> f32 {
    let cutoff = params.luminance_cutoff;
    smoothstep(cutoff, cutoff + params.luminance_feather, elevation)
        * (1.0 - smoothstep(params.fade_start, params.fade_end, dist_from_centre))
}

pub fn displace(
    vertex: &GridVertex,
    texel: Vec3,
    uniforms: &UniformSnapshot,
    params: &ParticleParams,
) -> DisplacedPoint {
    let uv = vertex.uv();
    let mut pos = vertex.position();
    let elevation = luminance(texel);
    let t = uniforms.time;

    let xy_scale = 1.0 + (t * params.breath_speed).sin() * params.breath_xy_scale;
    pos.x *= xy_scale;
    pos.y *= xy_scale;

    // Bright pixels come forward; background cards are flattened to half.
    let active_factor = 0.5 + 0.5 * uniforms.hover_blend;
    pos.z += elevation * params.depth_strength * active_factor;

    // Only the structure breathes, not the void.
    pos.z += (t * params.breath_speed + pos.x).sin() * params.breath_amplitude * elevation;

    if uniforms.interaction_blend > 0.0 {
        pos += turbulence(pos, t, params)
            * uniforms.interaction_blend
            * (params.turbulence_bias + elevation);
    }

    let dist = uv.distance(Vec2::splat(0.5));
    let scatter = smoothstep(params.scatter_start, params.scatter_end, dist);
    pos += scatter_direction(uv) * scatter * params.scatter_strength;

    DisplacedPoint {
        position: pos,
        elevation,
        visibility: visibility(elevation, dist, params),
        scatter,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn centre() -> GridVertex {
        GridVertex {
            position: [0.0, 0.0, 0.0],
            uv: [0.5, 0.5],
        }
    }

    fn active() -> UniformSnapshot {
        UniformSnapshot {
            time: 0.0,
            hover_blend: 1.0,
            interaction_blend: 0.0,
            opacity: 1.0,
        }
    }

    #[test]
    fn black_is_hidden_white_is_kept() {
        let params = ParticleParams::default();
        let black = displace(&centre(), Vec3::ZERO, &active(), &params);
        let white = displace(&centre(), Vec3::ONE, &active(), &params);
        assert!(black.visibility < 1e-6);
        assert!((white.visibility - 1.0).abs() < 1e-4);
    }

    #[test]
    fn rim_fades_out_even_for_bright_points() {
        let params = ParticleParams::default();
        let corner = GridVertex {
            position: [-4.0, 2.5, 0.0],
            uv: [0.0, 0.0],
        };
        let p = displace(&corner, Vec3::ONE, &active(), &params);
        assert_eq!(p.visibility, 0.0);
        assert_eq!(p.scatter, 1.0);
    }

    #[test]
    fn depth_is_halved_for_inactive_cards() {
        let params = ParticleParams::default();
        let front = displace(&centre(), Vec3::ONE, &active(), &params);
        let back = displace(
            &centre(),
            Vec3::ONE,
            &UniformSnapshot {
                hover_blend: 0.0,
                ..active()
            },
            &params,
        );
        assert!((front.position.z - 3.5).abs() < 1e-4);
        assert!((back.position.z - 1.75).abs() < 1e-4);
    }

    #[test]
    fn dark_points_do_not_breathe() {
        let params = ParticleParams::default();
        let at = |time| {
            displace(
                &centre(),
                Vec3::ZERO,
                &UniformSnapshot {
                    time,
                    ..active()
                },
                &params,
            )
            .position
        };
        assert_eq!(at(0.0).z, at(1.3).z);
    }

    #[test]
    fn turbulence_only_under_interaction() {
        let params = ParticleParams::default();
        let calm = displace(&centre(), Vec3::ONE, &active(), &params);
        let stirred = displace(
            &centre(),
            Vec3::ONE,
            &UniformSnapshot {
                interaction_blend: 1.0,
                ..active()
            },
            &params,
        );
        assert!(calm.position.distance(stirred.position) > 0.1);
    }

    #[test]
    fn scatter_is_stable_across_frames() {
        let uv = Vec2::new(0.03, 0.91);
        assert_eq!(scatter_direction(uv), scatter_direction(uv));
        let h = hash12(uv);
        assert!((0.0..1.0).contains(&h));
    }

    #[test]
    fn coarser_grids_get_bigger_points() {
        let params = ParticleParams::default();
        assert!((params.base_point_size(REFERENCE_RESOLUTION) - 3.5).abs() < 1e-6);
        assert!(params.base_point_size(220) > params.base_point_size(384));
    }

    #[test]
    fn point_size_shrinks_with_distance_and_grows_on_interaction() {
        let params = ParticleParams::default();
        let near = params.point_size_px(3.5, 1.0, 10.0, 0.0);
        let far = params.point_size_px(3.5, 1.0, 20.0, 0.0);
        let touched = params.point_size_px(3.5, 1.0, 10.0, 1.0);
        assert!((near - 3.5 * 1.2 * 1.5).abs() < 1e-5);
        assert!((far - near / 2.0).abs() < 1e-5);
        assert!((touched - near * 1.3).abs() < 1e-5);
        assert_eq!(params.point_size_px(3.5, 1.0, -1.0, 0.0), 0.0);
    }
}
