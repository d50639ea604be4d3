//! Fragment shading reference (`fs_main` in `particle_image.wgsl`).

use crate::smoothstep;
use glam::{Vec2, Vec3, Vec4, Vec4Swizzles};

/// Color of the darkest elevation.
pub const VOID_COLOR: Vec3 = Vec3::new(0.02, 0.05, 0.15);
/// Cyan tint added in proportion to elevation.
pub const HIGHLIGHT_BOOST: Vec3 = Vec3::new(0.0, 0.1, 0.2);
/// Points below this visibility are not rasterized at all.
pub const VISIBILITY_EPSILON: f32 = 0.01;

/// Shades one fragment of a point sprite. `point_coord` is in [0, 1]² across
/// the sprite. Returns `None` where the fragment is discarded.
pub fn shade(
    point_coord: Vec2,
    texel: Vec3,
    elevation: f32,
    visibility: f32,
    opacity: f32,
) -> Option<Vec4> {
    if visibility < VISIBILITY_EPSILON {
        return None;
    }

    let r = (point_coord - Vec2::splat(0.5)).length();
    if r > 0.5 {
        return None;
    }

    let color = VOID_COLOR.lerp(texel, elevation) + HIGHLIGHT_BOOST * elevation;
    let alpha = (1.0 - smoothstep(0.3, 0.5, r)) * opacity * visibility;
    Some(color.extend(alpha))
}

/// Additive blending (`src_alpha, one`): overlapping points brighten.
#[inline]
pub fn blend_additive(dst: Vec4, src: Vec4) -> Vec4 {
    (dst.xyz() + src.xyz() * src.w).extend(dst.w + src.w)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discards_invisible_and_outside_disc() {
        assert!(shade(Vec2::splat(0.5), Vec3::ONE, 1.0, 0.001, 1.0).is_none());
        assert!(shade(Vec2::new(0.95, 0.95), Vec3::ONE, 1.0, 1.0, 1.0).is_none());
        assert!(shade(Vec2::splat(0.5), Vec3::ONE, 1.0, 1.0, 1.0).is_some());
    }

    #[test]
    fn grades_from_void_to_source() {
        let dark = shade(Vec2::splat(0.5), Vec3::new(1.0, 0.0, 0.0), 0.0, 1.0, 1.0).unwrap();
        assert!(dark.xyz().abs_diff_eq(VOID_COLOR, 1e-6));

        let bright = shade(Vec2::splat(0.5), Vec3::new(1.0, 0.0, 0.0), 1.0, 1.0, 1.0).unwrap();
        assert!(bright.xyz().abs_diff_eq(Vec3::new(1.0, 0.1, 0.2), 1e-6));
    }

    #[test]
    fn alpha_combines_edge_opacity_and_visibility() {
        let centre = shade(Vec2::splat(0.5), Vec3::ONE, 1.0, 0.5, 0.15).unwrap();
        assert!((centre.w - 0.075).abs() < 1e-6);

        let rim = shade(Vec2::new(0.5, 0.99), Vec3::ONE, 1.0, 1.0, 1.0).unwrap();
        assert!(rim.w < 0.01);
    }

    #[test]
    fn overlapping_points_accumulate() {
        let src = Vec4::new(0.4, 0.4, 0.4, 0.5);
        let once = blend_additive(Vec4::ZERO, src);
        let twice = blend_additive(once, src);
        assert!(twice.x > once.x);
        assert!((twice.x - 0.4).abs() < 1e-6);
    }
}
