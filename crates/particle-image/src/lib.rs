//! Particle image: the GPU-free core of the portfolio carousel.
//!
//! A cover photograph is reconstructed as a point cloud. Every point of a
//! static grid samples the photo, and its luminance ("elevation") drives
//! depth extrusion, breathing, pointer turbulence and visibility.
//!
//! - `sampler`:     RGBA8 image + bilinear sampling + luminance.
//! - `geometry`:    the (R+1)×(R+1) point grid over an 8×5 plane.
//! - `displace`:    reference math of the vertex stage (mirrors the WGSL).
//! - `shade`:       reference math of the fragment stage and additive blend.
//! - `animate`:     per-card uniform blending toward targets.
//! - `carousel`:    active index, damped smoothed index, per-card layout.
//! - `interaction`: pointer hover/drag state machine with click suppression.
//! - `scene`:       one carousel + one card visual per project, per frame.
//! - `catalog`:     project records (built-in or JSON).
//!
//! Geometry never changes after it is built; every per-frame variation is a
//! function of the uniform snapshot handed to the shader stages.

pub mod animate;
pub mod carousel;
pub mod catalog;
pub mod displace;
pub mod error;
pub mod geometry;
pub mod interaction;
pub mod sampler;
pub mod scene;
pub mod shade;

pub use animate::{approach, BlendRates, BlendTargets, CardUniforms};
pub use carousel::{damp, CardLayout, Carousel, LayoutParams};
pub use catalog::{Catalog, Project};
pub use displace::{DisplacedPoint, ParticleParams, UniformSnapshot};
pub use error::{ParticleError, Result};
pub use geometry::{GridVertex, PlaneGrid};
pub use interaction::{CardInteraction, ClickOutcome, PointerPhase};
pub use sampler::{luminance, SourceImage};
pub use scene::{CardFrame, CardVisual, CarouselScene, FrameClock, FrameTime};

/// GLSL-style `smoothstep`, shared by both shader-stage reference modules.
#[inline]
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

#[cfg(test)]
mod tests {
    use super::smoothstep;

    #[test]
    fn smoothstep_clamps_and_is_symmetric() {
        assert_eq!(smoothstep(0.2, 0.4, 0.0), 0.0);
        assert_eq!(smoothstep(0.2, 0.4, 1.0), 1.0);
        assert!((smoothstep(0.2, 0.4, 0.3) - 0.5).abs() < 1e-6);
    }
}
