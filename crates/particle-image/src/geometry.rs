//! Point-cloud geometry: a subdivided plane whose vertices are the particles.

use crate::error::{ParticleError, Result};
use glam::{Vec2, Vec3};

/// World-space size of the plane every card is built on.
pub const PLANE_WIDTH: f32 = 8.0;
pub const PLANE_HEIGHT: f32 = 5.0;

/// Segments per side. 384 looked denser but cost ~3x the frame time.
pub const DEFAULT_RESOLUTION: u32 = 220;

/// Per-point data uploaded to the GPU instance buffer.
/// Must match the instance inputs of `particle_image.wgsl`.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GridVertex {
    /// Base position on the plane; z is always 0.
    pub position: [f32; 3],
    /// Texture coordinate, origin at the top-left of the image.
    pub uv: [f32; 2],
}

impl GridVertex {
    #[inline]
    pub fn position(&self) -> Vec3 {
        Vec3::from(self.position)
    }

    #[inline]
    pub fn uv(&self) -> Vec2 {
        Vec2::from(self.uv)
    }
}

/// Immutable grid of (R+1)×(R+1) points spanning the plane, row-major from
/// the top-left corner.
#[derive(Debug, Clone)]
pub struct PlaneGrid {
    resolution: u32,
    vertices: Vec<GridVertex>,
}

impl PlaneGrid {
    pub fn new(resolution: u32) -> Result<Self> {
        Self::with_size(resolution, PLANE_WIDTH, PLANE_HEIGHT)
    }

    pub fn with_size(resolution: u32, width: f32, height: f32) -> Result<Self> {
        if resolution == 0 {
            return Err(ParticleError::ZeroResolution);
        }

        let side = resolution as usize + 1;
        let step = 1.0 / resolution as f32;
        let mut vertices = Vec::with_capacity(side * side);

        for row in 0..side {
            let v = row as f32 * step;
            for col in 0..side {
                let u = col as f32 * step;
                vertices.push(GridVertex {
                    position: [(u - 0.5) * width, (0.5 - v) * height, 0.0],
                    uv: [u, v],
                });
            }
        }

        Ok(Self {
            resolution,
            vertices,
        })
    }

    pub fn resolution(&self) -> u32 {
        self.resolution
    }

    pub fn vertices(&self) -> &[GridVertex] {
        &self.vertices
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_count_and_extent() {
        let grid = PlaneGrid::new(4).unwrap();
        assert_eq!(grid.len(), 25);

        let first = grid.vertices()[0];
        let last = *grid.vertices().last().unwrap();
        assert_eq!(first.position, [-4.0, 2.5, 0.0]);
        assert_eq!(first.uv, [0.0, 0.0]);
        assert_eq!(last.position, [4.0, -2.5, 0.0]);
        assert_eq!(last.uv, [1.0, 1.0]);
    }

    #[test]
    fn default_resolution_is_within_particle_budget() {
        let grid = PlaneGrid::new(DEFAULT_RESOLUTION).unwrap();
        assert_eq!(grid.len(), 221 * 221);
        assert!((50_000..=150_000).contains(&grid.len()));
    }

    #[test]
    fn centre_point_maps_to_origin() {
        let grid = PlaneGrid::new(2).unwrap();
        let centre = grid.vertices()[4];
        assert_eq!(centre.position(), Vec3::ZERO);
        assert_eq!(centre.uv(), Vec2::splat(0.5));
    }

    #[test]
    fn zero_resolution_is_rejected() {
        assert!(matches!(
            PlaneGrid::new(0),
            Err(ParticleError::ZeroResolution)
        ));
    }
}
