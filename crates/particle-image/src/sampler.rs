//! Image-to-depth sampler.
//!
//! Holds a decoded cover image as tightly packed RGBA8 texels, in the same
//! orientation the GPU texture is uploaded with (row 0 at the top, so the
//! texture coordinate (0, 0) addresses the top-left texel).

use crate::error::{ParticleError, Result};
use glam::{Vec2, Vec3, Vec4};
use std::path::Path;

/// Rec. 601 luma weights.
pub const LUMA_WEIGHTS: Vec3 = Vec3::new(0.299, 0.587, 0.114);

/// Luminance ("elevation") of a color in [0, 1].
#[inline]
pub fn luminance(rgb: Vec3) -> f32 {
    rgb.dot(LUMA_WEIGHTS)
}

#[derive(Clone)]
pub struct SourceImage {
    width: u32,
    height: u32,
    texels: Vec<u8>,
}

impl std::fmt::Debug for SourceImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

impl SourceImage {
    /// Wraps an RGBA8 buffer, rejecting empty or mismatched dimensions.
    pub fn from_rgba8(width: u32, height: u32, texels: Vec<u8>) -> Result<Self> {
        let expected = width as usize * height as usize * 4;
        if width == 0 || height == 0 || texels.len() != expected {
            return Err(ParticleError::Dimensions {
                width,
                height,
                len: texels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            texels,
        })
    }

    /// A single-color image, handy as a stand-in and in tests.
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Result<Self> {
        let texels = rgba
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * 4)
            .collect();
        Self::from_rgba8(width, height, texels)
    }

    /// Decodes a local image file. URL-like references are rejected because
    /// fetching belongs to whoever supplies the catalog.
    pub fn load(reference: &str) -> Result<Self> {
        if reference.contains("://") {
            return Err(ParticleError::UnsupportedSource(reference.to_owned()));
        }
        let path = Path::new(reference);
        let decoded = image::open(path).map_err(|source| ParticleError::Decode {
            path: path.to_path_buf(),
            source,
        })?;
        let rgba = decoded.to_rgba8();
        let (width, height) = rgba.dimensions();
        log::debug!("Decoded {} ({}x{})", path.display(), width, height);
        Self::from_rgba8(width, height, rgba.into_raw())
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA8 rows, top row first.
    pub fn texels(&self) -> &[u8] {
        &self.texels
    }

    #[inline]
    fn texel(&self, x: u32, y: u32) -> Vec4 {
        let i = (y as usize * self.width as usize + x as usize) * 4;
        let t = &self.texels[i..i + 4];
        Vec4::new(t[0] as f32, t[1] as f32, t[2] as f32, t[3] as f32) / 255.0
    }

    /// Bilinear sample with clamp-to-edge addressing, texel centres at
    /// half-integer coordinates (matching a linear GPU sampler).
    pub fn sample(&self, uv: Vec2) -> Vec4 {
        let max_x = (self.width - 1) as f32;
        let max_y = (self.height - 1) as f32;
        let px = (uv.x * self.width as f32 - 0.5).clamp(0.0, max_x);
        let py = (uv.y * self.height as f32 - 0.5).clamp(0.0, max_y);

        let x0 = px.floor() as u32;
        let y0 = py.floor() as u32;
        let x1 = (x0 + 1).min(self.width - 1);
        let y1 = (y0 + 1).min(self.height - 1);
        let fx = px - x0 as f32;
        let fy = py - y0 as f32;

        let top = self.texel(x0, y0).lerp(self.texel(x1, y0), fx);
        let bottom = self.texel(x0, y1).lerp(self.texel(x1, y1), fx);
        top.lerp(bottom, fy)
    }

    /// Elevation at a texture coordinate.
    pub fn elevation(&self, uv: Vec2) -> f32 {
        luminance(self.sample(uv).truncate())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn luminance_of_primaries() {
        assert!((luminance(Vec3::ONE) - 1.0).abs() < 1e-6);
        assert_eq!(luminance(Vec3::ZERO), 0.0);
        assert!((luminance(Vec3::X) - 0.299).abs() < 1e-6);
    }

    #[test]
    fn rejects_mismatched_buffer() {
        let err = SourceImage::from_rgba8(2, 2, vec![0; 15]).unwrap_err();
        assert!(matches!(err, ParticleError::Dimensions { len: 15, .. }));
        assert!(SourceImage::from_rgba8(0, 4, Vec::new()).is_err());
    }

    #[test]
    fn rejects_remote_references() {
        let err = SourceImage::load("https://example.com/cover.jpg").unwrap_err();
        assert!(matches!(err, ParticleError::UnsupportedSource(_)));
    }

    #[test]
    fn missing_file_is_a_decode_error() {
        let err = SourceImage::load("definitely/not/here.png").unwrap_err();
        assert!(matches!(err, ParticleError::Decode { .. }));
    }

    #[test]
    fn samples_top_row_at_v_zero() {
        // 1x2 image: white on top, black below.
        let img = SourceImage::from_rgba8(1, 2, vec![255, 255, 255, 255, 0, 0, 0, 255]).unwrap();
        assert!((img.elevation(Vec2::new(0.5, 0.0)) - 1.0).abs() < 1e-5);
        assert!(img.elevation(Vec2::new(0.5, 1.0)) < 1e-5);
        let mid = img.elevation(Vec2::new(0.5, 0.5));
        assert!((mid - 0.5).abs() < 1e-5, "midpoint blends both rows, got {mid}");
    }

    #[test]
    fn solid_image_is_uniform() {
        let img = SourceImage::solid(4, 3, [255, 0, 0, 255]).unwrap();
        for uv in [Vec2::ZERO, Vec2::splat(0.5), Vec2::ONE] {
            assert!((img.elevation(uv) - 0.299).abs() < 1e-5);
        }
    }
}
