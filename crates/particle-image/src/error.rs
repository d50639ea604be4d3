use std::path::PathBuf;

/// Errors produced while preparing cards. Nothing in the per-frame path
/// returns an error.
#[derive(Debug, thiserror::Error)]
pub enum ParticleError {
    #[error("failed to decode image {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("image source '{0}' is not a local file")]
    UnsupportedSource(String),

    #[error("pixel buffer of {len} bytes does not match {width}x{height} RGBA8")]
    Dimensions { width: u32, height: u32, len: usize },

    #[error("grid resolution must be at least 1")]
    ZeroResolution,

    #[error("carousel needs at least one card")]
    EmptyCarousel,

    #[error("catalog {path}: {source}")]
    CatalogIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("catalog {path}: {source}")]
    CatalogJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T, E = ParticleError> = std::result::Result<T, E>;
