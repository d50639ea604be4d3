// src/data/mod.rs
//! Data handling modules for the portfolio viewer.
//!
//! This module provides functionality for:
//! - Decoding cover images off the frame loop and uploading them as card textures.
//! - Decoding the open project's gallery into egui textures.
//! - Defining the data structures for GPU buffers.

pub mod cover;
pub mod gallery;
pub mod types;

// Re-export commonly used types for convenience.
pub use self::cover::CoverLoader;
pub use self::gallery::{GalleryImage, GalleryLoader};
pub use self::types::{CardGpu, CardSlot, CardUniformStd140};
