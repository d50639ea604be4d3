//! Portfolio viewer: a 3D carousel of particle-image cards.
//!
//! Each project's cover photo becomes a point cloud rendered with wgpu; the
//! carousel, animation and pointer logic live in `particle_image`. This crate
//! adds the window, GPU resources, picking and the egui overlay.

pub mod app;
pub mod assistant;
pub mod camera;
pub mod config;
pub mod data;
pub mod input;
pub mod renderer;
pub mod ui;
