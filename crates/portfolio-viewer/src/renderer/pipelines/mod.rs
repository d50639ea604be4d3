//! Render pass pipelines.

pub mod particles;
pub mod present;
