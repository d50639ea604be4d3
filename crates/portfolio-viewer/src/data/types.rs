//! GPU-side data layouts for the particle pipeline.

use glam::Mat4;
use particle_image::{ParticleParams, UniformSnapshot};

/// Per-card uniform buffer data, respecting std140 layout.
/// Must match `CardUniform` in `particle_image.wgsl`.
#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CardUniformStd140 {
    pub model_view: [[f32; 4]; 4], // 64
    pub proj: [[f32; 4]; 4],       // 64 -> 128
    /// Size of the viewport in physical pixels.
    pub viewport_size: [f32; 2],
    pub _pad0: [f32; 2], // -> 144

    pub time: f32,
    pub hover_blend: f32,
    pub interaction_blend: f32,
    pub opacity: f32, // -> 160

    pub depth_strength: f32,
    pub breath_speed: f32,
    pub breath_amplitude: f32,
    pub breath_xy_scale: f32, // -> 176

    pub turbulence_amplitude: f32,
    pub turbulence_depth: f32,
    pub turbulence_speed: f32,
    pub turbulence_bias: f32, // -> 192

    pub scatter_start: f32,
    pub scatter_end: f32,
    pub scatter_strength: f32,
    pub luminance_cutoff: f32, // -> 208

    pub luminance_feather: f32,
    pub fade_start: f32,
    pub fade_end: f32,
    pub interaction_growth: f32, // -> 224

    /// Point size in pixels before elevation/perspective scaling.
    pub base_point_size: f32,
    pub size_floor: f32,
    pub perspective_reference: f32,
    pub _pad1: f32, // -> 240
}

// Compile‑time safety check: buffer size must match WGSL‑reflected size.
const _: [(); 240] = [(); core::mem::size_of::<CardUniformStd140>()];

impl CardUniformStd140 {
    pub fn new(
        model_view: Mat4,
        proj: Mat4,
        viewport_size: [f32; 2],
        uniforms: &UniformSnapshot,
        params: &ParticleParams,
        base_point_size: f32,
    ) -> Self {
        Self {
            model_view: model_view.to_cols_array_2d(),
            proj: proj.to_cols_array_2d(),
            viewport_size,
            _pad0: [0.0; 2],

            time: uniforms.time,
            hover_blend: uniforms.hover_blend,
            interaction_blend: uniforms.interaction_blend,
            opacity: uniforms.opacity,

            depth_strength: params.depth_strength,
            breath_speed: params.breath_speed,
            breath_amplitude: params.breath_amplitude,
            breath_xy_scale: params.breath_xy_scale,

            turbulence_amplitude: params.turbulence_amplitude,
            turbulence_depth: params.turbulence_depth,
            turbulence_speed: params.turbulence_speed,
            turbulence_bias: params.turbulence_bias,

            scatter_start: params.scatter_start,
            scatter_end: params.scatter_end,
            scatter_strength: params.scatter_strength,
            luminance_cutoff: params.luminance_cutoff,

            luminance_feather: params.luminance_feather,
            fade_start: params.fade_start,
            fade_end: params.fade_end,
            interaction_growth: params.interaction_growth,

            base_point_size,
            size_floor: params.size_floor,
            perspective_reference: params.perspective_reference,
            _pad1: 0.0,
        }
    }
}

/// GPU resources of one card whose cover image loaded.
#[derive(Debug)]
pub struct CardGpu {
    /// Uniform buffer containing `CardUniformStd140` data.
    pub ubo: wgpu::Buffer,
    /// Uniforms + cover texture + sampler.
    pub bind: wgpu::BindGroup,
    // Kept alive for the bind group.
    pub _texture: wgpu::Texture,
}

/// Load state of a card's cover image.
#[derive(Debug)]
pub enum CardSlot {
    /// Cover still decoding; the card is not drawn.
    Loading,
    Ready(CardGpu),
    Failed(String),
}

impl CardSlot {
    pub fn gpu(&self) -> Option<&CardGpu> {
        match self {
            CardSlot::Ready(gpu) => Some(gpu),
            CardSlot::Loading | CardSlot::Failed(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_carries_snapshot_and_params() {
        let snapshot = UniformSnapshot {
            time: 2.0,
            hover_blend: 0.25,
            interaction_blend: 0.5,
            opacity: 0.75,
        };
        let params = ParticleParams::default();
        let ubo = CardUniformStd140::new(
            Mat4::IDENTITY,
            Mat4::IDENTITY,
            [1280.0, 720.0],
            &snapshot,
            &params,
            6.0,
        );
        assert_eq!(ubo.time, 2.0);
        assert_eq!(ubo.opacity, 0.75);
        assert_eq!(ubo.depth_strength, params.depth_strength);
        assert_eq!(ubo.base_point_size, 6.0);
        assert_eq!(bytemuck::bytes_of(&ubo).len(), 240);
    }

    fn parse_particle_shader() -> naga::Module {
        let src = include_str!("../../shaders/particle_image.wgsl");
        let module = naga::front::wgsl::parse_str(src).unwrap();
        naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::all(),
        )
        .validate(&module)
        .unwrap();
        module
    }

    #[test]
    fn particle_shader_validates_with_both_entry_points() {
        let module = parse_particle_shader();
        let stage_of = |name: &str| {
            module
                .entry_points
                .iter()
                .find(|ep| ep.name == name)
                .map(|ep| ep.stage)
        };
        assert_eq!(stage_of("vs_main"), Some(naga::ShaderStage::Vertex));
        assert_eq!(stage_of("fs_main"), Some(naga::ShaderStage::Fragment));
    }

    #[test]
    fn shader_card_uniform_matches_rust_layout() {
        let module = parse_particle_shader();
        let (members, span) = module
            .types
            .iter()
            .find_map(|(_, ty)| match &ty.inner {
                naga::TypeInner::Struct { members, span }
                    if ty.name.as_deref() == Some("CardUniform") =>
                {
                    Some((members.clone(), *span))
                }
                _ => None,
            })
            .unwrap();

        assert_eq!(span as usize, std::mem::size_of::<CardUniformStd140>());
        assert_eq!(span, 240);

        let offset = |name: &str| {
            members
                .iter()
                .find(|m| m.name.as_deref() == Some(name))
                .map(|m| m.offset as usize)
        };
        assert_eq!(
            offset("viewport_size"),
            Some(std::mem::offset_of!(CardUniformStd140, viewport_size))
        );
        assert_eq!(offset("time"), Some(std::mem::offset_of!(CardUniformStd140, time)));
        assert_eq!(
            offset("scatter_start"),
            Some(std::mem::offset_of!(CardUniformStd140, scatter_start))
        );
        assert_eq!(
            offset("base_point_size"),
            Some(std::mem::offset_of!(CardUniformStd140, base_point_size))
        );
    }
}
