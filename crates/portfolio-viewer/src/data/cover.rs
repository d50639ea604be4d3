use crate::data::types::{CardGpu, CardSlot, CardUniformStd140};
use crossbeam_channel::{unbounded, Receiver};
use particle_image::{Project, SourceImage};
use rayon::prelude::*;
use wgpu::util::DeviceExt;

/// A decoded cover, tagged with its card index.
pub type DecodedCover = (usize, particle_image::Result<SourceImage>);

/// Decodes every cover image on the rayon pool, off the frame loop.
/// Results arrive in completion order; a failure only affects its own card.
pub struct CoverLoader {
    rx: Receiver<DecodedCover>,
    remaining: usize,
}

impl CoverLoader {
    pub fn spawn(projects: &[Project]) -> Self {
        let (tx, rx) = unbounded::<DecodedCover>();
        let covers: Vec<String> = projects.iter().map(|p| p.cover_image.clone()).collect();
        let remaining = covers.len();

        rayon::spawn(move || {
            covers
                .par_iter()
                .enumerate()
                .for_each_with(tx, |tx, (index, cover)| {
                    // The receiver is gone only when the viewer is shutting down.
                    let _ = tx.send((index, SourceImage::load(cover)));
                });
        });

        Self { rx, remaining }
    }

    /// Covers decoded since the last call. Never blocks.
    pub fn poll(&mut self) -> Vec<DecodedCover> {
        let ready: Vec<_> = self.rx.try_iter().collect();
        self.remaining = self.remaining.saturating_sub(ready.len());
        ready
    }

    pub fn is_done(&self) -> bool {
        self.remaining == 0
    }
}

/// Uploads one decoded cover and creates the card's uniform buffer and bind
/// group. The texture is written once and never touched again.
pub fn upload_card(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    layout: &wgpu::BindGroupLayout,
    sampler: &wgpu::Sampler,
    image: &SourceImage,
    label: &str,
) -> CardGpu {
    let size = wgpu::Extent3d {
        width: image.width(),
        height: image.height(),
        depth_or_array_layers: 1,
    };

    // Unorm, not sRGB: elevation is computed on the stored values.
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8Unorm,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });

    queue.write_texture(
        wgpu::ImageCopyTexture {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        image.texels(),
        wgpu::ImageDataLayout {
            offset: 0,
            bytes_per_row: Some(4 * image.width()),
            rows_per_image: Some(image.height()),
        },
        size,
    );

    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

    let initial = <CardUniformStd140 as bytemuck::Zeroable>::zeroed();
    let ubo = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("Card UBO"),
        contents: bytemuck::bytes_of(&initial),
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
    });

    let bind = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Card BindGroup"),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: ubo.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::TextureView(&view),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
    });

    CardGpu {
        ubo,
        bind,
        _texture: texture,
    }
}

/// Turns one decode result into the card's slot, uploading on success.
pub fn slot_from_decoded(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    layout: &wgpu::BindGroupLayout,
    sampler: &wgpu::Sampler,
    project: &Project,
    decoded: particle_image::Result<SourceImage>,
) -> CardSlot {
    let max_dim = device.limits().max_texture_dimension_2d;

    match decoded {
        Ok(image) if image.width() > max_dim || image.height() > max_dim => {
            let reason = format!(
                "cover {}x{} exceeds the GPU texture limit of {}",
                image.width(),
                image.height(),
                max_dim
            );
            log::error!("Card '{}': {}", project.id, reason);
            CardSlot::Failed(reason)
        }
        Ok(image) => {
            log::info!(
                "Card '{}': cover {}x{} from {}",
                project.id,
                image.width(),
                image.height(),
                project.cover_image
            );
            CardSlot::Ready(upload_card(
                device,
                queue,
                layout,
                sampler,
                &image,
                &project.cover_image,
            ))
        }
        Err(err) => {
            log::error!("Card '{}': {}", project.id, err);
            CardSlot::Failed(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use particle_image::Catalog;
    use std::time::{Duration, Instant};

    fn drain(loader: &mut CoverLoader) -> Vec<DecodedCover> {
        let deadline = Instant::now() + Duration::from_secs(10);
        let mut all = Vec::new();
        while !loader.is_done() {
            assert!(Instant::now() < deadline, "cover decoding timed out");
            all.extend(loader.poll());
            std::thread::sleep(Duration::from_millis(5));
        }
        all.sort_by_key(|(index, _)| *index);
        all
    }

    #[test]
    fn failures_stay_per_card() {
        let mut projects = Catalog::builtin().projects().to_vec();
        projects[0].cover_image = "https://example.com/remote.jpg".into();
        projects[1].cover_image = "missing/cover.png".into();

        let mut loader = CoverLoader::spawn(&projects);
        let decoded = drain(&mut loader);
        assert_eq!(decoded.len(), projects.len());
        assert!(matches!(
            decoded[0].1,
            Err(particle_image::ParticleError::UnsupportedSource(_))
        ));
        assert!(matches!(
            decoded[1].1,
            Err(particle_image::ParticleError::Decode { .. })
        ));
    }

    #[test]
    fn empty_catalog_is_done_immediately() {
        let mut loader = CoverLoader::spawn(&[]);
        assert!(loader.is_done());
        assert!(loader.poll().is_empty());
    }
}
