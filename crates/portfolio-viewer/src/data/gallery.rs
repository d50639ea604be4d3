use crossbeam_channel::{unbounded, Receiver};
use particle_image::{Project, SourceImage};
use rayon::prelude::*;

/// A decoded gallery image, tagged with its position in the gallery.
pub type DecodedImage = (usize, particle_image::Result<SourceImage>);

/// Load state of one gallery image.
pub enum GalleryImage {
    Loading,
    Ready(egui::TextureHandle),
    Failed(String),
}

/// Gallery of the open project. Images decode on the rayon pool and become
/// egui textures when polled from the frame loop.
pub struct GalleryLoader {
    project_id: String,
    rx: Receiver<DecodedImage>,
    images: Vec<GalleryImage>,
    remaining: usize,
}

impl GalleryLoader {
    pub fn spawn(project: &Project) -> Self {
        let (tx, rx) = unbounded::<DecodedImage>();
        let sources = project.gallery_images.clone();
        let remaining = sources.len();

        rayon::spawn(move || {
            sources
                .par_iter()
                .enumerate()
                .for_each_with(tx, |tx, (index, source)| {
                    // Closing the project drops the receiver.
                    let _ = tx.send((index, SourceImage::load(source)));
                });
        });

        Self {
            project_id: project.id.clone(),
            rx,
            images: (0..remaining).map(|_| GalleryImage::Loading).collect(),
            remaining,
        }
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&GalleryImage> {
        self.images.get(index)
    }

    pub fn is_done(&self) -> bool {
        self.remaining == 0
    }

    /// Uploads images decoded since the last call. Never blocks.
    pub fn poll(&mut self, ctx: &egui::Context) {
        if self.is_done() {
            return;
        }
        let ready: Vec<_> = self.rx.try_iter().collect();
        for (index, decoded) in ready {
            self.accept(ctx, index, decoded);
        }
    }

    fn accept(
        &mut self,
        ctx: &egui::Context,
        index: usize,
        decoded: particle_image::Result<SourceImage>,
    ) {
        let max_side = ctx.input(|i| i.max_texture_side);
        let state = match decoded {
            Ok(image) if image.width().max(image.height()) as usize > max_side => {
                let reason = format!(
                    "image {}x{} exceeds the texture limit of {}",
                    image.width(),
                    image.height(),
                    max_side
                );
                log::warn!("Gallery '{}' #{}: {}", self.project_id, index, reason);
                GalleryImage::Failed(reason)
            }
            Ok(image) => {
                let name = format!("gallery/{}/{}", self.project_id, index);
                GalleryImage::Ready(ctx.load_texture(
                    name,
                    color_image(&image),
                    egui::TextureOptions::LINEAR,
                ))
            }
            Err(err) => {
                log::warn!("Gallery '{}' #{}: {}", self.project_id, index, err);
                GalleryImage::Failed(err.to_string())
            }
        };

        if let Some(slot) = self.images.get_mut(index) {
            if matches!(slot, GalleryImage::Loading) {
                self.remaining = self.remaining.saturating_sub(1);
            }
            *slot = state;
        }
    }
}

pub fn color_image(image: &SourceImage) -> egui::ColorImage {
    egui::ColorImage::from_rgba_unmultiplied(
        [image.width() as usize, image.height() as usize],
        image.texels(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use particle_image::Catalog;
    use std::time::{Duration, Instant};

    fn project_with(images: &[&str]) -> Project {
        let mut project = Catalog::builtin().projects()[0].clone();
        project.gallery_images = images.iter().map(|s| (*s).to_owned()).collect();
        project
    }

    fn settle(loader: &mut GalleryLoader, ctx: &egui::Context) {
        let deadline = Instant::now() + Duration::from_secs(10);
        while !loader.is_done() {
            assert!(Instant::now() < deadline, "gallery decoding timed out");
            loader.poll(ctx);
            std::thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn unreadable_images_fail_individually() {
        let ctx = egui::Context::default();
        let project = project_with(&["https://example.com/a.jpg", "missing/b.png"]);
        let mut loader = GalleryLoader::spawn(&project);
        assert_eq!(loader.len(), 2);
        assert!(matches!(loader.get(0), Some(GalleryImage::Loading)));

        settle(&mut loader, &ctx);
        assert!(matches!(loader.get(0), Some(GalleryImage::Failed(_))));
        assert!(matches!(loader.get(1), Some(GalleryImage::Failed(_))));
    }

    #[test]
    fn decoded_image_becomes_texture() {
        let ctx = egui::Context::default();
        let mut loader = GalleryLoader::spawn(&project_with(&["missing/a.png"]));
        settle(&mut loader, &ctx);

        let image = SourceImage::solid(4, 2, [10, 20, 30, 255]).unwrap();
        loader.accept(&ctx, 0, Ok(image));
        match loader.get(0) {
            Some(GalleryImage::Ready(texture)) => assert_eq!(texture.size(), [4, 2]),
            _ => panic!("expected an uploaded texture"),
        }
    }

    #[test]
    fn color_image_keeps_dimensions_and_texels() {
        let image = SourceImage::solid(3, 2, [255, 0, 0, 255]).unwrap();
        let color = color_image(&image);
        assert_eq!(color.size, [3, 2]);
        assert_eq!(color.pixels[0], egui::Color32::from_rgb(255, 0, 0));
    }

    #[test]
    fn empty_gallery_is_done() {
        let mut loader = GalleryLoader::spawn(&project_with(&[]));
        assert!(loader.is_empty());
        assert!(loader.is_done());
        loader.poll(&egui::Context::default());
    }
}
