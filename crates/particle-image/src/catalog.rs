//! Project records shown by the carousel.

use crate::error::{ParticleError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub title: String,
    pub subtitle: String,
    pub description: String,
    /// Path of the image the particle cloud is built from.
    pub cover_image: String,
    #[serde(default)]
    pub gallery_images: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Background notes handed to the assistant for this project.
    #[serde(default)]
    pub ai_context: String,
}

impl Project {
    /// Rebases relative local image paths onto `base`. URLs and absolute
    /// paths are left alone.
    pub fn resolve_images(&mut self, base: &Path) {
        self.cover_image = resolve_against(base, &self.cover_image);
        for image in &mut self.gallery_images {
            *image = resolve_against(base, image);
        }
    }
}

fn resolve_against(base: &Path, reference: &str) -> String {
    if reference.contains("://") || Path::new(reference).is_absolute() {
        return reference.to_owned();
    }
    base.join(reference).to_string_lossy().into_owned()
}

#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    projects: Vec<Project>,
}

impl Catalog {
    pub fn new(projects: Vec<Project>) -> Self {
        Self { projects }
    }

    /// Reads a JSON array of projects. Relative image paths are taken
    /// relative to the catalog file's directory.
    pub fn from_json_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| ParticleError::CatalogIo {
            path: path.to_path_buf(),
            source,
        })?;
        let mut projects: Vec<Project> =
            serde_json::from_str(&text).map_err(|source| ParticleError::CatalogJson {
                path: path.to_path_buf(),
                source,
            })?;
        if let Some(base) = path.parent() {
            for project in &mut projects {
                project.resolve_images(base);
            }
        }
        log::info!("Loaded {} projects from {}", projects.len(), path.display());
        Ok(Self { projects })
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn get(&self, index: usize) -> Option<&Project> {
        self.projects.get(index)
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    /// The studio's three showcase projects. Images are looked up relative
    /// to the working directory.
    pub fn builtin() -> Self {
        fn project(
            id: &str,
            title: &str,
            subtitle: &str,
            description: &str,
            slug: &str,
            tags: &[&str],
            ai_context: &str,
        ) -> Project {
            Project {
                id: id.to_owned(),
                title: title.to_owned(),
                subtitle: subtitle.to_owned(),
                description: description.to_owned(),
                cover_image: format!("assets/{slug}/cover.jpg"),
                gallery_images: (1..=3)
                    .map(|i| format!("assets/{slug}/gallery-{i}.jpg"))
                    .collect(),
                tags: tags.iter().map(|t| (*t).to_owned()).collect(),
                ai_context: ai_context.to_owned(),
            }
        }

        Self::new(vec![
            project(
                "p1",
                "NEO-SHANGHAI VERTEX",
                "High-Density Vertical Eco-System",
                "An experimental skyscraper concept designed for the post-2050 climate. \
                 It integrates atmospheric water generation with vertical hydroponic \
                 farming, creating a self-sustaining ecosystem within the mega-structure.",
                "neo-shanghai-vertex",
                &["Vertical City", "Sustainability", "Parametric Design"],
                "The Neo-Shanghai Vertex is a 1.2km tall vertical city. Key features \
                 include the Aerogellic Facade for water harvesting and the internal \
                 Mycelium structural supports. It challenges traditional concrete paradigms.",
            ),
            project(
                "p2",
                "VOID MUSEUM",
                "Subterranean Art Repository",
                "Located in the desert salt flats, this museum exists entirely underground. \
                 Light is funneled through massive crystalline structures on the surface, \
                 creating shifting time-based light sculptures in the galleries below.",
                "void-museum",
                &["Subterranean", "Light Studies", "Brutalism"],
                "The Void Museum explores the concept of \"Architecture of Absence\". By \
                 subtracting volume from the earth rather than adding to it, we create a \
                 sanctuary for art that is protected from extreme surface temperatures.",
            ),
            project(
                "p3",
                "CYBER-AGORA",
                "Mixed Reality Public Space",
                "A physical public square overlaid with persistent AR functionality. The \
                 architecture serves as a canvas for digital artists, allowing the space to \
                 be reprogrammed instantly for protests, concerts, or markets.",
                "cyber-agora",
                &["Mixed Reality", "Urban Design", "Public Space"],
                "Cyber-Agora investigates the intersection of physical tectonics and digital \
                 overlays. The concrete forms are embedded with QR-mesh nodes, allowing for \
                 precise tracking of AR layers without GPS drift.",
            ),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_has_three_projects() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.get(1).unwrap().title, "VOID MUSEUM");
        assert!(catalog.get(3).is_none());
        assert!(catalog
            .projects()
            .iter()
            .all(|p| p.gallery_images.len() == 3 && !p.ai_context.is_empty()));
    }

    #[test]
    fn parses_camel_case_json() {
        let json = r#"[{
            "id": "x1",
            "title": "T",
            "subtitle": "S",
            "description": "D",
            "coverImage": "covers/x1.png",
            "galleryImages": ["a.png"],
            "tags": ["Brutalism"],
            "aiContext": "notes"
        }]"#;
        let projects: Vec<Project> = serde_json::from_str(json).unwrap();
        assert_eq!(projects[0].cover_image, "covers/x1.png");
        assert_eq!(projects[0].ai_context, "notes");
    }

    #[test]
    fn optional_fields_default_to_empty() {
        let json =
            r#"[{"id":"x","title":"T","subtitle":"S","description":"D","coverImage":"c.png"}]"#;
        let projects: Vec<Project> = serde_json::from_str(json).unwrap();
        assert!(projects[0].tags.is_empty());
        assert!(projects[0].gallery_images.is_empty());
    }

    #[test]
    fn image_paths_resolve_against_catalog_directory() {
        let dir = std::env::temp_dir().join(format!("catalog-paths-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("catalog.json");
        let json = r#"[{
            "id": "x1",
            "title": "T",
            "subtitle": "S",
            "description": "D",
            "coverImage": "covers/x1.png",
            "galleryImages": ["https://example.com/a.jpg", "/srv/b.png", "g/c.png"]
        }]"#;
        std::fs::write(&path, json).unwrap();

        let catalog = Catalog::from_json_path(&path).unwrap();
        std::fs::remove_dir_all(&dir).unwrap();

        let project = catalog.get(0).unwrap();
        assert_eq!(Path::new(&project.cover_image), dir.join("covers/x1.png"));
        assert_eq!(project.gallery_images[0], "https://example.com/a.jpg");
        assert_eq!(project.gallery_images[1], "/srv/b.png");
        assert_eq!(Path::new(&project.gallery_images[2]), dir.join("g/c.png"));
    }

    #[test]
    fn missing_catalog_file_reports_path() {
        let err = Catalog::from_json_path(Path::new("no/such/catalog.json")).unwrap_err();
        assert!(err.to_string().contains("no/such/catalog.json"));
    }
}
