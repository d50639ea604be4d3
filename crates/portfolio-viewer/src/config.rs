use crate::assistant::{DEFAULT_ENDPOINT, DEFAULT_MODEL};
use anyhow::{bail, Context, Result};
use clap::Parser;
use particle_image::{geometry::DEFAULT_RESOLUTION, Catalog};
use std::{fmt, path::PathBuf};

/// `portfolio-viewer` - a 3D carousel of projects rendered as particle images.
///
/// Each project's cover photo is rebuilt as a point cloud whose depth and
/// visibility follow the photo's brightness. Arrow keys or the on-screen
/// buttons move between projects; clicking the centred card opens it.
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// JSON file with an array of projects. The built-in catalog is used
    /// when omitted.
    #[arg(long, env = "PORTFOLIO_CATALOG")]
    pub catalog: Option<PathBuf>,

    /// Grid subdivisions per side; every card has (resolution + 1)^2 points.
    #[arg(long, default_value_t = DEFAULT_RESOLUTION)]
    pub resolution: u32,

    /// Initial window width in logical pixels.
    #[arg(long, default_value_t = 1280)]
    pub width: u32,

    /// Initial window height in logical pixels.
    #[arg(long, default_value_t = 720)]
    pub height: u32,

    /// Show the live tuning panel.
    #[arg(long)]
    pub tuning: bool,

    /// Present without waiting for vertical sync.
    #[arg(long)]
    pub no_vsync: bool,

    /// API key of the project assistant backend. The assistant runs in
    /// demo mode without one.
    #[arg(long, env = "PORTFOLIO_ASSISTANT_KEY", hide_env_values = true)]
    pub assistant_key: Option<String>,

    /// Model the assistant asks.
    #[arg(long, default_value = DEFAULT_MODEL)]
    pub assistant_model: String,

    /// Base URL of the `generateContent` API.
    #[arg(long, default_value = DEFAULT_ENDPOINT)]
    pub assistant_endpoint: String,
}

/// Remote assistant settings; present only when a key was supplied.
#[derive(Clone)]
pub struct AssistantBackend {
    pub api_key: String,
    pub model: String,
    pub endpoint: String,
}

impl fmt::Debug for AssistantBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssistantBackend")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

/// Validated startup configuration.
#[derive(Debug, Clone)]
pub struct ViewerConfig {
    pub catalog: Catalog,
    pub resolution: u32,
    pub window_size: (u32, u32),
    pub show_tuning: bool,
    pub vsync: bool,
    pub assistant: Option<AssistantBackend>,
}

impl ViewerConfig {
    pub fn from_args(args: Args) -> Result<Self> {
        if args.resolution == 0 {
            bail!("--resolution must be at least 1");
        }

        let catalog = match &args.catalog {
            Some(path) => Catalog::from_json_path(path)
                .with_context(|| format!("loading catalog {}", path.display()))?,
            None => Catalog::builtin(),
        };
        if catalog.is_empty() {
            bail!("catalog contains no projects");
        }
        log::info!(
            "Catalog: {} projects ({})",
            catalog.len(),
            args.catalog
                .as_ref()
                .map_or_else(|| "built-in".to_string(), |p| p.display().to_string())
        );

        let assistant = args
            .assistant_key
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
            .map(|api_key| AssistantBackend {
                api_key,
                model: args.assistant_model,
                endpoint: args.assistant_endpoint,
            });

        Ok(Self {
            catalog,
            resolution: args.resolution,
            window_size: (args.width.max(1), args.height.max(1)),
            show_tuning: args.tuning,
            vsync: !args.no_vsync,
            assistant,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_use_builtin_catalog() {
        let args = Args::parse_from(["portfolio-viewer"]);
        assert_eq!(args.resolution, DEFAULT_RESOLUTION);
        assert_eq!((args.width, args.height), (1280, 720));

        let cfg = ViewerConfig::from_args(args).unwrap();
        assert_eq!(cfg.catalog.len(), Catalog::builtin().len());
        assert!(cfg.vsync);
        assert!(!cfg.show_tuning);
    }

    #[test]
    fn flags_are_parsed() {
        let args = Args::parse_from([
            "portfolio-viewer",
            "--resolution",
            "64",
            "--width",
            "800",
            "--height",
            "600",
            "--tuning",
            "--no-vsync",
        ]);
        let cfg = ViewerConfig::from_args(args).unwrap();
        assert_eq!(cfg.resolution, 64);
        assert_eq!(cfg.window_size, (800, 600));
        assert!(cfg.show_tuning);
        assert!(!cfg.vsync);
    }

    #[test]
    fn assistant_key_selects_remote_backend() {
        let args = Args::parse_from([
            "portfolio-viewer",
            "--assistant-key",
            "secret-key",
            "--assistant-model",
            "gemini-test",
        ]);
        let cfg = ViewerConfig::from_args(args).unwrap();
        let backend = cfg.assistant.unwrap();
        assert_eq!(backend.api_key, "secret-key");
        assert_eq!(backend.model, "gemini-test");
        assert_eq!(backend.endpoint, DEFAULT_ENDPOINT);
        assert!(!format!("{:?}", backend).contains("secret-key"));
    }

    #[test]
    fn blank_assistant_key_means_demo_mode() {
        let args = Args::parse_from(["portfolio-viewer", "--assistant-key", "  "]);
        assert!(ViewerConfig::from_args(args).unwrap().assistant.is_none());
    }

    #[test]
    fn zero_resolution_is_rejected() {
        let args = Args::parse_from(["portfolio-viewer", "--resolution", "0"]);
        assert!(ViewerConfig::from_args(args).is_err());
    }

    #[test]
    fn missing_catalog_file_is_an_error() {
        let args = Args::parse_from(["portfolio-viewer", "--catalog", "does/not/exist.json"]);
        assert!(ViewerConfig::from_args(args).is_err());
    }
}
