//! Demo settings with persistence
//!
//! Settings are read from `~/.config/meshpull/settings.toml`, or from the
//! path given as the first command line argument.

use std::fs;
use std::path::{Path, PathBuf};

use meshpull_assets::MeshletLimits;
use meshpull_core::TimeConfig;
use meshpull_picking::PickRegion;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// All demo settings. Missing sections and fields take their defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoSettings {
    pub meshlets: MeshletLimits,
    pub scene: SceneSettings,
    pub picking: PickingSettings,
    pub logging: LoggingSettings,
}

impl DemoSettings {
    /// Get the config directory path
    fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("meshpull"))
    }

    /// Get the default settings file path
    pub fn settings_path() -> Option<PathBuf> {
        Self::config_dir().map(|p| p.join("settings.toml"))
    }

    /// Load settings from `path`, or from the default location when `None`.
    /// Falls back to defaults if the file is missing or unreadable.
    pub fn load(path: Option<&Path>) -> Self {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => match Self::settings_path() {
                Some(path) => path,
                None => {
                    warn!("Could not determine config directory");
                    return Self::default();
                }
            },
        };

        if !path.exists() {
            info!("No settings file at {:?}, using defaults", path);
            return Self::default();
        }

        match fs::read_to_string(&path) {
            Ok(content) => match Self::parse(&content) {
                Ok(settings) => {
                    info!("Loaded settings from {:?}", path);
                    settings
                }
                Err(e) => {
                    warn!("Failed to parse settings: {}, using defaults", e);
                    Self::default()
                }
            },
            Err(e) => {
                warn!("Failed to read settings file: {}, using defaults", e);
                Self::default()
            }
        }
    }

    pub fn parse(content: &str) -> anyhow::Result<Self> {
        let settings: Self = toml::from_str(content)?;
        settings.meshlets.validate()?;
        Ok(settings)
    }

    /// Save settings to the default location
    pub fn save(&self) -> anyhow::Result<()> {
        let Some(dir) = Self::config_dir() else {
            anyhow::bail!("Could not determine config directory");
        };

        let path = dir.join("settings.toml");

        if !dir.exists() {
            fs::create_dir_all(&dir)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        info!("Saved settings to {:?}", path);
        Ok(())
    }
}

/// What the headless demo builds and how long it runs
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneSettings {
    /// ID buffer width in pixels
    pub width: u32,
    /// ID buffer height in pixels
    pub height: u32,
    /// Vertical field of view in degrees
    pub fov: f32,
    /// Rows of static models (plane, sphere, capsule)
    pub static_rows: u32,
    /// Skinned capsules swaying behind the static rows
    pub animated_instances: u32,
    /// Spheres drawn through the flat instanced path
    pub instanced_spheres: u32,
    /// Frames to run before exiting
    pub frames: u32,
    /// Simulated seconds per frame
    pub frame_delta: f32,
    pub time: TimeConfig,
}

impl Default for SceneSettings {
    fn default() -> Self {
        Self {
            width: 320,
            height: 180,
            fov: 60.0,
            static_rows: 2,
            animated_instances: 3,
            instanced_spheres: 8,
            frames: 8,
            frame_delta: 1.0 / 30.0,
            time: TimeConfig::default(),
        }
    }
}

/// Where the demo picks each frame
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PickingSettings {
    /// Pixel used for the single-point pick
    pub point: [u32; 2],
    /// Box used for the box-select pick
    pub region: PickRegion,
    /// Collapse repeated ids from box selects before logging
    pub dedup_region: bool,
}

impl Default for PickingSettings {
    fn default() -> Self {
        Self {
            point: [160, 90],
            region: PickRegion::new(96, 48, 128, 96),
            dedup_region: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Filter used when `RUST_LOG` is unset, e.g. `info` or `meshpull=debug`
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let settings = DemoSettings::parse(
            r#"
            [meshlets]
            max_vertices = 32
            max_triangles = 48

            [scene]
            frames = 2
            "#,
        )
        .unwrap();
        assert_eq!(settings.meshlets.max_vertices, 32);
        assert_eq!(settings.scene.frames, 2);
        assert_eq!(settings.scene.width, 320);
        assert_eq!(settings.picking.region, PickRegion::new(96, 48, 128, 96));
        assert_eq!(settings.logging.level, "info");
    }

    #[test]
    fn test_invalid_meshlet_limits_are_rejected() {
        let result = DemoSettings::parse(
            r#"
            [meshlets]
            max_vertices = 512
            max_triangles = 64
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let settings = DemoSettings::load(Some(Path::new("/nonexistent/meshpull.toml")));
        assert_eq!(settings.scene.frames, SceneSettings::default().frames);
    }
}
