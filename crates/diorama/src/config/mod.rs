//! Configuration system
//!
//! Settings files in RON or TOML, picked by file extension. Any
//! serde-backed, default-constructible type can opt in through the
//! [`Config`] trait; [`EngineConfig`] is the shape the demo apps load.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from a RON or TOML file
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        match extension(path) {
            Some("toml") => {
                toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
            }
            Some("ron") => ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string())),
            _ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        }
    }

    /// Save configuration to a RON or TOML file
    fn save_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let contents = match extension(path) {
            Some("toml") => {
                toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
            }
            Some("ron") => ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?,
            _ => return Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        };
        std::fs::write(path, contents).map_err(ConfigError::Io)
    }
}

fn extension(path: &Path) -> Option<&str> {
    path.extension().and_then(|e| e.to_str())
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

/// Top-level engine settings
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Window settings
    pub window: WindowConfig,
    /// Asset lookup settings
    pub assets: AssetConfig,
    /// Scene startup settings
    pub scene: SceneConfig,
}

impl Config for EngineConfig {}

/// Window settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Title bar text
    pub title: String,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl WindowConfig {
    /// Width over height, for camera projections
    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "diorama".to_owned(),
            width: 1280,
            height: 720,
        }
    }
}

/// Asset lookup settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    /// Directory that relative asset paths resolve against
    pub root: PathBuf,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("assets"),
        }
    }
}

/// Scene startup settings
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Scene document to load at startup; empty scene when absent
    pub path: Option<PathBuf>,
    /// Stop after this many frames; run until closed when absent
    pub frame_cap: Option<u64>,
}
