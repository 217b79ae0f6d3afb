//! Configuration system
//!
//! Engine settings live in `resources/game.config` (required) and
//! `resources/rendering.config` (optional). Both are JSON documents; TOML and
//! RON files are accepted too, picked by file extension.

pub use serde::{Serialize, Deserialize};
use std::path::Path;

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let format = ConfigFormat::from_path(path)?;
        let contents = std::fs::read_to_string(path)
            .map_err(ConfigError::Io)?;
        
        match format {
            ConfigFormat::Toml => toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string())),
            ConfigFormat::Ron => ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string())),
            ConfigFormat::Json => serde_json::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string())),
        }
    }
    
    /// Save configuration to file
    fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let contents = match ConfigFormat::from_path(path)? {
            ConfigFormat::Toml => toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?,
            ConfigFormat::Ron => ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?,
            ConfigFormat::Json => serde_json::to_string_pretty(self)
                .map_err(|e| ConfigError::Serialize(e.to_string()))?,
        };
        
        std::fs::write(path, contents).map_err(ConfigError::Io)
    }
}

/// On-disk configuration formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConfigFormat {
    Toml,
    Ron,
    Json,
}

impl ConfigFormat {
    fn from_path(path: &Path) -> Result<Self, ConfigError> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Ok(Self::Toml),
            Some("ron") => Ok(Self::Ron),
            Some("json" | "config" | "scene" | "template") => Ok(Self::Json),
            _ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        }
    }
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

/// Game-level settings (`game.config`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Window title
    pub game_title: String,
    
    /// Scene loaded at startup; required
    pub initial_scene: Option<String>,
}

impl Config for GameConfig {}

/// Rendering settings (`rendering.config`)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderingConfig {
    /// Horizontal resolution in pixels
    pub x_resolution: u32,
    /// Vertical resolution in pixels
    pub y_resolution: u32,
    /// Clear color, red channel
    pub clear_color_r: u8,
    /// Clear color, green channel
    pub clear_color_g: u8,
    /// Clear color, blue channel
    pub clear_color_b: u8,
    /// Camera offset, x
    pub cam_offset_x: f32,
    /// Camera offset, y
    pub cam_offset_y: f32,
    /// Initial zoom
    pub zoom_factor: f32,
    /// Camera easing factor
    pub cam_ease_factor: f32,
}

impl Default for RenderingConfig {
    fn default() -> Self {
        Self {
            x_resolution: 640,
            y_resolution: 360,
            clear_color_r: 255,
            clear_color_g: 255,
            clear_color_b: 255,
            cam_offset_x: 0.0,
            cam_offset_y: 0.0,
            zoom_factor: 1.0,
            cam_ease_factor: 1.0,
        }
    }
}

impl Config for RenderingConfig {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rendering_defaults_fill_missing_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rendering.config");
        std::fs::write(&path, r#"{ "x_resolution": 1280, "zoom_factor": 2.0 }"#).unwrap();

        let config = RenderingConfig::load_from_file(&path).unwrap();
        assert_eq!(config.x_resolution, 1280);
        assert_eq!(config.y_resolution, 360);
        assert_eq!(config.clear_color_g, 255);
        assert!((config.zoom_factor - 2.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_document_extensions_read_as_json() {
        for name in ["basic.scene", "Player.template", "game.config", "game.json"] {
            assert_eq!(ConfigFormat::from_path(Path::new(name)).unwrap(), ConfigFormat::Json);
        }
        assert!(ConfigFormat::from_path(Path::new("notes.txt")).is_err());
    }

    #[test]
    fn test_game_config_toml_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("game.toml");
        let config = GameConfig {
            game_title: "Demo".to_string(),
            initial_scene: Some("basic".to_string()),
        };
        config.save_to_file(&path).unwrap();

        let loaded = GameConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded.game_title, "Demo");
        assert_eq!(loaded.initial_scene.as_deref(), Some("basic"));
    }

    #[test]
    fn test_unsupported_extension() {
        let result = GameConfig::load_from_file("game.yaml");
        assert!(matches!(result, Err(ConfigError::UnsupportedFormat(_))));
    }
}
