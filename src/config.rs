//! # Configuration Management
//!
//! This module handles loading and parsing configuration from the widget-config.toml file.
//! It provides a centralized way to configure the daily rotation, the dot-matrix look,
//! the PokeAPI endpoints, and where widget state is kept.

use crate::dot_matrix::DotMatrixParams;
use image::Rgba;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default configuration file name, looked up in the working directory
pub const CONFIG_FILE: &str = "widget-config.toml";

/// Errors from configuration values and persistence.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Colour string is not `#RRGGBB` or `#AARRGGBB`
    #[error("invalid colour {0:?}: expected #RRGGBB or #AARRGGBB")]
    Color(String),

    /// Serializing the configuration failed
    #[error("config serialize: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// Writing the configuration file failed
    #[error("config IO: {0}")]
    Io(#[from] std::io::Error),
}

/// Application configuration loaded from widget-config.toml
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Daily rotation settings
    pub selection: SelectionConfig,
    /// Dot-matrix rendering settings
    pub render: RenderConfig,
    /// PokeAPI endpoints
    pub api: ApiConfig,
    /// Widget state persistence
    pub state: StateConfig,
    /// Widget face settings
    pub display: DisplayConfig,
}

/// Daily rotation configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SelectionConfig {
    /// Highest Pokédex number included in the rotation
    pub max_id: u32,
}

/// Dot-matrix rendering configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RenderConfig {
    /// Grid columns after downsampling
    pub grid_width: u32,
    /// Grid rows after downsampling
    pub grid_height: u32,
    /// Output pixels per grid cell
    pub cell_size: u32,
    /// Background colour, `#RRGGBB` or `#AARRGGBB`
    pub background: String,
    /// Dot colour, `#RRGGBB` or `#AARRGGBB`
    pub dot_color: String,
    /// Cells at or below this average brightness stay dark
    pub brightness_threshold: u8,
    /// Cells below this alpha are transparent
    pub alpha_threshold: u8,
    /// Uniform nearest-neighbour scale applied after rendering
    pub output_scale: f32,
}

/// PokeAPI endpoint configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    /// Base URL of the sprite repository; sprites live at `{base}/{id}.png`
    pub sprite_base_url: String,
    /// Base URL of the data API; `{base}/pokemon/{id}` and `{base}/pokemon-species/{id}`
    pub api_base_url: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

/// Widget state configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StateConfig {
    /// JSON file holding page indices and the last rendered Pokémon
    pub path: PathBuf,
}

/// Widget face configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DisplayConfig {
    /// Widget face width in pixels
    pub width: u32,
    /// Widget face height in pixels
    pub height: u32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            selection: SelectionConfig {
                max_id: crate::daily::MAX_ID,
            },
            render: RenderConfig {
                grid_width: 50,
                grid_height: 50,
                cell_size: 5,
                background: "#1B1B1D".to_string(),
                dot_color: "#FFFFFF".to_string(),
                brightness_threshold: 50,
                alpha_threshold: 64,
                output_scale: 1.0,
            },
            api: ApiConfig {
                sprite_base_url:
                    "https://raw.githubusercontent.com/PokeAPI/sprites/master/sprites/pokemon"
                        .to_string(),
                api_base_url: "https://pokeapi.co/api/v2".to_string(),
                timeout_secs: 15,
            },
            state: StateConfig {
                path: PathBuf::from("pokemon-widget-state.json"),
            },
            display: DisplayConfig {
                width: 300,
                height: 300,
            },
        }
    }
}

impl RenderConfig {
    /// Dot-matrix parameters described by this section.
    pub fn params(&self) -> Result<DotMatrixParams, ConfigError> {
        Ok(DotMatrixParams {
            grid_width: self.grid_width,
            grid_height: self.grid_height,
            cell_size: self.cell_size,
            background: parse_color(&self.background)?,
            dot_color: parse_color(&self.dot_color)?,
            brightness_threshold: self.brightness_threshold,
            alpha_threshold: self.alpha_threshold,
        })
    }
}

impl Config {
    /// Load configuration from specified path
    /// Falls back to default configuration if file doesn't exist or is invalid
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Self {
        match fs::read_to_string(&path) {
            Ok(contents) => match toml::from_str::<Config>(&contents) {
                Ok(config) => {
                    log::info!(
                        "Loaded configuration from {} (max id {})",
                        path.as_ref().display(),
                        config.selection.max_id
                    );
                    config
                }
                Err(e) => {
                    log::warn!("Invalid config file format: {}", e);
                    log::warn!("Using default configuration");
                    Self::default()
                }
            },
            Err(_) => {
                log::info!("No config file found, using default configuration");
                Self::default()
            }
        }
    }

    /// Save current configuration to the given path
    pub fn save_to_path<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(&path, contents)?;
        log::info!("Configuration saved to {}", path.as_ref().display());
        Ok(())
    }
}

/// Parse `#RRGGBB` (opaque) or `#AARRGGBB` into an RGBA pixel.
pub fn parse_color(text: &str) -> Result<Rgba<u8>, ConfigError> {
    let err = || ConfigError::Color(text.to_string());
    let hex = text.trim().strip_prefix('#').ok_or_else(err)?;
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(err());
    }
    let value = u32::from_str_radix(hex, 16).map_err(|_| err())?;

    let [a, r, g, b] = match hex.len() {
        6 => (value | 0xFF00_0000).to_be_bytes(),
        8 => value.to_be_bytes(),
        _ => return Err(err()),
    };
    Ok(Rgba([r, g, b, a]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.selection.max_id, 1025);
        assert_eq!(config.render.grid_width, 50);
        assert_eq!(config.render.cell_size, 5);
        assert_eq!(config.api.api_base_url, "https://pokeapi.co/api/v2");
        assert_eq!(config.render.params().unwrap(), DotMatrixParams::widget());
    }

    #[test]
    fn test_config_roundtrip() {
        let config = Config::default();
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(config.selection.max_id, parsed.selection.max_id);
        assert_eq!(config.render.background, parsed.render.background);
        assert_eq!(config.state.path, parsed.state.path);
    }

    #[test]
    fn test_save_and_load() {
        let temp_file = NamedTempFile::new().unwrap();
        let mut config = Config::default();
        config.selection.max_id = 151;
        config.render.dot_color = "#FFCB05".to_string();

        config.save_to_path(temp_file.path()).unwrap();
        let loaded = Config::load_from_path(temp_file.path());
        assert_eq!(loaded.selection.max_id, 151);
        assert_eq!(loaded.render.dot_color, "#FFCB05");
    }

    #[test]
    fn test_load_nonexistent_file() {
        let config = Config::load_from_path("/nonexistent/path");
        // Should fallback to default
        assert_eq!(config.selection.max_id, 1025);
    }

    #[test]
    fn test_load_invalid_file() {
        let temp_file = NamedTempFile::new().unwrap();
        fs::write(temp_file.path(), "[selection]\nmax_id = \"many\"\n").unwrap();
        let config = Config::load_from_path(temp_file.path());
        assert_eq!(config.selection.max_id, 1025);
    }

    #[test]
    fn test_parse_color() {
        assert_eq!(parse_color("#1B1B1D").unwrap(), Rgba([0x1B, 0x1B, 0x1D, 0xFF]));
        assert_eq!(parse_color("#55FFFFFF").unwrap(), Rgba([0xFF, 0xFF, 0xFF, 0x55]));
        assert_eq!(parse_color(" #ffffff ").unwrap(), Rgba([0xFF, 0xFF, 0xFF, 0xFF]));
        assert!(parse_color("1B1B1D").is_err());
        assert!(parse_color("#1B1B").is_err());
        assert!(parse_color("#GGGGGG").is_err());
        assert!(parse_color("#+1B1B1D").is_err());
    }
}
