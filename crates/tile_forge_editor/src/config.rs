//! Editor configuration and its config-file save/load

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tile_forge_core::DraftDefaults;

const CONFIG_FILE: &str = "editor_config.json";

/// Tilesets available in the palette, in cycling order
pub const DEFAULT_TILESETS: [&str; 9] = [
    "terrain_tiles_v2.1",
    "stone_tiles_v2.1",
    "tiles-all-32x32",
    "assets-all",
    "water_and_island_tiles_v2.1",
    "fence_tiles",
    "1_Terrains_and_Fences_32x32",
    "7_Villas_32x32",
    "17_Garden_32x32",
];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),
    #[error("Parse error: {0}")]
    ParseError(String),
    #[error("Serialize error: {0}")]
    SerializeError(String),
    #[error("Could not determine config directory")]
    NoConfigDir,
}

/// Tunables for an editing session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Tile edge length in pixels
    pub tile_size: u32,
    /// Maximum number of history snapshots kept
    pub max_history: usize,
    /// Size of a freshly created map, in tiles
    pub default_width: u32,
    pub default_height: u32,
    pub min_zoom: f32,
    pub max_zoom: f32,
    pub initial_zoom: f32,
    /// Zoom change per pixel of wheel delta
    pub wheel_zoom_factor: f32,
    /// Wheel delta simulated by the zoom in/out shortcuts
    pub key_zoom_step: f32,
    /// Alpha above which a sampled tileset pixel counts as visible
    pub alpha_threshold: u8,
    /// Sample points per axis inside each tileset cell
    pub samples_per_axis: u32,
    pub default_tileset: String,
    pub tilesets: Vec<String>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            tile_size: 32,
            max_history: 80,
            default_width: 80,
            default_height: 45,
            min_zoom: 0.5,
            max_zoom: 2.2,
            initial_zoom: 1.0,
            wheel_zoom_factor: 0.0012,
            key_zoom_step: 120.0,
            alpha_threshold: 8,
            samples_per_axis: 4,
            default_tileset: DEFAULT_TILESETS[0].to_string(),
            tilesets: DEFAULT_TILESETS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl EditorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the history capacity (at least 1)
    pub fn with_max_history(mut self, max_history: usize) -> Self {
        self.max_history = max_history.max(1);
        self
    }

    /// Set the allowed zoom range; the initial zoom is clamped into it
    pub fn with_zoom_range(mut self, min_zoom: f32, max_zoom: f32) -> Self {
        self.min_zoom = min_zoom.min(max_zoom);
        self.max_zoom = max_zoom.max(min_zoom);
        self.initial_zoom = self.initial_zoom.clamp(self.min_zoom, self.max_zoom);
        self
    }

    /// Set the size of newly created maps
    pub fn with_default_size(mut self, width: u32, height: u32) -> Self {
        self.default_width = width;
        self.default_height = height;
        self
    }

    pub fn with_tile_size(mut self, tile_size: u32) -> Self {
        self.tile_size = tile_size;
        self
    }

    /// Replace the tileset list; the first entry becomes the default tileset
    pub fn with_tilesets<I, S>(mut self, tilesets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tilesets = tilesets.into_iter().map(Into::into).collect();
        if let Some(first) = self.tilesets.first() {
            self.default_tileset = first.clone();
        }
        self
    }

    /// Fallbacks for decoding stored drafts
    pub fn draft_defaults(&self) -> DraftDefaults {
        DraftDefaults {
            width: self.default_width,
            height: self.default_height,
            tile_size: self.tile_size,
            tileset_key: self.default_tileset.clone(),
        }
    }

    /// Get the config directory path for the editor
    pub fn config_dir() -> Option<PathBuf> {
        ProjectDirs::from("com", "tile_forge", "tile_forge")
            .map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|dir| dir.join(CONFIG_FILE))
    }

    /// Load config from the user config directory, returning defaults if not found
    pub fn load() -> Self {
        let loaded = Self::config_path()
            .ok_or(ConfigError::NoConfigDir)
            .and_then(|path| Self::load_from(&path));
        match loaded {
            Ok(config) => config,
            Err(e) => {
                bevy::log::warn!("Could not load editor config: {}. Using defaults.", e);
                Self::default()
            }
        }
    }

    /// Load config from a specific file; a missing file yields defaults
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;

        let mut config: Self =
            serde_json::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.sanitize();
        Ok(config)
    }

    /// Save config to the user config directory
    pub fn save(&self) -> Result<(), ConfigError> {
        let dir = Self::config_dir().ok_or(ConfigError::NoConfigDir)?;
        self.save_in(&dir)
    }

    /// Save config as the config file inside `dir`, creating the directory if needed
    pub fn save_in(&self, dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(dir).map_err(|e| ConfigError::IoError(e.to_string()))?;
        self.save_to(&dir.join(CONFIG_FILE))
    }

    /// Save config to a specific file
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        std::fs::write(path, content).map_err(|e| ConfigError::IoError(e.to_string()))?;

        bevy::log::info!("Saved editor config to {:?}", path);
        Ok(())
    }

    /// Repair values a hand-edited file could break
    fn sanitize(&mut self) {
        let defaults = Self::default();
        if self.tile_size == 0 {
            self.tile_size = defaults.tile_size;
        }
        if self.default_width == 0 || self.default_height == 0 {
            self.default_width = defaults.default_width;
            self.default_height = defaults.default_height;
        }
        self.max_history = self.max_history.max(1);
        self.samples_per_axis = self.samples_per_axis.max(1);
        if !(self.min_zoom > 0.0 && self.min_zoom <= self.max_zoom) {
            self.min_zoom = defaults.min_zoom;
            self.max_zoom = defaults.max_zoom;
        }
        self.initial_zoom = self.initial_zoom.clamp(self.min_zoom, self.max_zoom);
        if self.tilesets.is_empty() {
            self.tilesets = defaults.tilesets;
        }
        if self.default_tileset.is_empty() {
            self.default_tileset = self.tilesets[0].clone();
        }
    }
}
