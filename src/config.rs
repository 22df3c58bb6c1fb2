//! # Configuration
//!
//! Runtime settings read from a JSON file. Every field is optional; missing
//! fields take the defaults below.
//!
//! ```json
//! {
//!     "world_width": 32,
//!     "atlas_path": "assets/textures/atlas.png",
//!     "light_direction": [0.3, 1.0, 0.5]
//! }
//! ```

use std::{io, path::Path};

use log::{error, info};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::engine_state::{rendering::meshing::MAX_MESH_INDICES, voxels::world::DEFAULT_WORLD_WIDTH};

/// Config file used when no path is given on the command line
pub const DEFAULT_CONFIG_PATH: &str = "config.json";

/// Errors produced while reading the config file.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config {path}: {source}")]
    Io {
        /// Config file path
        path: String,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },
    /// The file is not valid config JSON.
    #[error("failed to parse config {path}: {source}")]
    Parse {
        /// Config file path
        path: String,
        /// Underlying JSON error
        #[source]
        source: serde_json::Error,
    },
}

/// All runtime settings of the application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Side length of the block grid in cells
    pub world_width: usize,
    /// World elevation of the block layer
    pub plane_y: i32,
    /// Block definition file
    pub blocks_path: String,
    /// Block that fills the grid at startup
    pub default_block: String,
    /// Atlas image file
    pub atlas_path: String,
    /// Atlas tile width in pixels
    pub tile_width: i32,
    /// Atlas tile height in pixels
    pub tile_height: i32,
    /// Store the atlas bottom row first
    pub flip_atlas_vertically: bool,
    /// WGSL shader file
    pub shader_path: String,
    /// Window title
    pub window_title: String,
    /// Initial window width in pixels
    pub window_width: u32,
    /// Initial window height in pixels
    pub window_height: u32,
    /// Direction towards the light
    pub light_direction: [f32; 3],
    /// Ambient light colour
    pub ambient: [f32; 3],
    /// Background colour
    pub clear_color: [f32; 3],
    /// Initial camera position
    pub camera_position: [f32; 3],
    /// Camera movement speed in units per second
    pub walk_speed: f32,
    /// Degrees of rotation per pixel of mouse motion
    pub mouse_sensitivity: f32,
    /// Largest mesh the mesher will build, in indices
    pub max_mesh_indices: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            world_width: DEFAULT_WORLD_WIDTH,
            plane_y: 0,
            blocks_path: "blocks.json".to_string(),
            default_block: "Grass".to_string(),
            atlas_path: "atlas.png".to_string(),
            tile_width: 16,
            tile_height: 16,
            flip_atlas_vertically: true,
            shader_path: "assets/shaders/block_shader.wgsl".to_string(),
            window_title: "Textured Blocks".to_string(),
            window_width: 1280,
            window_height: 720,
            light_direction: [0.3, 1.0, 0.5],
            ambient: [0.3, 0.3, 0.3],
            clear_color: [0.2, 0.3, 0.3],
            camera_position: [0.0, 2.0, 5.0],
            walk_speed: 5.0,
            mouse_sensitivity: 0.12,
            max_mesh_indices: MAX_MESH_INDICES,
        }
    }
}

impl EngineConfig {
    /// Reads a config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&contents).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Parses config JSON.
    pub fn parse(contents: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(contents)
    }

    /// Reads a config file, falling back to defaults if it is missing or broken.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(config) => {
                info!("Loaded config from {}", path.display());
                config
            }
            Err(ConfigError::Io { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
                info!("No config at {}, using defaults", path.display());
                Self::default()
            }
            Err(err) => {
                error!("{err}, using defaults");
                Self::default()
            }
        }
    }

    /// Config path from the command line, the first argument after the program name.
    pub fn path_from_args(mut args: impl Iterator<Item = String>) -> String {
        args.nth(1)
            .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string())
    }
}
