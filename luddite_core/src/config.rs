//! Editor configuration, loaded from TOML.

use crate::error::{LudditeError, Result};
use crate::syntax::Appearance;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Buffers longer than this are highlighted and counted in the background.
pub const DEFAULT_OFFLOAD_THRESHOLD: usize = 64 * 1024;

/// Lines treated as on screen when the caller does not size the viewport.
pub const DEFAULT_VIEWPORT_LINES: usize = 120;

/// Core settings. Missing keys take their default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Palette used by the highlighter.
    pub appearance: Appearance,
    /// Base directory the renderer resolves `style.css` against.
    pub resource_dir: PathBuf,
    /// Byte length above which full-buffer work goes to the background worker.
    pub offload_threshold: usize,
    /// Lines re-highlighted around the scroll position on each edit.
    /// `None` or `0` re-highlights the whole buffer.
    pub viewport_lines: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            appearance: Appearance::default(),
            resource_dir: PathBuf::from("."),
            offload_threshold: DEFAULT_OFFLOAD_THRESHOLD,
            viewport_lines: Some(DEFAULT_VIEWPORT_LINES),
        }
    }
}

impl Config {
    /// Parses a configuration from TOML text.
    pub fn from_toml(text: &str, origin: &Path) -> Result<Self> {
        toml::from_str(text).map_err(|e| LudditeError::Config {
            path: origin.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Loads a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let config = Self::from_toml(&text, path)?;
        log::info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Loads a configuration file, falling back to defaults if it is missing or invalid.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(LudditeError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No configuration at {:?}, using defaults", path);
                Self::default()
            }
            Err(e) => {
                log::warn!("{}, using defaults", e);
                Self::default()
            }
        }
    }
}
