//! Session configuration, loaded from TOML.
//!
//! Every section has defaults, so an empty file (or no file) is a valid
//! configuration for an 800x600 client.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::control::{KeyMap, NavigationConfig, RuneConfig};
use crate::kernel::time::Pacing;
use crate::vision::arrows::DEFAULT_PANEL;
use crate::vision::{GlyphThresholds, Palette, Position, Region};

/// Overrides `window.target` when set.
pub const WINDOW_ENV: &str = "RUNEWALKER_WINDOW";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub window: WindowConfig,
    pub palette: Palette,
    pub regions: RegionsConfig,
    pub decoder: GlyphThresholds,
    pub navigation: NavigationConfig,
    pub pacing: Pacing,
    pub keys: KeyMap,
    pub rune: RuneConfig,
    pub session: SessionConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Application name or window title of the game client.
    pub target: String,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self { target: "MapleStory".into() }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RegionsConfig {
    /// Mini-map crop. Positions reported by the locator are relative to it.
    pub overview: Region,
    pub captcha: Region,
}

impl Default for RegionsConfig {
    fn default() -> Self {
        Self {
            overview: Region::new(5, 60, 175, 70),
            captcha: DEFAULT_PANEL,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Home position on the overview panel the pilot returns to.
    pub anchor: Position,
    pub patrol_interval_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            anchor: Position::new(97.0, 32.5),
            patrol_interval_ms: 500,
        }
    }
}

impl Config {
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_toml_str(&raw)?;
        config.apply_env();
        Ok(config)
    }

    /// Explicit path: must load. No path: `runewalker.toml` in the working
    /// directory if present, defaults otherwise.
    pub fn resolve(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let fallback = Path::new("runewalker.toml");
                if fallback.exists() {
                    Self::load(fallback)
                } else {
                    let mut config = Self::default();
                    config.apply_env();
                    Ok(config)
                }
            }
        }
    }

    fn apply_env(&mut self) {
        if let Ok(v) = std::env::var(WINDOW_ENV) {
            if !v.trim().is_empty() {
                self.window.target = v;
            }
        }
    }
}
