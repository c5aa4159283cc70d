//! Configuration for the themes manager.
//!
//! Loaded from a JSON file (defaulting to `themely.json` under the user config
//! directory) with serde defaults for every field, so a partial or absent file
//! still yields a usable configuration.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct Config {
    /// Root directory scanned for theme packages.
    pub directory: PathBuf,
    /// Application public directory served by the web server.
    pub public_dir: PathBuf,
    /// Public subdirectory (or remote URL) under which theme assets live.
    /// Asset links are created at `<public_dir>/<symlink_path>/<vendor>/<name>`.
    pub symlink_path: String,
    /// Create relative symlinks instead of absolute ones.
    pub symlink_relative: bool,
    /// Theme activated when a request selects none explicitly.
    pub fallback_theme: Option<String>,
    /// Absolute URL prefix for resolved assets. `None` yields root-relative URLs.
    pub base_url: Option<String>,
    /// Append a `?v=<content hash>` token to resolved asset URLs.
    pub version_assets: bool,
    /// Application name used by the page-title helper.
    pub app_name: String,
    pub cache: CacheConfig,
}

/// Settings for the scan cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct CacheConfig {
    pub enabled: bool,
    /// Store key the serialized theme collection is filed under.
    pub key: String,
    /// Time to live, in seconds.
    pub lifetime: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("themes"),
            public_dir: PathBuf::from("public"),
            symlink_path: "themes".to_string(),
            symlink_relative: false,
            fallback_theme: None,
            base_url: None,
            version_assets: false,
            app_name: String::new(),
            cache: CacheConfig::default(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            key: "themely".to_string(),
            lifetime: 86_400,
        }
    }
}

impl Config {
    /// Read configuration from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Load from the default location, falling back to defaults when the file
    /// does not exist.
    pub fn load_default() -> Result<Self> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Default config file location: `<user config dir>/themely/themely.json`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("themely").join("themely.json"))
    }
}
