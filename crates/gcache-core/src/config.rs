//! Global configuration loaded from `~/.config/gcache/config.toml`.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Configuration for one managed game installation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GcacheConfig {
    /// Game installation directory entries are verified against.
    pub game_dir: PathBuf,
    /// Manifest file; when missing, `manifest.toml` next to the config file
    /// is used.
    #[serde(default)]
    pub manifest_path: Option<PathBuf>,
    /// Root for the cache tree; when missing, the XDG data dir is used.
    #[serde(default)]
    pub cache_root: Option<PathBuf>,
}

impl Default for GcacheConfig {
    fn default() -> Self {
        Self {
            game_dir: PathBuf::from("."),
            manifest_path: None,
            cache_root: None,
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("gcache")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<GcacheConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = GcacheConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: GcacheConfig = toml::from_str(&data)?;
    Ok(cfg)
}

/// Cache directory for game files: `<cache root>/cache/game`, with the XDG
/// data home as the default root.
pub fn cache_dir(cfg: &GcacheConfig) -> Result<PathBuf> {
    let root = match &cfg.cache_root {
        Some(root) => root.clone(),
        None => xdg::BaseDirectories::with_prefix("gcache")?.get_data_home(),
    };
    Ok(root.join("cache").join("game"))
}

/// Manifest path: the configured one, or `manifest.toml` next to the config
/// file.
pub fn manifest_path(cfg: &GcacheConfig) -> Result<PathBuf> {
    if let Some(path) = &cfg.manifest_path {
        return Ok(path.clone());
    }
    let config = config_path()?;
    Ok(config
        .parent()
        .map(|p| p.join("manifest.toml"))
        .unwrap_or_else(|| PathBuf::from("manifest.toml")))
}
