use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default chunk cache directory, relative to the working directory.
pub const DEFAULT_CACHE_DIR: &str = "./cache";

/// Global configuration loaded from `~/.config/chunkcat/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkcatConfig {
    /// Directory for persisted chunks (`--keep-chunks`).
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,
    /// Connect timeout per request, in seconds.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    /// Optional whole-transfer timeout in seconds (None = no limit).
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default = "default_follow_redirects")]
    pub follow_redirects: bool,
    #[serde(default = "default_max_redirections")]
    pub max_redirections: u32,
    #[serde(default)]
    pub user_agent: Option<String>,
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from(DEFAULT_CACHE_DIR)
}

fn default_connect_timeout_secs() -> u64 {
    15
}

fn default_follow_redirects() -> bool {
    true
}

fn default_max_redirections() -> u32 {
    10
}

impl Default for ChunkcatConfig {
    fn default() -> Self {
        Self {
            cache_dir: default_cache_dir(),
            connect_timeout_secs: default_connect_timeout_secs(),
            timeout_secs: None,
            follow_redirects: default_follow_redirects(),
            max_redirections: default_max_redirections(),
            user_agent: None,
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("chunkcat")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from `path`, creating it with defaults if it does not exist.
pub fn load_or_init_at(path: &Path) -> Result<ChunkcatConfig> {
    if !path.exists() {
        let default_cfg = ChunkcatConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml).with_context(|| format!("write {}", path.display()))?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: ChunkcatConfig =
        toml::from_str(&data).with_context(|| format!("parse {}", path.display()))?;
    Ok(cfg)
}

/// Load configuration from the XDG config dir, creating a default file if none exists.
pub fn load_or_init() -> Result<ChunkcatConfig> {
    load_or_init_at(&config_path()?)
}
