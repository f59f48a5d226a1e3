use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// libcurl transfer settings (optional `[curl]` section in config.toml).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurlConfig {
    /// Connect timeout in seconds.
    pub connect_timeout_secs: u64,
    /// Abort if the transfer stays below this many bytes/sec for `low_speed_time_secs`.
    pub low_speed_limit: u32,
    pub low_speed_time_secs: u64,
    /// Maximum number of HTTP redirects to follow.
    pub max_redirections: u32,
    /// Optional User-Agent header; libcurl sends none when unset.
    pub user_agent: Option<String>,
}

impl Default for CurlConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 30,
            low_speed_limit: 1024,
            low_speed_time_secs: 60,
            max_redirections: 10,
            user_agent: None,
        }
    }
}

/// Global configuration loaded from `~/.config/dlc/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DlcConfig {
    /// Never let one transfer's recorded fraction go below the highest it has
    /// reported. Off by default: progress values are applied as received.
    pub clamp_per_key: bool,
    /// Directory downloads land in when none is given (None = working directory).
    pub download_dir: Option<PathBuf>,
    pub curl: CurlConfig,
}

impl Default for DlcConfig {
    fn default() -> Self {
        Self {
            clamp_per_key: false,
            download_dir: None,
            curl: CurlConfig::default(),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("dlc")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<DlcConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = DlcConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
    let cfg: DlcConfig =
        toml::from_str(&data).with_context(|| format!("parse {}", path.display()))?;
    Ok(cfg)
}
