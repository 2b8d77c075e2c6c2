use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Media resolver parameters (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Upper bound in seconds for fetching and scanning one episode page.
    pub timeout_secs: u64,
    /// User-Agent sent with page requests.
    pub user_agent: String,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 15,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36"
                .to_string(),
        }
    }
}

impl ResolverConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

/// Media transfer parameters (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferConfig {
    pub connect_timeout_secs: u64,
    /// Abort when the rate stays below this many bytes/sec for `low_speed_time_secs`.
    pub low_speed_limit_bytes: u32,
    pub low_speed_time_secs: u64,
    /// Hard ceiling for a single transfer.
    pub timeout_secs: u64,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 30,
            low_speed_limit_bytes: 1024,
            low_speed_time_secs: 60,
            timeout_secs: 3600,
        }
    }
}

/// Global configuration loaded from `~/.config/episodl/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpisodlConfig {
    /// Root directory for downloaded media (`<root>/<title>/Season N/...`).
    pub storage_root: PathBuf,
    /// Directory receiving `downloads_<job id>.json` snapshots.
    pub snapshot_dir: PathBuf,
    /// Maximum number of episode units executing at once across a job.
    pub concurrency_limit: usize,
    /// Number of episodes flushed to the job state at a time.
    pub batch_size: usize,
    /// Listen address for `episodl serve`.
    pub bind: String,
    #[serde(default)]
    pub resolver: Option<ResolverConfig>,
    #[serde(default)]
    pub transfer: Option<TransferConfig>,
}

impl Default for EpisodlConfig {
    fn default() -> Self {
        Self {
            storage_root: PathBuf::from("data"),
            snapshot_dir: PathBuf::from("."),
            concurrency_limit: 1,
            batch_size: 5,
            bind: "0.0.0.0:8000".to_string(),
            resolver: None,
            transfer: None,
        }
    }
}

impl EpisodlConfig {
    /// Resolver section, or built-in defaults if the section is missing.
    pub fn resolver_or_default(&self) -> ResolverConfig {
        self.resolver.clone().unwrap_or_default()
    }

    /// Transfer section, or built-in defaults if the section is missing.
    pub fn transfer_or_default(&self) -> TransferConfig {
        self.transfer.clone().unwrap_or_default()
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("episodl")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<EpisodlConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = EpisodlConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: EpisodlConfig = toml::from_str(&data)?;
    Ok(cfg)
}
