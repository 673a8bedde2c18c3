use std::path::PathBuf;
use std::time::Duration;

use eyre::Result;
use log::debug;
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub default_format: Option<String>,
    pub metadata_timeout_secs: Option<u64>,
    pub yt_dlp_path: Option<String>,
    pub skip_metadata: Option<bool>,
}

impl Config {
    /// Load config from ~/.config/vidtutor/config.toml if it exists
    pub fn load() -> Result<Self> {
        let path = config_path();
        if path.exists() {
            debug!("Loading config from {}", path.display());
            let content = std::fs::read_to_string(&path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            debug!("No config file found at {}", path.display());
            Ok(Config::default())
        }
    }

    pub fn metadata_timeout(&self) -> Duration {
        self.metadata_timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(crate::metadata::DEFAULT_TIMEOUT)
    }

    pub fn yt_dlp(&self) -> &str {
        self.yt_dlp_path.as_deref().unwrap_or("yt-dlp")
    }
}

pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from(".config"))
        .join("vidtutor")
        .join("config.toml")
}
