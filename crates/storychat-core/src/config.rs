use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use anyhow::{Result, anyhow};

pub const DEFAULT_SERVER_URL: &str = "http://localhost:8080";
pub const SERVER_ENV_VAR: &str = "STORYCHAT_SERVER";

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub server_url: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub log_file: Option<PathBuf>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::get_config_path()?)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(config_path)?;
        let config: Config = serde_json::from_str(&config_content)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::get_config_path()?)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)?;
        fs::write(config_path, config_content)?;
        Ok(())
    }

    pub fn save_server_url(url: &str) -> Result<()> {
        Self::save_server_url_to(&Self::get_config_path()?, url)
    }

    /// Updates only `server_url`; an unreadable file is left untouched
    pub fn save_server_url_to(config_path: &Path, url: &str) -> Result<()> {
        let mut config = Self::load_from(config_path)?;
        config.server_url = Some(url.to_string());
        config.save_to(config_path)
    }

    /// Server URL by precedence: explicit flag, environment, file, default
    pub fn resolve_server_url(&self, flag: Option<&str>) -> String {
        let env = std::env::var(SERVER_ENV_VAR).ok();
        self.resolve_server_url_with(flag, env.as_deref())
    }

    fn resolve_server_url_with(&self, flag: Option<&str>, env: Option<&str>) -> String {
        flag.or(env)
            .or(self.server_url.as_deref())
            .unwrap_or(DEFAULT_SERVER_URL)
            .trim_end_matches('/')
            .to_string()
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    /// Where the interactive client writes its log
    pub fn resolve_log_file(&self, flag: Option<&Path>) -> Result<PathBuf> {
        if let Some(path) = flag.or(self.log_file.as_deref()) {
            return Ok(path.to_path_buf());
        }

        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow!("Could not determine cache directory"))?;

        Ok(cache_dir.join("storychat").join("storychat.log"))
    }

    fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("storychat").join("config.json"))
    }
}
