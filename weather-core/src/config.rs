use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::{
    dispatch::{DEFAULT_BATCH_DEADLINE, DEFAULT_REQUEST_TIMEOUT, DEFAULT_WORKERS, DispatchOptions},
    provider::openweather::DEFAULT_BASE_URL,
};

/// Environment variable that takes precedence over the stored API key.
pub const API_KEY_ENV: &str = "OPENWEATHER_API_KEY";

pub const DEFAULT_LOG_FILE: &str = "Weather File.txt";

pub const DEFAULT_LOCATIONS: &[&str] = &[
    "Faridabad",
    "Jammu and kashmir",
    "Delhi",
    "Punjab",
    "Himachal Pradesh",
    "Rajasthan",
    "WRONG",
];

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// locations = ["Delhi", "Punjab"]
/// log_file = "Weather File.txt"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Locations queried on every run, in submission order.
    pub locations: Vec<String>,

    /// Batch log; relative paths resolve against the working directory.
    pub log_file: PathBuf,

    pub base_url: String,

    /// Size of the fetch pool.
    pub workers: usize,

    pub request_timeout_secs: u64,

    pub batch_deadline_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            locations: DEFAULT_LOCATIONS.iter().map(|s| s.to_string()).collect(),
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
            base_url: DEFAULT_BASE_URL.to_string(),
            workers: DEFAULT_WORKERS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT.as_secs(),
            batch_deadline_secs: DEFAULT_BATCH_DEADLINE.as_secs(),
        }
    }
}

impl Config {
    /// Load config from `path`, or return defaults if it doesn't exist yet.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, use defaults.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to `path`, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weather-task", "weather-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// API key from the environment, falling back to the stored one.
    pub fn api_key(&self) -> Result<String> {
        self.api_key_with_env(std::env::var(API_KEY_ENV).ok())
    }

    fn api_key_with_env(&self, env_key: Option<String>) -> Result<String> {
        env_key
            .filter(|k| !k.trim().is_empty())
            .or_else(|| self.api_key.clone().filter(|k| !k.trim().is_empty()))
            .ok_or_else(|| {
                anyhow!(
                    "No OpenWeather API key configured.\n\
                     Hint: run `weather configure` or set {API_KEY_ENV}."
                )
            })
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.api_key = Some(api_key);
    }

    pub fn dispatch_options(&self) -> DispatchOptions {
        DispatchOptions {
            workers: self.workers.max(1),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            batch_deadline: Duration::from_secs(self.batch_deadline_secs),
        }
    }
}
