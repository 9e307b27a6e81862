use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const API_URL_ENV: &str = "DEVFLOW_API_URL";

fn default_base_url() -> String {
    "http://localhost:8000/api".to_string()
}

fn default_n_results() -> usize {
    5
}

fn default_toast_secs() -> u64 {
    5
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub window: WindowConfig,
    #[serde(default)]
    pub notifications: NotificationConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_n_results")]
    pub n_results: usize,
    /// Transport timeout. Requests wait indefinitely when unset.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct WindowConfig {
    pub width: u32,
    pub height: u32,
    pub min_width: u32,
    pub min_height: u32,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct NotificationConfig {
    #[serde(default)]
    pub desktop: bool,
    #[serde(default = "default_toast_secs")]
    pub toast_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            base_url: default_base_url(),
            n_results: default_n_results(),
            timeout_secs: None,
        }
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        WindowConfig {
            width: 960,
            height: 720,
            min_width: 480,
            min_height: 360,
        }
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        NotificationConfig {
            desktop: false,
            toast_secs: default_toast_secs(),
        }
    }
}

impl Config {
    pub fn load() -> Self {
        let config_path = Self::get_config_path();

        let mut config = if config_path.exists() {
            match Self::read(&config_path) {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!("{:#}. Using defaults.", e);
                    Config::default()
                }
            }
        } else {
            if let Some(parent) = config_path.parent() {
                let _ = fs::create_dir_all(parent);
            }
            Config::default()
        };

        if let Ok(url) = std::env::var(API_URL_ENV) {
            config.apply_api_url_override(url);
        }

        config
    }

    pub fn read(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Error reading {}", path.display()))?;
        toml::from_str(&contents).with_context(|| format!("Error parsing {}", path.display()))
    }

    fn apply_api_url_override(&mut self, url: String) {
        let url = url.trim();
        if !url.is_empty() {
            self.api.base_url = url.to_string();
        }
    }

    pub fn get_config_path() -> PathBuf {
        if let Some(home) = std::env::var_os("HOME") {
            PathBuf::from(home).join(".config/devflow/config.toml")
        } else {
            PathBuf::from("config.toml")
        }
    }
}
