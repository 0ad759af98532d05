use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_PATH: &str = "config/chat.json";
pub const DEFAULT_HTTP_URL: &str = "http://localhost:8080";
pub const DEFAULT_WS_URL: &str = "ws://localhost:8080/ws";
pub const DEFAULT_DATABASE_PATH: &str = "data/client.db";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Base URL of the message store (`GET`/`POST {http_url}/messages`).
    pub http_url: String,
    pub ws_url: String,
    pub database_path: String,
    pub reconnect: ReconnectConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            http_url: DEFAULT_HTTP_URL.to_string(),
            ws_url: DEFAULT_WS_URL.to_string(),
            database_path: DEFAULT_DATABASE_PATH.to_string(),
            reconnect: ReconnectConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconnectConfig {
    pub enabled: bool,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    /// `None` retries forever.
    pub max_attempts: Option<u32>,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            initial_delay_ms: 500,
            max_delay_ms: 30_000,
            max_attempts: None,
        }
    }
}

impl ReconnectConfig {
    pub fn initial_delay(&self) -> Duration {
        Duration::from_millis(self.initial_delay_ms)
    }

    pub fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_delay_ms)
    }
}

/// Values given on the command line (or through the environment) win over
/// the config file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub http_url: Option<String>,
    pub ws_url: Option<String>,
    pub database_path: Option<String>,
    pub no_reconnect: bool,
}

impl AppConfig {
    pub fn apply(mut self, overrides: Overrides) -> Self {
        if let Some(url) = overrides.http_url {
            self.http_url = url;
        }
        if let Some(url) = overrides.ws_url {
            self.ws_url = url;
        }
        if let Some(path) = overrides.database_path {
            self.database_path = path;
        }
        if overrides.no_reconnect {
            self.reconnect.enabled = false;
        }
        self
    }
}

pub fn load_config(path: &str) -> AppConfig {
    let path = Path::new(path);
    match fs::read_to_string(path) {
        Ok(content) => match serde_json::from_str::<AppConfig>(&content) {
            Ok(config) => config,
            Err(err) => {
                log::warn!("Failed to parse config file {}: {err}", path.display());
                AppConfig::default()
            }
        },
        Err(err) => {
            log::info!(
                "Config file {} not found ({err}); using defaults",
                path.display()
            );
            AppConfig::default()
        }
    }
}
