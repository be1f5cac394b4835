use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Recipe catalog API base URL
    #[serde(default = "default_catalog_api_url")]
    pub catalog_api_url: String,

    /// Optional request timeout for catalog calls, in seconds
    #[serde(default)]
    pub catalog_timeout_secs: Option<u64>,

    /// Directory holding the file-backed history store
    #[serde(default = "default_history_dir")]
    pub history_dir: PathBuf,

    /// Storage key the history sequence is persisted under
    #[serde(default = "default_history_key")]
    pub history_key: String,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_catalog_api_url() -> String {
    "https://www.themealdb.com/api/json/v1/1".to_string()
}

fn default_history_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_history_key() -> String {
    "recipeHistory".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    pub fn catalog_timeout(&self) -> Option<Duration> {
        self.catalog_timeout_secs.map(Duration::from_secs)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
