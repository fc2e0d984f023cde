use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::paths::{config_json_path, default_database_path};

/// Hosted text-generation endpoint used when none is configured
pub const DEFAULT_INFERENCE_URL: &str = "https://api-inference.huggingface.co/models/gpt2";

const CONFIG_FILE_PATH: &str = "config.toml";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub http_proxy: String,
    #[serde(default)]
    pub https_proxy: String,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub inference: InferenceConfig,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Process-local store, lost on exit
    Memory,
    /// Local SQLite database file
    #[default]
    Sqlite,
    /// Hosted PostgREST (Supabase) database
    Rest,
}

impl fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StoreBackend::Memory => "memory",
            StoreBackend::Sqlite => "sqlite",
            StoreBackend::Rest => "rest",
        };
        f.write_str(name)
    }
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "memory" | "mem" => Ok(StoreBackend::Memory),
            "sqlite" | "sql" => Ok(StoreBackend::Sqlite),
            "rest" | "supabase" | "postgrest" => Ok(StoreBackend::Rest),
            other => Err(format!("unknown store backend: {other}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,
    #[serde(default)]
    pub database_path: Option<PathBuf>,
    /// Project URL of the hosted database, e.g. `https://xyz.supabase.co`
    #[serde(default)]
    pub rest_url: Option<String>,
    #[serde(default)]
    pub rest_key: Option<String>,
}

impl StoreConfig {
    pub fn database_path(&self) -> PathBuf {
        self.database_path
            .clone()
            .unwrap_or_else(default_database_path)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferenceConfig {
    #[serde(default = "default_inference_url")]
    pub api_base: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub max_retries: u32,
}

fn default_inference_url() -> String {
    DEFAULT_INFERENCE_URL.to_string()
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            api_base: default_inference_url(),
            api_key: None,
            max_retries: 0,
        }
    }
}

impl Config {
    /// Load from `~/.threadchat/config.json`, falling back to `./config.toml`,
    /// then apply environment overrides.
    pub fn new() -> Self {
        let mut config = Self::from_file(&config_json_path())
            .or_else(|| Self::from_file(Path::new(CONFIG_FILE_PATH)))
            .unwrap_or_default();
        config.apply_env(|key| std::env::var(key).ok());
        config
    }

    /// Parse a JSON or TOML config file; `None` if it is missing or unreadable.
    pub fn from_file(path: &Path) -> Option<Self> {
        if !path.exists() {
            return None;
        }
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                log::warn!("Failed to read config {}: {}", path.display(), err);
                return None;
            }
        };
        let parsed = if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str::<Config>(&content).map_err(|e| e.to_string())
        } else {
            toml::from_str::<Config>(&content).map_err(|e| e.to_string())
        };
        match parsed {
            Ok(config) => {
                log::debug!("Loaded config from {}", path.display());
                Some(config)
            }
            Err(err) => {
                log::warn!("Failed to parse config {}: {}", path.display(), err);
                None
            }
        }
    }

    /// Override fields from environment-style variables
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(http_proxy) = lookup("HTTP_PROXY") {
            self.http_proxy = http_proxy;
        }
        if let Some(https_proxy) = lookup("HTTPS_PROXY") {
            self.https_proxy = https_proxy;
        }
        if let Some(backend) = lookup("CHAT_STORE") {
            match backend.parse() {
                Ok(backend) => self.store.backend = backend,
                Err(err) => log::warn!("Ignoring CHAT_STORE: {}", err),
            }
        }
        if let Some(path) = lookup("CHAT_DB_PATH") {
            self.store.database_path = Some(PathBuf::from(path));
        }
        if let Some(url) = lookup("SUPABASE_URL") {
            self.store.rest_url = Some(url);
        }
        if let Some(key) = lookup("SUPABASE_KEY") {
            self.store.rest_key = Some(key);
        }
        if let Some(url) = lookup("INFERENCE_URL") {
            self.inference.api_base = url;
        }
        if let Some(key) = lookup("HUGGINGFACE_API_KEY") {
            self.inference.api_key = Some(key);
        }
        if let Some(retries) = lookup("INFERENCE_MAX_RETRIES") {
            match retries.trim().parse() {
                Ok(retries) => self.inference.max_retries = retries,
                Err(err) => log::warn!("Ignoring INFERENCE_MAX_RETRIES={}: {}", retries, err),
            }
        }
    }
}
