use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use lumberjack::client::{DEFAULT_JOB_COUNT, DEFAULT_PUSH_COUNT, DEFAULT_SERVER_URL};

/// Configuration file structure for lumberjack.
///
/// Lets users pin a server, output format and default counts instead of
/// passing flags on every run. Command-line flags always win.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub watch: WatchConfig,

    #[serde(default)]
    pub defaults: DefaultsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ServerConfig {
    /// Treeherder instance base URL
    #[serde(default = "default_server_url")]
    pub url: String,

    /// Per-request timeout in seconds; unset means the transport default
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    /// Override the User-Agent header
    #[serde(default)]
    pub user_agent: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct WatchConfig {
    /// Seconds between polls
    #[serde(default = "default_watch_interval")]
    pub interval_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DefaultsConfig {
    #[serde(default = "default_push_count")]
    pub push_count: usize,

    #[serde(default = "default_job_count")]
    pub job_count: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            url: default_server_url(),
            timeout_secs: None,
            user_agent: None,
        }
    }
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_watch_interval(),
        }
    }
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            push_count: default_push_count(),
            job_count: default_job_count(),
        }
    }
}

fn default_server_url() -> String {
    DEFAULT_SERVER_URL.to_string()
}

fn default_watch_interval() -> u64 {
    30
}

fn default_push_count() -> usize {
    DEFAULT_PUSH_COUNT
}

fn default_job_count() -> usize {
    DEFAULT_JOB_COUNT
}

const CANDIDATES: [&str; 4] = [
    "lumberjack.toml",
    "lumberjack.json",
    "lumberjack.yaml",
    "lumberjack.yml",
];

impl Config {
    /// Load configuration.
    ///
    /// Searches in this order:
    /// 1. Specified path (must exist)
    /// 2. ./lumberjack.toml, ./lumberjack.json, ./lumberjack.yaml, ./lumberjack.yml
    /// 3. `<config dir>/lumberjack/config.toml`
    ///
    /// Returns default configuration if no file is found.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load_from_path(path);
        }

        let user_config = dirs::config_dir().map(|dir| dir.join("lumberjack").join("config.toml"));

        let found = CANDIDATES
            .iter()
            .map(|name| PathBuf::from(*name))
            .chain(user_config)
            .find(|path| path.exists());

        match found {
            Some(path) => Self::load_from_path(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load configuration from a specific file path.
    fn load_from_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        log::debug!("Loaded config from {}", path.display());

        let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or("");

        match extension {
            "toml" => toml::from_str(&contents)
                .with_context(|| format!("Failed to parse TOML config: {}", path.display())),
            "json" => serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display())),
            "yaml" | "yml" => serde_yaml::from_str(&contents)
                .with_context(|| format!("Failed to parse YAML config: {}", path.display())),
            _ => toml::from_str(&contents)
                .or_else(|_| serde_json::from_str(&contents))
                .or_else(|_| serde_yaml::from_str(&contents))
                .with_context(|| format!("Failed to parse config file: {}", path.display())),
        }
    }
}
