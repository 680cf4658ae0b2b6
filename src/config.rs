// 🔧 Runtime configuration
//
// Defaults → optional JSON file ($MILKTRACK_CONFIG) → environment overrides.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_ENV: &str = "MILKTRACK_CONFIG";
pub const DB_ENV: &str = "MILKTRACK_DB";
pub const LOG_ENV: &str = "MILKTRACK_LOG";
pub const ADDR_ENV: &str = "MILKTRACK_ADDR";

pub const DEFAULT_DB_PATH: &str = "milktrack.db";
pub const DEFAULT_LOG_FILTER: &str = "info";
pub const DEFAULT_SERVER_ADDR: &str = "0.0.0.0:3000";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// SQLite file holding both ledgers
    pub db_path: PathBuf,
    /// tracing-subscriber EnvFilter directive
    pub log_filter: String,
    pub server_addr: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            server_addr: DEFAULT_SERVER_ADDR.to_string(),
        }
    }
}

impl Config {
    /// Resolve from the process environment
    pub fn load() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolve with an explicit variable lookup (tests pass a closure)
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = match lookup(CONFIG_ENV) {
            Some(path) => Self::from_file(Path::new(&path))?,
            None => Config::default(),
        };

        if let Some(db) = lookup(DB_ENV) {
            config.db_path = PathBuf::from(db);
        }
        if let Some(filter) = lookup(LOG_ENV) {
            config.log_filter = filter;
        }
        if let Some(addr) = lookup(ADDR_ENV) {
            config.server_addr = addr;
        }

        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }
}

/// Install the global tracing subscriber writing to stderr
pub fn init_logging(filter: &str) {
    let env_filter = tracing_subscriber::EnvFilter::try_new(filter)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_LOG_FILTER));

    // A second init (tests, embedding) keeps the first subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .try_init();
}
