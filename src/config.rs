//! Configuration System
//!
//! Provides hierarchical configuration loading from:
//! - config.toml (default configuration)
//! - config.local.toml (git-ignored local overrides)
//! - Environment variables (TOPOSTORE_* prefix)
//!
//! ## Example
//!
//! ```toml
//! # config.toml
//! [database]
//! dsn = "Driver={PostgreSQL};Server=db;Database=uppl"
//! username = "topostore"
//!
//! [bulk]
//! max_rep_ct = 512
//! ```
//!
//! Environment variable overrides:
//! ```bash
//! TOPOSTORE_DATABASE__DSN="Driver={PostgreSQL};Server=standby"
//! TOPOSTORE_BULK__MAX_REP_CT=128
//! ```

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration struct
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    #[serde(default)]
    pub bulk: BulkConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Connection settings for the SQL execution backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Driver connection string
    pub dsn: String,

    #[serde(default)]
    pub username: String,

    #[serde(default)]
    pub password: String,

    /// Seconds to wait for a connection before reporting an access error
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

/// Bulk-read settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkConfig {
    /// Cap on rows returned by one bulk/sibling batch
    #[serde(default = "default_max_rep_ct")]
    pub max_rep_ct: u32,
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON-structured logs instead of plain text
    #[serde(default)]
    pub json: bool,

    /// Log file path; stdout when unset
    #[serde(default)]
    pub file: Option<PathBuf>,
}

fn default_connect_timeout() -> u64 {
    30
}

fn default_max_rep_ct() -> u32 {
    512
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Config {
            database: DatabaseConfig::default(),
            bulk: BulkConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        DatabaseConfig {
            dsn: String::new(),
            username: String::new(),
            password: String::new(),
            connect_timeout_secs: default_connect_timeout(),
        }
    }
}

impl Default for BulkConfig {
    fn default() -> Self {
        BulkConfig { max_rep_ct: default_max_rep_ct() }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig { level: default_log_level(), json: false, file: None }
    }
}

impl Config {
    /// Load configuration from files and environment.
    pub fn load() -> Result<Self, figment::Error> {
        Figment::new()
            .merge(Toml::file("config.toml"))
            .merge(Toml::file("config.local.toml"))
            .merge(Env::prefixed("TOPOSTORE_").split("__"))
            .extract()
    }

    /// Load from an explicit file path plus environment overrides.
    pub fn load_from(path: &std::path::Path) -> Result<Self, figment::Error> {
        Figment::new()
            .merge(Toml::file(path))
            .merge(Env::prefixed("TOPOSTORE_").split("__"))
            .extract()
    }
}
