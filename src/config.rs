//! Configuration handling for the benchmark service
//!
//! Manages the `mongobench.toml` configuration file.
//!
//! ## Environment Variables
//!
//! The following environment variables override config file settings:
//!
//! - `MONGOBENCH_HOST` - Bind address of the HTTP service
//! - `MONGOBENCH_PORT` - Port of the HTTP service
//! - `MONGODB_URL` - MongoDB host or seed list (only used without a connection URI)
//! - `MONGODB_USER` - MongoDB user (only used without a connection URI)
//! - `MONGODB_PWD` - MongoDB password (only used without a connection URI)
//!
//! The MongoDB variables are read by [`crate::db::credentials`] at handler
//! construction time, not here. All of them can be set in a `.env` file.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{BenchError, BenchResult};

/// Default configuration file name
pub const CONFIG_FILE_NAME: &str = "mongobench.toml";

/// Environment variable names
pub const ENV_HOST: &str = "MONGOBENCH_HOST";
pub const ENV_PORT: &str = "MONGOBENCH_PORT";
pub const ENV_DB_URL: &str = "MONGODB_URL";
pub const ENV_DB_USER: &str = "MONGODB_USER";
pub const ENV_DB_PWD: &str = "MONGODB_PWD";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub mongodb: MongoConfig,
}

/// HTTP service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// MongoDB connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoConfig {
    /// Full connection URI. When non-empty, every discrete field below is ignored.
    #[serde(default)]
    pub connection_uri: String,
    /// Replica set name applied to the connection URI
    #[serde(default)]
    pub replica_set: String,
    /// Host, `host:port`, seed list or `mongodb://` URI
    #[serde(default = "default_url")]
    pub url: String,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub password: String,
    /// Ping the server when a handler is constructed
    #[serde(default = "default_connect_eagerly")]
    pub connect_eagerly: bool,
}

fn default_url() -> String {
    "localhost:27017".to_string()
}

fn default_connect_eagerly() -> bool {
    true
}

impl Default for MongoConfig {
    fn default() -> Self {
        Self {
            connection_uri: String::new(),
            replica_set: String::new(),
            url: default_url(),
            user: String::new(),
            password: String::new(),
            connect_eagerly: default_connect_eagerly(),
        }
    }
}

impl Config {
    /// Load configuration from a file and apply environment overrides
    pub fn load(path: &Path) -> BenchResult<Self> {
        if !path.exists() {
            return Err(BenchError::Config(format!(
                "Configuration file not found: {}",
                path.display()
            )));
        }

        let content = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&content)?;
        config.apply_env_overrides();

        Ok(config)
    }

    /// Load the file if it exists, otherwise start from defaults
    pub fn load_or_default(path: &Path) -> BenchResult<Self> {
        if path.exists() {
            return Self::load(path);
        }

        tracing::info!(
            "No configuration file at {}, using defaults",
            path.display()
        );
        let mut config = Config::default();
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides to the service section
    fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var(ENV_HOST) {
            if !host.is_empty() {
                self.service.host = host;
            }
        }

        if let Ok(port_str) = std::env::var(ENV_PORT) {
            if let Ok(port) = port_str.parse::<u16>() {
                self.service.port = port;
            }
        }
    }

    /// Address the HTTP listener binds to
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.service.host, self.service.port)
    }
}
