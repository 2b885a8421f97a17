//! Application configuration.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Image storage configuration.
    pub images: ImagesConfig,
    /// Blog read-side configuration.
    #[serde(default)]
    pub blog: BlogConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind to.
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Database connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Image storage configuration.
///
/// Non-Original resolutions are saved under `opened_dir`, which the
/// front-facing server is allowed to read. Original files live under
/// `protected_dir` and stay private to the backend process.
#[derive(Debug, Clone, Deserialize)]
pub struct ImagesConfig {
    /// Directory for front-end-readable image variants.
    pub opened_dir: PathBuf,
    /// Directory for backend-only original images.
    pub protected_dir: PathBuf,
    /// Group ID owning files in `opened_dir`.
    #[serde(default)]
    pub opened_group_id: Option<u32>,
    /// Group ID owning files in `protected_dir`.
    #[serde(default)]
    pub protected_group_id: Option<u32>,
    /// URL prefix images are served under.
    #[serde(default = "default_image_route")]
    pub route_prefix: String,
}

/// Blog read-side configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct BlogConfig {
    /// Number of posts per listing page.
    #[serde(default = "default_page_size")]
    pub page_size: u64,
}

impl Default for BlogConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    3000
}

const fn default_max_connections() -> u32 {
    20
}

const fn default_min_connections() -> u32 {
    2
}

fn default_image_route() -> String {
    "/img/".to_string()
}

const fn default_page_size() -> u64 {
    10
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Configuration is loaded in the following order:
    /// 1. `config/default.toml`
    /// 2. `config/{environment}.toml` (based on `SCRIBE_ENV`)
    /// 3. Environment variables with `SCRIBE_` prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        let env = std::env::var("SCRIBE_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("SCRIBE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load configuration from a specific file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix("SCRIBE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
