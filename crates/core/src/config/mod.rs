//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (LISBOA_SW_*)
//! 2. TOML config file (`--config` or LISBOA_SW_CONFIG_FILE)
//! 3. Built-in defaults

use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use url::Url;

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (LISBOA_SW_*)
/// 2. TOML config file
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Origin the hosted application is served from.
    ///
    /// Requests to any other origin are passed through untouched.
    /// Set via LISBOA_SW_ORIGIN.
    #[serde(default = "default_origin")]
    pub origin: String,

    /// Cache generation identifier for this build.
    ///
    /// Overridden by the `version` of `build_manifest` when that is set.
    /// Set via LISBOA_SW_GENERATION.
    #[serde(default = "default_generation")]
    pub generation: String,

    /// Optional JSON build manifest (`{"version", "build", "files"}`).
    ///
    /// Set via LISBOA_SW_BUILD_MANIFEST.
    #[serde(default)]
    pub build_manifest: Option<PathBuf>,

    /// Hashed build artifact paths to pre-cache.
    #[serde(default)]
    pub build_assets: Vec<String>,

    /// Static file paths to pre-cache.
    #[serde(default)]
    pub static_files: Vec<String>,

    /// Additional paths to pre-cache.
    #[serde(default)]
    pub extra_assets: Vec<String>,

    /// Path to SQLite cache database.
    ///
    /// Set via LISBOA_SW_DB_PATH.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// User-Agent string for network requests.
    ///
    /// Set via LISBOA_SW_USER_AGENT.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Largest response body kept in the cache on a runtime miss.
    ///
    /// Larger responses are still served. Install stores every asset.
    ///
    /// Set via LISBOA_SW_MAX_BYTES.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,

    /// Deadline for a single network fetch in milliseconds.
    ///
    /// A fetch that has not answered by then is treated as offline.
    /// Set via LISBOA_SW_TIMEOUT_MS.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// RapidAPI key for the flight status lookup.
    ///
    /// Set via LISBOA_SW_RAPIDAPI_KEY. Required only for flight lookups.
    #[serde(default)]
    pub rapidapi_key: Option<String>,
}

fn default_origin() -> String {
    "http://localhost:4173".into()
}

fn default_generation() -> String {
    format!("v{}", env!("CARGO_PKG_VERSION"))
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./lisboa-sw-cache.sqlite")
}

fn default_user_agent() -> String {
    "lisboa-sw/0.1".into()
}

fn default_max_bytes() -> usize {
    5_242_880 // 5MB
}

fn default_timeout_ms() -> u64 {
    10_000
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            origin: default_origin(),
            generation: default_generation(),
            build_manifest: None,
            build_assets: Vec::new(),
            static_files: Vec::new(),
            extra_assets: Vec::new(),
            db_path: default_db_path(),
            user_agent: default_user_agent(),
            max_bytes: default_max_bytes(),
            timeout_ms: default_timeout_ms(),
            rapidapi_key: None,
        }
    }
}

impl AppConfig {
    /// Fetch deadline as Duration for use with tokio/reqwest.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Parsed application origin.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if the origin is not an http(s) URL.
    pub fn origin_url(&self) -> Result<Url, ConfigError> {
        let url = Url::parse(&self.origin)
            .map_err(|e| ConfigError::Invalid { field: "origin".into(), reason: e.to_string() })?;
        match url.scheme() {
            "http" | "https" if url.host_str().is_some() => Ok(url),
            _ => Err(ConfigError::Invalid { field: "origin".into(), reason: "must be an http(s) URL with a host".into() }),
        }
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Equivalent to `load_from(None)`.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration, reading `config_file` when given and otherwise
    /// the file named by `LISBOA_SW_CONFIG_FILE`, if set.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load_from(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        match config_file {
            Some(path) => figment = figment.merge(Toml::file(path)),
            None => {
                if let Ok(config_path) = std::env::var("LISBOA_SW_CONFIG_FILE") {
                    figment = figment.merge(Toml::file(&config_path));
                }
            }
        }

        figment = figment.merge(
            Env::prefixed("LISBOA_SW_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }

    /// Check if the RapidAPI key is available (for deferred validation).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if the key is not set.
    pub fn require_rapidapi_key(&self) -> Result<&str, ConfigError> {
        self.rapidapi_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| ConfigError::Missing {
                field: "rapidapi_key".into(),
                hint: "Set LISBOA_SW_RAPIDAPI_KEY environment variable".into(),
            })
    }
}
