use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid engine host '{0}'")]
    InvalidHost(String),
    #[error("Invalid request timeout '{0}'")]
    InvalidTimeout(String),
}

#[derive(Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub engine: Engine,
}

/// Connection settings for the remote engine API
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Engine {
    /// Engine address, `tcp://host:port`, `http(s)://host:port` or `host:port`
    #[serde(default = "Engine::default_host")]
    pub host: String,
    /// API version used as path prefix, e.g. "1.43"
    /// Requests are sent unversioned when not set
    #[serde(default)]
    pub api_version: Option<String>,
    /// Per-request timeout in seconds
    #[serde(default = "Engine::default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for Engine {
    fn default() -> Self {
        Self {
            host: Self::default_host(),
            api_version: None,
            timeout_secs: Self::default_timeout_secs(),
        }
    }
}

impl Engine {
    const DEFAULT_HOST: &'static str = "tcp://127.0.0.1:2375";
    const DEFAULT_TIMEOUT_SECS: u64 = 30;

    fn default_host() -> String {
        Self::DEFAULT_HOST.to_string()
    }

    fn default_timeout_secs() -> u64 {
        Self::DEFAULT_TIMEOUT_SECS
    }

    /// Converts `host` to an HTTP base URL without trailing slash
    pub fn base_url(&self) -> Result<String, ConfigError> {
        let host = self.host.trim();

        let (scheme, address) = if let Some(address) = host.strip_prefix("tcp://") {
            ("http", address)
        } else if let Some(address) = host.strip_prefix("http://") {
            ("http", address)
        } else if let Some(address) = host.strip_prefix("https://") {
            ("https", address)
        } else if host.contains("://") {
            return Err(ConfigError::InvalidHost(self.host.clone()));
        } else {
            ("http", host)
        };

        let address = address.trim_end_matches('/');

        if address.is_empty() || address.contains('/') {
            return Err(ConfigError::InvalidHost(self.host.clone()));
        }

        Ok(format!("{scheme}://{address}"))
    }
}

impl Config {
    const DEFAULT_CONFIG_PATH: &'static str = "dockside.toml";

    pub const HOST_ENV: &'static str = "DOCKSIDE_HOST";
    pub const API_VERSION_ENV: &'static str = "DOCKSIDE_API_VERSION";
    pub const TIMEOUT_ENV: &'static str = "DOCKSIDE_TIMEOUT_SECS";

    /// Reads config from `path`, or from `dockside.toml` when no path is given
    pub fn new(path: Option<&str>) -> Result<Self, ConfigError> {
        let path = path.unwrap_or(Self::DEFAULT_CONFIG_PATH);

        let config = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_string(),
            source,
        })?;

        let toml_data: Config = toml::from_str(&config)?;

        Ok(toml_data)
    }

    /// Same as [`Config::new`], but an absent default config file yields
    /// the default config. An explicitly passed path must exist.
    pub fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        Self::load_from(path, Self::DEFAULT_CONFIG_PATH)
    }

    fn load_from(path: Option<&str>, default_path: &str) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::new(Some(path)),
            None if Path::new(default_path).exists() => Self::new(Some(default_path)),
            None => {
                log::debug!("No {default_path} found, using default engine settings");

                Ok(Self::default())
            }
        }
    }

    /// Overrides engine settings with `DOCKSIDE_*` process environment variables
    pub fn apply_system_env(&mut self) -> Result<(), ConfigError> {
        self.apply_env(|key| std::env::var(key).ok())
    }

    /// Overrides engine settings with values returned by `lookup`
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup(Self::HOST_ENV).filter(|value| !value.trim().is_empty()) {
            log::debug!("Engine host overridden by {}", Self::HOST_ENV);

            self.engine.host = host;
        }

        if let Some(api_version) =
            lookup(Self::API_VERSION_ENV).filter(|value| !value.trim().is_empty())
        {
            self.engine.api_version = Some(api_version.trim().to_string());
        }

        if let Some(timeout) = lookup(Self::TIMEOUT_ENV).filter(|value| !value.trim().is_empty()) {
            self.engine.timeout_secs = timeout
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidTimeout(timeout.clone()))?;
        }

        Ok(())
    }
}
