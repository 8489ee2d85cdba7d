//! Configuration loading and representation.
//!
//! Values come from the process environment. Parsing goes through a lookup
//! closure so tests never have to mutate the environment.

use std::time::Duration;

use reqwest::Url;
use thiserror::Error;

use entsync_core::LevelId;
use entsync_levels::Level;

pub const ENV_BASE_URL: &str = "ENTSYNC_BASE_URL";
pub const ENV_DIRECTORY: &str = "ENTSYNC_DIRECTORY";
pub const ENV_TIMEOUT_SECS: &str = "ENTSYNC_TIMEOUT_SECS";

pub const DEFAULT_BASE_URL: &str = "https://sso-test.onadvantagecs.com";
pub const DEFAULT_DIRECTORY: &str = "acsssodemo.onmicrosoft.com";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Path of the entitlements resource, relative to the tenant's API root.
pub const ENTITLEMENTS_PATH: &str = "me/entitlements";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid base url {value:?}: {reason}")]
    InvalidBaseUrl { value: String, reason: String },

    #[error("invalid directory {0:?}: must be non-empty and contain no '/'")]
    InvalidDirectory(String),

    #[error("invalid timeout {0:?}: expected a positive number of seconds")]
    InvalidTimeout(String),

    #[error("invalid level seed entry {0:?}: expected <id>:<name>")]
    InvalidLevelSeed(String),
}

/// Where and how to reach the entitlements API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntitlementsConfig {
    pub base_url: String,
    /// Tenant/directory identifier embedded in the API path.
    pub directory: String,
    pub timeout: Duration,
}

impl Default for EntitlementsConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            directory: DEFAULT_DIRECTORY.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl EntitlementsConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let base_url = lookup(ENV_BASE_URL)
            .filter(|v| !v.trim().is_empty())
            .unwrap_or(defaults.base_url);
        let directory = lookup(ENV_DIRECTORY)
            .filter(|v| !v.trim().is_empty())
            .unwrap_or(defaults.directory);
        let timeout = match lookup(ENV_TIMEOUT_SECS) {
            Some(raw) => parse_timeout(&raw)?,
            None => defaults.timeout,
        };

        let config = Self {
            base_url: base_url.trim().to_string(),
            directory: directory.trim().to_string(),
            timeout,
        };
        config.entitlements_url()?;
        Ok(config)
    }

    /// `{base_url}/api/{directory}/`
    pub fn api_root(&self) -> Result<Url, ConfigError> {
        if self.directory.is_empty() || self.directory.contains('/') {
            return Err(ConfigError::InvalidDirectory(self.directory.clone()));
        }

        let raw = format!("{}/api/{}/", self.base_url.trim_end_matches('/'), self.directory);
        let url = Url::parse(&raw).map_err(|e| ConfigError::InvalidBaseUrl {
            value: self.base_url.clone(),
            reason: e.to_string(),
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidBaseUrl {
                value: self.base_url.clone(),
                reason: format!("unsupported scheme {}", url.scheme()),
            });
        }

        Ok(url)
    }

    /// `{base_url}/api/{directory}/me/entitlements`
    pub fn entitlements_url(&self) -> Result<Url, ConfigError> {
        let root = self.api_root()?;
        root.join(ENTITLEMENTS_PATH).map_err(|e| ConfigError::InvalidBaseUrl {
            value: self.base_url.clone(),
            reason: e.to_string(),
        })
    }
}

fn parse_timeout(raw: &str) -> Result<Duration, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(ConfigError::InvalidTimeout(raw.to_string())),
    }
}

/// Parse a level catalog of the form `1:gold,2:silver`.
pub fn parse_level_seed(raw: &str) -> Result<Vec<Level>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let (id, name) = entry
                .split_once(':')
                .ok_or_else(|| ConfigError::InvalidLevelSeed(entry.to_string()))?;
            let id: LevelId = id
                .parse()
                .map_err(|_| ConfigError::InvalidLevelSeed(entry.to_string()))?;
            let name = name.trim();
            if name.is_empty() {
                return Err(ConfigError::InvalidLevelSeed(entry.to_string()));
            }
            Ok(Level::new(id, name))
        })
        .collect()
}
