//! Process configuration for the API binary.

use std::net::SocketAddr;

use thiserror::Error;

use entsync_infra::config::{parse_level_seed, ConfigError, EntitlementsConfig};
use entsync_levels::Level;

pub const ENV_BIND_ADDR: &str = "ENTSYNC_BIND_ADDR";
pub const ENV_LEVELS: &str = "ENTSYNC_LEVELS";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

#[derive(Debug, Error)]
pub enum ApiConfigError {
    #[error("invalid bind address {0:?}")]
    InvalidBindAddr(String),

    #[error(transparent)]
    Entitlements(#[from] ConfigError),
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub bind_addr: SocketAddr,
    pub entitlements: EntitlementsConfig,
    /// Level catalog loaded into the in-memory level store at startup.
    pub levels: Vec<Level>,
}

impl ApiConfig {
    pub fn from_env() -> Result<Self, ApiConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ApiConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw_addr = lookup(ENV_BIND_ADDR).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = raw_addr
            .trim()
            .parse()
            .map_err(|_| ApiConfigError::InvalidBindAddr(raw_addr.clone()))?;

        let levels = match lookup(ENV_LEVELS) {
            Some(raw) => parse_level_seed(&raw)?,
            None => Vec::new(),
        };

        Ok(Self {
            bind_addr,
            entitlements: EntitlementsConfig::from_lookup(&lookup)?,
            levels,
        })
    }
}
