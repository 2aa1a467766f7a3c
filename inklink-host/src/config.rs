//! Host configuration file
//!
//! Every section and key is optional; missing values fall back to the
//! defaults below and can be overridden from the command line.

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use inklink_core::config::InvalidConfig;
use inklink_core::TransferConfig;
use serde::Deserialize;
use thiserror::Error;

use crate::link::Endpoint;

/// Default link read timeout
pub const DEFAULT_READ_TIMEOUT_MS: u64 = 5000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid transfer settings: {0}")]
    Invalid(#[from] InvalidConfig),

    #[error("read timeout must be greater than zero")]
    ZeroTimeout,

    #[error("no endpoint configured (pass --endpoint or set [link] endpoint)")]
    MissingEndpoint,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LinkConfig {
    /// Device path or `tcp://host:port`
    pub endpoint: Option<String>,
    /// Connect, read and write timeout of `tcp://` endpoints
    ///
    /// Device nodes keep the read timeout set on the tty (`stty time`).
    pub read_timeout_ms: u64,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            read_timeout_ms: DEFAULT_READ_TIMEOUT_MS,
        }
    }
}

impl LinkConfig {
    pub fn endpoint(&self) -> Result<Endpoint, ConfigError> {
        self.endpoint
            .as_deref()
            .map(Endpoint::from)
            .ok_or(ConfigError::MissingEndpoint)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    /// True when a non-default read timeout was asked for an endpoint
    /// that cannot apply it
    pub fn ignores_read_timeout(&self, endpoint: &Endpoint) -> bool {
        matches!(endpoint, Endpoint::Device(_)) && self.read_timeout_ms != DEFAULT_READ_TIMEOUT_MS
    }
}

/// Where each plane comes from: a pattern name or a raw plane file
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImageConfig {
    pub primary: String,
    pub accent: String,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            primary: "stripes".into(),
            accent: "ramp".into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HostConfig {
    pub link: LinkConfig,
    pub transfer: TransferConfig,
    pub image: ImageConfig,
}

impl HostConfig {
    /// Read and parse a configuration file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        text.parse()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.transfer.validate()?;
        if self.link.read_timeout_ms == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(())
    }
}

impl FromStr for HostConfig {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(toml::from_str(s)?)
    }
}
