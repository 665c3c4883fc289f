//! YAML configuration and key loading.
//!
//! ```yaml
//! hookRelayVersion: 1
//! api: http://localhost:3030/api/flux
//! endpoints:
//! - source: GitHub
//!   keyPath: github_key
//! - source: Nexus
//!   keyPath: nexus_key
//!   registryHost: container.example.com
//! - source: GoogleContainerRegistry
//!   keyPath: gcr_key
//!   gcr:
//!     audience: https://hooks.example.com/push
//! ```
//!
//! `keyPath` is resolved against the directory holding the configuration
//! file. Key files are read as raw bytes.

use std::path::{Path, PathBuf};

use notifier::DEFAULT_API_BASE;
use serde::Deserialize;
use sources::{Endpoint, Secret, SourceKind, UnknownSource};
use thiserror::Error;

/// The only configuration format version understood.
pub const CONFIG_VERSION: u32 = 1;

/// Startup configuration could not be loaded.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("cannot read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not a configuration document.
    #[error("cannot parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// `hookRelayVersion` is missing or not [`CONFIG_VERSION`].
    #[error("not a valid config file (hookRelayVersion is {0}, expected 1)")]
    UnsupportedVersion(u32),

    /// An endpoint names a provider that does not exist.
    #[error("endpoint {index}: {unknown}")]
    UnknownSource { index: usize, unknown: UnknownSource },

    /// An endpoint's key file could not be read.
    #[error("endpoint {index}: cannot load key from {path}: {source}")]
    Key {
        index: usize,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Parsed configuration document.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default)]
    pub hook_relay_version: u32,

    /// Downstream API base URL; [`DEFAULT_API_BASE`] when absent.
    #[serde(default)]
    pub api: Option<String>,

    #[serde(default)]
    pub endpoints: Vec<EndpointConfig>,
}

/// One `endpoints` entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointConfig {
    pub source: String,
    pub key_path: PathBuf,
    #[serde(default)]
    pub registry_host: Option<String>,
    #[serde(default)]
    pub gcr: Option<GcrConfig>,
}

/// Google Container Registry push authentication.
#[derive(Debug, Clone, Deserialize)]
pub struct GcrConfig {
    pub audience: String,
}

impl Config {
    /// Parses and version-checks a configuration document.
    pub fn from_yaml(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(text)?;
        if config.hook_relay_version != CONFIG_VERSION {
            return Err(ConfigError::UnsupportedVersion(config.hook_relay_version));
        }
        Ok(config)
    }

    /// Reads and parses the configuration file at `path`.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&text)
    }

    /// Returns the downstream API base URL.
    pub fn api_base(&self) -> &str {
        self.api.as_deref().unwrap_or(DEFAULT_API_BASE)
    }

    /// Resolves every endpoint: validates its source name and reads its key
    /// relative to `base_dir`.
    ///
    /// # Errors
    ///
    /// Fails on the first unknown source or unreadable key file.
    pub fn load_endpoints(&self, base_dir: &Path) -> Result<Vec<Endpoint>, ConfigError> {
        self.endpoints
            .iter()
            .enumerate()
            .map(|(index, entry)| entry.load(index, base_dir))
            .collect()
    }
}

impl EndpointConfig {
    fn load(&self, index: usize, base_dir: &Path) -> Result<Endpoint, ConfigError> {
        let kind: SourceKind = self
            .source
            .parse()
            .map_err(|unknown| ConfigError::UnknownSource { index, unknown })?;

        let path = base_dir.join(&self.key_path);
        let key = std::fs::read(&path).map_err(|source| ConfigError::Key {
            index,
            path: path.clone(),
            source,
        })?;

        let mut endpoint = Endpoint::new(kind, Secret::new(key));
        if let Some(host) = &self.registry_host {
            endpoint = endpoint.with_registry_host(host.clone());
        }
        if let Some(gcr) = &self.gcr {
            endpoint = endpoint.with_gcr_audience(gcr.audience.clone());
        }
        Ok(endpoint)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
