//! Store configuration.
//!
//! Loaded from RON. The backend is picked once from this configuration at
//! startup and never switched afterwards.
//!
//! ```ron
//! StoreConfig(
//!     backend: Remote((
//!         root: 1000,
//!         timeout_ms: 2000,
//!         channel: Loopback,
//!     )),
//!     token: "8f2c0f3e-0000-0000-0000-000000000000",
//! )
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_RPC_TIMEOUT, LOCAL_CONTENT_CAPACITY, LOCAL_INO_MAX, LOCAL_INO_MIN, LOCAL_ROOT,
    REMOTE_ROOT,
};

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON parse error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("RON write error: {0}")]
    RonWrite(#[from] ron::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Which backend serves the store.
    pub backend: BackendConfig,
    /// Opaque credential handed to `initialize`.
    pub token: String,
}

impl StoreConfig {
    /// Parse a RON document.
    pub fn from_ron_str(text: &str) -> Result<Self, ConfigError> {
        let config: StoreConfig = ron::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a RON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_ron_str(&text)
    }

    /// Render as pretty RON.
    pub fn to_ron_string(&self) -> Result<String, ConfigError> {
        Ok(ron::ser::to_string_pretty(
            self,
            ron::ser::PrettyConfig::default(),
        )?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        match &self.backend {
            BackendConfig::Local(local) => local.validate(),
            BackendConfig::Remote(remote) => remote.validate(),
        }
    }
}

/// Backend selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BackendConfig {
    /// In-process node table.
    Local(LocalConfig),
    /// Admin service over RPC.
    Remote(RemoteConfig),
}

impl Default for BackendConfig {
    fn default() -> Self {
        BackendConfig::Local(LocalConfig::default())
    }
}

/// Local backend settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalConfig {
    /// Root directory identifier; must lie outside `[ino_min, ino_max]`.
    pub root: u32,
    /// First allocatable identifier.
    pub ino_min: u32,
    /// Last allocatable identifier (inclusive).
    pub ino_max: u32,
    /// Content capacity of every regular file.
    pub content_capacity: usize,
    /// Seed demonstration entries on `initialize`.
    pub seed_demo: bool,
}

impl Default for LocalConfig {
    fn default() -> Self {
        Self {
            root: LOCAL_ROOT,
            ino_min: LOCAL_INO_MIN,
            ino_max: LOCAL_INO_MAX,
            content_capacity: LOCAL_CONTENT_CAPACITY,
            seed_demo: true,
        }
    }
}

impl LocalConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ino_min == 0 || self.ino_min > self.ino_max || self.ino_max == u32::MAX {
            return Err(ConfigError::Invalid(format!(
                "identifier range [{}, {}] is empty or touches the u32 bounds",
                self.ino_min, self.ino_max
            )));
        }
        if self.root == 0 || (self.ino_min..=self.ino_max).contains(&self.root) {
            return Err(ConfigError::Invalid(format!(
                "root {} must be non-zero and outside [{}, {}]",
                self.root, self.ino_min, self.ino_max
            )));
        }
        Ok(())
    }
}

/// Remote backend settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// Root directory identifier used by the admin service.
    pub root: u32,
    /// Bound on one admin round trip, in milliseconds.
    pub timeout_ms: u64,
    /// How calls reach the admin service.
    pub channel: ChannelConfig,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            root: REMOTE_ROOT,
            timeout_ms: DEFAULT_RPC_TIMEOUT.as_millis() as u64,
            channel: ChannelConfig::default(),
        }
    }
}

impl RemoteConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.root == 0 {
            return Err(ConfigError::Invalid("remote root must be non-zero".into()));
        }
        if self.timeout_ms == 0 {
            return Err(ConfigError::Invalid("timeout_ms must be positive".into()));
        }
        Ok(())
    }
}

/// Admin channel selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChannelConfig {
    /// In-process admin service backed by a local node table.
    #[default]
    Loopback,
}
