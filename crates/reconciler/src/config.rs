//! Reconciler configuration.

use std::path::Path;
use std::time::Duration;

use polkadot_api::Polkadot;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Configuration for the reconciler and its loop.
///
/// Every key is optional when loaded from TOML:
///
/// ```toml
/// resync_interval_secs = 30
/// max_forced_requeues = 5
/// default_namespace = "default"
/// image = "parity/polkadot"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReconcilerConfig {
    /// Seconds between two full passes of the loop.
    pub resync_interval_secs: u64,
    /// Immediate re-runs allowed for one resource within a pass.
    pub max_forced_requeues: u32,
    /// Namespace given to resources declared without one.
    pub default_namespace: String,
    /// Container image repository for node workloads.
    pub image: String,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            resync_interval_secs: 30,
            max_forced_requeues: 5,
            default_namespace: "default".to_string(),
            image: "parity/polkadot".to_string(),
        }
    }
}

impl ReconcilerConfig {
    /// Parse and validate a TOML document.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` for malformed TOML, unknown keys or values
    /// rejected by [`validate`](Self::validate).
    pub fn from_toml_str(input: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(input).map_err(|e| Error::invalid_config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigLoadFailed` if the file cannot be read, otherwise as
    /// [`from_toml_str`](Self::from_toml_str).
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| Error::config_load_failed(path.display().to_string(), e.to_string()))?;
        Self::from_toml_str(&contents)
    }

    /// Check value ranges.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` for a zero resync interval, an empty image or
    /// an empty default namespace.
    pub fn validate(&self) -> Result<()> {
        if self.resync_interval_secs == 0 {
            return Err(Error::invalid_config("resync_interval_secs must be positive"));
        }
        if self.image.trim().is_empty() {
            return Err(Error::invalid_config("image must not be empty"));
        }
        if self.default_namespace.trim().is_empty() {
            return Err(Error::invalid_config("default_namespace must not be empty"));
        }
        Ok(())
    }

    pub const fn resync_interval(&self) -> Duration {
        Duration::from_secs(self.resync_interval_secs)
    }

    /// Fill in the default namespace on a resource declared without one.
    #[must_use]
    pub fn with_default_namespace(&self, mut resource: Polkadot) -> Polkadot {
        if resource.metadata.namespace.is_empty() {
            resource
                .metadata
                .namespace
                .clone_from(&self.default_namespace);
        }
        resource
    }
}
