//! Error types for the reconciler crate.

use polkadot_api::ObjectKey;
use thiserror::Error;

/// Result type alias for reconciler operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Reconciler error types.
///
/// Client and ownership failures are wrapped as-is so callers can match on
/// the exact value the collaborator produced.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("cluster client error: {0}")]
    Client(#[from] ClientError),

    #[error("ownership error: {0}")]
    Ownership(#[from] OwnershipError),

    #[error("invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error("failed to load configuration '{path}': {reason}")]
    ConfigLoadFailed { path: String, reason: String },

    #[error("resource provider failed: {reason}")]
    ProviderFailed { reason: String },
}

impl Error {
    /// Create an invalid config error.
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }

    /// Create a config load error.
    pub fn config_load_failed(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ConfigLoadFailed {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a provider error.
    pub fn provider_failed(reason: impl Into<String>) -> Self {
        Self::ProviderFailed {
            reason: reason.into(),
        }
    }
}

/// Errors returned by a [`WorkloadClient`](crate::client::WorkloadClient).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClientError {
    #[error("statefulset '{key}' not found")]
    NotFound { key: ObjectKey },

    #[error("statefulset '{key}' already exists")]
    AlreadyExists { key: ObjectKey },

    #[error("conflict on statefulset '{key}': resource version {sent:?} is stale (current {current:?})")]
    Conflict {
        key: ObjectKey,
        sent: Option<String>,
        current: Option<String>,
    },

    #[error("{operation} failed: {reason}")]
    Transport { operation: String, reason: String },
}

impl ClientError {
    /// Create a not found error.
    pub const fn not_found(key: ObjectKey) -> Self {
        Self::NotFound { key }
    }

    /// Create a transport error.
    pub fn transport(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Transport {
            operation: operation.into(),
            reason: reason.into(),
        }
    }

    /// Whether this error only means the object does not exist.
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Errors raised while linking a workload to its owning resource.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OwnershipError {
    #[error("owner '{owner}' has no uid yet")]
    MissingUid { owner: ObjectKey },

    #[error("'{object}' is already controlled by '{controller}'")]
    AlreadyOwned { object: ObjectKey, controller: String },
}
