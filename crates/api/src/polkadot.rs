//! The `Polkadot` custom resource.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ManifestError, Result};
use crate::meta::{ObjectKey, ObjectMeta};

/// API group/version of the custom resource.
pub const API_VERSION: &str = "polkadot.swisscom.com/v1alpha1";

/// Kind of the custom resource.
pub const KIND: &str = "Polkadot";

/// Default libp2p port.
pub const DEFAULT_P2P_PORT: u16 = 30333;

/// Default JSON-RPC port.
pub const DEFAULT_RPC_PORT: u16 = 9933;

/// Role of a node in the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    Validator,
    Sentry,
    SentryAndValidator,
}

impl NodeKind {
    /// Parse a declared kind. Matching is exact; anything else is `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Validator" => Some(Self::Validator),
            "Sentry" => Some(Self::Sentry),
            "SentryAndValidator" => Some(Self::SentryAndValidator),
            _ => None,
        }
    }

    /// Canonical string form.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Validator => "Validator",
            Self::Sentry => "Sentry",
            Self::SentryAndValidator => "SentryAndValidator",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declared intent for a Polkadot deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Polkadot {
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: PolkadotSpec,
}

/// Spec of a [`Polkadot`] resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolkadotSpec {
    /// Declared role. Kept as a free string: unknown values are legal and
    /// manage no workload.
    #[serde(default)]
    pub kind: String,
    #[serde(default = "default_client_version")]
    pub client_version: String,
    #[serde(default)]
    pub sentry: NodeSpec,
    #[serde(default)]
    pub validator: NodeSpec,
}

impl Default for PolkadotSpec {
    fn default() -> Self {
        Self {
            kind: String::new(),
            client_version: default_client_version(),
            sentry: NodeSpec::default(),
            validator: NodeSpec::default(),
        }
    }
}

/// Per-role node settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeSpec {
    #[serde(default = "default_replicas")]
    pub replicas: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_key: Option<String>,
    #[serde(default = "default_rpc_port")]
    pub rpc_port: u16,
    #[serde(default = "default_p2p_port")]
    pub p2p_port: u16,
}

impl Default for NodeSpec {
    fn default() -> Self {
        Self {
            replicas: default_replicas(),
            node_key: None,
            rpc_port: DEFAULT_RPC_PORT,
            p2p_port: DEFAULT_P2P_PORT,
        }
    }
}

fn default_client_version() -> String {
    "latest".to_string()
}

const fn default_replicas() -> u32 {
    1
}

const fn default_rpc_port() -> u16 {
    DEFAULT_RPC_PORT
}

const fn default_p2p_port() -> u16 {
    DEFAULT_P2P_PORT
}

impl Polkadot {
    /// Create a resource with the given role and default settings.
    pub fn new(
        namespace: impl Into<String>,
        name: impl Into<String>,
        kind: impl Into<String>,
    ) -> Self {
        Self {
            metadata: ObjectMeta::new(namespace, name),
            spec: PolkadotSpec {
                kind: kind.into(),
                ..PolkadotSpec::default()
            },
        }
    }

    /// Set the client version.
    #[must_use]
    pub fn with_client_version(mut self, version: impl Into<String>) -> Self {
        self.spec.client_version = version.into();
        self
    }

    /// Set the number of sentry replicas.
    #[must_use]
    pub fn with_sentry_replicas(mut self, replicas: u32) -> Self {
        self.spec.sentry.replicas = replicas;
        self
    }

    /// Set the cluster-assigned uid.
    #[must_use]
    pub fn with_uid(mut self, uid: impl Into<String>) -> Self {
        self.metadata.uid = Some(uid.into());
        self
    }

    /// Parse a manifest from YAML.
    ///
    /// # Errors
    ///
    /// Returns `YamlParseFailed` for malformed input and `MissingField` when
    /// `metadata.name` is empty.
    pub fn from_yaml_str(input: &str) -> Result<Self> {
        serde_yaml::from_str::<Self>(input)
            .map_err(|e| ManifestError::yaml_parse_failed(e.to_string()))
            .and_then(Self::validated)
    }

    /// Parse a manifest from JSON.
    ///
    /// # Errors
    ///
    /// Returns `JsonParseFailed` for malformed input and `MissingField` when
    /// `metadata.name` is empty.
    pub fn from_json_str(input: &str) -> Result<Self> {
        serde_json::from_str::<Self>(input)
            .map_err(|e| ManifestError::json_parse_failed(e.to_string()))
            .and_then(Self::validated)
    }

    fn validated(self) -> Result<Self> {
        if self.metadata.name.trim().is_empty() {
            return Err(ManifestError::missing_field("metadata.name"));
        }
        Ok(self)
    }

    /// Parsed role, `None` for unrecognised values.
    pub fn node_kind(&self) -> Option<NodeKind> {
        NodeKind::parse(&self.spec.kind)
    }

    /// Key of this resource.
    pub fn key(&self) -> ObjectKey {
        self.metadata.key()
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    pub fn namespace(&self) -> &str {
        &self.metadata.namespace
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::expect_used)]
    #![allow(clippy::panic)]

    use super::*;

    #[test]
    fn test_node_kind_parse_is_exact() {
        assert_eq!(NodeKind::parse("Sentry"), Some(NodeKind::Sentry));
        assert_eq!(
            NodeKind::parse("SentryAndValidator"),
            Some(NodeKind::SentryAndValidator)
        );
        assert_eq!(NodeKind::parse("sentry"), None);
        assert_eq!(NodeKind::parse(""), None);
    }

    #[test]
    fn test_yaml_manifest_fills_defaults() {
        let resource = Polkadot::from_yaml_str(
            "metadata:\n  name: alice\nspec:\n  kind: Sentry\n  sentry:\n    replicas: 3\n",
        )
        .unwrap();

        assert_eq!(resource.spec.client_version, "latest");
        assert_eq!(resource.spec.sentry.replicas, 3);
        assert_eq!(resource.spec.sentry.p2p_port, DEFAULT_P2P_PORT);
        assert_eq!(resource.spec.validator.replicas, 1);
        assert_eq!(resource.namespace(), "");
    }

    #[test]
    fn test_manifest_without_name_is_rejected() {
        let result = Polkadot::from_json_str(r#"{"metadata":{"name":""},"spec":{}}"#);
        assert_eq!(result, Err(ManifestError::missing_field("metadata.name")));
    }

    #[test]
    fn test_malformed_yaml_is_reported() {
        let result = Polkadot::from_yaml_str("metadata: [");
        assert!(matches!(result, Err(ManifestError::YamlParseFailed { .. })));
    }
}
