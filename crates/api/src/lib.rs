//! Resource types for the Polkadot operator.
//!
//! Two families of objects live here:
//!
//! - **Polkadot**: the user-authored custom resource declaring a node's role
//!   (`Validator`, `Sentry`, `SentryAndValidator`) and its client settings
//! - **StatefulSet**: the managed workload realising one role in the cluster
//!
//! Both share [`ObjectMeta`], which carries the identity (`namespace/name`,
//! `uid`), the optimistic-concurrency `resource_version`, labels and owner
//! references.
//!
//! # Example
//!
//! ```
//! use polkadot_api::{NodeKind, Polkadot};
//!
//! let manifest = r#"
//! metadata:
//!   name: alice
//!   namespace: kusama
//! spec:
//!   kind: Validator
//!   clientVersion: v0.8.26
//! "#;
//!
//! let resource = Polkadot::from_yaml_str(manifest).unwrap();
//! assert_eq!(resource.node_kind(), Some(NodeKind::Validator));
//! ```

pub mod error;
pub mod meta;
pub mod polkadot;
pub mod workload;

pub use error::{ManifestError, Result};
pub use meta::{ObjectKey, ObjectMeta, OwnerReference};
pub use polkadot::{
    API_VERSION, KIND, NodeKind, NodeSpec, Polkadot, PolkadotSpec, DEFAULT_P2P_PORT,
    DEFAULT_RPC_PORT,
};
pub use workload::{
    Container, ContainerPort, PodTemplate, StatefulSet, StatefulSetSpec, VERSION_LABEL,
};
