//! Desired-state builders: one fully specified StatefulSet per role.

use std::collections::BTreeMap;

use polkadot_api::{
    Container, ContainerPort, NodeSpec, ObjectMeta, PodTemplate, Polkadot, StatefulSet,
    StatefulSetSpec, VERSION_LABEL,
};

use crate::config::ReconcilerConfig;
use crate::types::WorkloadRole;

/// Builds the desired StatefulSet for each role of a resource.
///
/// Implementations must be pure: the same resource always yields the same
/// workload.
pub trait WorkloadBuilder: Send + Sync {
    /// Validator-shaped workload.
    fn validator(&self, resource: &Polkadot) -> StatefulSet;

    /// Sentry-shaped workload.
    fn sentry(&self, resource: &Polkadot) -> StatefulSet;

    /// Workload for `role`.
    fn build(&self, role: WorkloadRole, resource: &Polkadot) -> StatefulSet {
        match role {
            WorkloadRole::Validator => self.validator(resource),
            WorkloadRole::Sentry => self.sentry(resource),
        }
    }
}

/// Builder producing `polkadot` client StatefulSets.
#[derive(Debug, Clone)]
pub struct DefaultWorkloadBuilder {
    image: String,
}

/// A validator key must never be active on two nodes at once.
const VALIDATOR_REPLICAS: u32 = 1;

impl DefaultWorkloadBuilder {
    /// Create a builder using `image` as container repository.
    pub fn new(image: impl Into<String>) -> Self {
        Self {
            image: image.into(),
        }
    }

    /// Create a builder from the reconciler configuration.
    pub fn from_config(config: &ReconcilerConfig) -> Self {
        Self::new(config.image.clone())
    }

    fn workload(
        &self,
        resource: &Polkadot,
        role: WorkloadRole,
        node: &NodeSpec,
        replicas: u32,
    ) -> StatefulSet {
        let name = role.workload_name(resource.name());
        let selector: BTreeMap<String, String> = [
            ("app".to_string(), resource.name().to_string()),
            ("role".to_string(), role.suffix().to_string()),
        ]
        .into_iter()
        .collect();

        let mut metadata = ObjectMeta::new(resource.namespace(), name.clone());
        metadata.labels.clone_from(&selector);
        metadata.labels.insert(
            VERSION_LABEL.to_string(),
            resource.spec.client_version.clone(),
        );

        StatefulSet {
            metadata: metadata.clone(),
            spec: StatefulSetSpec {
                replicas,
                service_name: name,
                selector,
                template: PodTemplate {
                    labels: metadata.labels,
                    containers: vec![self.container(resource, role, node)],
                },
            },
        }
    }

    fn container(&self, resource: &Polkadot, role: WorkloadRole, node: &NodeSpec) -> Container {
        let mut args = vec![
            format!("--{}", role.suffix()),
            "--port".to_string(),
            node.p2p_port.to_string(),
            "--rpc-port".to_string(),
            node.rpc_port.to_string(),
        ];
        if let Some(key) = &node.node_key {
            args.push("--node-key".to_string());
            args.push(key.clone());
        }

        Container {
            name: role.suffix().to_string(),
            image: format!("{}:{}", self.image, resource.spec.client_version),
            args,
            ports: vec![
                ContainerPort {
                    name: "p2p".to_string(),
                    container_port: node.p2p_port,
                },
                ContainerPort {
                    name: "rpc".to_string(),
                    container_port: node.rpc_port,
                },
            ],
        }
    }
}

impl Default for DefaultWorkloadBuilder {
    fn default() -> Self {
        Self::from_config(&ReconcilerConfig::default())
    }
}

impl WorkloadBuilder for DefaultWorkloadBuilder {
    fn validator(&self, resource: &Polkadot) -> StatefulSet {
        self.workload(
            resource,
            WorkloadRole::Validator,
            &resource.spec.validator,
            VALIDATOR_REPLICAS,
        )
    }

    fn sentry(&self, resource: &Polkadot) -> StatefulSet {
        self.workload(
            resource,
            WorkloadRole::Sentry,
            &resource.spec.sentry,
            resource.spec.sentry.replicas,
        )
    }
}
