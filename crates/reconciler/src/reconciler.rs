//! Reconciler implementation.

use std::sync::Arc;

use polkadot_api::Polkadot;
use tracing::{Instrument, info, info_span};

use crate::builder::{DefaultWorkloadBuilder, WorkloadBuilder};
use crate::client::WorkloadClient;
use crate::config::ReconcilerConfig;
use crate::engine::ConvergenceEngine;
use crate::error::{Error, Result};
use crate::strategy::RoleStrategy;
use crate::types::Requeue;

/// K8s-style reconciler for Polkadot resources.
pub struct Reconciler {
    /// Converges single workloads.
    engine: ConvergenceEngine,
    /// Produces desired workloads per role.
    builder: Arc<dyn WorkloadBuilder>,
    /// Configuration.
    config: ReconcilerConfig,
}

impl Reconciler {
    /// Create a new reconciler.
    pub fn new(
        client: Arc<dyn WorkloadClient>,
        builder: Arc<dyn WorkloadBuilder>,
        config: ReconcilerConfig,
    ) -> Self {
        Self {
            engine: ConvergenceEngine::new(client),
            builder,
            config,
        }
    }

    /// Create a reconciler with the default workload builder.
    pub fn with_default_builder(client: Arc<dyn WorkloadClient>, config: ReconcilerConfig) -> Self {
        let builder = Arc::new(DefaultWorkloadBuilder::from_config(&config));
        Self::new(client, builder, config)
    }

    /// Reconcile one resource: select its role strategy and run it.
    ///
    /// `Ok(Requeue::Forced)` asks the caller to reconcile again right away.
    ///
    /// # Errors
    ///
    /// Returns the first client or ownership error hit while converging.
    pub async fn reconcile(&self, resource: &Polkadot) -> Result<Requeue> {
        let strategy = RoleStrategy::select(&resource.spec.kind);
        let span = info_span!(
            "reconcile",
            namespace = %resource.namespace(),
            name = %resource.name(),
            strategy = ?strategy
        );

        async {
            info!("Reconciling Polkadot resource");
            strategy
                .reconcile(&self.engine, self.builder.as_ref(), resource)
                .await
                .inspect(|requeue| info!(requeue = %requeue, "Reconciliation complete"))
        }
        .instrument(span)
        .await
    }

    /// Get the convergence engine.
    pub const fn engine(&self) -> &ConvergenceEngine {
        &self.engine
    }

    /// Get the configuration.
    pub const fn config(&self) -> &ReconcilerConfig {
        &self.config
    }
}

/// Builder for Reconciler.
pub struct ReconcilerBuilder {
    client: Option<Arc<dyn WorkloadClient>>,
    builder: Option<Arc<dyn WorkloadBuilder>>,
    config: ReconcilerConfig,
}

impl ReconcilerBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            client: None,
            builder: None,
            config: ReconcilerConfig::default(),
        }
    }

    /// Set the cluster client.
    #[must_use]
    pub fn with_client(mut self, client: Arc<dyn WorkloadClient>) -> Self {
        self.client = Some(client);
        self
    }

    /// Set the workload builder.
    #[must_use]
    pub fn with_workload_builder(mut self, builder: Arc<dyn WorkloadBuilder>) -> Self {
        self.builder = Some(builder);
        self
    }

    /// Set the configuration.
    #[must_use]
    pub fn with_config(mut self, config: ReconcilerConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the resync interval in seconds.
    #[must_use]
    pub fn resync_interval_secs(mut self, secs: u64) -> Self {
        self.config.resync_interval_secs = secs;
        self
    }

    /// Set the cap on immediate re-runs per resource and pass.
    #[must_use]
    pub fn max_forced_requeues(mut self, max: u32) -> Self {
        self.config.max_forced_requeues = max;
        self
    }

    /// Build the reconciler.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` when no client was given or the configuration
    /// does not validate.
    pub fn build(self) -> Result<Reconciler> {
        let client = self
            .client
            .ok_or_else(|| Error::invalid_config("Cluster client is required"))?;

        self.config.validate()?;

        let builder: Arc<dyn WorkloadBuilder> = match self.builder {
            Some(builder) => builder,
            None => Arc::new(DefaultWorkloadBuilder::from_config(&self.config)),
        };

        Ok(Reconciler::new(client, builder, self.config))
    }
}

impl Default for ReconcilerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
