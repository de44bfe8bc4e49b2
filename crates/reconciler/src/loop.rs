//! Reconciliation loop driving the reconciler over every declared resource.
//!
//! The loop honours the requeue signal: a forced requeue re-runs the same
//! resource immediately, capped by `max_forced_requeues`. Errors are logged
//! and left to the next resync tick.

use std::sync::Arc;

use async_trait::async_trait;
use polkadot_api::Polkadot;
use tokio::sync::{RwLock, watch};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::reconciler::Reconciler;
use crate::types::{PassReport, Requeue};

/// Source of the resources to reconcile.
#[async_trait]
pub trait DeclaredResourceProvider: Send + Sync {
    /// Current set of declared resources.
    async fn list(&self) -> Result<Vec<Polkadot>>;
}

/// In-memory resource provider.
#[derive(Default)]
pub struct InMemoryResourceProvider {
    resources: RwLock<Vec<Polkadot>>,
}

impl InMemoryResourceProvider {
    pub fn new(resources: Vec<Polkadot>) -> Self {
        Self {
            resources: RwLock::new(resources),
        }
    }

    /// Insert a resource, replacing one with the same key.
    pub async fn upsert(&self, resource: Polkadot) {
        let mut resources = self.resources.write().await;
        resources.retain(|r| r.key() != resource.key());
        resources.push(resource);
    }
}

#[async_trait]
impl DeclaredResourceProvider for InMemoryResourceProvider {
    async fn list(&self) -> Result<Vec<Polkadot>> {
        Ok(self.resources.read().await.clone())
    }
}

/// Handle to stop a running loop.
#[derive(Clone)]
pub struct LoopStopper {
    tx: Arc<watch::Sender<bool>>,
}

impl LoopStopper {
    /// Ask the loop to stop after the current pass.
    pub fn stop(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_stopped(&self) -> bool {
        *self.tx.borrow()
    }
}

/// Periodic reconciliation over a [`DeclaredResourceProvider`].
pub struct ReconciliationLoop {
    reconciler: Arc<Reconciler>,
    provider: Arc<dyn DeclaredResourceProvider>,
    stop: Arc<watch::Sender<bool>>,
}

impl ReconciliationLoop {
    pub fn new(reconciler: Arc<Reconciler>, provider: Arc<dyn DeclaredResourceProvider>) -> Self {
        let (tx, _rx) = watch::channel(false);
        Self {
            reconciler,
            provider,
            stop: Arc::new(tx),
        }
    }

    /// Handle for stopping [`run`](Self::run).
    pub fn stopper(&self) -> LoopStopper {
        LoopStopper {
            tx: Arc::clone(&self.stop),
        }
    }

    /// Reconcile every declared resource once.
    ///
    /// # Errors
    ///
    /// Only a provider failure fails the pass; reconciliation errors are
    /// collected in the report.
    pub async fn run_once(&self) -> Result<PassReport> {
        let resources = self.provider.list().await?;
        let mut report = PassReport::default();

        for resource in &resources {
            self.reconcile_resource(resource, &mut report).await;
        }

        debug!(
            reconciled = report.reconciled.len(),
            pending = report.pending.len(),
            failed = report.failed.len(),
            forced_requeues = report.forced_requeues,
            "Pass complete"
        );
        Ok(report)
    }

    async fn reconcile_resource(&self, resource: &Polkadot, report: &mut PassReport) {
        let key = resource.key();
        let max = self.reconciler.config().max_forced_requeues;
        let mut forced: u32 = 0;

        loop {
            match self.reconciler.reconcile(resource).await {
                Ok(Requeue::NotForced) => {
                    report.reconciled.push(key);
                    return;
                }
                Ok(Requeue::Forced) if forced < max => {
                    forced = forced.saturating_add(1);
                    report.forced_requeues = report.forced_requeues.saturating_add(1);
                }
                Ok(Requeue::Forced) => {
                    warn!(key = %key, max, "Forced requeue limit reached, deferring to next pass");
                    report.pending.push(key);
                    return;
                }
                Err(e) => {
                    warn!(key = %key, error = %e, "Reconciliation failed");
                    report.failed.push((key, e.to_string()));
                    return;
                }
            }
        }
    }

    /// Run passes on the resync interval until stopped.
    pub async fn run(&self) {
        let mut stop = self.stop.subscribe();
        let mut interval = tokio::time::interval(self.reconciler.config().resync_interval());
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            interval_secs = self.reconciler.config().resync_interval_secs,
            "Reconciliation loop started"
        );

        while !*stop.borrow_and_update() {
            tokio::select! {
                _ = interval.tick() => {
                    match self.run_once().await {
                        Ok(report) if report.is_settled() => {
                            info!(resources = report.total(), "All resources converged");
                        }
                        Ok(report) => {
                            info!(
                                pending = report.pending.len(),
                                failed = report.failed.len(),
                                "Pass finished with unsettled resources"
                            );
                        }
                        Err(e) => warn!(error = %e, "Failed to list declared resources"),
                    }
                }
                changed = stop.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }

        info!("Reconciliation loop stopped");
    }
}
