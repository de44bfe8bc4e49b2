//! Generic convergence of one desired StatefulSet against the cluster.

use std::sync::Arc;

use polkadot_api::{Polkadot, StatefulSet};
use tracing::{Instrument, Span, debug, error, info, info_span};

use crate::client::{WorkloadClient, fetch};
use crate::diff;
use crate::error::Result;
use crate::ownership::set_controller_reference;
use crate::types::Requeue;

/// Fetch-compare-converge for a single workload.
///
/// Each call fetches exactly once and issues at most one mutating request.
#[derive(Clone)]
pub struct ConvergenceEngine {
    client: Arc<dyn WorkloadClient>,
}

impl ConvergenceEngine {
    pub fn new(client: Arc<dyn WorkloadClient>) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &Arc<dyn WorkloadClient> {
        &self.client
    }

    /// Bring the cluster's copy of `desired` in line with it.
    ///
    /// - absent: set `owner` as controller, create, `Forced`
    /// - present and different: update, `NotForced`
    /// - present and identical: nothing, `NotForced`
    ///
    /// `desired` is never modified.
    ///
    /// # Errors
    ///
    /// Client errors other than a not-found fetch are returned unchanged as
    /// `Error::Client`; ownership failures as `Error::Ownership`, in which
    /// case no create is attempted.
    pub async fn converge(&self, owner: &Polkadot, desired: &StatefulSet) -> Result<Requeue> {
        let span = info_span!(
            "statefulset",
            namespace = %desired.namespace(),
            name = %desired.name()
        );
        self.converge_in(owner, desired, &span)
            .instrument(span.clone())
            .await
    }

    async fn converge_in(
        &self,
        owner: &Polkadot,
        desired: &StatefulSet,
        span: &Span,
    ) -> Result<Requeue> {
        let observed = fetch(self.client.as_ref(), &desired.key())
            .await
            .inspect_err(|e| error!(error = %e, "Failed to fetch the StatefulSet"))?;

        let Some(observed) = observed else {
            info!("StatefulSet not found, creating it");
            self.create(owner, desired).await?;
            info!("Created the StatefulSet");
            return Ok(Requeue::Forced);
        };

        if !diff::differs(&observed, desired, span) {
            debug!("StatefulSet is up to date");
            return Ok(Requeue::NotForced);
        }

        info!("Updating the StatefulSet");
        self.update(observed, desired).await?;
        info!("Updated the StatefulSet");
        Ok(Requeue::NotForced)
    }

    async fn create(&self, owner: &Polkadot, desired: &StatefulSet) -> Result<()> {
        let mut object = desired.clone();
        set_controller_reference(owner, &mut object)
            .inspect_err(|e| error!(error = %e, "Failed to set the ownership"))?;
        self.client
            .create(&object)
            .await
            .inspect_err(|e| error!(error = %e, "Failed to create the StatefulSet"))?;
        Ok(())
    }

    /// Replace the mutable fields of `observed` with those of `desired`,
    /// keeping identity, resource version and owner references.
    async fn update(&self, observed: StatefulSet, desired: &StatefulSet) -> Result<()> {
        let mut object = observed;
        object.metadata.labels.clone_from(&desired.metadata.labels);
        object.spec = desired.spec.clone();
        self.client
            .update(&object)
            .await
            .inspect_err(|e| error!(error = %e, "Failed to update the StatefulSet"))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::expect_used)]
    #![allow(clippy::panic)]

    use polkadot_api::ObjectKey;

    use super::*;
    use crate::client::{InMemoryClient, Operation};
    use crate::error::{ClientError, Error, OwnershipError};

    fn owner() -> Polkadot {
        Polkadot::new("kusama", "alice", "Sentry").with_uid("owner-uid")
    }

    fn desired(replicas: u32, version: &str) -> StatefulSet {
        StatefulSet::new("kusama", "alice-sentry", replicas).with_version(version)
    }

    fn key() -> ObjectKey {
        ObjectKey::new("kusama", "alice-sentry")
    }

    fn setup() -> (ConvergenceEngine, Arc<InMemoryClient>) {
        let client = InMemoryClient::new_arc();
        (ConvergenceEngine::new(client.clone()), client)
    }

    #[tokio::test]
    async fn test_absent_workload_is_created_with_forced_requeue() {
        let (engine, client) = setup();

        let result = engine.converge(&owner(), &desired(2, "a")).await;

        assert_eq!(result, Ok(Requeue::Forced));
        assert_eq!(client.call_count(Operation::Get, "alice-sentry").await, 1);
        assert_eq!(client.call_count(Operation::Create, "alice-sentry").await, 1);
        assert_eq!(client.mutation_count().await, 1);

        let stored = client.object(&key()).await.unwrap();
        let reference = stored.metadata.controller_reference().unwrap();
        assert_eq!(reference.uid, "owner-uid");
    }

    #[tokio::test]
    async fn test_desired_is_left_untouched() {
        let (engine, _client) = setup();
        let wanted = desired(2, "a");
        let snapshot = wanted.clone();

        engine.converge(&owner(), &wanted).await.unwrap();

        assert_eq!(wanted, snapshot);
    }

    #[tokio::test]
    async fn test_replica_drift_is_updated_without_forced_requeue() {
        let (engine, client) = setup();
        client.insert(desired(3, "a")).await;

        let result = engine.converge(&owner(), &desired(5, "a")).await;

        assert_eq!(result, Ok(Requeue::NotForced));
        assert_eq!(client.call_count(Operation::Update, "alice-sentry").await, 1);
        assert_eq!(client.mutation_count().await, 1);
        assert_eq!(client.object(&key()).await.unwrap().replicas(), 5);
    }

    #[tokio::test]
    async fn test_update_keeps_observed_identity() {
        let (engine, client) = setup();
        let mut existing = desired(3, "a");
        existing.metadata.uid = Some("sts-uid".to_string());
        client.insert(existing).await;

        engine.converge(&owner(), &desired(3, "b")).await.unwrap();

        let stored = client.object(&key()).await.unwrap();
        assert_eq!(stored.metadata.uid.as_deref(), Some("sts-uid"));
        assert_eq!(stored.version(), "b");
        assert_eq!(stored.metadata.resource_version.as_deref(), Some("2"));
    }

    #[tokio::test]
    async fn test_converged_workload_is_left_alone() {
        let (engine, client) = setup();
        client.insert(desired(3, "a")).await;

        let result = engine.converge(&owner(), &desired(3, "a")).await;

        assert_eq!(result, Ok(Requeue::NotForced));
        assert_eq!(client.mutation_count().await, 0);
    }

    #[tokio::test]
    async fn test_fetch_error_is_propagated_without_mutation() {
        let (engine, client) = setup();
        let fault = ClientError::transport("get", "connection reset");
        client.fail_next(Operation::Get, fault.clone()).await;

        let result = engine.converge(&owner(), &desired(2, "a")).await;

        assert_eq!(result, Err(Error::Client(fault)));
        assert_eq!(client.mutation_count().await, 0);
    }

    #[tokio::test]
    async fn test_create_error_is_propagated() {
        let (engine, client) = setup();
        let fault = ClientError::transport("create", "admission webhook unavailable");
        client.fail_next(Operation::Create, fault.clone()).await;

        let result = engine.converge(&owner(), &desired(2, "a")).await;

        assert_eq!(result, Err(Error::Client(fault)));
        assert!(client.object(&key()).await.is_none());
    }

    #[tokio::test]
    async fn test_update_error_is_propagated() {
        let (engine, client) = setup();
        client.insert(desired(3, "a")).await;
        let fault = ClientError::transport("update", "etcd timeout");
        client.fail_next(Operation::Update, fault.clone()).await;

        let result = engine.converge(&owner(), &desired(5, "a")).await;

        assert_eq!(result, Err(Error::Client(fault)));
    }

    #[tokio::test]
    async fn test_ownership_error_skips_create() {
        let (engine, client) = setup();
        let unsaved = Polkadot::new("kusama", "alice", "Sentry");

        let result = engine.converge(&unsaved, &desired(2, "a")).await;

        assert!(matches!(
            result,
            Err(Error::Ownership(OwnershipError::MissingUid { .. }))
        ));
        assert_eq!(client.call_count(Operation::Create, "alice-sentry").await, 0);
    }
}
