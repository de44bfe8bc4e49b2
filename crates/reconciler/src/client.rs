//! Cluster client trait and implementations.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use polkadot_api::{ObjectKey, StatefulSet};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::ClientError;

/// Request/response access to StatefulSets in the cluster.
///
/// `get` must report a missing object as [`ClientError::NotFound`] so callers
/// can tell absence apart from transport failures.
#[async_trait]
pub trait WorkloadClient: Send + Sync {
    /// Fetch a StatefulSet by key.
    async fn get(&self, key: &ObjectKey) -> Result<StatefulSet, ClientError>;

    /// Create a new StatefulSet.
    async fn create(&self, object: &StatefulSet) -> Result<(), ClientError>;

    /// Replace an existing StatefulSet.
    async fn update(&self, object: &StatefulSet) -> Result<(), ClientError>;
}

#[async_trait]
impl<C: WorkloadClient + ?Sized> WorkloadClient for Arc<C> {
    async fn get(&self, key: &ObjectKey) -> Result<StatefulSet, ClientError> {
        (**self).get(key).await
    }

    async fn create(&self, object: &StatefulSet) -> Result<(), ClientError> {
        (**self).create(object).await
    }

    async fn update(&self, object: &StatefulSet) -> Result<(), ClientError> {
        (**self).update(object).await
    }
}

/// Fetch an object, normalizing `NotFound` to `None`.
///
/// # Errors
///
/// Returns every client error other than `NotFound` unchanged.
pub async fn fetch<C: WorkloadClient + ?Sized>(
    client: &C,
    key: &ObjectKey,
) -> Result<Option<StatefulSet>, ClientError> {
    match client.get(key).await {
        Ok(found) => Ok(Some(found)),
        Err(err) if err.is_not_found() => Ok(None),
        Err(err) => Err(err),
    }
}

/// Client operation kinds, used for call recording and fault injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Get,
    Create,
    Update,
}

/// A recorded client call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientCall {
    pub operation: Operation,
    pub key: ObjectKey,
}

/// In-memory cluster for testing and dry runs.
///
/// Mirrors the API server semantics the reconciler relies on: uids and
/// resource versions are assigned on create, updates are checked against the
/// stored resource version.
#[derive(Default)]
pub struct InMemoryClient {
    objects: RwLock<HashMap<ObjectKey, StatefulSet>>,
    calls: RwLock<Vec<ClientCall>>,
    faults: RwLock<HashMap<Operation, ClientError>>,
}

impl InMemoryClient {
    /// Create a new empty in-memory cluster.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new in-memory cluster wrapped in an Arc.
    pub fn new_arc() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Store an object directly, bypassing call recording.
    ///
    /// Missing uid and resource version are filled in.
    pub async fn insert(&self, mut object: StatefulSet) {
        object
            .metadata
            .uid
            .get_or_insert_with(|| Uuid::new_v4().to_string());
        object
            .metadata
            .resource_version
            .get_or_insert_with(|| "1".to_string());
        self.objects.write().await.insert(object.key(), object);
    }

    /// Make the next call of `operation` fail with `error`.
    pub async fn fail_next(&self, operation: Operation, error: ClientError) {
        self.faults.write().await.insert(operation, error);
    }

    /// Stored object for a key.
    pub async fn object(&self, key: &ObjectKey) -> Option<StatefulSet> {
        self.objects.read().await.get(key).cloned()
    }

    /// All stored objects, ordered by key.
    pub async fn objects(&self) -> Vec<StatefulSet> {
        let objects = self.objects.read().await;
        let mut all: Vec<StatefulSet> = objects.values().cloned().collect();
        all.sort_by(|a, b| a.key().cmp(&b.key()));
        all
    }

    /// Every call made so far, in order.
    pub async fn calls(&self) -> Vec<ClientCall> {
        self.calls.read().await.clone()
    }

    /// Number of calls of `operation` against `name`, any namespace.
    pub async fn call_count(&self, operation: Operation, name: &str) -> usize {
        self.calls
            .read()
            .await
            .iter()
            .filter(|c| c.operation == operation && c.key.name == name)
            .count()
    }

    /// Number of create and update calls made so far.
    pub async fn mutation_count(&self) -> usize {
        self.calls
            .read()
            .await
            .iter()
            .filter(|c| c.operation != Operation::Get)
            .count()
    }

    /// Forget recorded calls.
    pub async fn clear_calls(&self) {
        self.calls.write().await.clear();
    }

    async fn record(&self, operation: Operation, key: &ObjectKey) -> Result<(), ClientError> {
        self.calls.write().await.push(ClientCall {
            operation,
            key: key.clone(),
        });
        match self.faults.write().await.remove(&operation) {
            Some(fault) => Err(fault),
            None => Ok(()),
        }
    }
}

fn next_version(current: Option<&str>) -> String {
    current
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(0)
        .saturating_add(1)
        .to_string()
}

#[async_trait]
impl WorkloadClient for InMemoryClient {
    async fn get(&self, key: &ObjectKey) -> Result<StatefulSet, ClientError> {
        self.record(Operation::Get, key).await?;
        self.objects
            .read()
            .await
            .get(key)
            .cloned()
            .ok_or_else(|| ClientError::not_found(key.clone()))
    }

    async fn create(&self, object: &StatefulSet) -> Result<(), ClientError> {
        let key = object.key();
        self.record(Operation::Create, &key).await?;

        let mut objects = self.objects.write().await;
        if objects.contains_key(&key) {
            return Err(ClientError::AlreadyExists { key });
        }

        let mut stored = object.clone();
        stored.metadata.uid = Some(Uuid::new_v4().to_string());
        stored.metadata.resource_version = Some("1".to_string());
        objects.insert(key, stored);
        Ok(())
    }

    async fn update(&self, object: &StatefulSet) -> Result<(), ClientError> {
        let key = object.key();
        self.record(Operation::Update, &key).await?;

        let mut objects = self.objects.write().await;
        let Some(current) = objects.get(&key) else {
            return Err(ClientError::not_found(key));
        };

        let current_version = current.metadata.resource_version.clone();
        if let Some(sent) = &object.metadata.resource_version {
            if Some(sent) != current_version.as_ref() {
                return Err(ClientError::Conflict {
                    key,
                    sent: Some(sent.clone()),
                    current: current_version,
                });
            }
        }

        let mut stored = object.clone();
        stored.metadata.uid.clone_from(&current.metadata.uid);
        stored.metadata.resource_version = Some(next_version(current_version.as_deref()));
        objects.insert(key, stored);
        Ok(())
    }
}

/// A wrapper that adds tracing to a workload client.
pub struct TracingClient<C: WorkloadClient> {
    inner: C,
}

impl<C: WorkloadClient> TracingClient<C> {
    /// Create a new tracing client.
    pub const fn new(inner: C) -> Self {
        Self { inner }
    }

    pub const fn inner(&self) -> &C {
        &self.inner
    }
}

#[async_trait]
impl<C: WorkloadClient> WorkloadClient for TracingClient<C> {
    async fn get(&self, key: &ObjectKey) -> Result<StatefulSet, ClientError> {
        tracing::debug!(key = %key, "Getting StatefulSet");
        let result = self.inner.get(key).await;
        if let Ok(ref found) = result {
            tracing::trace!(
                resource_version = ?found.metadata.resource_version,
                "StatefulSet fetched"
            );
        }
        result
    }

    async fn create(&self, object: &StatefulSet) -> Result<(), ClientError> {
        tracing::debug!(key = %object.key(), replicas = object.replicas(), "Creating StatefulSet");
        self.inner.create(object).await
    }

    async fn update(&self, object: &StatefulSet) -> Result<(), ClientError> {
        tracing::debug!(
            key = %object.key(),
            resource_version = ?object.metadata.resource_version,
            "Updating StatefulSet"
        );
        self.inner.update(object).await
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::expect_used)]
    #![allow(clippy::panic)]

    use super::*;

    fn key() -> ObjectKey {
        ObjectKey::new("kusama", "alice-sentry")
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let client = InMemoryClient::new();
        let result = client.get(&key()).await;
        assert_eq!(result, Err(ClientError::not_found(key())));
    }

    #[tokio::test]
    async fn test_fetch_normalizes_not_found() {
        let client = InMemoryClient::new();
        assert_eq!(fetch(&client, &key()).await, Ok(None));
    }

    #[tokio::test]
    async fn test_fetch_propagates_transport_error() {
        let client = InMemoryClient::new();
        let fault = ClientError::transport("get", "connection refused");
        client.fail_next(Operation::Get, fault.clone()).await;

        assert_eq!(fetch(&client, &key()).await, Err(fault));
    }

    #[tokio::test]
    async fn test_create_assigns_identity_and_rejects_duplicates() {
        let client = InMemoryClient::new();
        let set = StatefulSet::new("kusama", "alice-sentry", 2);

        client.create(&set).await.unwrap();
        let stored = client.object(&key()).await.unwrap();
        assert!(stored.metadata.uid.is_some());
        assert_eq!(stored.metadata.resource_version.as_deref(), Some("1"));

        let again = client.create(&set).await;
        assert_eq!(again, Err(ClientError::AlreadyExists { key: key() }));
    }

    #[tokio::test]
    async fn test_update_bumps_version_and_detects_conflicts() {
        let client = InMemoryClient::new();
        client.create(&StatefulSet::new("kusama", "alice-sentry", 2)).await.unwrap();

        let mut next = client.object(&key()).await.unwrap();
        next.spec.replicas = 4;
        client.update(&next).await.unwrap();

        let stored = client.object(&key()).await.unwrap();
        assert_eq!(stored.replicas(), 4);
        assert_eq!(stored.metadata.resource_version.as_deref(), Some("2"));

        // `next` still carries version 1
        let stale = client.update(&next).await;
        assert!(matches!(stale, Err(ClientError::Conflict { .. })));
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let client = InMemoryClient::new();
        let result = client.update(&StatefulSet::new("kusama", "alice-sentry", 1)).await;
        assert_eq!(result, Err(ClientError::not_found(key())));
    }

    #[tokio::test]
    async fn test_calls_are_recorded() {
        let client = InMemoryClient::new();
        let _ = client.get(&key()).await;
        client.create(&StatefulSet::new("kusama", "alice-sentry", 1)).await.unwrap();

        assert_eq!(client.call_count(Operation::Get, "alice-sentry").await, 1);
        assert_eq!(client.call_count(Operation::Create, "alice-sentry").await, 1);
        assert_eq!(client.mutation_count().await, 1);
    }

    #[tokio::test]
    async fn test_fault_is_one_shot() {
        let client = InMemoryClient::new();
        client
            .fail_next(Operation::Create, ClientError::transport("create", "timeout"))
            .await;
        let set = StatefulSet::new("kusama", "alice-sentry", 1);

        assert!(client.create(&set).await.is_err());
        assert!(client.create(&set).await.is_ok());
    }

    #[tokio::test]
    async fn test_tracing_client_delegates() {
        let client = TracingClient::new(InMemoryClient::new());
        client.create(&StatefulSet::new("kusama", "alice-sentry", 1)).await.unwrap();
        assert!(client.get(&key()).await.is_ok());
        assert_eq!(client.inner().calls().await.len(), 2);
    }
}
