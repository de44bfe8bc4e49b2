//! K8s-style StatefulSet reconciliation for Polkadot node roles.
//!
//! This crate implements a reconciliation pattern for the `Polkadot` custom
//! resource:
//!
//! - **Role selection**: the declared `kind` picks a [`RoleStrategy`]
//! - **Desired state**: a [`WorkloadBuilder`] produces one StatefulSet per role
//! - **Convergence**: the [`ConvergenceEngine`] fetches the observed
//!   StatefulSet and creates, updates or leaves it alone
//! - **Requeue signal**: every pass tells the caller whether to re-run now
//!
//! # Requeue semantics
//!
//! Creating a workload yields [`Requeue::Forced`]: the new object has no
//! meaningful status yet, so the next pass should look again right away.
//! Updates and no-ops yield [`Requeue::NotForced`]. The composite
//! `SentryAndValidator` role converges the sentry first and stops there if
//! that step forced a requeue or failed.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//!
//! use polkadot_api::Polkadot;
//! use polkadot_reconciler::{InMemoryClient, Reconciler, ReconcilerConfig, Requeue};
//!
//! #[tokio::main]
//! async fn main() {
//!     let client = InMemoryClient::new_arc();
//!     let reconciler = Reconciler::with_default_builder(client, ReconcilerConfig::default());
//!
//!     let resource = Polkadot::new("kusama", "alice", "Validator").with_uid("1");
//!     let requeue = reconciler.reconcile(&resource).await.unwrap();
//!     assert_eq!(requeue, Requeue::Forced);
//! }
//! ```

pub mod builder;
pub mod client;
pub mod config;
pub mod diff;
pub mod engine;
pub mod error;
pub mod r#loop;
pub mod ownership;
pub mod reconciler;
pub mod strategy;
pub mod types;

// Re-export main types
pub use builder::{DefaultWorkloadBuilder, WorkloadBuilder};
pub use client::{ClientCall, InMemoryClient, Operation, TracingClient, WorkloadClient, fetch};
pub use config::ReconcilerConfig;
pub use diff::{Mismatch, differences, differs};
pub use engine::ConvergenceEngine;
pub use error::{ClientError, Error, OwnershipError, Result};
pub use ownership::set_controller_reference;
pub use r#loop::{
    DeclaredResourceProvider, InMemoryResourceProvider, LoopStopper, ReconciliationLoop,
};
pub use reconciler::{Reconciler, ReconcilerBuilder};
pub use strategy::RoleStrategy;
pub use types::{PassReport, Requeue, WorkloadRole};
