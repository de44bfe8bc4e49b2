//! Core types for the reconciler.

use std::fmt;

use polkadot_api::ObjectKey;
use serde::{Deserialize, Serialize};

/// Outcome of a convergence step, telling the caller whether to re-run
/// reconciliation immediately.
///
/// An `Err` from any step is always paired with `NotForced`: the caller's
/// own retry policy governs failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Requeue {
    /// Re-evaluate now, the observed state is not yet meaningful.
    Forced,
    /// Nothing to do until the next external event.
    NotForced,
}

impl Requeue {
    pub const fn is_forced(self) -> bool {
        matches!(self, Self::Forced)
    }
}

impl fmt::Display for Requeue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Forced => f.write_str("forced"),
            Self::NotForced => f.write_str("not-forced"),
        }
    }
}

/// Shape of a managed workload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorkloadRole {
    Validator,
    Sentry,
}

impl WorkloadRole {
    /// Suffix appended to the resource name, also used as the `role` label.
    pub const fn suffix(self) -> &'static str {
        match self {
            Self::Validator => "validator",
            Self::Sentry => "sentry",
        }
    }

    /// Deterministic workload name for a resource.
    pub fn workload_name(self, resource_name: &str) -> String {
        format!("{resource_name}-{}", self.suffix())
    }
}

/// Summary of one reconciliation pass over every declared resource.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassReport {
    /// Resources that ended the pass without a pending forced requeue.
    pub reconciled: Vec<ObjectKey>,
    /// Resources still asking for a forced requeue when the cap was hit.
    pub pending: Vec<ObjectKey>,
    /// Resources whose reconciliation failed, with the error message.
    pub failed: Vec<(ObjectKey, String)>,
    /// Immediate re-runs performed during the pass.
    pub forced_requeues: u32,
}

impl PassReport {
    /// Whether every resource converged without error.
    pub fn is_settled(&self) -> bool {
        self.pending.is_empty() && self.failed.is_empty()
    }

    /// Total number of resources visited.
    pub fn total(&self) -> usize {
        self.reconciled
            .len()
            .saturating_add(self.pending.len())
            .saturating_add(self.failed.len())
    }
}
