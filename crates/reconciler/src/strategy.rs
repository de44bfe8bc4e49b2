//! Role strategies and their selection.

use polkadot_api::{NodeKind, Polkadot};
use tracing::debug;

use crate::builder::WorkloadBuilder;
use crate::engine::ConvergenceEngine;
use crate::error::Result;
use crate::types::{Requeue, WorkloadRole};

/// How a declared role maps onto managed workloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoleStrategy {
    /// One validator workload.
    Validator,
    /// One sentry workload.
    Sentry,
    /// Sentry first, then validator.
    SentryAndValidator,
    /// No workload.
    Default,
}

impl RoleStrategy {
    /// Pick the strategy for a declared kind. Unrecognised kinds select
    /// [`RoleStrategy::Default`].
    pub fn select(kind: &str) -> Self {
        NodeKind::parse(kind).map_or(Self::Default, Self::from)
    }

    /// Workloads this strategy manages, in convergence order.
    pub const fn workload_roles(self) -> &'static [WorkloadRole] {
        match self {
            Self::Validator => &[WorkloadRole::Validator],
            Self::Sentry => &[WorkloadRole::Sentry],
            Self::SentryAndValidator => &[WorkloadRole::Sentry, WorkloadRole::Validator],
            Self::Default => &[],
        }
    }

    /// Converge the workloads of `resource` for this role.
    ///
    /// The composite role stops after the sentry step when that step forces
    /// a requeue or fails; the validator workload is then not even built.
    ///
    /// # Errors
    ///
    /// Propagates the first convergence error unchanged.
    pub async fn reconcile(
        self,
        engine: &ConvergenceEngine,
        builder: &dyn WorkloadBuilder,
        resource: &Polkadot,
    ) -> Result<Requeue> {
        match self {
            Self::Validator => engine.converge(resource, &builder.validator(resource)).await,
            Self::Sentry => engine.converge(resource, &builder.sentry(resource)).await,
            Self::SentryAndValidator => {
                let requeue = engine.converge(resource, &builder.sentry(resource)).await?;
                if requeue.is_forced() {
                    debug!("Sentry requeue forced, deferring the validator");
                    return Ok(requeue);
                }
                engine
                    .converge(resource, &builder.validator(resource))
                    .await
            }
            Self::Default => {
                debug!(kind = %resource.spec.kind, "Role manages no workload");
                Ok(Requeue::NotForced)
            }
        }
    }
}

impl From<NodeKind> for RoleStrategy {
    fn from(kind: NodeKind) -> Self {
        match kind {
            NodeKind::Validator => Self::Validator,
            NodeKind::Sentry => Self::Sentry,
            NodeKind::SentryAndValidator => Self::SentryAndValidator,
        }
    }
}
