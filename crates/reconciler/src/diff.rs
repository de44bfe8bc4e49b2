//! Difference evaluation between an observed and a desired StatefulSet.
//!
//! Only a fixed list of fields is tracked. Every check runs even after an
//! earlier one matched, so each mismatch gets reported.

use itertools::Itertools;
use polkadot_api::StatefulSet;
use tracing::{Span, info};

/// A tracked field whose observed value differs from the desired one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mismatch {
    Replicas { observed: u32, desired: u32 },
    Version { observed: String, desired: String },
}

impl Mismatch {
    /// Name of the mismatched field.
    pub const fn field(&self) -> &'static str {
        match self {
            Self::Replicas { .. } => "replicas",
            Self::Version { .. } => "version",
        }
    }
}

type Check = fn(&StatefulSet, &StatefulSet) -> Option<Mismatch>;

const CHECKS: [Check; 2] = [replica_mismatch, version_mismatch];

fn replica_mismatch(observed: &StatefulSet, desired: &StatefulSet) -> Option<Mismatch> {
    (observed.replicas() != desired.replicas()).then(|| Mismatch::Replicas {
        observed: observed.replicas(),
        desired: desired.replicas(),
    })
}

fn version_mismatch(observed: &StatefulSet, desired: &StatefulSet) -> Option<Mismatch> {
    (observed.version() != desired.version()).then(|| Mismatch::Version {
        observed: observed.version().to_string(),
        desired: desired.version().to_string(),
    })
}

/// All tracked mismatches, each logged under `span`.
pub fn differences(observed: &StatefulSet, desired: &StatefulSet, span: &Span) -> Vec<Mismatch> {
    CHECKS
        .iter()
        .filter_map(|check| check(observed, desired))
        .inspect(|mismatch| match mismatch {
            Mismatch::Replicas { observed, desired } => {
                info!(parent: span, observed, desired, "Found a replica count mismatch");
            }
            Mismatch::Version { observed, desired } => {
                info!(parent: span, %observed, %desired, "Found a version mismatch");
            }
        })
        .collect_vec()
}

/// Whether `observed` must be updated to match `desired`.
pub fn differs(observed: &StatefulSet, desired: &StatefulSet, span: &Span) -> bool {
    !differences(observed, desired, span).is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(replicas: u32, version: &str) -> StatefulSet {
        StatefulSet::new("kusama", "alice-sentry", replicas).with_version(version)
    }

    #[test]
    fn test_identical_sets_do_not_differ() {
        assert!(!differs(&set(3, "a"), &set(3, "a"), &Span::none()));
    }

    #[test]
    fn test_replica_mismatch() {
        let found = differences(&set(3, "a"), &set(5, "a"), &Span::none());
        assert_eq!(
            found,
            vec![Mismatch::Replicas {
                observed: 3,
                desired: 5
            }]
        );
    }

    #[test]
    fn test_every_mismatch_is_reported() {
        let found = differences(&set(3, "a"), &set(5, "b"), &Span::none());
        let fields: Vec<&str> = found.iter().map(Mismatch::field).collect();
        assert_eq!(fields, vec!["replicas", "version"]);
    }

    #[test]
    fn test_missing_version_label_reads_as_empty() {
        let unlabeled = StatefulSet::new("kusama", "alice-sentry", 3);
        assert!(!differs(&unlabeled, &set(3, ""), &Span::none()));
        assert!(differs(&unlabeled, &set(3, "a"), &Span::none()));
    }

    #[test]
    fn test_untracked_fields_are_ignored() {
        let mut desired = set(3, "a");
        desired.spec.service_name = "other".to_string();
        desired.metadata.labels.insert("team".to_string(), "infra".to_string());
        assert!(!differs(&set(3, "a"), &desired, &Span::none()));
    }
}
