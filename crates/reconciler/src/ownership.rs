//! Owner references from a `Polkadot` resource to the workloads it manages.
//!
//! The controller reference lets the cluster garbage-collect a StatefulSet
//! once its owning resource is deleted.

use polkadot_api::{OwnerReference, Polkadot, StatefulSet, API_VERSION, KIND};

use crate::error::OwnershipError;

/// Mark `owner` as the controlling owner of `object`.
///
/// An existing controller reference to the same owner is replaced in place.
///
/// # Errors
///
/// - `MissingUid` if the owner has not been persisted yet
/// - `AlreadyOwned` if another object already controls `object`
pub fn set_controller_reference(
    owner: &Polkadot,
    object: &mut StatefulSet,
) -> Result<(), OwnershipError> {
    let uid = owner
        .metadata
        .uid
        .clone()
        .ok_or_else(|| OwnershipError::MissingUid { owner: owner.key() })?;

    if let Some(existing) = object.metadata.controller_reference() {
        if existing.uid != uid {
            return Err(OwnershipError::AlreadyOwned {
                object: object.key(),
                controller: format!("{}/{}", existing.kind, existing.name),
            });
        }
    }

    let reference = OwnerReference {
        api_version: API_VERSION.to_string(),
        kind: KIND.to_string(),
        name: owner.name().to_string(),
        uid,
        controller: true,
        block_owner_deletion: true,
    };

    object
        .metadata
        .owner_references
        .retain(|r| r.uid != reference.uid);
    object.metadata.owner_references.push(reference);
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn owner() -> Polkadot {
        Polkadot::new("kusama", "alice", "Sentry").with_uid("uid-1")
    }

    #[test]
    fn test_sets_controller_reference() {
        let mut set = StatefulSet::new("kusama", "alice-sentry", 1);
        set_controller_reference(&owner(), &mut set).unwrap();

        let reference = set.metadata.controller_reference().unwrap();
        assert_eq!(reference.uid, "uid-1");
        assert_eq!(reference.kind, KIND);
        assert!(reference.block_owner_deletion);
    }

    #[test]
    fn test_is_idempotent_for_same_owner() {
        let mut set = StatefulSet::new("kusama", "alice-sentry", 1);
        set_controller_reference(&owner(), &mut set).unwrap();
        set_controller_reference(&owner(), &mut set).unwrap();
        assert_eq!(set.metadata.owner_references.len(), 1);
    }

    #[test]
    fn test_owner_without_uid_is_rejected() {
        let mut set = StatefulSet::new("kusama", "alice-sentry", 1);
        let result = set_controller_reference(&Polkadot::new("kusama", "alice", "Sentry"), &mut set);
        assert!(matches!(result, Err(OwnershipError::MissingUid { .. })));
        assert!(set.metadata.owner_references.is_empty());
    }

    #[test]
    fn test_foreign_controller_is_rejected() {
        let mut set = StatefulSet::new("kusama", "alice-sentry", 1);
        let other = Polkadot::new("kusama", "bob", "Sentry").with_uid("uid-2");
        set_controller_reference(&other, &mut set).unwrap();

        let result = set_controller_reference(&owner(), &mut set);
        assert_eq!(
            result,
            Err(OwnershipError::AlreadyOwned {
                object: set.key(),
                controller: "Polkadot/bob".to_string(),
            })
        );
    }
}
