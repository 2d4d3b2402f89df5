//! Reconciliation plan between persisted and desired role grants.
//!
//! Grants are compared as sets of `(permission, grant type)` pairs. A desired
//! pair whose permission is already held with another grant type becomes an
//! in-place update instead of an insert plus a delete, which keeps at most one
//! active grant type per permission once the plan is applied.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::{DesiredGrants, GrantType, PermissionGrant, PermissionId};

/// In-place grant type change for one permission.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GrantUpdate {
    /// Permission whose grant type changes.
    pub permission_id: PermissionId,
    /// Currently persisted grant type.
    pub from: GrantType,
    /// Desired grant type.
    pub to: GrantType,
}

impl GrantUpdate {
    /// Returns the persisted pair targeted by this update.
    #[must_use]
    pub fn existing(&self) -> PermissionGrant {
        PermissionGrant::new(self.permission_id, self.from.clone())
    }

    /// Returns the pair persisted once this update is applied.
    #[must_use]
    pub fn desired(&self) -> PermissionGrant {
        PermissionGrant::new(self.permission_id, self.to.clone())
    }
}

/// Partition of existing and desired grants into mutation sets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionGrantDiff {
    /// Desired pairs to create.
    pub inserts: Vec<PermissionGrant>,
    /// Existing pairs whose grant type changes.
    pub updates: Vec<GrantUpdate>,
    /// Existing pairs to remove.
    pub deletes: Vec<PermissionGrant>,
    /// Pairs already persisted as desired.
    pub unchanged: Vec<PermissionGrant>,
}

impl PermissionGrantDiff {
    /// Returns whether applying the plan would not change persisted grants.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inserts.is_empty() && self.updates.is_empty() && self.deletes.is_empty()
    }

    /// Returns the number of row mutations in the plan.
    #[must_use]
    pub fn change_count(&self) -> usize {
        self.inserts.len() + self.updates.len() + self.deletes.len()
    }
}

/// Computes the mutations turning `existing` into `desired`.
///
/// The result does not depend on the order of `existing`; every output list is
/// sorted by permission then grant type.
#[must_use]
pub fn diff_permission_grants(
    existing: &[PermissionGrant],
    desired: &DesiredGrants,
) -> PermissionGrantDiff {
    let existing: BTreeSet<&PermissionGrant> = existing.iter().collect();
    let desired_pairs: BTreeSet<&PermissionGrant> = desired.as_slice().iter().collect();

    let mut diff = PermissionGrantDiff::default();
    let mut unmatched: BTreeMap<PermissionId, BTreeSet<GrantType>> = BTreeMap::new();

    for grant in &existing {
        if desired_pairs.contains(grant) {
            diff.unchanged.push((*grant).clone());
        } else {
            unmatched
                .entry(grant.permission_id)
                .or_default()
                .insert(grant.grant_type.clone());
        }
    }

    for grant in desired.as_slice() {
        if existing.contains(grant) {
            continue;
        }

        let reusable = unmatched
            .get_mut(&grant.permission_id)
            .and_then(BTreeSet::pop_first);

        match reusable {
            Some(from) => diff.updates.push(GrantUpdate {
                permission_id: grant.permission_id,
                from,
                to: grant.grant_type.clone(),
            }),
            None => diff.inserts.push(grant.clone()),
        }
    }

    for (permission_id, grant_types) in unmatched {
        diff.deletes.extend(
            grant_types
                .into_iter()
                .map(|grant_type| PermissionGrant::new(permission_id, grant_type)),
        );
    }

    diff
}
