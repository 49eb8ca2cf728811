//! Keyed set reconciliation.
//!
//! User script phases, sandbox support directories and sandbox header directories are all
//! converged the same way: compare the desired keys against the existing keys, create what is
//! missing, delete what is stale, and update the intersection in place.

use std::collections::HashSet;
use std::hash::Hash;

/// Result of comparing a desired key set against an existing one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetDelta<K> {
    /// Desired keys with no existing counterpart, in desired order.
    pub create: Vec<K>,
    /// Existing keys that are no longer desired, in existing order.
    pub delete: Vec<K>,
    /// Keys present on both sides, in desired order.
    pub keep: Vec<K>,
}

impl<K> SetDelta<K> {
    /// True when the existing set already equals the desired set.
    pub fn is_converged(&self) -> bool {
        self.create.is_empty() && self.delete.is_empty()
    }
}

/// Compare `desired` against `existing` by key. Repeated keys on either side count once.
pub fn reconcile_by_key<K>(
    desired: impl IntoIterator<Item = K>,
    existing: impl IntoIterator<Item = K>,
) -> SetDelta<K>
where
    K: Eq + Hash + Clone,
{
    let desired = unique(desired);
    let existing = unique(existing);

    let desired_set: HashSet<&K> = desired.iter().collect();
    let existing_set: HashSet<&K> = existing.iter().collect();

    let mut create = Vec::new();
    let mut keep = Vec::new();
    for key in &desired {
        if existing_set.contains(key) {
            keep.push(key.clone());
        } else {
            create.push(key.clone());
        }
    }

    let delete = existing
        .iter()
        .filter(|k| !desired_set.contains(k))
        .cloned()
        .collect();

    SetDelta {
        create,
        delete,
        keep,
    }
}

fn unique<K: Eq + Hash + Clone>(keys: impl IntoIterator<Item = K>) -> Vec<K> {
    let mut seen = HashSet::new();
    keys.into_iter().filter(|k| seen.insert(k.clone())).collect()
}
