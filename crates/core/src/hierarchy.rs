//! Parent/child trees (accounts, branches).
//!
//! Trees are passed in as a parent map: each node maps to its parent, or
//! `None` for a root. Moving a node is only allowed when the new parent is
//! not the node itself and not one of its descendants.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;

/// Returns true if making `new_parent` the parent of `node` would close a
/// loop.
///
/// Walks up from `new_parent` towards the root. Meeting `node` on the way
/// means `new_parent` is `node` or lies below it. A loop already present in
/// `parents` stops the walk and counts as a cycle.
#[must_use]
pub fn would_create_cycle<K>(parents: &HashMap<K, Option<K>>, node: K, new_parent: K) -> bool
where
    K: Copy + Eq + Hash,
{
    let mut seen = HashSet::new();
    let mut current = Some(new_parent);

    while let Some(id) = current {
        if id == node || !seen.insert(id) {
            return true;
        }
        current = parents.get(&id).copied().flatten();
    }

    false
}
