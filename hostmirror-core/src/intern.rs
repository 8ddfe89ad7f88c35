//! Process-wide interning cache for domain name values.
//!
//! Account codes, user ids and similar domain values repeat across every
//! mirrored table, so they are stored once and shared by `Arc`. The cache is
//! initialized on first use and never evicted; the working set is bounded by
//! the number of distinct identities on the remote platform.

use once_cell::sync::Lazy;
use std::collections::HashSet;
use std::sync::{Arc, PoisonError, RwLock};

static NAMES: Lazy<RwLock<HashSet<Arc<str>>>> = Lazy::new(|| RwLock::new(HashSet::new()));

/// Intern a string, returning a shared `Arc<str>`.
///
/// Equal inputs always return clones of the same allocation, so equality
/// checks on interned values can short-circuit on pointer identity.
pub fn intern(value: &str) -> Arc<str> {
    {
        let names = NAMES.read().unwrap_or_else(PoisonError::into_inner);
        if let Some(existing) = names.get(value) {
            return Arc::clone(existing);
        }
    }

    let mut names = NAMES.write().unwrap_or_else(PoisonError::into_inner);
    // Second lookup: another thread may have inserted between the locks.
    if let Some(existing) = names.get(value) {
        return Arc::clone(existing);
    }
    let name: Arc<str> = Arc::from(value);
    names.insert(Arc::clone(&name));
    name
}

/// Number of distinct values currently interned.
pub fn interned_count() -> usize {
    NAMES
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .len()
}
