use std::collections::hash_map::{Entry, HashMap};
use std::fmt::Debug;
use std::hash::Hash;

use crate::error::ContractViolation;

/// Write-once memo of every outcome recorded in one scope.
///
/// An entry of `None` records that the fetch found nothing for the key, which
/// is as authoritative as a value. Entries are never removed; the cache goes
/// away with its scope.
pub struct ScopeCache<K, V> {
    entries: HashMap<K, Option<V>>,
}

impl<K, V> Default for ScopeCache<K, V> {
    fn default() -> Self {
        ScopeCache {
            entries: HashMap::new(),
        }
    }
}

impl<K, V> ScopeCache<K, V>
where
    K: Eq + Hash + Debug,
    V: Clone,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// `Some(outcome)` on a hit, `None` on a miss.
    pub fn get(&self, key: &K) -> Option<Option<V>> {
        self.entries.get(key).cloned()
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    /// Records the outcome for `key`. The first recorded outcome stays; a
    /// second `put` leaves the cache untouched and reports the violation.
    pub fn put(&mut self, key: K, outcome: Option<V>) -> Result<(), ContractViolation> {
        match self.entries.entry(key) {
            Entry::Occupied(e) => Err(ContractViolation::DuplicatePut {
                key: format!("{:?}", e.key()),
            }),
            Entry::Vacant(e) => {
                e.insert(outcome);
                Ok(())
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
