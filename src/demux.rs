use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;

use crate::batch::Slot;
use crate::cache::ScopeCache;
use crate::error::LoadError;

/// Hands a batch's result to every slot registered under its keys.
///
/// Matching is by key. Each unique key's slots are drained from `pending`
/// and all settle to the same outcome. On success the outcome, absence
/// included, is recorded in `cache`; a failed batch records nothing.
pub(crate) fn demultiplex<K, V, E>(
    keys: &[K],
    result: Result<HashMap<K, V>, E>,
    pending: &mut HashMap<K, Vec<Slot<V, E>>>,
    cache: &mut ScopeCache<K, V>,
) where
    K: Eq + Hash + Clone + Debug,
    V: Clone,
{
    match result {
        Ok(mut found) => {
            for key in keys {
                let outcome = found.remove(key);
                for slot in pending.remove(key).unwrap_or_default() {
                    // A dropped receiver means its caller stopped waiting.
                    let _ = slot.send(Ok(outcome.clone()));
                }
                if let Err(violation) = cache.put(key.clone(), outcome) {
                    tracing::error!(%violation, "scope cache contract violated");
                    debug_assert!(false, "{}", violation);
                }
            }
        }
        Err(e) => {
            let err = LoadError::BatchFetch(Arc::new(e));
            for key in keys {
                for slot in pending.remove(key).unwrap_or_default() {
                    let _ = slot.send(Err(err.clone()));
                }
            }
        }
    }
}
