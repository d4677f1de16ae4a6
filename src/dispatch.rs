use std::collections::{HashMap, HashSet};
use std::fmt::Debug;
use std::hash::Hash;

use crate::batch::BatchId;
use crate::runtime::Mutex;
use crate::BatchFn;

/// Collapses a batch's key list to its unique keys, keeping first-occurrence
/// order.
pub(crate) fn unique_keys<K>(keys: Vec<K>) -> Vec<K>
where
    K: Eq + Hash + Clone,
{
    let mut seen = HashSet::with_capacity(keys.len());
    keys.into_iter()
        .filter(|k| seen.insert(k.clone()))
        .collect()
}

/// Runs the batch fetch once for `keys`. An empty key set issues no call.
pub(crate) async fn fetch<K, V, F>(
    load_fn: &Mutex<F>,
    batch: BatchId,
    keys: &[K],
) -> Result<HashMap<K, V>, F::Error>
where
    K: Debug,
    F: BatchFn<K, V>,
    F::Error: Debug,
{
    if keys.is_empty() {
        return Ok(HashMap::new());
    }
    tracing::debug!(batch, keys = keys.len(), "dispatching batch");
    let mut load_fn = load_fn.lock().await;
    let ret = load_fn.load(keys).await;
    drop(load_fn);
    match &ret {
        Ok(found) => tracing::debug!(batch, found = found.len(), "batch loaded"),
        Err(e) => tracing::warn!(batch, error = ?e, "batch fetch failed"),
    }
    ret
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_keys_keep_first_occurrence_order() {
        let keys = vec!["b", "a", "b", "c", "a"];
        assert_eq!(vec!["b", "a", "c"], unique_keys(keys));
    }

    #[test]
    fn unique_keys_of_nothing() {
        assert!(unique_keys(Vec::<u8>::new()).is_empty());
    }
}
