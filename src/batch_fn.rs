use async_trait::async_trait;
use std::collections::HashMap;

/// The downstream fetch a [`Scope`](crate::Scope) coalesces requests into.
///
/// `load` receives the unique keys of one batch in first-request order. Keys
/// missing from the returned map resolve to absent; extra keys are ignored.
/// An `Err` fails every request waiting on the batch.
#[async_trait]
pub trait BatchFn<K, V> {
    type Error;

    async fn load(&mut self, keys: &[K]) -> Result<HashMap<K, V>, Self::Error>
    where
        K: 'async_trait,
        V: 'async_trait;
}
