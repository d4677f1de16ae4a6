#![allow(dead_code)]

use async_trait::async_trait;
use labelloader::{AccountLabels, BatchFn, LabelStore};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Panics when a key is fetched twice; remembers the largest batch seen.
#[derive(Clone, Default)]
pub struct LoadFnWithHistory {
    pub loaded_keys: Arc<Mutex<HashSet<usize>>>,
    pub max_batch_loaded: Arc<Mutex<usize>>,
}

#[async_trait]
impl BatchFn<usize, usize> for LoadFnWithHistory {
    type Error = ();

    async fn load(&mut self, keys: &[usize]) -> Result<HashMap<usize, usize>, ()> {
        let mut loaded_keys = self.loaded_keys.lock().unwrap();
        let mut max_batch_loaded = self.max_batch_loaded.lock().unwrap();
        if keys.len() > *max_batch_loaded {
            *max_batch_loaded = keys.len();
        }
        for k in keys {
            if !loaded_keys.insert(*k) {
                panic!("already loaded, loader should not request same key");
            }
        }
        // odd keys have no value
        Ok(keys
            .iter()
            .filter(|v| *v % 2 == 0)
            .map(|v| (*v, *v * 10))
            .collect())
    }
}

/// Counts the queries that reach a [`LabelStore`].
#[derive(Clone)]
pub struct CountingStore {
    pub inner: LabelStore,
    pub calls: Arc<AtomicUsize>,
}

impl CountingStore {
    pub fn new(inner: LabelStore) -> CountingStore {
        CountingStore {
            inner,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BatchFn<String, AccountLabels> for CountingStore {
    type Error = labelloader::error::LabelsError;

    async fn load(
        &mut self,
        keys: &[String],
    ) -> Result<HashMap<String, AccountLabels>, Self::Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.load(keys).await
    }
}

pub const VITALIK: &str = "0xd8da6bf26964af9d7eed9e03e53415d37aa96045";
pub const BINANCE: &str = "0x28c6c06298d514db089934071355e5743bf21d60";
pub const UNKNOWN: &str = "0x0000000000000000000000000000000000000001";

pub fn seeded_store() -> LabelStore {
    let store = LabelStore::open_in_memory("1").unwrap();
    store.create_schema().unwrap();
    store.insert(VITALIK, Some("vitalik.eth"), Some("ens")).unwrap();
    store.insert(BINANCE, Some("Binance 14"), Some("cex")).unwrap();
    store
        .insert(BINANCE, Some("Binance 14"), Some("hot-wallet"))
        .unwrap();
    store
}
