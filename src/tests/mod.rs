use crate::BatchFn;
use async_trait::async_trait;
use futures::channel::oneshot;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};


#[derive(Clone, Debug, PartialEq)]
pub enum MyError {
    Unknown,
}

/// Answers `(batch call seq, lowercased key)` for every key not in `omit`,
/// recording the keys of each call.
#[derive(Clone, Default)]
pub struct Batcher {
    calls: Arc<Mutex<Vec<Vec<&'static str>>>>,
    omit: HashSet<&'static str>,
    failures_left: Arc<AtomicUsize>,
    gate: Arc<Mutex<Option<oneshot::Receiver<()>>>>,
}

impl Batcher {
    pub fn new() -> Batcher {
        Batcher::default()
    }

    pub fn omitting(keys: &[&'static str]) -> Batcher {
        Batcher {
            omit: keys.iter().copied().collect(),
            ..Batcher::default()
        }
    }

    /// The next `n` calls fail as a whole.
    pub fn failing(n: usize) -> Batcher {
        Batcher {
            failures_left: Arc::new(AtomicUsize::new(n)),
            ..Batcher::default()
        }
    }

    /// The first call waits until the returned sender fires or is dropped.
    pub fn gated() -> (Batcher, oneshot::Sender<()>) {
        let (tx, rx) = oneshot::channel();
        let batcher = Batcher {
            gate: Arc::new(Mutex::new(Some(rx))),
            ..Batcher::default()
        };
        (batcher, tx)
    }

    pub fn calls(&self) -> Vec<Vec<&'static str>> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl BatchFn<&'static str, (usize, String)> for Batcher {
    type Error = MyError;

    async fn load(
        &mut self,
        keys: &[&'static str],
    ) -> Result<HashMap<&'static str, (usize, String)>, MyError> {
        let seq = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(keys.to_vec());
            calls.len()
        };
        let gate = self.gate.lock().unwrap().take();
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        let failing = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(MyError::Unknown);
        }
        Ok(keys
            .iter()
            .filter(|k| !self.omit.contains(*k))
            .map(|k| (*k, (seq, k.to_lowercase())))
            .collect())
    }
}
