use futures::future::{self, BoxFuture, FutureExt as _, Shared};
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::{Arc, Mutex as StdMutex, MutexGuard, PoisonError};

use crate::batch::{Batch, BatchId, Outcome, PendingRequest, RequestState, Slot};
use crate::cache::ScopeCache;
use crate::config::LoaderConfig;
use crate::runtime::Mutex;
use crate::{demux, dispatch, yield_fn, BatchFn, WaitForWorkFn};

/// A running fetch. Any of its waiters may drive it, so it completes as long
/// as one of them is still polling, or a later request attaches to it.
type Fetch = Shared<BoxFuture<'static, ()>>;

struct InFlight<K, V, E> {
    pending: HashMap<K, Vec<Slot<V, E>>>,
    fetch: Fetch,
}

struct State<K, V, E> {
    cache: ScopeCache<K, V>,
    open: Option<Batch<K, V, E>>,
    flights: HashMap<BatchId, InFlight<K, V, E>>,
    batch_seq: BatchId,
}

impl<K, V, E> State<K, V, E>
where
    K: Eq + Hash + Clone + Debug,
    V: Clone,
{
    fn new() -> Self {
        State {
            cache: ScopeCache::new(),
            open: None,
            flights: HashMap::new(),
            batch_seq: 0,
        }
    }

    fn is_open(&self, id: BatchId) -> bool {
        self.open.as_ref().is_some_and(|batch| batch.id() == id)
    }

    /// Whether `key` waits in the open window or on a running fetch.
    fn is_pending(&self, key: &K) -> bool {
        self.open.as_ref().is_some_and(|batch| batch.contains(key))
            || self.flights.values().any(|f| f.pending.contains_key(key))
    }

    /// Closes the open window if it is `id`. Returns the unique keys to fetch
    /// and the slots waiting on them.
    #[allow(clippy::type_complexity)]
    fn close_window(
        &mut self,
        id: Option<BatchId>,
    ) -> Option<(BatchId, Vec<K>, HashMap<K, Vec<Slot<V, E>>>)> {
        let open_id = self.open.as_ref()?.id();
        if id.is_some_and(|id| id != open_id) {
            return None;
        }
        let batch = self.open.take()?;
        let requested = batch.len();
        let (keys, pending) = batch.into_parts();
        let keys = dispatch::unique_keys(keys);
        tracing::debug!(
            batch = open_id,
            requested,
            unique = keys.len(),
            "closing window"
        );
        Some((open_id, keys, pending))
    }
}

/// One resolution scope: a write-once cache plus the batch currently being
/// accumulated, both discarded when the last clone of the scope is dropped.
///
/// Every [`resolve`](Scope::resolve) issued within one window is coalesced
/// into a single call of the batch function. A window stays open while the
/// requesters wait for work (by default, a few yields to the executor) and is
/// then flushed by whichever requester gets there first. Call
/// [`dispatch`](Scope::dispatch) to close it explicitly.
pub struct Scope<K, V, F>
where
    F: BatchFn<K, V>,
{
    state: Arc<StdMutex<State<K, V, F::Error>>>,
    load_fn: Arc<Mutex<F>>,
    wait_for_work_fn: Arc<dyn WaitForWorkFn>,
}

// Manual implementation is used to omit applying unnecessary Clone bounds.
impl<K, V, F> Clone for Scope<K, V, F>
where
    F: BatchFn<K, V>,
{
    fn clone(&self) -> Self {
        Scope {
            state: self.state.clone(),
            load_fn: self.load_fn.clone(),
            wait_for_work_fn: self.wait_for_work_fn.clone(),
        }
    }
}

impl<K, V, F> Scope<K, V, F>
where
    K: Eq + Hash + Clone + Debug + Send + Sync + 'static,
    V: Clone + Send + 'static,
    F: BatchFn<K, V> + Send + 'static,
    F::Error: Debug + Send + Sync + 'static,
{
    pub fn new(load_fn: F) -> Self {
        Self::with_config(load_fn, &LoaderConfig::default())
    }

    pub fn with_config(load_fn: F, config: &LoaderConfig) -> Self {
        Self::with_yield_count(load_fn, config.yield_count)
    }

    pub fn with_yield_count(load_fn: F, yield_count: usize) -> Self {
        Scope {
            state: Arc::new(StdMutex::new(State::new())),
            load_fn: Arc::new(Mutex::new(load_fn)),
            wait_for_work_fn: Arc::new(yield_fn(yield_count)),
        }
    }

    /// Replaces the wait that keeps a window open after a request joins it.
    pub fn with_wait_for_work_fn(mut self, wait_for_work_fn: impl WaitForWorkFn) -> Self {
        self.wait_for_work_fn = Arc::new(wait_for_work_fn);
        self
    }

    /// Resolves `key` to its value, `None` when the fetch has nothing for it.
    ///
    /// Each key reaches the batch function at most once per scope, however
    /// many callers ask for it. Absence is cached; a failed batch is not, so a
    /// later call for the same key fetches again.
    pub async fn resolve(&self, key: K) -> Outcome<V, F::Error> {
        loop {
            let request = self.request(key.clone());
            if let Some(outcome) = self.settle(request).await {
                return outcome;
            }
        }
    }

    /// Resolves all `keys` in one window. Results keep the order of `keys`.
    pub async fn resolve_many(&self, keys: Vec<K>) -> Vec<Outcome<V, F::Error>> {
        future::join_all(keys.into_iter().map(|key| self.resolve(key))).await
    }

    /// Closes the open window now and fetches its keys.
    pub async fn dispatch(&self) {
        self.flush(None).await
    }

    /// Seeds the cache with `value` unless `key` already has an outcome or
    /// is waiting to be fetched. Returns whether the value was recorded.
    pub fn prime(&self, key: K, value: V) -> bool {
        let mut state = self.lock_state();
        if state.cache.contains_key(&key) || state.is_pending(&key) {
            return false;
        }
        state.cache.put(key, Some(value)).is_ok()
    }

    /// The outcome recorded for `key` in this scope, if any.
    pub fn cached(&self, key: &K) -> Option<Option<V>> {
        self.lock_state().cache.get(key)
    }

    /// Registers interest in `key`: a cache hit comes back resolved, a key
    /// being fetched gets a slot on the running fetch, anything else joins
    /// the open window, opening one if needed.
    pub(crate) fn request(&self, key: K) -> PendingRequest<K, V, F::Error> {
        let mut state = self.lock_state();
        if let Some(outcome) = state.cache.get(&key) {
            tracing::trace!(?key, "scope cache hit");
            return PendingRequest::resolved(key, Ok(outcome));
        }
        let attached = state.flights.iter_mut().find_map(|(id, flight)| {
            flight.pending.get_mut(&key).map(|slots| {
                let (tx, rx) = futures::channel::oneshot::channel();
                slots.push(tx);
                (*id, rx)
            })
        });
        if let Some((batch, rx)) = attached {
            tracing::trace!(?key, batch, "attached to in-flight fetch");
            return PendingRequest::awaiting(key, batch, rx);
        }
        let State {
            open, batch_seq, ..
        } = &mut *state;
        let batch = open.get_or_insert_with(|| {
            *batch_seq = batch_seq.wrapping_add(1);
            tracing::debug!(batch = *batch_seq, "opening window");
            Batch::new(*batch_seq)
        });
        let rx = batch.push(key.clone());
        let id = batch.id();
        PendingRequest::awaiting(key, id, rx)
    }

    /// Drives `request` to its outcome. `None` means its slot was dropped
    /// without an outcome and the request must be issued again.
    pub(crate) async fn settle(
        &self,
        request: PendingRequest<K, V, F::Error>,
    ) -> Option<Outcome<V, F::Error>> {
        let (key, state) = request.into_parts();
        match state {
            RequestState::Resolved(outcome) => Some(outcome),
            RequestState::AwaitingBatch { batch, rx } => {
                let open = self.lock_state().is_open(batch);
                if open {
                    (self.wait_for_work_fn)().await;
                }
                self.flush(Some(batch)).await;
                match rx.await {
                    Ok(outcome) => Some(outcome),
                    Err(_) => {
                        tracing::debug!(?key, batch, "result slot dropped");
                        None
                    }
                }
            }
        }
    }

    /// Flushes the open window, or only window `id` when given and still
    /// open, then drives the fetch until it completes. A window that is
    /// already closed has its running fetch driven instead.
    async fn flush(&self, id: Option<BatchId>) {
        let fetch = {
            let mut state = self.lock_state();
            match state.close_window(id) {
                Some((batch, keys, pending)) => {
                    let fetch = self.launch(batch, keys);
                    state.flights.insert(
                        batch,
                        InFlight {
                            pending,
                            fetch: fetch.clone(),
                        },
                    );
                    Some(fetch)
                }
                None => id.and_then(|id| state.flights.get(&id).map(|f| f.fetch.clone())),
            }
        };
        if let Some(fetch) = fetch {
            fetch.await;
        }
    }

    /// The fetch of batch `batch`, handing its result to the batch's waiters
    /// once it returns.
    fn launch(&self, batch: BatchId, keys: Vec<K>) -> Fetch {
        let load_fn = self.load_fn.clone();
        let state = Arc::downgrade(&self.state);
        async move {
            let result = dispatch::fetch(&load_fn, batch, &keys).await;
            // every clone of the scope is gone: nobody is waiting
            let state = match state.upgrade() {
                Some(state) => state,
                None => return,
            };
            let mut state = lock(&state);
            let State { cache, flights, .. } = &mut *state;
            if let Some(mut flight) = flights.remove(&batch) {
                demux::demultiplex(&keys, result, &mut flight.pending, cache);
            }
        }
        .boxed()
        .shared()
    }

    fn lock_state(&self) -> MutexGuard<'_, State<K, V, F::Error>> {
        lock(&self.state)
    }
}

fn lock<T>(mutex: &StdMutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
