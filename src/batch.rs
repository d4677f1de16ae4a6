use futures::channel::oneshot;
use std::collections::HashMap;
use std::hash::Hash;

use crate::error::LoadError;

pub(crate) type BatchId = usize;

/// What a request settles to: a value, an explicit absence, or the failure of
/// the batch it rode in.
pub type Outcome<V, E> = Result<Option<V>, LoadError<E>>;

/// Sending half of a request's single-resolution slot.
pub(crate) type Slot<V, E> = oneshot::Sender<Outcome<V, E>>;

/// Keys collected during one window, in request order and with repeats, plus
/// the slots waiting on each key.
pub(crate) struct Batch<K, V, E> {
    id: BatchId,
    keys: Vec<K>,
    pending: HashMap<K, Vec<Slot<V, E>>>,
}

impl<K, V, E> Batch<K, V, E>
where
    K: Eq + Hash + Clone,
{
    pub(crate) fn new(id: BatchId) -> Self {
        Batch {
            id,
            keys: Vec::new(),
            pending: HashMap::new(),
        }
    }

    pub(crate) fn id(&self) -> BatchId {
        self.id
    }

    /// Appends `key` and registers a fresh slot for it. Repeated keys get
    /// their own slot each.
    pub(crate) fn push(&mut self, key: K) -> oneshot::Receiver<Outcome<V, E>> {
        let (tx, rx) = oneshot::channel();
        self.keys.push(key.clone());
        self.pending.entry(key).or_default().push(tx);
        rx
    }

    pub(crate) fn contains(&self, key: &K) -> bool {
        self.pending.contains_key(key)
    }

    pub(crate) fn len(&self) -> usize {
        self.keys.len()
    }

    pub(crate) fn into_parts(self) -> (Vec<K>, HashMap<K, Vec<Slot<V, E>>>) {
        (self.keys, self.pending)
    }
}

pub(crate) enum RequestState<V, E> {
    Resolved(Outcome<V, E>),
    AwaitingBatch {
        /// The batch carrying the key: the window the request opened or
        /// joined, or the fetch it attached to.
        batch: BatchId,
        rx: oneshot::Receiver<Outcome<V, E>>,
    },
}

/// One caller's ask for one key.
pub(crate) struct PendingRequest<K, V, E> {
    key: K,
    state: RequestState<V, E>,
}

impl<K, V, E> PendingRequest<K, V, E> {
    pub(crate) fn resolved(key: K, outcome: Outcome<V, E>) -> Self {
        PendingRequest {
            key,
            state: RequestState::Resolved(outcome),
        }
    }

    pub(crate) fn awaiting(key: K, batch: BatchId, rx: oneshot::Receiver<Outcome<V, E>>) -> Self {
        PendingRequest {
            key,
            state: RequestState::AwaitingBatch { batch, rx },
        }
    }

    #[cfg(test)]
    pub(crate) fn key(&self) -> &K {
        &self.key
    }

    #[cfg(test)]
    pub(crate) fn is_resolved(&self) -> bool {
        matches!(self.state, RequestState::Resolved(_))
    }

    pub(crate) fn into_parts(self) -> (K, RequestState<V, E>) {
        (self.key, self.state)
    }
}
