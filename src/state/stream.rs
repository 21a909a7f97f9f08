//! Fan-out of folded states to subscribers.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;

use crate::state::async_state::StoreState;
use crate::store::StoreError;

struct Hub<S> {
    latest: S,
    subscribers: Vec<mpsc::UnboundedSender<S>>,
    closed: bool,
}

/// Latest state plus one queue per subscriber.
///
/// Publishing and subscribing take the same lock, so a new subscriber gets
/// the latest state followed by every later emission, with nothing skipped
/// or repeated.
pub(crate) struct StateHub<S> {
    inner: Arc<Mutex<Hub<S>>>,
}

impl<S> Clone for StateHub<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: StoreState> StateHub<S> {
    pub(crate) fn new(initial_state: S) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Hub {
                latest: initial_state,
                subscribers: Vec::new(),
                closed: false,
            })),
        }
    }

    pub(crate) fn subscribe(&self) -> StateStream<S> {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut hub = self.inner.lock();
        // Cannot fail: `rx` is alive.
        let _ = tx.send(hub.latest.clone());
        if !hub.closed {
            hub.subscribers.push(tx);
        }
        StateStream {
            hub: self.clone(),
            rx,
        }
    }

    fn latest(&self) -> S {
        self.inner.lock().latest.clone()
    }
}

/// Write side of a [`StateHub`], owned by the fold task.
///
/// Dropping it closes every subscriber's stream once they have drained
/// what was already published.
pub(crate) struct StatePublisher<S: StoreState> {
    hub: StateHub<S>,
}

impl<S: StoreState> StatePublisher<S> {
    pub(crate) fn new(hub: StateHub<S>) -> Self {
        Self { hub }
    }

    pub(crate) fn publish(&self, state: S) {
        let mut hub = self.hub.inner.lock();
        hub.subscribers.retain(|tx| tx.send(state.clone()).is_ok());
        hub.latest = state;
    }
}

impl<S: StoreState> Drop for StatePublisher<S> {
    fn drop(&mut self) {
        let mut hub = self.hub.inner.lock();
        hub.closed = true;
        hub.subscribers.clear();
    }
}

/// Subscriber view of a store's state.
///
/// Yields the state current at subscription time, then every emitted state
/// in fold order. A subscriber that never reads keeps queuing states.
pub struct StateStream<S> {
    hub: StateHub<S>,
    rx: mpsc::UnboundedReceiver<S>,
}

impl<S: StoreState> StateStream<S> {
    /// Latest folded state, regardless of what this subscriber has read.
    pub fn current(&self) -> S {
        self.hub.latest()
    }

    /// Next state for this subscriber.
    ///
    /// # Errors
    /// `StateClosed` once the fold has stopped (destroy, or a panic in a
    /// store task) and every queued state has been read.
    pub async fn recv(&mut self) -> Result<S, StoreError> {
        self.rx.recv().await.ok_or(StoreError::StateClosed)
    }

    /// Read states until one matches `predicate` and return it.
    pub async fn wait_for<F>(&mut self, mut predicate: F) -> Result<S, StoreError>
    where
        F: FnMut(&S) -> bool,
    {
        loop {
            let state = self.recv().await?;
            if predicate(&state) {
                return Ok(state);
            }
        }
    }

    pub fn into_stream(self) -> UnboundedReceiverStream<S> {
        UnboundedReceiverStream::new(self.rx)
    }
}
