use std::sync::Arc;

use parking_lot::Mutex;
use tokio::task::JoinHandle;

#[derive(Default)]
struct Tasks {
    handles: Vec<(String, JoinHandle<()>)>,
    closed: bool,
}

/// Handle on every task started by one `init`.
///
/// Clones share the same task set, so a store task can stop its siblings.
/// Dropping the handle does not stop the tasks; call [`Subscription::unsubscribe`].
#[derive(Clone, Default)]
pub struct Subscription {
    tasks: Arc<Mutex<Tasks>>,
}

impl Subscription {
    /// Track `handle`. A task pushed after `unsubscribe` is aborted at once.
    pub(crate) fn push(&self, name: impl Into<String>, handle: JoinHandle<()>) {
        let mut tasks = self.tasks.lock();
        if tasks.closed {
            handle.abort();
            return;
        }
        tasks.handles.push((name.into(), handle));
    }

    pub fn len(&self) -> usize {
        self.tasks.lock().handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.lock().handles.is_empty()
    }

    /// False once `unsubscribe` has run.
    pub fn is_active(&self) -> bool {
        !self.tasks.lock().closed
    }

    /// Abort every task. Folding and effect processing stop at their next
    /// suspension point.
    ///
    /// Returns false if the subscription was already closed.
    pub fn unsubscribe(&self) -> bool {
        let handles = {
            let mut tasks = self.tasks.lock();
            if tasks.closed {
                return false;
            }
            tasks.closed = true;
            std::mem::take(&mut tasks.handles)
        };
        for (name, handle) in handles {
            if handle.is_finished() {
                tracing::debug!(task = %name, "Store task had already finished");
            }
            handle.abort();
        }
        true
    }
}
