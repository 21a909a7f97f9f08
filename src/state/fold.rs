//! The action→state fold behind a store's state stream.

use crate::action::{Action, ActionReceiver};
use crate::state::async_state::StoreState;
use crate::state::reducer::ComposedReducer;
use crate::state::stream::StatePublisher;

/// Running accumulation of state over actions.
///
/// Only states that differ from the previous one count as emissions.
pub struct StateFold<S> {
    state: S,
    reducer: ComposedReducer<S>,
    emissions: u64,
}

impl<S: StoreState> StateFold<S> {
    pub fn new(initial_state: S, reducer: ComposedReducer<S>) -> Self {
        Self {
            state: initial_state,
            reducer,
            emissions: 0,
        }
    }

    /// Fold one action. Returns the new state if it changed.
    pub fn apply(&mut self, action: &Action) -> Option<&S> {
        let next = self.reducer.reduce(self.state.clone(), action);
        if next == self.state {
            return None;
        }
        self.state = next;
        self.emissions += 1;
        Some(&self.state)
    }

    pub fn state(&self) -> &S {
        &self.state
    }

    pub fn emissions(&self) -> u64 {
        self.emissions
    }

    /// Fold every action from `actions` and publish each change until the
    /// channel closes or the task is aborted.
    pub(crate) async fn run(
        mut self,
        mut actions: ActionReceiver,
        publisher: &StatePublisher<S>,
    ) {
        while let Some(action) = actions.recv().await {
            if let Some(next) = self.apply(&action) {
                publisher.publish(next.clone());
            }
        }
        tracing::debug!(emissions = self.emissions, "State fold finished");
    }
}
