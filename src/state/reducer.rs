//! Reducer trait and the composition applied by the fold.

use std::sync::Arc;

use serde_json::Value;

use crate::action::{Action, AsyncPhase};
use crate::link::LinkSlice;
use crate::state::async_state::StoreState;

/// Reducer transforms state based on actions.
///
/// The reducer is the only place where state transitions happen.
/// It must be a pure function: (State, Action) -> State
pub trait Reducer<S>: Send + Sync + 'static {
    /// Process an action and return the new state.
    ///
    /// A panic here ends the store's fold; the state stream closes.
    fn reduce(&self, state: S, action: &Action) -> S;
}

impl<S, F> Reducer<S> for F
where
    F: Fn(S, &Action) -> S + Send + Sync + 'static,
{
    fn reduce(&self, state: S, action: &Action) -> S {
        self(state, action)
    }
}

/// Maintains the async slices of every wired link.
#[derive(Clone, Default)]
pub struct AsyncSliceReducer {
    slices: Vec<LinkSlice>,
}

impl AsyncSliceReducer {
    pub fn new(slices: Vec<LinkSlice>) -> Self {
        Self { slices }
    }

    pub fn reduce<S: StoreState>(&self, mut state: S, action: &Action) -> S {
        for slice in &self.slices {
            let Some(phase) = slice.triple.phase_of(&action.kind) else {
                continue;
            };
            let Some(current) = state.async_slice_mut(&slice.key) else {
                tracing::warn!(
                    slice = %slice.key,
                    action = %action.kind,
                    "Async slice missing from state, update skipped"
                );
                continue;
            };

            match phase {
                AsyncPhase::Start => {
                    current.loading = true;
                    current.err = Value::Null;
                }
                AsyncPhase::End => {
                    current.loading = false;
                    current.data = (slice.data_selector)(action.payload.clone());
                }
                AsyncPhase::Err => {
                    current.loading = false;
                    current.err = (slice.error_selector)(action.payload.clone());
                }
            }
        }
        state
    }
}

/// Async slice pass followed by the user reducer, for every action.
pub struct ComposedReducer<S> {
    async_slices: AsyncSliceReducer,
    user: Arc<dyn Reducer<S>>,
}

impl<S: StoreState> ComposedReducer<S> {
    pub fn new(async_slices: AsyncSliceReducer, user: Arc<dyn Reducer<S>>) -> Self {
        Self { async_slices, user }
    }

    pub fn reduce(&self, state: S, action: &Action) -> S {
        let state = self.async_slices.reduce(state, action);
        self.user.reduce(state, action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{AsyncTypeTriple, Identifier};
    use crate::config::{identity_selector, selector};
    use crate::state::async_state::AsyncState;
    use serde_json::json;

    #[derive(Debug, Clone, Default, PartialEq)]
    struct TwoSlices {
        users: AsyncState,
        posts: AsyncState,
        seen_loading: bool,
    }

    impl StoreState for TwoSlices {
        fn async_slice(&self, key: &str) -> Option<&AsyncState> {
            match key {
                "users" => Some(&self.users),
                "posts" => Some(&self.posts),
                _ => None,
            }
        }

        fn async_slice_mut(&mut self, key: &str) -> Option<&mut AsyncState> {
            match key {
                "users" => Some(&mut self.users),
                "posts" => Some(&mut self.posts),
                _ => None,
            }
        }
    }

    fn slice(key: &str, triple: &AsyncTypeTriple) -> LinkSlice {
        LinkSlice {
            key: key.to_string(),
            triple: triple.clone(),
            data_selector: selector(|v| v["items"].clone()),
            error_selector: identity_selector(),
        }
    }

    #[test]
    fn start_end_err_protocol() {
        let users = AsyncTypeTriple::new("users");
        let reducer = AsyncSliceReducer::new(vec![slice("users", &users)]);
        let initial = TwoSlices {
            users: AsyncState {
                loading: false,
                data: json!(["old"]),
                err: json!("stale"),
            },
            ..Default::default()
        };

        let started = reducer.reduce(initial, &Action::new(users.start.clone()));
        assert!(started.users.loading);
        assert_eq!(started.users.err, json!(null));
        assert_eq!(started.users.data, json!(["old"]));

        let ended = reducer.reduce(
            started.clone(),
            &Action::with_payload(users.end.clone(), json!({"items": [1, 2, 3]})),
        );
        assert!(!ended.users.loading);
        assert_eq!(ended.users.data, json!([1, 2, 3]));

        let failed = reducer.reduce(
            started,
            &Action::with_payload(users.err.clone(), json!("timeout")),
        );
        assert!(!failed.users.loading);
        assert_eq!(failed.users.err, json!("timeout"));
        assert_eq!(failed.users.data, json!(["old"]));
    }

    #[test]
    fn unrelated_actions_leave_state_alone() {
        let users = AsyncTypeTriple::new("users");
        let reducer = AsyncSliceReducer::new(vec![slice("users", &users)]);
        let state = TwoSlices::default();

        let next = reducer.reduce(state.clone(), &Action::new(Identifier::new("users/START")));
        assert_eq!(next, state);
    }

    #[test]
    fn other_slices_untouched() {
        let users = AsyncTypeTriple::new("users");
        let posts = AsyncTypeTriple::new("posts");
        let reducer =
            AsyncSliceReducer::new(vec![slice("users", &users), slice("posts", &posts)]);

        let next = reducer.reduce(TwoSlices::default(), &Action::new(posts.start.clone()));
        assert!(next.posts.loading);
        assert_eq!(next.users, AsyncState::default());
    }

    #[test]
    fn user_reducer_sees_updated_slice() {
        let users = AsyncTypeTriple::new("users");
        let composed = ComposedReducer::new(
            AsyncSliceReducer::new(vec![slice("users", &users)]),
            Arc::new(|mut state: TwoSlices, _action: &Action| {
                state.seen_loading = state.users.loading;
                state
            }),
        );

        let next = composed.reduce(TwoSlices::default(), &Action::new(users.start.clone()));
        assert!(next.seen_loading);
    }
}
