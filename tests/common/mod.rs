//! Shared test state and helpers.

#![allow(dead_code, unused_imports)]

use rxstore::{Action, AsyncState, Identifier, StateStream, StoreError, StoreState};
use std::time::Duration;

pub const WAIT: Duration = Duration::from_secs(2);

/// State with two linked slices and a plain counter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppState {
    pub users: AsyncState,
    pub posts: AsyncState,
    pub count: i64,
    pub init_seen: bool,
}

impl StoreState for AppState {
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

/// Reducer adding the payload of `increment` actions and flagging `@@INIT`.
pub fn counting_reducer(
    increment: Identifier,
) -> impl Fn(AppState, &Action) -> AppState + Send + Sync + 'static {
    move |mut state: AppState, action: &Action| {
        if action.is(&increment) {
            state.count += action.payload.as_i64().unwrap_or(1);
        }
        if action.kind.label() == rxstore::store::INIT_ACTION_LABEL {
            state.init_seen = true;
        }
        state
    }
}

pub fn passthrough(state: AppState, _action: &Action) -> AppState {
    state
}

/// Wait until `predicate` holds, failing the test after [`WAIT`].
pub async fn wait_for<F>(stream: &mut StateStream<AppState>, predicate: F) -> AppState
where
    F: FnMut(&AppState) -> bool,
{
    tokio::time::timeout(WAIT, stream.wait_for(predicate))
        .await
        .expect("timed out waiting for state")
        .expect("state stream closed")
}

/// Every state read until `predicate` holds, the matching one included.
pub async fn collect_until<F>(
    stream: &mut StateStream<AppState>,
    mut predicate: F,
) -> Vec<AppState>
where
    F: FnMut(&AppState) -> bool,
{
    let mut seen = Vec::new();
    let reached = tokio::time::timeout(WAIT, async {
        loop {
            let state = stream.recv().await.expect("state stream closed");
            let done = predicate(&state);
            seen.push(state);
            if done {
                return;
            }
        }
    })
    .await;
    assert!(reached.is_ok(), "timed out waiting for state");
    seen
}

/// Read the states still queued on `stream` until it closes.
pub async fn drain_until_closed(stream: &mut StateStream<AppState>) -> Vec<AppState> {
    tokio::time::timeout(WAIT, async {
        let mut rest = Vec::new();
        loop {
            match stream.recv().await {
                Ok(state) => rest.push(state),
                Err(StoreError::StateClosed) => return rest,
                Err(other) => panic!("unexpected state error: {other}"),
            }
        }
    })
    .await
    .expect("state stream did not close")
}
