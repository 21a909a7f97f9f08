//! User-declared effects: action streams started at `init` and fed back
//! into the store's channel.

use std::fmt;
use std::sync::Arc;

use futures::stream::BoxStream;

use crate::action::{Action, ActionReceiver};
use crate::declarations::ActionTypes;

/// Everything an effect can see when it starts.
pub struct EffectContext {
    /// Subscription taken before the store's `@@INIT` action is sent.
    pub actions: ActionReceiver,
    pub types: Arc<ActionTypes>,
}

pub type EffectFn = Arc<dyn Fn(EffectContext) -> BoxStream<'static, Action> + Send + Sync>;

/// An effect plus the name it is logged under.
#[derive(Clone)]
pub struct NamedEffect {
    pub name: String,
    pub run: EffectFn,
}

impl NamedEffect {
    pub fn new<F>(name: impl Into<String>, run: F) -> Self
    where
        F: Fn(EffectContext) -> BoxStream<'static, Action> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            run: Arc::new(run),
        }
    }
}

impl fmt::Debug for NamedEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NamedEffect").field("name", &self.name).finish()
    }
}
