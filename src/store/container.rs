//! The store: owns the action channel, the link registry and the running
//! fold/effect tasks.

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::future::FutureExt;
use futures::stream::{BoxStream, StreamExt};
use parking_lot::Mutex;
use tokio::runtime::Handle;

use crate::action::{Action, ActionChannel, Identifier};
use crate::config::{ResolvedStoreConfig, StoreConfig};
use crate::declarations::{ActionTypes, Declarations};
use crate::effect::{EffectContext, NamedEffect};
use crate::link::{AsyncLinkRegistry, LinkEffect, LinkServiceConfig};
use crate::state::{
    AsyncSliceReducer, ComposedReducer, Reducer, StateFold, StateHub, StatePublisher, StateStream,
    StoreState,
};
use crate::store::error::StoreError;
use crate::store::subscription::Subscription;

/// Label of the action every `init` dispatches first.
pub const INIT_ACTION_LABEL: &str = "@@INIT";

/// Initial state and user reducer handed to [`Store::init`].
pub struct InitOptions<S> {
    pub initial_state: S,
    pub reducer: Arc<dyn Reducer<S>>,
}

impl<S: StoreState> InitOptions<S> {
    pub fn new<F>(initial_state: S, reducer: F) -> Self
    where
        F: Fn(S, &Action) -> S + Send + Sync + 'static,
    {
        Self::with_reducer(initial_state, reducer)
    }

    pub fn with_reducer(initial_state: S, reducer: impl Reducer<S>) -> Self {
        Self {
            initial_state,
            reducer: Arc::new(reducer),
        }
    }
}

impl<S: Clone> Clone for InitOptions<S> {
    fn clone(&self) -> Self {
        Self {
            initial_state: self.initial_state.clone(),
            reducer: Arc::clone(&self.reducer),
        }
    }
}

struct Lifecycle<S> {
    options: Option<InitOptions<S>>,
    state: Option<StateHub<S>>,
    subscription: Option<Subscription>,
}

/// Reactive state container.
///
/// Construct it, register links with [`Store::link_service`], then call
/// [`Store::init`] once from inside a tokio runtime. Every method takes
/// `&self`, so the store can be shared behind an `Arc` after setup.
pub struct Store<S: StoreState> {
    channel: ActionChannel,
    types: Arc<ActionTypes>,
    effects: Vec<NamedEffect>,
    config: Option<StoreConfig>,
    links: Mutex<AsyncLinkRegistry>,
    lifecycle: Mutex<Lifecycle<S>>,
}

impl<S: StoreState> Store<S> {
    /// Create a store and generate fresh identifiers for its declarations.
    ///
    /// # Errors
    /// Returns `Declaration` if a name is declared twice.
    pub fn new(
        channel: ActionChannel,
        declarations: Declarations,
        config: Option<StoreConfig>,
    ) -> Result<Self, StoreError> {
        let types = ActionTypes::generate(&declarations)?;
        Ok(Self {
            channel,
            types: Arc::new(types),
            effects: declarations.effects,
            config,
            links: Mutex::new(AsyncLinkRegistry::default()),
            lifecycle: Mutex::new(Lifecycle {
                options: None,
                state: None,
                subscription: None,
            }),
        })
    }

    /// Identifiers generated for this instance.
    pub fn types(&self) -> &ActionTypes {
        &self.types
    }

    pub fn channel(&self) -> &ActionChannel {
        &self.channel
    }

    /// Configured selector defaults merged over identity.
    pub fn store_config(&self) -> ResolvedStoreConfig {
        StoreConfig::resolve(self.config.as_ref())
    }

    /// Register a linked service. Only links registered before `init` are
    /// wired.
    pub fn link_service(&self, config: LinkServiceConfig) {
        if self.is_initialized() {
            tracing::warn!(
                link = %config.state,
                "Service link registered after init, it will not be wired"
            );
        }
        self.links.lock().register(config);
    }

    /// Broadcast `action` to the fold and every effect.
    pub fn dispatch(&self, action: Action) {
        self.channel.dispatch(action);
    }

    /// Subscribe to state. The returned stream starts at the latest state
    /// and then yields every emission.
    pub fn state(&self) -> Result<StateStream<S>, StoreError> {
        self.lifecycle
            .lock()
            .state
            .as_ref()
            .map(StateHub::subscribe)
            .ok_or(StoreError::NotInitialized)
    }

    pub fn options(&self) -> Option<InitOptions<S>> {
        self.lifecycle.lock().options.clone()
    }

    pub fn is_initialized(&self) -> bool {
        self.lifecycle.lock().options.is_some()
    }

    /// True between `init` and `destroy`, unless a store task panicked.
    pub fn is_running(&self) -> bool {
        self.lifecycle
            .lock()
            .subscription
            .as_ref()
            .is_some_and(Subscription::is_active)
    }

    /// Start the fold, every valid link effect and every declared effect,
    /// then dispatch a fresh `@@INIT` action.
    ///
    /// Invalid links are logged and skipped. A panic in any of the started
    /// tasks stops all of them and closes the state stream.
    ///
    /// # Errors
    /// `NoRuntime` outside a tokio runtime, `AlreadyInitialized` on a
    /// second call.
    pub fn init(&self, options: InitOptions<S>) -> Result<(), StoreError> {
        let runtime = Handle::try_current().map_err(|_| StoreError::NoRuntime)?;
        if self.is_initialized() {
            return Err(StoreError::AlreadyInitialized);
        }

        let resolved = self.store_config();
        let (registered, links) = {
            let registry = self.links.lock();
            let links = registry.wire(&options.initial_state, &resolved.link_service);
            (registry.len(), links)
        };

        let slices = links.iter().map(|link| link.slice.clone()).collect();
        let fold = StateFold::new(
            options.initial_state.clone(),
            ComposedReducer::new(AsyncSliceReducer::new(slices), Arc::clone(&options.reducer)),
        );
        let hub = StateHub::new(options.initial_state.clone());
        let publisher = StatePublisher::new(hub.clone());

        // Subscribe everything before any task can dispatch. Effect factories
        // are user code, so they run without the lifecycle lock.
        let fold_actions = self.channel.subscribe();
        let link_effects: Vec<(String, LinkEffect)> = links
            .iter()
            .map(|link| {
                let effect = LinkEffect::new(link, self.channel.subscribe(), self.channel.clone());
                (link.slice.key.clone(), effect)
            })
            .collect();
        let user_effects: Vec<(String, BoxStream<'static, Action>)> = self
            .effects
            .iter()
            .map(|effect| {
                let context = EffectContext {
                    actions: self.channel.subscribe(),
                    types: Arc::clone(&self.types),
                };
                (effect.name.clone(), (effect.run)(context))
            })
            .collect();

        let mut lifecycle = self.lifecycle.lock();
        if lifecycle.options.is_some() {
            return Err(StoreError::AlreadyInitialized);
        }

        let subscription = Subscription::default();
        let teardown = subscription.clone();
        subscription.push(
            "fold",
            runtime.spawn(async move {
                let fold = fold.run(fold_actions, &publisher);
                supervised("fold".to_string(), fold, teardown).await;
                // Subscribers see the stream close only after the other
                // tasks are stopped.
                drop(publisher);
            }),
        );
        for (key, effect) in link_effects {
            let name = format!("link:{key}");
            let task = supervised(name.clone(), effect.run(), subscription.clone());
            subscription.push(name, runtime.spawn(task));
        }
        for (effect, actions) in user_effects {
            let name = format!("effect:{effect}");
            let forward = forward_effect(effect, actions, self.channel.clone());
            let task = supervised(name.clone(), forward, subscription.clone());
            subscription.push(name, runtime.spawn(task));
        }

        tracing::info!(
            links = links.len(),
            skipped_links = registered - links.len(),
            effects = self.effects.len(),
            "Store initialized"
        );

        lifecycle.options = Some(options);
        lifecycle.state = Some(hub);
        lifecycle.subscription = Some(subscription);
        drop(lifecycle);

        self.dispatch(Action::new(Identifier::new(INIT_ACTION_LABEL)));
        Ok(())
    }

    /// Stop every task started by `init`. No-op if nothing is running.
    pub fn destroy(&self) {
        let subscription = self.lifecycle.lock().subscription.take();
        if let Some(subscription) = subscription {
            let tasks = subscription.len();
            if subscription.unsubscribe() {
                tracing::info!(tasks, "Store destroyed");
            }
        }
    }
}

impl<S: StoreState> Drop for Store<S> {
    fn drop(&mut self) {
        self.destroy();
    }
}

/// Run one store task. A panic in it stops every task of the store.
async fn supervised<F>(name: String, task: F, subscription: Subscription)
where
    F: Future<Output = ()>,
{
    if AssertUnwindSafe(task).catch_unwind().await.is_err() {
        tracing::error!(task = %name, "Store task panicked, stopping the store");
        subscription.unsubscribe();
    }
}

async fn forward_effect(
    name: String,
    mut actions: BoxStream<'static, Action>,
    channel: ActionChannel,
) {
    while let Some(action) = actions.next().await {
        channel.dispatch(action);
    }
    tracing::debug!(effect = %name, "Effect stream completed");
}
