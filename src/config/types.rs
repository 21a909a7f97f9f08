use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Transform applied to an END or ERR payload before it lands in a slice.
pub type Selector = Arc<dyn Fn(Value) -> Value + Send + Sync>;

/// Wrap a closure as a [`Selector`].
pub fn selector<F>(f: F) -> Selector
where
    F: Fn(Value) -> Value + Send + Sync + 'static,
{
    Arc::new(f)
}

pub fn identity_selector() -> Selector {
    Arc::new(|payload: Value| payload)
}

/// Store-wide selector defaults for linked services.
#[derive(Clone, Default)]
pub struct LinkServiceDefaults {
    pub data_selector: Option<Selector>,
    pub error_selector: Option<Selector>,
}

impl fmt::Debug for LinkServiceDefaults {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LinkServiceDefaults")
            .field("data_selector", &self.data_selector.is_some())
            .field("error_selector", &self.error_selector.is_some())
            .finish()
    }
}

/// Optional configuration handed to a store at construction.
#[derive(Debug, Clone, Default)]
pub struct StoreConfig {
    pub link_service: LinkServiceDefaults,
}

/// Selectors with every default filled in.
#[derive(Clone)]
pub struct ResolvedLinkService {
    pub data_selector: Selector,
    pub error_selector: Selector,
}

/// What [`crate::Store::store_config`] returns: identity merged with any
/// configured defaults.
#[derive(Clone)]
pub struct ResolvedStoreConfig {
    pub link_service: ResolvedLinkService,
}

impl StoreConfig {
    pub fn resolve(config: Option<&StoreConfig>) -> ResolvedStoreConfig {
        let defaults = config.map(|c| c.link_service.clone()).unwrap_or_default();
        ResolvedStoreConfig {
            link_service: ResolvedLinkService {
                data_selector: defaults.data_selector.unwrap_or_else(identity_selector),
                error_selector: defaults.error_selector.unwrap_or_else(identity_selector),
            },
        }
    }
}

/// Action channel tuning.
///
/// The channel never drops actions; this only controls when a slow
/// receiver is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelSettings {
    /// Queued actions on one receiver before it logs a warning.
    pub backlog_warning: usize,
}

impl Default for ChannelSettings {
    fn default() -> Self {
        Self {
            backlog_warning: default_backlog_warning(),
        }
    }
}

fn default_backlog_warning() -> usize {
    1024
}
