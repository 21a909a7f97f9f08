//! Store configuration: selector defaults and action channel tuning.

mod loader;
mod types;

pub use loader::ConfigError;
pub use types::{
    identity_selector, selector, ChannelSettings, LinkServiceDefaults, ResolvedLinkService,
    ResolvedStoreConfig, Selector, StoreConfig,
};
