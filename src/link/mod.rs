//! Linked services: declarative START/END/ERR bindings between a state
//! slice and an async call.

mod config;
mod effect;
mod registry;

pub use config::{
    LinkConfigError, LinkServiceConfig, LinkSlice, ServiceFn, ServiceFuture, ValidLink,
};
pub use effect::LinkEffect;
pub use registry::AsyncLinkRegistry;
