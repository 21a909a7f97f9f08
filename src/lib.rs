//! Reactive state store with linked async services.
//!
//! # Architecture
//!
//! ```text
//! dispatch ──→ ActionChannel ──→ async slices + reducer ──→ StateFold ──→ state()
//!    ↑               │
//!    │               └──→ link effects / declared effects
//!    └────────────────────────────┘
//! ```
//!
//! - **Action**: `{kind, payload}`, where `kind` is an identity-compared [`Identifier`]
//! - **Link**: binds a state slice and a START/END/ERR family to an async service;
//!   the slice's `{loading, data, err}` is kept up to date without reducer code
//! - **Store**: folds actions into state and runs every effect until destroyed

pub mod action;
pub mod config;
pub mod declarations;
pub mod effect;
pub mod link;
pub mod state;
pub mod store;

pub use action::{Action, ActionChannel, ActionReceiver, AsyncPhase, AsyncTypeTriple, Identifier};
pub use config::{ChannelSettings, ConfigError, LinkServiceDefaults, StoreConfig};
pub use declarations::{ActionTypes, DeclarationError, Declarations};
pub use effect::{EffectContext, NamedEffect};
pub use link::{LinkConfigError, LinkServiceConfig};
pub use state::{AsyncState, Reducer, StateStream, StoreState};
pub use store::{InitOptions, Store, StoreError};
