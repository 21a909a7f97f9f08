//! Store lifecycle: construction, `init`, `dispatch` and `destroy`.

mod container;
mod error;
mod subscription;

pub use container::{InitOptions, Store, INIT_ACTION_LABEL};
pub use error::StoreError;
pub use subscription::Subscription;
