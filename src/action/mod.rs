//! Actions, their identifiers, and the channel they travel on.

mod channel;
mod identifier;
mod types;

pub use channel::{ActionChannel, ActionReceiver};
pub use identifier::{AsyncPhase, AsyncTypeTriple, Identifier};
pub use types::Action;
