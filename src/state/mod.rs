//! Store state: async slices, reducer composition and the fold.

mod async_state;
mod fold;
mod reducer;
mod stream;

pub use async_state::{AsyncState, StoreState};
pub use fold::StateFold;
pub use reducer::{AsyncSliceReducer, ComposedReducer, Reducer};
pub use stream::StateStream;
pub(crate) use stream::{StateHub, StatePublisher};
