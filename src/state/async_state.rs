use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The `{loading, data, err}` slice a linked service maintains.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AsyncState {
    pub loading: bool,
    pub data: Value,
    pub err: Value,
}

impl AsyncState {
    /// Slice seeded with existing data, not loading, no error.
    pub fn with_data(data: impl Into<Value>) -> Self {
        Self {
            loading: false,
            data: data.into(),
            err: Value::Null,
        }
    }

    pub fn has_error(&self) -> bool {
        !self.err.is_null()
    }
}

/// State held by a store.
///
/// States should be:
/// - Immutable once published (the fold clones before updating)
/// - Comparable (PartialEq decides whether a new value is emitted)
/// - Addressable by slice key for every linked service
pub trait StoreState: Clone + PartialEq + Send + Sync + 'static {
    /// The async slice stored under `key`, if the state has one.
    fn async_slice(&self, key: &str) -> Option<&AsyncState>;

    fn async_slice_mut(&mut self, key: &str) -> Option<&mut AsyncState>;
}
