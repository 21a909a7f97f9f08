use serde_json::Value;

use crate::action::identifier::Identifier;

/// A discrete event folded into store state.
#[derive(Debug, Clone, PartialEq)]
pub struct Action {
    pub kind: Identifier,
    pub payload: Value,
}

impl Action {
    /// Action without payload (`Value::Null`).
    pub fn new(kind: Identifier) -> Self {
        Self {
            kind,
            payload: Value::Null,
        }
    }

    pub fn with_payload(kind: Identifier, payload: impl Into<Value>) -> Self {
        Self {
            kind,
            payload: payload.into(),
        }
    }

    pub fn is(&self, kind: &Identifier) -> bool {
        self.kind == *kind
    }
}
