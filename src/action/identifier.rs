//! Identity-compared action kinds.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use uuid::Uuid;

/// A unique token naming an action kind.
///
/// The label is for humans only. Two identifiers created with the same
/// label are still different identifiers, so actions declared by one store
/// can never be matched by another store's filters.
#[derive(Clone)]
pub struct Identifier {
    token: Uuid,
    label: Arc<str>,
}

impl Identifier {
    /// Create a fresh identifier.
    pub fn new(label: impl Into<Arc<str>>) -> Self {
        Self {
            token: Uuid::new_v4(),
            label: label.into(),
        }
    }

    /// Human-readable label given at creation.
    pub fn label(&self) -> &str {
        &self.label
    }
}

impl PartialEq for Identifier {
    fn eq(&self, other: &Self) -> bool {
        self.token == other.token
    }
}

impl Eq for Identifier {}

impl Hash for Identifier {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.token.hash(state);
    }
}

impl fmt::Debug for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Identifier({})", self.label)
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

/// Which leg of an async family an identifier belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AsyncPhase {
    Start,
    End,
    Err,
}

/// START/END/ERR identifiers generated for one async action family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AsyncTypeTriple {
    pub start: Identifier,
    pub end: Identifier,
    pub err: Identifier,
}

impl AsyncTypeTriple {
    /// Generate three fresh identifiers labelled `<name>/START` etc.
    pub fn new(name: &str) -> Self {
        Self {
            start: Identifier::new(format!("{name}/START")),
            end: Identifier::new(format!("{name}/END")),
            err: Identifier::new(format!("{name}/ERR")),
        }
    }

    /// Classify `kind` against this triple.
    pub fn phase_of(&self, kind: &Identifier) -> Option<AsyncPhase> {
        if *kind == self.start {
            Some(AsyncPhase::Start)
        } else if *kind == self.end {
            Some(AsyncPhase::End)
        } else if *kind == self.err {
            Some(AsyncPhase::Err)
        } else {
            None
        }
    }

    /// True if any identifier is shared with `other`.
    pub fn overlaps(&self, other: &AsyncTypeTriple) -> bool {
        [&self.start, &self.end, &self.err]
            .iter()
            .any(|id| other.phase_of(id).is_some())
    }
}
