//! Declared action names, async families and effects, and the identifiers
//! generated from them.

use std::collections::HashSet;

use futures::stream::BoxStream;
use thiserror::Error;

use crate::action::{Action, AsyncTypeTriple, Identifier};
use crate::effect::{EffectContext, NamedEffect};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DeclarationError {
    #[error("Action name '{name}' is declared more than once")]
    DuplicateName { name: String },
}

/// What a store declares up front.
///
/// Built either with the chained methods or from pipe-delimited metadata
/// strings such as `"increment|decrement"`.
#[derive(Debug, Clone, Default)]
pub struct Declarations {
    pub action_names: Vec<String>,
    pub async_action_names: Vec<String>,
    pub effects: Vec<NamedEffect>,
}

impl Declarations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse pipe-delimited name lists. Empty input yields no names.
    pub fn from_metadata(action_names: &str, async_action_names: &str) -> Self {
        Self {
            action_names: split_names(action_names),
            async_action_names: split_names(async_action_names),
            effects: Vec::new(),
        }
    }

    pub fn action(mut self, name: impl Into<String>) -> Self {
        self.action_names.push(name.into());
        self
    }

    pub fn async_action(mut self, name: impl Into<String>) -> Self {
        self.async_action_names.push(name.into());
        self
    }

    pub fn effect<F>(mut self, name: impl Into<String>, run: F) -> Self
    where
        F: Fn(EffectContext) -> BoxStream<'static, Action> + Send + Sync + 'static,
    {
        self.effects.push(NamedEffect::new(name, run));
        self
    }
}

fn split_names(metadata: &str) -> Vec<String> {
    metadata
        .split('|')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

/// Identifiers generated for one store instance, keyed by declared name.
#[derive(Debug, Clone, Default)]
pub struct ActionTypes {
    actions: Vec<(String, Identifier)>,
    async_types: Vec<(String, AsyncTypeTriple)>,
}

impl ActionTypes {
    /// Mint fresh identifiers for every declared name.
    ///
    /// # Errors
    /// Returns `DuplicateName` if a name appears twice across both lists.
    pub fn generate(declarations: &Declarations) -> Result<Self, DeclarationError> {
        let mut seen = HashSet::new();
        let all = declarations
            .action_names
            .iter()
            .chain(declarations.async_action_names.iter());
        for name in all {
            if !seen.insert(name.as_str()) {
                return Err(DeclarationError::DuplicateName { name: name.clone() });
            }
        }

        let actions = declarations
            .action_names
            .iter()
            .map(|name| (name.clone(), Identifier::new(name.as_str())))
            .collect();
        let async_types = declarations
            .async_action_names
            .iter()
            .map(|name| (name.clone(), AsyncTypeTriple::new(name)))
            .collect();

        Ok(Self {
            actions,
            async_types,
        })
    }

    pub fn action(&self, name: &str) -> Option<&Identifier> {
        self.actions
            .iter()
            .find(|(declared, _)| declared == name)
            .map(|(_, id)| id)
    }

    pub fn async_type(&self, name: &str) -> Option<&AsyncTypeTriple> {
        self.async_types
            .iter()
            .find(|(declared, _)| declared == name)
            .map(|(_, triple)| triple)
    }

    /// Plain actions in declaration order.
    pub fn actions(&self) -> impl Iterator<Item = (&str, &Identifier)> {
        self.actions.iter().map(|(name, id)| (name.as_str(), id))
    }

    /// Async families in declaration order.
    pub fn async_types(&self) -> impl Iterator<Item = (&str, &AsyncTypeTriple)> {
        self.async_types
            .iter()
            .map(|(name, triple)| (name.as_str(), triple))
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty() && self.async_types.is_empty()
    }
}
