use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};
use serde_json::Value;
use thiserror::Error;

use crate::action::AsyncTypeTriple;
use crate::config::{ResolvedLinkService, Selector};
use crate::state::StoreState;

/// Single-shot result of one service call. `Err` carries the raw error
/// payload that becomes the ERR action.
pub type ServiceFuture = BoxFuture<'static, Result<Value, Value>>;

pub type ServiceFn = Arc<dyn Fn(Value) -> ServiceFuture + Send + Sync>;

/// Reasons a link is left out when a store is initialized.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LinkConfigError {
    #[error("Link has no state slice key")]
    MissingState,

    #[error("Link '{state}' has no async action type")]
    MissingType { state: String },

    #[error("Link '{state}' has no service")]
    MissingService { state: String },

    #[error("Link '{state}' names a slice the initial state does not have")]
    UnknownSlice { state: String },

    #[error("Link '{state}' reuses action types already linked by '{other}'")]
    TypeCollision { state: String, other: String },
}

/// Declarative binding of a state slice and an async family to a service.
///
/// Fields are public so a partially filled config can be registered; it is
/// checked when the store is initialized.
#[derive(Clone, Default)]
pub struct LinkServiceConfig {
    pub state: String,
    pub async_type: Option<AsyncTypeTriple>,
    pub service: Option<ServiceFn>,
    pub data_selector: Option<Selector>,
    pub error_selector: Option<Selector>,
}

impl LinkServiceConfig {
    pub fn new<F, Fut>(state: impl Into<String>, async_type: &AsyncTypeTriple, service: F) -> Self
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, Value>> + Send + 'static,
    {
        Self {
            state: state.into(),
            async_type: Some(async_type.clone()),
            service: Some(Arc::new(move |payload: Value| service(payload).boxed())),
            data_selector: None,
            error_selector: None,
        }
    }

    pub fn with_data_selector<F>(mut self, f: F) -> Self
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        self.data_selector = Some(Arc::new(f));
        self
    }

    pub fn with_error_selector<F>(mut self, f: F) -> Self
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        self.error_selector = Some(Arc::new(f));
        self
    }

    /// Check this config against the initial state and the links already
    /// accepted, resolving selectors against the store defaults.
    pub fn validate<S: StoreState>(
        &self,
        initial_state: &S,
        defaults: &ResolvedLinkService,
        accepted: &[ValidLink],
    ) -> Result<ValidLink, LinkConfigError> {
        if self.state.is_empty() {
            return Err(LinkConfigError::MissingState);
        }
        let state = self.state.clone();
        let triple = self
            .async_type
            .clone()
            .ok_or_else(|| LinkConfigError::MissingType {
                state: state.clone(),
            })?;
        let service = self
            .service
            .clone()
            .ok_or_else(|| LinkConfigError::MissingService {
                state: state.clone(),
            })?;

        if initial_state.async_slice(&state).is_none() {
            return Err(LinkConfigError::UnknownSlice { state });
        }
        if let Some(other) = accepted
            .iter()
            .find(|link| link.slice.triple.overlaps(&triple))
        {
            return Err(LinkConfigError::TypeCollision {
                state,
                other: other.slice.key.clone(),
            });
        }

        Ok(ValidLink {
            slice: LinkSlice {
                key: state,
                triple,
                data_selector: self
                    .data_selector
                    .clone()
                    .unwrap_or_else(|| defaults.data_selector.clone()),
                error_selector: self
                    .error_selector
                    .clone()
                    .unwrap_or_else(|| defaults.error_selector.clone()),
            },
            service,
        })
    }
}

impl fmt::Debug for LinkServiceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LinkServiceConfig")
            .field("state", &self.state)
            .field("async_type", &self.async_type)
            .field("service", &self.service.is_some())
            .field("data_selector", &self.data_selector.is_some())
            .field("error_selector", &self.error_selector.is_some())
            .finish()
    }
}

/// The reducer-facing half of a valid link.
#[derive(Clone)]
pub struct LinkSlice {
    pub key: String,
    pub triple: AsyncTypeTriple,
    pub data_selector: Selector,
    pub error_selector: Selector,
}

/// A link that passed validation.
#[derive(Clone)]
pub struct ValidLink {
    pub slice: LinkSlice,
    pub service: ServiceFn,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{selector, StoreConfig};
    use crate::state::AsyncState;
    use serde_json::json;

    #[derive(Debug, Clone, Default, PartialEq)]
    struct OneSlice {
        users: AsyncState,
    }

    impl StoreState for OneSlice {
        fn async_slice(&self, key: &str) -> Option<&AsyncState> {
            (key == "users").then_some(&self.users)
        }

        fn async_slice_mut(&mut self, key: &str) -> Option<&mut AsyncState> {
            (key == "users").then_some(&mut self.users)
        }
    }

    fn ok_service(payload: Value) -> impl Future<Output = Result<Value, Value>> {
        async move { Ok(payload) }
    }

    fn defaults() -> ResolvedLinkService {
        StoreConfig::resolve(None).link_service
    }

    #[test]
    fn complete_config_is_valid() {
        let triple = AsyncTypeTriple::new("users");
        let link = LinkServiceConfig::new("users", &triple, ok_service)
            .validate(&OneSlice::default(), &defaults(), &[])
            .unwrap();
        assert_eq!(link.slice.key, "users");
        assert_eq!(link.slice.triple, triple);
    }

    #[test]
    fn missing_fields_reported() {
        let triple = AsyncTypeTriple::new("users");
        let state = OneSlice::default();

        let empty = LinkServiceConfig::default();
        assert_eq!(
            empty.validate(&state, &defaults(), &[]).err(),
            Some(LinkConfigError::MissingState)
        );

        let no_type = LinkServiceConfig {
            async_type: None,
            ..LinkServiceConfig::new("users", &triple, ok_service)
        };
        assert!(matches!(
            no_type.validate(&state, &defaults(), &[]),
            Err(LinkConfigError::MissingType { .. })
        ));

        let no_service = LinkServiceConfig {
            service: None,
            ..LinkServiceConfig::new("users", &triple, ok_service)
        };
        assert!(matches!(
            no_service.validate(&state, &defaults(), &[]),
            Err(LinkConfigError::MissingService { .. })
        ));
    }

    #[test]
    fn unknown_slice_rejected() {
        let triple = AsyncTypeTriple::new("posts");
        let result = LinkServiceConfig::new("posts", &triple, ok_service).validate(
            &OneSlice::default(),
            &defaults(),
            &[],
        );
        assert_eq!(
            result.err(),
            Some(LinkConfigError::UnknownSlice {
                state: "posts".to_string()
            })
        );
    }

    #[test]
    fn shared_triple_rejected() {
        let triple = AsyncTypeTriple::new("users");
        let state = OneSlice::default();
        let first = LinkServiceConfig::new("users", &triple, ok_service)
            .validate(&state, &defaults(), &[])
            .unwrap();

        let second = LinkServiceConfig::new("users", &triple, ok_service).validate(
            &state,
            &defaults(),
            &[first],
        );
        assert!(matches!(
            second,
            Err(LinkConfigError::TypeCollision { .. })
        ));
    }

    #[test]
    fn link_selector_beats_store_default() {
        let triple = AsyncTypeTriple::new("users");
        let config = StoreConfig {
            link_service: crate::config::LinkServiceDefaults {
                data_selector: Some(selector(|_| json!("store"))),
                error_selector: Some(selector(|_| json!("store"))),
            },
        };
        let defaults = StoreConfig::resolve(Some(&config)).link_service;

        let link = LinkServiceConfig::new("users", &triple, ok_service)
            .with_data_selector(|_| json!("link"))
            .validate(&OneSlice::default(), &defaults, &[])
            .unwrap();

        assert_eq!((link.slice.data_selector)(json!(1)), json!("link"));
        assert_eq!((link.slice.error_selector)(json!(1)), json!("store"));
    }
}
