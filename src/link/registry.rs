use crate::config::ResolvedLinkService;
use crate::link::config::{LinkServiceConfig, ValidLink};
use crate::state::StoreState;

/// Links registered on a store, in registration order.
#[derive(Debug, Default)]
pub struct AsyncLinkRegistry {
    configs: Vec<LinkServiceConfig>,
}

impl AsyncLinkRegistry {
    pub fn register(&mut self, config: LinkServiceConfig) {
        self.configs.push(config);
    }

    pub fn len(&self) -> usize {
        self.configs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }

    /// Validate every registered link. Invalid ones are reported and left
    /// out; the rest are returned in registration order.
    pub fn wire<S: StoreState>(
        &self,
        initial_state: &S,
        defaults: &ResolvedLinkService,
    ) -> Vec<ValidLink> {
        let mut accepted: Vec<ValidLink> = Vec::with_capacity(self.configs.len());
        for config in &self.configs {
            match config.validate(initial_state, defaults, &accepted) {
                Ok(link) => accepted.push(link),
                Err(error) => {
                    tracing::error!(%error, ?config, "Invalid service link config, skipped");
                }
            }
        }
        accepted
    }
}
