//! Builds the static fallback sequence from configuration

use std::sync::Arc;
use tracing::info;

use crate::backend::traits::BackendDescriptor;
use crate::backend::workers_ai::{WorkersAiClient, WorkersAiImageBackend};
use crate::config::BackendConfig;

/// Ordered image backends, fixed at startup
#[derive(Debug, Clone, Default)]
pub struct BackendRegistry {
    descriptors: Vec<BackendDescriptor>,
}

impl BackendRegistry {
    pub fn new(descriptors: Vec<BackendDescriptor>) -> Self {
        Self { descriptors }
    }

    /// Register every enabled backend, ranked by its position in the list
    pub fn from_config(configs: &[BackendConfig], client: Arc<WorkersAiClient>) -> Self {
        let descriptors = configs
            .iter()
            .filter(|config| config.enabled)
            .enumerate()
            .map(|(rank, config)| {
                info!(
                    backend = %config.name,
                    model = %config.model,
                    rank,
                    num_steps = config.num_steps,
                    "Registered image backend"
                );
                let backend =
                    WorkersAiImageBackend::new(&config.name, &config.model, client.clone());
                BackendDescriptor::new(rank, config.num_steps, Arc::new(backend))
            })
            .collect();

        Self { descriptors }
    }

    pub fn descriptors(&self) -> &[BackendDescriptor] {
        &self.descriptors
    }

    pub fn identifiers(&self) -> Vec<String> {
        self.descriptors.iter().map(|d| d.identifier.clone()).collect()
    }
}
