//! Postcard Gateway
//!
//! Turns a place name into a postcard-style image: a text model writes the
//! image prompt, then an ordered list of image backends is tried with bounded
//! retries and exponential backoff until one of them renders it.

pub mod api;
pub mod backend;
pub mod config;
pub mod error;
pub mod gateway;
pub mod prompt;
pub mod response;

pub use error::{AppError, Result};

use std::sync::Arc;

use backend::registry::BackendRegistry;
use backend::workers_ai::{WorkersAiClient, WorkersAiTextBackend};
use gateway::backoff::RetryPolicy;
use gateway::classifier::SignatureClassifier;
use gateway::throttle::{MinIntervalThrottle, NoThrottle, Throttle};
use gateway::Orchestrator;
use prompt::PromptSynthesizer;
use response::ResponseMode;

/// Application state shared across all handlers
pub struct AppState {
    pub settings: Arc<config::Settings>,
    pub synthesizer: Arc<PromptSynthesizer>,
    pub orchestrator: Arc<Orchestrator>,
    pub backends: Arc<BackendRegistry>,
    pub response_mode: ResponseMode,
}

impl AppState {
    /// Wire the Workers AI backends, orchestrator and synthesizer from settings
    pub fn from_settings(settings: config::Settings) -> Result<Self> {
        let client = Arc::new(WorkersAiClient::new(&settings.provider)?);

        let text_backend = Arc::new(WorkersAiTextBackend::new(
            &settings.prompt.model,
            client.clone(),
        ));
        let synthesizer = PromptSynthesizer::new(text_backend, &settings.prompt);

        let backends = BackendRegistry::from_config(&settings.backends, client);

        let throttle: Arc<dyn Throttle> = if settings.generation.min_interval_ms > 0 {
            Arc::new(MinIntervalThrottle::new(settings.generation.min_interval()))
        } else {
            Arc::new(NoThrottle)
        };

        let orchestrator = Orchestrator::new(RetryPolicy::from_config(&settings.generation))
            .with_classifier(Arc::new(SignatureClassifier::new(&settings.classifier)))
            .with_throttle(throttle);

        let response_mode =
            ResponseMode::parse(&settings.generation.response_mode).ok_or_else(|| {
                AppError::Config(::config::ConfigError::Message(format!(
                    "Invalid response mode '{}'",
                    settings.generation.response_mode
                )))
            })?;

        Ok(Self {
            settings: Arc::new(settings),
            synthesizer: Arc::new(synthesizer),
            orchestrator: Arc::new(orchestrator),
            backends: Arc::new(backends),
            response_mode,
        })
    }
}
