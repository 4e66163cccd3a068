//! Turns a place name into an image generation prompt

use std::sync::Arc;
use tracing::{debug, warn};

use crate::backend::traits::TextBackend;
use crate::config::PromptConfig;
use crate::error::{AppError, Result};
use crate::prompt::extract::{extract_prompt, ExtractionStrategy, DEFAULT_STRATEGIES};

/// Where a prompt came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptSource {
    Generated,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptResult {
    pub prompt: String,
    pub source: PromptSource,
}

/// Postcard prompt used when the text model is unavailable or unreadable
pub fn fallback_prompt(place: &str) -> String {
    format!(
        "A vintage travel postcard of {place}, showing its most iconic landmarks under a \
         bright sky, saturated colors, with bold retro lettering that reads \
         \"Greetings from {place}\""
    )
}

pub struct PromptSynthesizer {
    backend: Arc<dyn TextBackend>,
    instructions: String,
    user_template: String,
    strategies: Vec<ExtractionStrategy>,
}

impl PromptSynthesizer {
    pub fn new(backend: Arc<dyn TextBackend>, config: &PromptConfig) -> Self {
        Self {
            backend,
            instructions: config.instructions.clone(),
            user_template: config.user_template.clone(),
            strategies: DEFAULT_STRATEGIES.to_vec(),
        }
    }

    pub fn with_strategies(mut self, strategies: Vec<ExtractionStrategy>) -> Self {
        self.strategies = strategies;
        self
    }

    /// Ask the text model for a postcard prompt describing `place`.
    ///
    /// Never fails once `place` is non-blank: model errors and unrecognised
    /// responses fall back to [`fallback_prompt`].
    pub async fn synthesize(&self, place: &str) -> Result<PromptResult> {
        let place = place.trim();
        if place.is_empty() {
            return Err(AppError::InvalidInput("city is required".to_string()));
        }

        let input = self.user_template.replace("{place}", place);

        let generated = match self.backend.complete(&self.instructions, &input).await {
            Ok(response) => match extract_prompt(&response, &self.strategies) {
                Some((strategy, prompt)) => {
                    debug!(place = %place, strategy, "Extracted image prompt");
                    Some(prompt)
                }
                None => {
                    warn!(place = %place, "Text model response had no usable prompt");
                    None
                }
            },
            Err(e) => {
                warn!(place = %place, error = %e, "Prompt generation failed");
                None
            }
        };

        Ok(match generated {
            Some(prompt) => PromptResult {
                prompt,
                source: PromptSource::Generated,
            },
            None => PromptResult {
                prompt: fallback_prompt(place),
                source: PromptSource::Fallback,
            },
        })
    }
}
