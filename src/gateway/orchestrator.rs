//! Sequential multi-backend image generation with retry and backoff

use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::backend::traits::{BackendDescriptor, RenderRequest};
use crate::error::{AppError, Result};
use crate::gateway::backoff::{RetryPolicy, Sleeper, TokioSleeper};
use crate::gateway::classifier::{FailureClassifier, FailureKind, SignatureClassifier};
use crate::gateway::throttle::{NoThrottle, Throttle};

const DEFAULT_PLACE: &str = "Unknown";
const DEFAULT_SUBMITTER: &str = "Anonymous";

/// Validated image generation request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    prompt: String,
    place: String,
    submitter: String,
}

impl GenerationRequest {
    /// Build a request from unvalidated boundary input. Blank optional
    /// fields fall back to their defaults.
    pub fn new(
        prompt: impl Into<String>,
        place: Option<String>,
        submitter: Option<String>,
    ) -> Result<Self> {
        let prompt = prompt.into().trim().to_string();
        if prompt.is_empty() {
            return Err(AppError::InvalidInput("imagePrompt is required".to_string()));
        }

        Ok(Self {
            prompt,
            place: non_blank(place).unwrap_or_else(|| DEFAULT_PLACE.to_string()),
            submitter: non_blank(submitter).unwrap_or_else(|| DEFAULT_SUBMITTER.to_string()),
        })
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn place(&self) -> &str {
        &self.place
    }

    pub fn submitter(&self) -> &str {
        &self.submitter
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Result of one (backend, attempt) pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    Success(Vec<u8>),
    TransientFailure(String),
    PermanentFailure(String),
}

/// A rendered image and where it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub image: Vec<u8>,
    pub backend_used: String,
    pub timestamp: DateTime<Utc>,
    pub place: String,
    pub submitter: String,
}

/// Every backend was tried without success
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exhaustion {
    pub last_reason: String,
    pub last_failure: FailureKind,
    pub attempted_backends: Vec<String>,
    pub attempts: u32,
}

/// Terminal outcome of a generation request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationResult {
    Delivered(Delivery),
    Exhausted(Exhaustion),
}

impl GenerationResult {
    pub fn backend_used(&self) -> Option<&str> {
        match self {
            GenerationResult::Delivered(delivery) => Some(delivery.backend_used.as_str()),
            GenerationResult::Exhausted(_) => None,
        }
    }
}

/// Drives the fallback sequence for each request
pub struct Orchestrator {
    policy: RetryPolicy,
    classifier: Arc<dyn FailureClassifier>,
    throttle: Arc<dyn Throttle>,
    sleeper: Arc<dyn Sleeper>,
}

impl Orchestrator {
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            classifier: Arc::new(SignatureClassifier::default()),
            throttle: Arc::new(NoThrottle),
            sleeper: Arc::new(TokioSleeper),
        }
    }

    pub fn with_classifier(mut self, classifier: Arc<dyn FailureClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn with_throttle(mut self, throttle: Arc<dyn Throttle>) -> Self {
        self.throttle = throttle;
        self
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Try each backend in rank order until one returns an image.
    ///
    /// Capacity-class failures are retried on the same backend with
    /// exponential backoff until the retry budget runs out; any other failure
    /// moves on to the next backend without waiting. Only an empty prompt is
    /// reported as an error; backend failures end in `Exhausted`.
    pub async fn generate(
        &self,
        request: &GenerationRequest,
        backends: &[BackendDescriptor],
    ) -> Result<GenerationResult> {
        if request.prompt().trim().is_empty() {
            return Err(AppError::InvalidInput("imagePrompt is required".to_string()));
        }

        let span = info_span!(
            "generate",
            request_id = %Uuid::new_v4(),
            place = %request.place(),
            submitter = %request.submitter()
        );

        Ok(self.run(request, backends).instrument(span).await)
    }

    async fn run(
        &self,
        request: &GenerationRequest,
        backends: &[BackendDescriptor],
    ) -> GenerationResult {
        let mut ordered: Vec<&BackendDescriptor> = backends.iter().collect();
        ordered.sort_by_key(|d| d.rank);

        let mut attempted_backends = Vec::with_capacity(ordered.len());
        let mut last_reason = "no image backends configured".to_string();
        let mut last_failure = FailureKind::Permanent;
        let mut attempts = 0u32;

        for descriptor in ordered {
            attempted_backends.push(descriptor.identifier.clone());
            let render = RenderRequest {
                prompt: request.prompt().to_string(),
                num_steps: descriptor.num_steps,
            };

            for attempt in 0..self.policy.max_retries {
                attempts += 1;
                debug!(backend = %descriptor.identifier, attempt, "Attempting image generation");

                match self.attempt(descriptor, &render).await {
                    AttemptOutcome::Success(image) => {
                        info!(
                            backend = %descriptor.identifier,
                            attempt,
                            bytes = image.len(),
                            "Image delivered"
                        );
                        return GenerationResult::Delivered(Delivery {
                            image,
                            backend_used: descriptor.identifier.clone(),
                            timestamp: Utc::now(),
                            place: request.place().to_string(),
                            submitter: request.submitter().to_string(),
                        });
                    }
                    AttemptOutcome::TransientFailure(reason) => {
                        warn!(
                            backend = %descriptor.identifier,
                            attempt,
                            kind = "transient",
                            reason = %reason,
                            "Image generation attempt failed"
                        );
                        last_reason = reason;
                        last_failure = FailureKind::Transient;

                        if attempt + 1 < self.policy.max_retries {
                            let delay = self.policy.delay_for(attempt);
                            debug!(
                                backend = %descriptor.identifier,
                                delay_ms = delay.as_millis() as u64,
                                "Backing off"
                            );
                            self.sleeper.sleep(delay).await;
                        }
                    }
                    AttemptOutcome::PermanentFailure(reason) => {
                        warn!(
                            backend = %descriptor.identifier,
                            attempt,
                            kind = "permanent",
                            reason = %reason,
                            "Image generation attempt failed"
                        );
                        last_reason = reason;
                        last_failure = FailureKind::Permanent;
                        break;
                    }
                }
            }
        }

        error!(
            attempts,
            backends = ?attempted_backends,
            reason = %last_reason,
            "All image backends exhausted"
        );

        GenerationResult::Exhausted(Exhaustion {
            last_reason,
            last_failure,
            attempted_backends,
            attempts,
        })
    }

    async fn attempt(
        &self,
        descriptor: &BackendDescriptor,
        render: &RenderRequest,
    ) -> AttemptOutcome {
        let wait = self.throttle.should_delay(Instant::now());
        if !wait.is_zero() {
            debug!(delay_ms = wait.as_millis() as u64, "Throttling outbound call");
            self.sleeper.sleep(wait).await;
        }

        match descriptor.backend.render(render).await {
            Ok(image) if !image.is_empty() => AttemptOutcome::Success(image),
            Ok(_) => AttemptOutcome::PermanentFailure("empty image payload".to_string()),
            Err(e) => match self.classifier.classify(&e) {
                FailureKind::Transient => AttemptOutcome::TransientFailure(e.to_string()),
                FailureKind::Permanent => AttemptOutcome::PermanentFailure(e.to_string()),
            },
        }
    }
}
