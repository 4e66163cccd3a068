//! Common traits and types for text and image generation backends

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Request handed to an image backend for a single attempt
#[derive(Debug, Clone)]
pub struct RenderRequest {
    /// The prompt to render
    pub prompt: String,

    /// Number of inference steps (quality/speed tradeoff)
    pub num_steps: u32,
}

/// Failure reported by a backend call
///
/// Carries whatever the provider told us: the HTTP status, the provider's
/// numeric error code, and its message. Classification into transient or
/// permanent happens in the gateway, not here.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct BackendError {
    pub status: Option<u16>,
    pub code: Option<u32>,
    pub message: String,
}

impl BackendError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: None,
            code: None,
            message: message.into(),
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_code(mut self, code: u32) -> Self {
        self.code = Some(code);
        self
    }
}

/// Trait for image generation backends
#[async_trait]
pub trait ImageBackend: Send + Sync {
    /// Get the backend name
    fn name(&self) -> &str;

    /// Render a prompt into raw image bytes
    async fn render(&self, request: &RenderRequest) -> Result<Vec<u8>, BackendError>;
}

/// Trait for text generation backends
///
/// The response shape varies by model, so it is returned as raw JSON and
/// interpreted by the prompt extractors.
#[async_trait]
pub trait TextBackend: Send + Sync {
    async fn complete(
        &self,
        instructions: &str,
        input: &str,
    ) -> Result<serde_json::Value, BackendError>;
}

/// One entry in the fallback sequence
#[derive(Clone)]
pub struct BackendDescriptor {
    pub identifier: String,
    pub rank: usize,
    pub num_steps: u32,
    pub backend: Arc<dyn ImageBackend>,
}

impl BackendDescriptor {
    pub fn new(rank: usize, num_steps: u32, backend: Arc<dyn ImageBackend>) -> Self {
        Self {
            identifier: backend.name().to_string(),
            rank,
            num_steps,
            backend,
        }
    }
}

impl fmt::Debug for BackendDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendDescriptor")
            .field("identifier", &self.identifier)
            .field("rank", &self.rank)
            .field("num_steps", &self.num_steps)
            .finish()
    }
}
