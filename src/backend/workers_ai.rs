//! Workers AI REST client implementing the text and image backends

use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, Client, Response};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::backend::traits::{BackendError, ImageBackend, RenderRequest, TextBackend};
use crate::config::ProviderConfig;
use crate::error::Result;
use crate::response::base64;

/// Shared HTTP client for the `/accounts/{id}/ai/run/{model}` endpoint
pub struct WorkersAiClient {
    client: Client,
    base_url: String,
    account_id: String,
    api_token: String,
}

#[derive(Debug, Serialize)]
struct ApiRenderRequest<'a> {
    prompt: &'a str,
    num_steps: u32,
}

#[derive(Debug, Serialize)]
struct ApiCompleteRequest<'a> {
    instructions: &'a str,
    input: &'a str,
}

/// Error envelope returned on failed calls
#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    #[serde(default)]
    errors: Vec<ApiErrorItem>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorItem {
    #[serde(default)]
    code: Option<u32>,
    #[serde(default)]
    message: String,
}

impl WorkersAiClient {
    /// Create a new client from provider configuration
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            account_id: config.account_id.clone(),
            api_token: config.api_token.clone(),
        })
    }

    fn run_url(&self, model: &str) -> String {
        format!("{}/accounts/{}/ai/run/{}", self.base_url, self.account_id, model)
    }

    async fn run<B: Serialize + ?Sized>(
        &self,
        model: &str,
        body: &B,
    ) -> std::result::Result<Response, BackendError> {
        let url = self.run_url(model);
        debug!(model = %model, url = %url, "Sending Workers AI request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_token)
            .json(body)
            .send()
            .await
            .map_err(transport_error)?;

        if response.status().is_success() {
            Ok(response)
        } else {
            Err(error_from_response(response).await)
        }
    }
}

fn transport_error(e: reqwest::Error) -> BackendError {
    let err = BackendError::new(format!("Request failed: {}", e));
    match e.status() {
        Some(status) => err.with_status(status.as_u16()),
        None => err,
    }
}

async fn error_from_response(response: Response) -> BackendError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();

    let first = serde_json::from_str::<ApiErrorEnvelope>(&body)
        .ok()
        .and_then(|envelope| envelope.errors.into_iter().next());

    match first {
        Some(ApiErrorItem {
            code: Some(code),
            message,
        }) => BackendError::new(format!("{}: {}", code, message))
            .with_status(status.as_u16())
            .with_code(code),
        Some(ApiErrorItem {
            code: None,
            message,
        }) => BackendError::new(message).with_status(status.as_u16()),
        None => BackendError::new(format!("Backend returned {}: {}", status, body))
            .with_status(status.as_u16()),
    }
}

/// Image model served through Workers AI
pub struct WorkersAiImageBackend {
    name: String,
    model: String,
    client: Arc<WorkersAiClient>,
}

impl WorkersAiImageBackend {
    pub fn new(
        name: impl Into<String>,
        model: impl Into<String>,
        client: Arc<WorkersAiClient>,
    ) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
            client,
        }
    }
}

#[async_trait]
impl ImageBackend for WorkersAiImageBackend {
    fn name(&self) -> &str {
        &self.name
    }

    async fn render(&self, request: &RenderRequest) -> std::result::Result<Vec<u8>, BackendError> {
        let body = ApiRenderRequest {
            prompt: &request.prompt,
            num_steps: request.num_steps,
        };
        let response = self.client.run(&self.model, &body).await?;

        // Some models stream the image directly, others wrap it in JSON
        let is_image = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.starts_with("image/"))
            .unwrap_or(false);

        if is_image {
            let bytes = response.bytes().await.map_err(transport_error)?;
            return Ok(bytes.to_vec());
        }

        let value: Value = response
            .json()
            .await
            .map_err(|e| BackendError::new(format!("Failed to parse response: {}", e)))?;

        let encoded = value
            .pointer("/result/image")
            .or_else(|| value.get("image"))
            .and_then(Value::as_str)
            .ok_or_else(|| BackendError::new("Response did not include an image"))?;

        base64::decode(encoded)
            .map_err(|e| BackendError::new(format!("Invalid base64 image data: {}", e)))
    }
}

/// Text model served through Workers AI
pub struct WorkersAiTextBackend {
    model: String,
    client: Arc<WorkersAiClient>,
}

impl WorkersAiTextBackend {
    pub fn new(model: impl Into<String>, client: Arc<WorkersAiClient>) -> Self {
        Self {
            model: model.into(),
            client,
        }
    }
}

#[async_trait]
impl TextBackend for WorkersAiTextBackend {
    async fn complete(
        &self,
        instructions: &str,
        input: &str,
    ) -> std::result::Result<Value, BackendError> {
        let body = ApiCompleteRequest {
            instructions,
            input,
        };
        let response = self.client.run(&self.model, &body).await?;

        response
            .json()
            .await
            .map_err(|e| BackendError::new(format!("Failed to parse response: {}", e)))
    }
}
