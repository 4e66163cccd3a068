//! Request handlers

use axum::{
    extract::{rejection::JsonRejection, State},
    response::Response,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::info;

use crate::error::{AppError, Result};
use crate::gateway::{GenerationRequest, GenerationResult};
use crate::response;
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct PromptBody {
    #[serde(default)]
    pub city: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptResponse {
    pub city: String,
    pub image_prompt: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationBody {
    #[serde(default)]
    pub image_prompt: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

fn rejection(e: JsonRejection) -> AppError {
    AppError::InvalidInput(e.body_text())
}

pub async fn health(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "backends": state.backends.identifiers(),
    }))
}

pub async fn generate_prompt(
    State(state): State<Arc<AppState>>,
    body: std::result::Result<Json<PromptBody>, JsonRejection>,
) -> Result<Json<PromptResponse>> {
    let Json(body) = body.map_err(rejection)?;
    let city = body
        .city
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .ok_or_else(|| AppError::InvalidInput("city is required".to_string()))?;

    let result = state.synthesizer.synthesize(&city).await?;
    info!(city = %city, source = ?result.source, "Image prompt ready");

    Ok(Json(PromptResponse {
        city,
        image_prompt: result.prompt,
    }))
}

pub async fn generate_image(
    State(state): State<Arc<AppState>>,
    body: std::result::Result<Json<GenerationBody>, JsonRejection>,
) -> Result<Response> {
    let Json(body) = body.map_err(rejection)?;
    let request =
        GenerationRequest::new(body.image_prompt.unwrap_or_default(), body.city, body.name)?;

    match state
        .orchestrator
        .generate(&request, state.backends.descriptors())
        .await?
    {
        GenerationResult::Delivered(delivery) => {
            Ok(response::render(delivery, state.response_mode))
        }
        GenerationResult::Exhausted(exhaustion) => Err(exhaustion.into()),
    }
}
