//! Response handling module - Raw image bytes or base64 JSON envelope

pub mod base64;

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::gateway::Delivery;

/// How a delivered image is returned to the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseMode {
    /// Raw image bytes with an image content type
    Binary,
    /// JSON envelope carrying the image as base64
    Json,
}

impl ResponseMode {
    /// Parse a configured mode name; only `binary` and `json` are accepted
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "binary" => Some(Self::Binary),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// JSON envelope for a delivered image
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageEnvelope {
    pub success: bool,
    pub image: String,
    pub city: String,
    pub name: String,
    pub timestamp: String,
    pub model_used: String,
}

impl From<&Delivery> for ImageEnvelope {
    fn from(delivery: &Delivery) -> Self {
        Self {
            success: true,
            image: base64::encode(&delivery.image),
            city: delivery.place.clone(),
            name: delivery.submitter.clone(),
            timestamp: delivery.timestamp.to_rfc3339(),
            model_used: delivery.backend_used.clone(),
        }
    }
}

/// Guess an image content type from its magic bytes, defaulting to PNG
pub fn sniff_content_type(data: &[u8]) -> &'static str {
    if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
        "image/jpeg"
    } else if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
        "image/webp"
    } else {
        "image/png"
    }
}

/// Render a delivered image in the configured mode
pub fn render(delivery: Delivery, mode: ResponseMode) -> Response {
    match mode {
        ResponseMode::Json => {
            (StatusCode::OK, Json(ImageEnvelope::from(&delivery))).into_response()
        }
        ResponseMode::Binary => {
            let content_type = sniff_content_type(&delivery.image);
            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, content_type.to_string()),
                    (
                        header::HeaderName::from_static("x-model-used"),
                        delivery.backend_used,
                    ),
                ],
                delivery.image,
            )
                .into_response()
        }
    }
}
