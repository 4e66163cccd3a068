//! Unit tests for response rendering

use axum::http::{header, StatusCode};
use chrono::{TimeZone, Utc};
use postcard_gateway::gateway::Delivery;
use postcard_gateway::response::{
    base64, render, sniff_content_type, ImageEnvelope, ResponseMode,
};

fn delivery(image: &[u8]) -> Delivery {
    Delivery {
        image: image.to_vec(),
        backend_used: "flux-schnell".to_string(),
        timestamp: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        place: "Porto".to_string(),
        submitter: "Rui".to_string(),
    }
}

#[test]
fn test_response_mode_parse() {
    assert_eq!(ResponseMode::parse("json"), Some(ResponseMode::Json));
    assert_eq!(ResponseMode::parse("binary"), Some(ResponseMode::Binary));
    assert_eq!(ResponseMode::parse("base64"), None);
    assert_eq!(ResponseMode::parse("JSON"), None);
    assert_eq!(ResponseMode::parse("unknown"), None);
}

#[test]
fn test_sniff_content_type() {
    assert_eq!(sniff_content_type(&[0x89, b'P', b'N', b'G']), "image/png");
    assert_eq!(sniff_content_type(&[0xFF, 0xD8, 0xFF, 0xE0]), "image/jpeg");
    assert_eq!(sniff_content_type(b"RIFF\0\0\0\0WEBPVP8 "), "image/webp");
    assert_eq!(sniff_content_type(b"??"), "image/png");
}

#[test]
fn test_envelope_shape() {
    let envelope = ImageEnvelope::from(&delivery(b"Hello, World!"));
    let value = serde_json::to_value(&envelope).unwrap();

    assert_eq!(value["success"], true);
    assert_eq!(value["image"], "SGVsbG8sIFdvcmxkIQ==");
    assert_eq!(value["city"], "Porto");
    assert_eq!(value["name"], "Rui");
    assert_eq!(value["modelUsed"], "flux-schnell");
    assert_eq!(value["timestamp"], "2024-05-01T12:00:00+00:00");
    assert_eq!(base64::decode(value["image"].as_str().unwrap()).unwrap(), b"Hello, World!");
}

#[test]
fn test_render_binary() {
    let response = render(delivery(&[0xFF, 0xD8, 0xFF, 0x00]), ResponseMode::Binary);
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "image/jpeg");
    assert_eq!(response.headers()["x-model-used"], "flux-schnell");
}

#[test]
fn test_render_json() {
    let response = render(delivery(b"png"), ResponseMode::Json);
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");
}
