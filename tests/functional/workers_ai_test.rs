//! Functional tests for the Workers AI client against a mock server

use postcard_gateway::backend::workers_ai::{
    WorkersAiClient, WorkersAiImageBackend, WorkersAiTextBackend,
};
use postcard_gateway::backend::{ImageBackend, RenderRequest, TextBackend};
use postcard_gateway::config::ProviderConfig;
use postcard_gateway::gateway::classifier::{FailureClassifier, FailureKind, SignatureClassifier};
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const IMAGE_PATH: &str = "/accounts/acct-123/ai/run/@cf/leonardo/lucid-origin";
const TEXT_PATH: &str = "/accounts/acct-123/ai/run/@cf/openai/gpt-oss-20b";

fn client(server: &MockServer) -> Arc<WorkersAiClient> {
    let config = ProviderConfig {
        base_url: server.uri(),
        account_id: "acct-123".to_string(),
        api_token: "test-token".to_string(),
        timeout_ms: 5000,
    };
    Arc::new(WorkersAiClient::new(&config).unwrap())
}

fn image_backend(server: &MockServer) -> WorkersAiImageBackend {
    WorkersAiImageBackend::new("lucid-origin", "@cf/leonardo/lucid-origin", client(server))
}

fn render_request() -> RenderRequest {
    RenderRequest {
        prompt: "a lighthouse at sunset".to_string(),
        num_steps: 3,
    }
}

#[tokio::test]
async fn test_json_base64_image() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(IMAGE_PATH))
        .and(header("authorization", "Bearer test-token"))
        .and(body_partial_json(json!({ "prompt": "a lighthouse at sunset", "num_steps": 3 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": { "image": "SGVsbG8sIFdvcmxkIQ==" },
            "success": true,
            "errors": []
        })))
        .expect(1)
        .mount(&server)
        .await;

    let image = image_backend(&server).render(&render_request()).await.unwrap();
    assert_eq!(image, b"Hello, World!");
}

#[tokio::test]
async fn test_raw_image_body() {
    let server = MockServer::start().await;
    let png = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
    Mock::given(method("POST"))
        .and(path(IMAGE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_raw(png.clone(), "image/png"))
        .mount(&server)
        .await;

    let image = image_backend(&server).render(&render_request()).await.unwrap();
    assert_eq!(image, png);
}

#[tokio::test]
async fn test_capacity_error_envelope() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(IMAGE_PATH))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "result": null,
            "success": false,
            "errors": [{
                "code": 3040,
                "message": "Capacity temporarily exceeded, please try again."
            }]
        })))
        .mount(&server)
        .await;

    let err = image_backend(&server).render(&render_request()).await.unwrap_err();
    assert_eq!(err.status, Some(429));
    assert_eq!(err.code, Some(3040));
    assert!(err.message.starts_with("3040:"));
    assert_eq!(SignatureClassifier::default().classify(&err), FailureKind::Transient);
}

#[tokio::test]
async fn test_auth_error_is_permanent() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(IMAGE_PATH))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "success": false,
            "errors": [{ "code": 10000, "message": "Authentication error" }]
        })))
        .mount(&server)
        .await;

    let err = image_backend(&server).render(&render_request()).await.unwrap_err();
    assert_eq!(err.status, Some(401));
    assert_eq!(SignatureClassifier::default().classify(&err), FailureKind::Permanent);
}

#[tokio::test]
async fn test_missing_image_field() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(IMAGE_PATH))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "result": {}, "success": true })),
        )
        .mount(&server)
        .await;

    let err = image_backend(&server).render(&render_request()).await.unwrap_err();
    assert_eq!(err.status, None);
    assert_eq!(SignatureClassifier::default().classify(&err), FailureKind::Permanent);
}

#[tokio::test]
async fn test_non_json_error_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(IMAGE_PATH))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream unavailable"))
        .mount(&server)
        .await;

    let err = image_backend(&server).render(&render_request()).await.unwrap_err();
    assert_eq!(err.status, Some(503));
    assert!(err.message.contains("upstream unavailable"));
    assert_eq!(SignatureClassifier::default().classify(&err), FailureKind::Transient);
}

#[tokio::test]
async fn test_text_backend_returns_raw_body() {
    let server = MockServer::start().await;
    let body = json!({
        "result": { "response": "A sunlit Porto riverside" },
        "success": true
    });
    Mock::given(method("POST"))
        .and(path(TEXT_PATH))
        .and(body_partial_json(json!({ "input": "Porto" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(body.clone()))
        .expect(1)
        .mount(&server)
        .await;

    let backend = WorkersAiTextBackend::new("@cf/openai/gpt-oss-20b", client(&server));
    let value = backend.complete("be brief", "Porto").await.unwrap();
    assert_eq!(value, body);
}
