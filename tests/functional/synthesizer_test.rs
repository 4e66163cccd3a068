//! Functional tests for prompt synthesis

#[path = "../common/mod.rs"]
mod common;

use common::CannedText;
use postcard_gateway::backend::BackendError;
use postcard_gateway::config::PromptConfig;
use postcard_gateway::prompt::{fallback_prompt, PromptSource, PromptSynthesizer};
use postcard_gateway::AppError;
use serde_json::json;

fn synthesizer(text: std::sync::Arc<CannedText>) -> PromptSynthesizer {
    PromptSynthesizer::new(text, &PromptConfig::default())
}

#[tokio::test]
async fn test_extracts_assistant_output_text() {
    let text = CannedText::new(Ok(json!({
        "result": {
            "output": [
                { "type": "reasoning", "content": [] },
                { "type": "message", "role": "assistant",
                  "content": [{
                      "type": "output_text",
                      "text": "  A postcard of Kyoto in autumn  "
                  }] }
            ]
        },
        "success": true
    })));

    let result = synthesizer(text.clone()).synthesize("Kyoto").await.unwrap();
    assert_eq!(result.prompt, "A postcard of Kyoto in autumn");
    assert_eq!(result.source, PromptSource::Generated);
    assert_eq!(text.calls(), 1);
    assert!(text.inputs()[0].contains("Kyoto"));
}

#[tokio::test]
async fn test_extracts_nested_result_response() {
    let text = CannedText::new(Ok(json!({ "result": { "response": "Sunny Lisbon trams" } })));
    let result = synthesizer(text).synthesize("Lisbon").await.unwrap();
    assert_eq!(result.prompt, "Sunny Lisbon trams");
}

#[tokio::test]
async fn test_backend_error_falls_back() {
    let text = CannedText::new(Err(BackendError::new("3040: Capacity temporarily exceeded")
        .with_status(429)
        .with_code(3040)));

    let result = synthesizer(text).synthesize("Reykjavik").await.unwrap();
    assert_eq!(result.source, PromptSource::Fallback);
    assert_eq!(result.prompt, fallback_prompt("Reykjavik"));
    assert!(result.prompt.contains("Reykjavik"));
}

#[tokio::test]
async fn test_unrecognised_shape_falls_back() {
    let text = CannedText::new(Ok(json!({ "choices": [{ "message": { "content": "hi" } }] })));
    let result = synthesizer(text).synthesize("Oslo").await.unwrap();
    assert_eq!(result.source, PromptSource::Fallback);
    assert!(!result.prompt.is_empty());
    assert_eq!(result.prompt, result.prompt.trim());
}

#[tokio::test]
async fn test_blank_extraction_falls_back() {
    let text = CannedText::new(Ok(json!({ "response": "   " })));
    let result = synthesizer(text).synthesize("Cairo").await.unwrap();
    assert_eq!(result.source, PromptSource::Fallback);
}

#[tokio::test]
async fn test_never_empty_for_any_place() {
    for place in ["Paris", "  São Paulo ", "x", "New York City"] {
        let text = CannedText::new(Ok(json!(null)));
        let result = synthesizer(text).synthesize(place).await.unwrap();
        assert!(!result.prompt.trim().is_empty());
        assert!(result.prompt.contains(place.trim()));
    }
}

#[tokio::test]
async fn test_empty_place_rejected_without_call() {
    let text = CannedText::new(Ok(json!({ "response": "unused" })));
    let synth = synthesizer(text.clone());

    for place in ["", "   "] {
        let err = synth.synthesize(place).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }
    assert_eq!(text.calls(), 0);
}
