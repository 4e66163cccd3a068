//! Ordered strategies for pulling a prompt out of a text model response
//!
//! Text models answer in different shapes depending on the model family and
//! on whether the call went through the REST API or a binding. Each strategy
//! handles one shape and returns a trimmed, non-empty string or `None`.

use serde_json::Value;

/// One named way of reading a prompt from a response
#[derive(Clone, Copy)]
pub struct ExtractionStrategy {
    pub name: &'static str,
    pub extract: fn(&Value) -> Option<String>,
}

/// Strategies in priority order
pub const DEFAULT_STRATEGIES: &[ExtractionStrategy] = &[
    ExtractionStrategy {
        name: "direct_field",
        extract: direct_field,
    },
    ExtractionStrategy {
        name: "result_response",
        extract: result_response,
    },
    ExtractionStrategy {
        name: "assistant_message",
        extract: assistant_message,
    },
    ExtractionStrategy {
        name: "raw_string",
        extract: raw_string,
    },
];

const DIRECT_FIELDS: &[&str] = &["response", "output_text", "text"];

/// Apply `strategies` in order; the first non-empty hit wins.
pub fn extract_prompt(
    value: &Value,
    strategies: &[ExtractionStrategy],
) -> Option<(&'static str, String)> {
    strategies
        .iter()
        .find_map(|strategy| (strategy.extract)(value).map(|text| (strategy.name, text)))
}

fn non_empty(text: &str) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// `{ "response": "..." }` and similar top-level string fields
pub fn direct_field(value: &Value) -> Option<String> {
    DIRECT_FIELDS
        .iter()
        .filter_map(|field| value.get(field).and_then(Value::as_str))
        .find_map(non_empty)
}

/// `{ "result": { "response": "..." } }`
pub fn result_response(value: &Value) -> Option<String> {
    value
        .pointer("/result/response")
        .and_then(Value::as_str)
        .and_then(non_empty)
}

/// Responses-API style output list:
/// `{ "output": [{ "type": "message", "role": "assistant",
///   "content": [{ "type": "output_text", "text": "..." }] }] }`,
/// either at the top level or under `result`.
pub fn assistant_message(value: &Value) -> Option<String> {
    let output = value
        .get("output")
        .or_else(|| value.pointer("/result/output"))
        .and_then(Value::as_array)?;

    output
        .iter()
        .filter(|item| item.get("role").and_then(Value::as_str) == Some("assistant"))
        .filter(|item| {
            item.get("type")
                .and_then(Value::as_str)
                .map_or(true, |t| t == "message")
        })
        .filter_map(|item| item.get("content").and_then(Value::as_array))
        .flatten()
        .filter(|content| content.get("type").and_then(Value::as_str) == Some("output_text"))
        .filter_map(|content| content.get("text").and_then(Value::as_str))
        .find_map(non_empty)
}

/// The response is itself a JSON string
pub fn raw_string(value: &Value) -> Option<String> {
    value.as_str().and_then(non_empty)
}
