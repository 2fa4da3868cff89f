//! Normalizing heterogeneous backend response shapes.
//!
//! Backend integrations have produced several payload shapes over time:
//! `{data: {answer, ...}}`, `{answer}`, `{message}`, and bare strings. The
//! extraction rules here are evaluated in a fixed precedence that other
//! teams' integrations rely on; do not reorder them.

use askdoc_core::{BotReply, Source};
use serde_json::Value;
use tracing::debug;

/// Canonical fallback when no answer text can be extracted.
pub const NO_RESPONSE_TEXT: &str = "No response received";

/// Map an arbitrary backend response to a canonical reply.
///
/// Answer text precedence, first match wins:
/// 1. `response.data.answer` (when `data` is an object)
/// 2. `response.answer`
/// 3. `response.message`
/// 4. the response itself, when it is a string
/// 5. [`NO_RESPONSE_TEXT`]
///
/// Attachment fields are read from `data.*` first, then the top level,
/// defaulting to empty. Never fails.
#[must_use]
pub fn normalize_response(response: &Value) -> BotReply {
    let content = extract_content(response);
    if content == NO_RESPONSE_TEXT {
        debug!("could not extract answer text from response");
    }

    BotReply {
        content,
        sources: field(response, "sources")
            .and_then(|v| serde_json::from_value::<Vec<Source>>(v.clone()).ok())
            .unwrap_or_default(),
        image_url: field(response, "imageUrl")
            .and_then(Value::as_str)
            .map(ToString::to_string),
        images: field(response, "images")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|v| v.as_str().map(ToString::to_string))
                    .collect()
            })
            .unwrap_or_default(),
        link_url: field(response, "otherUrl")
            .and_then(Value::as_str)
            .map(ToString::to_string),
    }
}

fn extract_content(response: &Value) -> String {
    if let Some(answer) = response
        .get("data")
        .filter(|d| d.is_object())
        .and_then(|d| d.get("answer"))
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
    {
        return answer.to_string();
    }
    if let Some(answer) = response
        .get("answer")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
    {
        return answer.to_string();
    }
    if let Some(message) = response
        .get("message")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
    {
        return message.to_string();
    }
    if let Some(text) = response.as_str().filter(|s| !s.is_empty()) {
        return text.to_string();
    }
    NO_RESPONSE_TEXT.to_string()
}

/// Look a field up under `data` first, then at the top level.
fn field<'a>(response: &'a Value, key: &str) -> Option<&'a Value> {
    response
        .get("data")
        .filter(|d| d.is_object())
        .and_then(|d| d.get(key))
        .or_else(|| response.get(key))
}
