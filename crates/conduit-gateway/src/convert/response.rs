//! Native response to foreign response translation, plus the error
//! translator

use std::time::{SystemTime, UNIX_EPOCH};

use crate::protocol::anthropic::{ContentBlock, ErrorEnvelope, MessagesResponse};
use crate::protocol::openai::{
    AssistantMessage, ChatChoice, ChatResponse, ErrorDetail, FunctionCall, ToolCall, Usage,
};

/// Fallback message when an upstream error body is unusable
const GENERIC_UPSTREAM_MESSAGE: &str = "upstream request failed";

/// Translate a native response into foreign shape
///
/// Text segments concatenate with no separator; the assistant content is
/// null when the response carried no text. Each tool-invocation segment
/// becomes one foreign tool call with its input re-serialized. The echoed
/// model name is the foreign name the caller requested, not the mapped
/// native one.
#[must_use]
pub fn to_foreign(response: MessagesResponse, requested_model: &str) -> ChatResponse {
    let mut text = String::new();
    let mut tool_calls = Vec::new();

    for block in &response.content {
        match block {
            ContentBlock::Text { text: t } => text.push_str(t),
            ContentBlock::ToolUse { id, name, input } => {
                let arguments = serde_json::to_string(input).unwrap_or_else(|_| "{}".to_owned());
                tool_calls.push(ToolCall {
                    id: id.clone(),
                    tool_type: "function".to_owned(),
                    function: FunctionCall {
                        name: name.clone(),
                        arguments,
                    },
                });
            }
        }
    }

    let content = if text.is_empty() { None } else { Some(text) };
    let finish_reason = response.stop_reason.as_deref().and_then(map_stop_reason);

    ChatResponse {
        id: completion_id(),
        object: "chat.completion".to_owned(),
        created: epoch_seconds(),
        model: requested_model.to_owned(),
        choices: vec![ChatChoice {
            index: 0,
            message: AssistantMessage {
                role: "assistant".to_owned(),
                content,
                tool_calls: if tool_calls.is_empty() { None } else { Some(tool_calls) },
            },
            finish_reason: finish_reason.map(str::to_owned),
        }],
        usage: Some(Usage {
            prompt_tokens: response.usage.input_tokens,
            completion_tokens: response.usage.output_tokens,
            total_tokens: response.usage.input_tokens + response.usage.output_tokens,
        }),
    }
}

/// Fixed stop-reason table; unlisted reasons map to a null finish reason
pub(crate) fn map_stop_reason(stop_reason: &str) -> Option<&'static str> {
    match stop_reason {
        "end_turn" => Some("stop"),
        "max_tokens" => Some("length"),
        "tool_use" => Some("tool_calls"),
        _ => None,
    }
}

/// Translate an upstream error body into a foreign error detail
///
/// A body in the backend's documented `{type, message}` shape passes
/// through with null param and code. Anything else is synthesized as an
/// internal error, reusing the body's `message` field when one exists.
#[must_use]
pub fn upstream_error_detail(body: &str) -> ErrorDetail {
    if let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(body) {
        return ErrorDetail {
            message: envelope.error.message,
            error_type: envelope.error.error_type,
            param: None,
            code: None,
        };
    }

    let message = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("message")
                .and_then(serde_json::Value::as_str)
                .map(str::to_owned)
        })
        .unwrap_or_else(|| GENERIC_UPSTREAM_MESSAGE.to_owned());

    ErrorDetail {
        message,
        error_type: "internal_error".to_owned(),
        param: None,
        code: None,
    }
}

pub(crate) fn epoch_seconds() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

pub(crate) fn completion_id() -> String {
    format!("chatcmpl-{}", uuid::Uuid::new_v4().simple())
}
