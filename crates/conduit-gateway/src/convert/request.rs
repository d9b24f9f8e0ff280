//! Foreign request to native request translation

use conduit_config::ModelMapping;

use crate::error::GatewayError;
use crate::mapping;
use crate::protocol::anthropic::{Message, MessagesRequest, SystemPrompt, Tool, ToolChoice};
use crate::protocol::openai::{ChatMessage, ChatRequest, MessageContent, StopSequences, ToolDefinition};

/// Token budget when the caller omits one (the backend requires the field)
pub const DEFAULT_MAX_TOKENS: u32 = 4096;

/// Translate a validated foreign request into a native request
///
/// System turns are joined, in order, into one instruction segment.
/// Consecutive same-role user/assistant turns are consolidated to satisfy
/// the backend's alternation requirement. Turns with any other role are
/// dropped; tool-result turns are a known gap.
///
/// # Errors
///
/// Returns `GatewayError::Validation` when a tool definition is missing
/// its name or description.
pub fn to_native(request: &ChatRequest, mapping: &ModelMapping) -> Result<MessagesRequest, GatewayError> {
    let (system, messages) = translate_turns(&request.messages);
    let tools = request.tools.as_deref().map(translate_tools).transpose()?;
    let tool_choice = request.tool_choice.as_ref().and_then(translate_tool_choice);

    Ok(MessagesRequest {
        model: mapping::resolve(&request.model, mapping),
        max_tokens: request.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
        system,
        messages,
        temperature: request.temperature,
        top_p: request.top_p,
        stop_sequences: request.stop.clone().map(StopSequences::into_vec),
        stream: request.stream.filter(|&s| s),
        tools,
        tool_choice,
    })
}

/// Split turns into one instruction segment plus alternating conversation
/// turns
fn translate_turns(turns: &[ChatMessage]) -> (Option<SystemPrompt>, Vec<Message>) {
    let mut system_parts: Vec<String> = Vec::new();
    let mut messages: Vec<Message> = Vec::new();

    for turn in turns {
        let content = turn.content.as_ref().map_or_else(String::new, MessageContent::as_text);

        match turn.role.as_str() {
            "system" => system_parts.push(content),
            "user" | "assistant" => {
                match messages.last_mut() {
                    Some(last) if last.role == turn.role => {
                        last.content.push_str("\n\n");
                        last.content.push_str(&content);
                    }
                    _ => messages.push(Message {
                        role: turn.role.clone(),
                        content,
                    }),
                }
            }
            other => {
                tracing::debug!(role = other, "dropping turn with unsupported role");
            }
        }
    }

    let system = if system_parts.is_empty() {
        None
    } else {
        Some(SystemPrompt::Text(system_parts.join("\n\n")))
    };

    (system, messages)
}

/// Normalize tool definitions from either foreign shape
fn translate_tools(tools: &[ToolDefinition]) -> Result<Vec<Tool>, GatewayError> {
    tools
        .iter()
        .enumerate()
        .map(|(i, tool)| {
            let spec = tool.spec();

            if spec.name.trim().is_empty() {
                return Err(GatewayError::Validation(format!(
                    "tool at index {i} has no name"
                )));
            }

            let description = spec
                .description
                .as_deref()
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .ok_or_else(|| {
                    GatewayError::Validation(format!("tool \"{}\" has no description", spec.name))
                })?;

            Ok(Tool {
                name: spec.name.clone(),
                description: description.to_owned(),
                input_schema: spec
                    .parameters
                    .clone()
                    .unwrap_or_else(|| serde_json::json!({"type": "object", "properties": {}})),
            })
        })
        .collect()
}

/// Translate the foreign `tool_choice` value, dropping shapes the backend
/// cannot express
fn translate_tool_choice(value: &serde_json::Value) -> Option<ToolChoice> {
    match value {
        serde_json::Value::String(s) => match s.as_str() {
            "auto" => Some(ToolChoice {
                choice_type: "auto".to_owned(),
                name: None,
            }),
            "required" => Some(ToolChoice {
                choice_type: "any".to_owned(),
                name: None,
            }),
            _ => None,
        },
        serde_json::Value::Object(_) => value
            .pointer("/function/name")
            .and_then(serde_json::Value::as_str)
            .map(|name| ToolChoice {
                choice_type: "tool".to_owned(),
                name: Some(name.to_owned()),
            }),
        _ => None,
    }
}
