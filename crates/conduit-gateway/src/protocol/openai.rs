//! `OpenAI` chat completion wire format (the foreign protocol)

use serde::{Deserialize, Serialize};

// -- Request types --

/// Chat completion request as sent by `OpenAI`-speaking clients
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Requested model identifier (foreign name)
    pub model: String,
    /// Ordered conversation turns
    pub messages: Vec<ChatMessage>,
    /// Maximum tokens to generate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// Sampling temperature
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Nucleus sampling threshold
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    /// Number of completions to generate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n: Option<u32>,
    /// Whether to stream the response
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>,
    /// Stop sequences (single string or list)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop: Option<StopSequences>,
    /// Tool definitions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<ToolDefinition>>,
    /// Tool choice configuration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_choice: Option<serde_json::Value>,
    /// Log-probability reporting (unsupported)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logprobs: Option<bool>,
    /// Presence penalty (accepted, ignored downstream)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub presence_penalty: Option<f64>,
    /// Frequency penalty (accepted, ignored downstream)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency_penalty: Option<f64>,
    /// Logit bias map (accepted, ignored downstream)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logit_bias: Option<serde_json::Value>,
    /// End-user identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
}

/// One conversation turn
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Turn role ("system", "user", "assistant", ...)
    pub role: String,
    /// Turn content (string or array of text parts)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<MessageContent>,
    /// Participant name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Message content, either a plain string or a list of typed parts
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    /// Plain text content
    Text(String),
    /// Array of content parts
    Parts(Vec<ContentPart>),
}

impl MessageContent {
    /// Flatten the content to a single string
    #[must_use]
    pub fn as_text(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Parts(parts) => parts
                .iter()
                .map(|ContentPart::Text { text }| text.as_str())
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

/// Typed content part within a message
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    /// Text content
    Text {
        /// The text string
        text: String,
    },
}

/// Stop sequences, accepted as a bare string or a list
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StopSequences {
    /// Single stop sequence
    One(String),
    /// Multiple stop sequences
    Many(Vec<String>),
}

impl StopSequences {
    /// Normalize to a list
    #[must_use]
    pub fn into_vec(self) -> Vec<String> {
        match self {
            Self::One(s) => vec![s],
            Self::Many(v) => v,
        }
    }
}

/// Tool definition, accepted in both shapes clients send
///
/// The canonical shape nests the function spec under a `function` key; a
/// widespread variant flattens the spec to the top level. Both carry the
/// same information.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ToolDefinition {
    /// `{"type": "function", "function": {...}}`
    Nested {
        /// Tool type discriminator (always "function")
        #[serde(rename = "type")]
        tool_type: String,
        /// Function specification
        function: FunctionSpec,
    },
    /// `{"name": ..., "description": ..., "parameters": ...}`
    Flattened(FunctionSpec),
}

impl ToolDefinition {
    /// The function spec regardless of wire shape
    #[must_use]
    pub const fn spec(&self) -> &FunctionSpec {
        match self {
            Self::Nested { function, .. } => function,
            Self::Flattened(spec) => spec,
        }
    }
}

/// Function specification within a tool definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionSpec {
    /// Function name
    pub name: String,
    /// Human-readable description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// JSON Schema for parameters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<serde_json::Value>,
}

// -- Response types --

/// Chat completion response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Response identifier
    pub id: String,
    /// Object type (always "chat.completion")
    pub object: String,
    /// Creation timestamp, epoch seconds
    pub created: u64,
    /// Model name echoed to the caller (the requested foreign name)
    pub model: String,
    /// Generated choices (always exactly one)
    pub choices: Vec<ChatChoice>,
    /// Token usage
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

/// Choice within a response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatChoice {
    /// Choice index
    pub index: u32,
    /// Generated assistant message
    pub message: AssistantMessage,
    /// Why generation stopped
    pub finish_reason: Option<String>,
}

/// Assistant message within a response choice
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantMessage {
    /// Role (always "assistant")
    pub role: String,
    /// Text content, null when the response carried no text
    pub content: Option<String>,
    /// Tool calls requested by the model
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,
}

/// Tool call within an assistant message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    /// Tool call identifier
    pub id: String,
    /// Tool type (always "function")
    #[serde(rename = "type")]
    pub tool_type: String,
    /// Function call details
    pub function: FunctionCall,
}

/// Function call details within a tool call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionCall {
    /// Function name
    pub name: String,
    /// JSON-encoded arguments
    pub arguments: String,
}

/// Token usage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Usage {
    /// Prompt tokens
    pub prompt_tokens: u32,
    /// Completion tokens
    pub completion_tokens: u32,
    /// Total tokens
    pub total_tokens: u32,
}

// -- Streaming types --

/// Streaming chunk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamChunk {
    /// Chunk identifier, constant for the whole stream
    pub id: String,
    /// Object type (always "chat.completion.chunk")
    pub object: String,
    /// Creation timestamp, epoch seconds
    pub created: u64,
    /// Model name echoed to the caller
    pub model: String,
    /// Delta choices
    pub choices: Vec<StreamChoice>,
    /// Usage, present only on the terminal chunk
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

/// Choice within a streaming chunk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamChoice {
    /// Choice index
    pub index: u32,
    /// Incremental delta
    pub delta: ChunkDelta,
    /// Finish reason, present only on the terminal chunk
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Delta content within a streaming choice
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChunkDelta {
    /// Role, present on the first chunk only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Incremental text content
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

// -- Error response --

/// Error response body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Error details
    pub error: ErrorDetail,
}

/// Error detail
///
/// `param` and `code` are always serialized, as null when absent, matching
/// what `OpenAI` SDKs expect to find.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Error message
    pub message: String,
    /// Error type
    #[serde(rename = "type")]
    pub error_type: String,
    /// Parameter that caused the error
    #[serde(default)]
    pub param: Option<String>,
    /// Error code
    #[serde(default)]
    pub code: Option<String>,
}
