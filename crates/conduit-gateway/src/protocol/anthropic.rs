//! Anthropic Messages API wire format (the native protocol)

use serde::{Deserialize, Serialize};

// -- Request types --

/// Messages API request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessagesRequest {
    /// Native model identifier
    pub model: String,
    /// Maximum tokens to generate (required by the backend)
    pub max_tokens: u32,
    /// Instruction segments, top level rather than in `messages`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<SystemPrompt>,
    /// Conversation turns, strictly alternating user/assistant
    pub messages: Vec<Message>,
    /// Sampling temperature
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Nucleus sampling threshold
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    /// Stop sequences
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_sequences: Option<Vec<String>>,
    /// Whether to stream the response
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>,
    /// Tool definitions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<Tool>>,
    /// Tool choice configuration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_choice: Option<ToolChoice>,
}

/// System prompt, a bare string or an ordered segment list
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SystemPrompt {
    /// Single instruction string (shorthand)
    Text(String),
    /// Ordered instruction segments
    Blocks(Vec<SystemBlock>),
}

/// One instruction segment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SystemBlock {
    /// Text segment
    Text {
        /// The instruction text
        text: String,
    },
}

impl SystemBlock {
    /// Build a text segment
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }
}

/// One conversation turn
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Turn role ("user" or "assistant")
    pub role: String,
    /// Turn content
    pub content: String,
}

/// Tool definition in native shape
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tool {
    /// Tool name
    pub name: String,
    /// Human-readable description
    pub description: String,
    /// JSON Schema for input parameters
    pub input_schema: serde_json::Value,
}

/// Tool choice configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolChoice {
    /// Choice type: "auto", "any", or "tool"
    #[serde(rename = "type")]
    pub choice_type: String,
    /// Specific tool name (when type is "tool")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

// -- Response types --

/// Messages API response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessagesResponse {
    /// Response identifier
    pub id: String,
    /// Object type (always "message")
    #[serde(rename = "type")]
    pub response_type: String,
    /// Role (always "assistant")
    pub role: String,
    /// Ordered content segments
    pub content: Vec<ContentBlock>,
    /// Model that produced the response
    pub model: String,
    /// Stop reason
    #[serde(default)]
    pub stop_reason: Option<String>,
    /// Stop sequence that triggered the stop
    #[serde(default)]
    pub stop_sequence: Option<String>,
    /// Token usage
    pub usage: NativeUsage,
}

/// Content segment in a response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    /// Text segment
    Text {
        /// The text string
        text: String,
    },
    /// Tool invocation segment
    ToolUse {
        /// Invocation identifier
        id: String,
        /// Target tool name
        name: String,
        /// Tool input as JSON
        input: serde_json::Value,
    },
}

/// Native token usage
///
/// Both fields default to zero: stream events carry partial usage
/// (`message_start` has only input tokens, `message_delta` only output).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct NativeUsage {
    /// Input tokens
    #[serde(default)]
    pub input_tokens: u32,
    /// Output tokens
    #[serde(default)]
    pub output_tokens: u32,
}

// -- Streaming types --

/// Native SSE event, a closed variant set
///
/// Parse with [`StreamEvent::parse`]: an unknown tag never breaks an
/// in-flight stream, it becomes [`StreamEvent::Other`] keeping only its
/// usage field.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    /// Stream started, carries initial usage
    MessageStart {
        /// Partial message with metadata
        message: StreamMessageStart,
    },
    /// New content block started
    ContentBlockStart {
        /// Block index
        index: u32,
    },
    /// Incremental content within a block
    ContentBlockDelta {
        /// Block index
        index: u32,
        /// Delta content
        delta: StreamDelta,
    },
    /// Content block finished
    ContentBlockStop {
        /// Block index
        index: u32,
    },
    /// Message metadata delta, carries updated usage
    MessageDelta {
        /// Delta with stop reason
        delta: MessageDeltaBody,
        /// Updated usage
        #[serde(default)]
        usage: Option<NativeUsage>,
    },
    /// Stream completed
    MessageStop,
    /// Keep-alive
    Ping,
    /// Any tag this gateway does not handle, inspected only for usage
    Other {
        /// Usage carried by the unhandled event, if any
        #[serde(default)]
        usage: Option<NativeUsage>,
    },
}

impl StreamEvent {
    /// Parse one SSE event payload, tolerating unknown tags
    ///
    /// An event whose tag is not in the variant set still surfaces its
    /// `usage` field through [`StreamEvent::Other`]. A payload with no
    /// string `type` field at all fails with the primary parse error.
    ///
    /// # Errors
    ///
    /// Returns the underlying `serde_json` error when the payload is not
    /// a JSON object in event shape.
    pub fn parse(data: &str) -> serde_json::Result<Self> {
        #[derive(Deserialize)]
        struct AnyEvent {
            #[serde(rename = "type")]
            _tag: String,
            #[serde(default)]
            usage: Option<NativeUsage>,
        }

        match serde_json::from_str::<Self>(data) {
            Ok(event) => Ok(event),
            Err(primary) => serde_json::from_str::<AnyEvent>(data)
                .map(|any| Self::Other { usage: any.usage })
                .map_err(|_| primary),
        }
    }
}

/// Partial message in a `message_start` event
#[derive(Debug, Clone, Deserialize)]
pub struct StreamMessageStart {
    /// Response identifier
    pub id: String,
    /// Model
    pub model: String,
    /// Initial usage
    #[serde(default)]
    pub usage: Option<NativeUsage>,
}

/// Delta content in a `content_block_delta` event
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamDelta {
    /// Incremental text
    TextDelta {
        /// Text fragment
        text: String,
    },
    /// Incremental tool input JSON (not forwarded)
    InputJsonDelta {
        /// JSON fragment
        partial_json: String,
    },
}

/// Delta in a `message_delta` event
#[derive(Debug, Clone, Deserialize)]
pub struct MessageDeltaBody {
    /// Stop reason
    #[serde(default)]
    pub stop_reason: Option<String>,
    /// Stop sequence
    #[serde(default)]
    pub stop_sequence: Option<String>,
}

// -- Error response --

/// Native error response body
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorEnvelope {
    /// Object type (always "error")
    #[serde(rename = "type")]
    pub envelope_type: String,
    /// Error details
    pub error: NativeError,
}

/// Native error detail
#[derive(Debug, Clone, Deserialize)]
pub struct NativeError {
    /// Error kind (e.g. `overloaded_error`)
    #[serde(rename = "type")]
    pub error_type: String,
    /// Error message
    pub message: String,
}
