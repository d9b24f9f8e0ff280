//! Native event stream to foreign chunk stream translation
//!
//! One-shot per call: the translator consumes the backend's SSE byte
//! stream exactly once and emits the foreign chunk protocol, ending with
//! the `[DONE]` sentinel.

use bytes::Bytes;
use eventsource_stream::Eventsource;
use futures_util::{Stream, StreamExt, stream};

use crate::error::GatewayError;
use crate::protocol::anthropic::{StreamDelta, StreamEvent};
use crate::protocol::openai::{ChunkDelta, StreamChoice, StreamChunk, Usage};

use super::response::{completion_id, epoch_seconds};

/// One outbound frame of the foreign stream
#[derive(Debug)]
pub enum OutboundFrame {
    /// A JSON chunk
    Chunk(StreamChunk),
    /// The terminal `[DONE]` sentinel; nothing follows it
    Done,
}

/// Parse a native SSE byte stream into native events
///
/// `eventsource-stream` reassembles lines split across read boundaries.
/// An event whose payload does not parse is dropped with a debug log;
/// one bad event never fails the call.
pub fn native_events<B, E>(bytes: B) -> impl Stream<Item = Result<StreamEvent, GatewayError>> + Send
where
    B: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: std::fmt::Display + Send + 'static,
{
    bytes.eventsource().filter_map(|result| {
        let item = match &result {
            Ok(event) => {
                let data = event.data.trim();
                if data.is_empty() {
                    None
                } else {
                    match StreamEvent::parse(data) {
                        Ok(parsed) => Some(Ok(parsed)),
                        Err(e) => {
                            tracing::debug!(error = %e, "skipping unparseable native stream event");
                            None
                        }
                    }
                }
            }
            Err(e) => Some(Err(GatewayError::Streaming(e.to_string()))),
        };

        async move { item }
    })
}

/// Translate native events into foreign chunks
///
/// Protocol: a role-announcement chunk before any native event is read,
/// one chunk per text delta, then exactly one terminal chunk carrying the
/// accumulated usage and `finish_reason: "stop"`, then the sentinel.
/// `message_start` usage records input tokens; `message_delta` usage
/// overwrites output tokens, last value wins. A transport failure mid
/// stream is logged and the stream finalized; the response has already
/// started, so it cannot be reported as an error body.
pub fn chunk_stream<S>(events: S, model: String) -> impl Stream<Item = OutboundFrame> + Send
where
    S: Stream<Item = Result<StreamEvent, GatewayError>> + Send + 'static,
{
    let events = Box::pin(events);
    let translation = Translation::new(model);

    stream::unfold(
        (Step::Role, events, translation),
        |(step, mut events, mut t)| async move {
            match step {
                Step::Role => Some((OutboundFrame::Chunk(t.role_chunk()), (Step::Relay, events, t))),
                Step::Relay => loop {
                    match events.next().await {
                        None => {
                            return Some((OutboundFrame::Chunk(t.final_chunk()), (Step::Sentinel, events, t)));
                        }
                        Some(Ok(event)) => match event {
                            StreamEvent::MessageStart { message } => {
                                if let Some(usage) = message.usage {
                                    t.input_tokens = usage.input_tokens;
                                }
                            }
                            StreamEvent::ContentBlockDelta {
                                delta: StreamDelta::TextDelta { text },
                                ..
                            } => {
                                return Some((OutboundFrame::Chunk(t.text_chunk(text)), (Step::Relay, events, t)));
                            }
                            StreamEvent::MessageDelta { usage, .. } => {
                                if let Some(usage) = usage {
                                    t.output_tokens = usage.output_tokens;
                                }
                            }
                            // Unhandled tags contribute nothing but usage
                            StreamEvent::Other { usage: Some(usage) } => {
                                if usage.input_tokens > 0 {
                                    t.input_tokens = usage.input_tokens;
                                }
                                if usage.output_tokens > 0 {
                                    t.output_tokens = usage.output_tokens;
                                }
                            }
                            StreamEvent::ContentBlockDelta { .. }
                            | StreamEvent::ContentBlockStart { .. }
                            | StreamEvent::ContentBlockStop { .. }
                            | StreamEvent::MessageStop
                            | StreamEvent::Ping
                            | StreamEvent::Other { usage: None } => {}
                        },
                        Some(Err(e)) => {
                            tracing::warn!(error = %e, "native stream failed mid-response, finalizing");
                            return Some((OutboundFrame::Chunk(t.final_chunk()), (Step::Sentinel, events, t)));
                        }
                    }
                },
                Step::Sentinel => Some((OutboundFrame::Done, (Step::Ended, events, t))),
                Step::Ended => None,
            }
        },
    )
}

enum Step {
    Role,
    Relay,
    Sentinel,
    Ended,
}

/// Per-call translation state
struct Translation {
    id: String,
    model: String,
    created: u64,
    input_tokens: u32,
    output_tokens: u32,
}

impl Translation {
    fn new(model: String) -> Self {
        Self {
            id: completion_id(),
            model,
            created: epoch_seconds(),
            input_tokens: 0,
            output_tokens: 0,
        }
    }

    fn role_chunk(&self) -> StreamChunk {
        self.chunk(
            ChunkDelta {
                role: Some("assistant".to_owned()),
                content: Some(String::new()),
            },
            None,
            None,
        )
    }

    fn text_chunk(&self, text: String) -> StreamChunk {
        self.chunk(
            ChunkDelta {
                role: None,
                content: Some(text),
            },
            None,
            None,
        )
    }

    fn final_chunk(&self) -> StreamChunk {
        self.chunk(
            ChunkDelta::default(),
            Some("stop".to_owned()),
            Some(Usage {
                prompt_tokens: self.input_tokens,
                completion_tokens: self.output_tokens,
                total_tokens: self.input_tokens + self.output_tokens,
            }),
        )
    }

    fn chunk(&self, delta: ChunkDelta, finish_reason: Option<String>, usage: Option<Usage>) -> StreamChunk {
        StreamChunk {
            id: self.id.clone(),
            object: "chat.completion.chunk".to_owned(),
            created: self.created,
            model: self.model.clone(),
            choices: vec![StreamChoice {
                index: 0,
                delta,
                finish_reason,
            }],
            usage,
        }
    }
}
