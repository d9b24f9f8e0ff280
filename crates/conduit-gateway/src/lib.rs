//! Protocol translation gateway core
//!
//! Translates the `OpenAI` chat-completion wire protocol (foreign) to the
//! Anthropic Messages API (native) in both directions: requests,
//! non-streaming responses, streamed responses, and errors. Every native
//! request leaves with the mandated leading instruction in place.

pub mod convert;
pub mod enforce;
mod error;
mod handler;
pub mod mapping;
pub mod protocol;
mod state;
mod upstream;
pub mod validate;

pub use enforce::MANDATED_INSTRUCTION;
pub use error::GatewayError;
pub use handler::gateway_router;
pub use state::GatewayState;
pub use upstream::AnthropicClient;
