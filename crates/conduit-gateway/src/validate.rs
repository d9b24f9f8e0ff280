//! Foreign-request validation, run before any translation

use crate::error::GatewayError;
use crate::protocol::openai::ChatRequest;

/// Reject foreign requests the gateway cannot honor
///
/// Presence penalty, frequency penalty, and logit bias are accepted with a
/// warning; the native protocol has no equivalent and they are dropped
/// downstream.
///
/// # Errors
///
/// Returns `GatewayError::Validation` naming the violated constraint.
pub fn validate(request: &ChatRequest) -> Result<(), GatewayError> {
    if request.messages.is_empty() {
        return Err(GatewayError::Validation(
            "messages must contain at least one entry".to_owned(),
        ));
    }

    if request.model.trim().is_empty() {
        return Err(GatewayError::Validation("model must not be blank".to_owned()));
    }

    if let Some(n) = request.n
        && n > 1
    {
        return Err(GatewayError::Validation(format!(
            "Multiple completions are not supported (n must be 1, got {n})"
        )));
    }

    if request.logprobs == Some(true) {
        return Err(GatewayError::Validation(
            "logprobs is not supported by the backend".to_owned(),
        ));
    }

    if request.presence_penalty.is_some() || request.frequency_penalty.is_some() {
        tracing::warn!("penalty parameters accepted but ignored, the backend has no equivalent");
    }

    if request.logit_bias.is_some() {
        tracing::warn!("logit_bias accepted but ignored, the backend has no equivalent");
    }

    Ok(())
}
