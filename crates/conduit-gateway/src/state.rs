//! Gateway orchestration: validate, translate, enforce, dispatch

use std::pin::Pin;
use std::sync::Arc;

use conduit_auth::CredentialStore;
use conduit_config::ModelsConfig;
use conduit_core::{CredentialSource, RequestContext};
use futures_util::Stream;
use secrecy::SecretString;

use crate::convert;
use crate::convert::stream::OutboundFrame;
use crate::enforce;
use crate::error::GatewayError;
use crate::protocol::anthropic::MessagesRequest;
use crate::protocol::openai::{ChatRequest, ChatResponse};
use crate::upstream::AnthropicClient;
use crate::validate;

/// Shared state for gateway route handlers
#[derive(Clone)]
pub struct GatewayState {
    inner: Arc<GatewayStateInner>,
}

struct GatewayStateInner {
    upstream: AnthropicClient,
    models: ModelsConfig,
    credentials: Option<Arc<CredentialStore>>,
}

impl GatewayState {
    /// Assemble the gateway state
    #[must_use]
    pub fn new(
        upstream: AnthropicClient,
        models: ModelsConfig,
        credentials: Option<Arc<CredentialStore>>,
    ) -> Self {
        Self {
            inner: Arc::new(GatewayStateInner {
                upstream,
                models,
                credentials,
            }),
        }
    }

    /// Execute a non-streaming completion
    ///
    /// # Errors
    ///
    /// Returns an error when validation, credential resolution, or the
    /// backend call fails.
    pub async fn complete(
        &self,
        request: ChatRequest,
        context: RequestContext,
    ) -> Result<ChatResponse, GatewayError> {
        let native = self.prepare(&request)?;
        let token = self.resolve_credential(&context).await?;

        let response = self.inner.upstream.send(&native, &token).await?;
        Ok(convert::response::to_foreign(response, &request.model))
    }

    /// Execute a streaming completion
    ///
    /// Errors are only possible here, before the first response byte;
    /// once the returned stream is being consumed, failures finalize the
    /// stream instead of surfacing.
    ///
    /// # Errors
    ///
    /// Returns an error when validation, credential resolution, or the
    /// initial backend call fails.
    pub async fn complete_stream(
        &self,
        request: ChatRequest,
        context: RequestContext,
    ) -> Result<Pin<Box<dyn Stream<Item = OutboundFrame> + Send>>, GatewayError> {
        let mut native = self.prepare(&request)?;
        native.stream = Some(true);
        let token = self.resolve_credential(&context).await?;

        let events = self.inner.upstream.send_stream(&native, &token).await?;
        Ok(Box::pin(convert::stream::chunk_stream(events, request.model)))
    }

    /// Validate and translate, using a fresh mapping snapshot
    fn prepare(&self, request: &ChatRequest) -> Result<MessagesRequest, GatewayError> {
        validate::validate(request)?;

        let mapping = self.inner.models.snapshot();
        let mut native = convert::request::to_native(request, &mapping)?;
        enforce::enforce(&mut native);

        Ok(native)
    }

    /// Resolve the backend credential for this call
    ///
    /// Passthrough forwards the caller's own token; otherwise the managed
    /// store supplies one. With no store configured and no inbound token,
    /// the call cannot be authenticated.
    async fn resolve_credential(&self, context: &RequestContext) -> Result<SecretString, GatewayError> {
        match &context.credential {
            CredentialSource::Passthrough(token) => Ok(token.clone()),
            CredentialSource::Managed => {
                let store = self
                    .inner
                    .credentials
                    .as_ref()
                    .ok_or(GatewayError::Unauthorized)?;

                store.access_token().await.map_err(|e| {
                    tracing::error!(error = %e, "managed credential unavailable");
                    GatewayError::Unauthorized
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> GatewayState {
        GatewayState::new(
            AnthropicClient::new(None).unwrap(),
            ModelsConfig::default(),
            None,
        )
    }

    #[tokio::test]
    async fn managed_path_without_store_is_unauthorized() {
        let err = state()
            .resolve_credential(&RequestContext::managed())
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Unauthorized));
    }

    #[tokio::test]
    async fn passthrough_path_forwards_inbound_token() {
        use secrecy::ExposeSecret as _;

        let token = state()
            .resolve_credential(&RequestContext::passthrough(SecretString::from("sk-abc")))
            .await
            .unwrap();
        assert_eq!(token.expose_secret(), "sk-abc");
    }

    #[tokio::test]
    async fn invalid_request_fails_before_any_network_io() {
        let request: ChatRequest = serde_json::from_value(serde_json::json!({
            "model": "gpt-4",
            "messages": [{"role": "user", "content": "hi"}],
            "n": 2
        }))
        .unwrap();

        // No backend is running; a validation failure proves nothing was
        // dispatched.
        let err = state()
            .complete(request, RequestContext::managed())
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Validation(_)));
    }
}
