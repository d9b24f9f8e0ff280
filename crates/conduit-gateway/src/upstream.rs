//! Native backend client

use std::pin::Pin;

use futures_util::Stream;
use secrecy::{ExposeSecret, SecretString};
use url::Url;

use crate::convert::stream::native_events;
use crate::error::GatewayError;
use crate::protocol::anthropic::{MessagesRequest, MessagesResponse, StreamEvent};

/// Default backend base URL
const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";

/// Protocol version header value
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Feature flag required for OAuth-issued credentials
const OAUTH_BETA: &str = "oauth-2025-04-20";

/// Client for the backend Messages API
///
/// No retries anywhere: a backend failure is translated and surfaced
/// exactly once.
#[derive(Debug, Clone)]
pub struct AnthropicClient {
    client: reqwest::Client,
    base_url: Url,
}

impl AnthropicClient {
    /// Create a client, falling back to the public API base URL
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::Internal` if the built-in default URL fails
    /// to parse, which indicates a build defect.
    pub fn new(base_url: Option<Url>) -> Result<Self, GatewayError> {
        let base_url = match base_url {
            Some(url) => url,
            None => Url::parse(DEFAULT_BASE_URL)
                .map_err(|e| GatewayError::Internal(anyhow::anyhow!("default base URL: {e}")))?,
        };

        Ok(Self {
            client: reqwest::Client::new(),
            base_url,
        })
    }

    /// Execute a non-streaming call
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::Upstream` for non-success statuses, carrying
    /// the raw body for the error translator.
    pub async fn send(
        &self,
        request: &MessagesRequest,
        token: &SecretString,
    ) -> Result<MessagesResponse, GatewayError> {
        let response = self.dispatch(request, token).await?;

        response
            .json()
            .await
            .map_err(|e| GatewayError::Internal(anyhow::anyhow!("unparseable backend response: {e}")))
    }

    /// Execute a streaming call, returning parsed native events
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::Upstream` when the backend rejects the call
    /// before any stream bytes are sent.
    pub async fn send_stream(
        &self,
        request: &MessagesRequest,
        token: &SecretString,
    ) -> Result<Pin<Box<dyn Stream<Item = Result<StreamEvent, GatewayError>> + Send>>, GatewayError> {
        let response = self.dispatch(request, token).await?;
        Ok(Box::pin(native_events(response.bytes_stream())))
    }

    async fn dispatch(
        &self,
        request: &MessagesRequest,
        token: &SecretString,
    ) -> Result<reqwest::Response, GatewayError> {
        let response = self
            .client
            .post(self.messages_url())
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("anthropic-beta", OAUTH_BETA)
            .bearer_auth(token.expose_secret())
            .json(request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "backend request failed");
                GatewayError::Upstream {
                    status: http::StatusCode::BAD_GATEWAY,
                    body: serde_json::json!({"message": e.to_string()}).to_string(),
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = %status, "backend returned error");
            return Err(GatewayError::Upstream { status, body });
        }

        Ok(response)
    }

    fn messages_url(&self) -> String {
        let base = self.base_url.as_str().trim_end_matches('/');
        format!("{base}/v1/messages")
    }
}
