use http::StatusCode;
use conduit_core::HttpError;
use thiserror::Error;

/// Errors that can occur while servicing a gateway call
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Client sent a request the gateway cannot honor
    #[error("{0}")]
    Validation(String),

    /// Native backend returned a non-success status
    #[error("upstream returned {status}")]
    Upstream {
        /// Status code from the backend
        status: StatusCode,
        /// Raw backend response body, fed to the error translator
        body: String,
    },

    /// Error during a streaming exchange
    #[error("streaming error: {0}")]
    Streaming(String),

    /// No usable credential for this call
    #[error("authentication required")]
    Unauthorized,

    /// Unexpected internal failure
    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl HttpError for GatewayError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Upstream { status, .. } => *status,
            Self::Streaming(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
        }
    }

    fn error_type(&self) -> &str {
        match self {
            Self::Validation(_) => "invalid_request_error",
            Self::Upstream { .. } => "upstream_error",
            Self::Streaming(_) => "streaming_error",
            Self::Unauthorized => "authentication_error",
            Self::Internal(_) => "internal_error",
        }
    }

    fn client_message(&self) -> String {
        match self {
            Self::Internal(_) => "an internal error occurred".to_owned(),
            other => other.to_string(),
        }
    }
}
