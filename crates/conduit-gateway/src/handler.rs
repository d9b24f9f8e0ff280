//! Axum route handlers for the foreign-protocol surface

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router, routing};
use conduit_core::{HttpError, RequestContext};
use futures_util::{Stream, StreamExt};

use crate::convert::response::upstream_error_detail;
use crate::convert::stream::OutboundFrame;
use crate::error::GatewayError;
use crate::protocol::openai::{ChatRequest, ErrorBody, ErrorDetail};
use crate::state::GatewayState;

/// Build the gateway router
pub fn gateway_router(state: GatewayState) -> Router {
    Router::new()
        .route("/v1/chat/completions", routing::post(chat_completions))
        .with_state(state)
}

/// Handle `POST /v1/chat/completions`
///
/// The body is deserialized by hand so a malformed payload (missing
/// `model`, `messages` that is not a sequence) is reported as a
/// validation failure in the foreign error shape, not as the extractor's
/// plain-text rejection.
async fn chat_completions(
    State(state): State<GatewayState>,
    axum::Extension(context): axum::Extension<RequestContext>,
    body: Result<Json<ChatRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match body {
        Ok(json) => json,
        Err(rejection) => {
            return error_response(&GatewayError::Validation(rejection.body_text()));
        }
    };

    let is_stream = request.stream.unwrap_or(false);

    if is_stream {
        match state.complete_stream(request, context).await {
            Ok(frames) => sse_response(frames).into_response(),
            Err(e) => error_response(&e),
        }
    } else {
        match state.complete(request, context).await {
            Ok(response) => Json(response).into_response(),
            Err(e) => error_response(&e),
        }
    }
}

/// Wrap the outbound frame stream as SSE
///
/// Frame serialization cannot realistically fail; a failure yields an
/// empty data line rather than tearing down the stream.
fn sse_response<S>(frames: S) -> Sse<impl Stream<Item = Result<Event, axum::Error>>>
where
    S: Stream<Item = OutboundFrame> + Send + 'static,
{
    let events = frames.map(|frame| match frame {
        OutboundFrame::Chunk(chunk) => {
            let data = serde_json::to_string(&chunk).unwrap_or_default();
            Ok(Event::default().data(data))
        }
        OutboundFrame::Done => Ok(Event::default().data("[DONE]")),
    });

    Sse::new(events).keep_alive(KeepAlive::default())
}

/// Convert a gateway error into a foreign-shape JSON error response
///
/// Upstream errors go through the error translator so recognizable
/// backend errors pass through with their own kind and message.
fn error_response(error: &GatewayError) -> Response {
    let status = error.status_code();

    let detail = match error {
        GatewayError::Upstream { body, .. } => upstream_error_detail(body),
        other => ErrorDetail {
            message: other.client_message(),
            error_type: other.error_type().to_owned(),
            param: None,
            code: None,
        },
    };

    (status, Json(ErrorBody { error: detail })).into_response()
}

#[cfg(test)]
mod tests {
    use http::StatusCode;

    use super::*;

    #[test]
    fn validation_error_renders_foreign_shape() {
        let response = error_response(&GatewayError::Validation(
            "Multiple completions are not supported".to_owned(),
        ));
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn upstream_error_keeps_backend_status() {
        let response = error_response(&GatewayError::Upstream {
            status: StatusCode::SERVICE_UNAVAILABLE,
            body: r#"{"type": "error", "error": {"type": "overloaded_error", "message": "busy"}}"#.to_owned(),
        });
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
