use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use conduit_core::RequestContext;
use secrecy::SecretString;

/// Middleware that selects the credential path for each call
///
/// An inbound `Authorization: Bearer` token selects passthrough; its
/// absence selects the managed credential store. The decision is made
/// here, once, and handlers only see the resulting context.
pub async fn request_context_middleware(mut request: Request, next: Next) -> Response {
    let context = bearer_token(&request).map_or_else(RequestContext::managed, RequestContext::passthrough);

    request.extensions_mut().insert(context);
    next.run(request).await
}

fn bearer_token(request: &Request) -> Option<SecretString> {
    request
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(SecretString::from)
}
