use http::StatusCode;

/// Contract between a domain error and the foreign error response
///
/// Every failure leaves the gateway as `{"error": {"message", "type",
/// "param", "code"}}`. Implementors supply the status and the two fields
/// that vary per error; the route layer owns the envelope, so domain
/// crates never touch axum types.
pub trait HttpError: std::error::Error {
    /// HTTP status of the response
    fn status_code(&self) -> StatusCode;

    /// Value of the foreign `error.type` field (e.g. `invalid_request_error`)
    fn error_type(&self) -> &str;

    /// Value of the foreign `error.message` field
    ///
    /// This is what callers see. Implementors redact internal detail
    /// here; the unredacted error belongs in the logs.
    fn client_message(&self) -> String;
}
