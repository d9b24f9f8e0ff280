use thiserror::Error;

/// Errors from the managed credential store
#[derive(Debug, Error)]
pub enum AuthError {
    /// Credential file is missing or unreadable
    #[error("credential file unavailable: {0}")]
    Unavailable(String),

    /// Credential file exists but does not parse
    #[error("credential file malformed: {0}")]
    Malformed(String),

    /// Token is expired and no refresh token is available
    #[error("credential expired and not refreshable")]
    NotRefreshable,

    /// Token refresh request failed
    #[error("token refresh failed: {0}")]
    RefreshFailed(String),
}
