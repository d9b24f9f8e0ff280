use std::path::PathBuf;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::AuthError;

/// OAuth token endpoint used for refresh
const TOKEN_URL: &str = "https://console.anthropic.com/v1/oauth/token";

/// OAuth client identifier registered for CLI-class credentials
const CLIENT_ID: &str = "9d1c250a-e61b-44d9-88ed-5944d1962f5e";

/// Persisted OAuth token pair
///
/// Matches the credential file written by the provisioning tool:
/// `expires_at` is epoch milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredCredentials {
    /// Current access token
    pub access_token: String,
    /// Refresh token, if the grant issued one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Expiry of the access token, epoch milliseconds
    #[serde(default)]
    pub expires_at: Option<u64>,
}

impl StoredCredentials {
    /// Whether the access token is within `margin` of its expiry
    fn is_stale(&self, margin: Duration) -> bool {
        let Some(expires_at) = self.expires_at else {
            // No expiry recorded; assume the token is usable
            return false;
        };

        let now_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or(0);

        now_ms + margin.as_millis() >= u128::from(expires_at)
    }
}

/// Token response from the OAuth refresh endpoint
#[derive(Debug, Deserialize)]
struct RefreshResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    /// Lifetime of the new access token in seconds
    #[serde(default)]
    expires_in: Option<u64>,
}

/// Managed credential store backed by a JSON file
///
/// Refreshes the token when it is within the configured margin of expiry
/// and writes the refreshed pair back. Refreshes are serialized behind a
/// mutex so concurrent calls never race the token endpoint.
pub struct CredentialStore {
    path: PathBuf,
    refresh_margin: Duration,
    client: reqwest::Client,
    /// Serializes refresh attempts; holds the last-loaded credentials
    current: Mutex<Option<StoredCredentials>>,
}

impl CredentialStore {
    /// Create a store over the given credential file
    #[must_use]
    pub fn new(path: PathBuf, refresh_margin: Duration) -> Self {
        Self {
            path,
            refresh_margin,
            client: reqwest::Client::new(),
            current: Mutex::new(None),
        }
    }

    /// Get a usable access token, refreshing first if it is stale
    ///
    /// # Errors
    ///
    /// Returns `AuthError` if the credential file is unusable or the
    /// refresh request fails
    pub async fn access_token(&self) -> Result<SecretString, AuthError> {
        let mut guard = self.current.lock().await;

        let mut credentials = match guard.take() {
            Some(credentials) => credentials,
            None => self.load().await?,
        };

        if credentials.is_stale(self.refresh_margin) {
            credentials = self.refresh(&credentials).await?;
            self.persist(&credentials).await;
        }

        let token = SecretString::from(credentials.access_token.clone());
        *guard = Some(credentials);

        Ok(token)
    }

    /// Read the credential file
    async fn load(&self) -> Result<StoredCredentials, AuthError> {
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| AuthError::Unavailable(format!("{}: {e}", self.path.display())))?;

        serde_json::from_str(&raw).map_err(|e| AuthError::Malformed(e.to_string()))
    }

    /// Exchange the refresh token for a new access token
    async fn refresh(&self, credentials: &StoredCredentials) -> Result<StoredCredentials, AuthError> {
        let refresh_token = credentials
            .refresh_token
            .as_deref()
            .ok_or(AuthError::NotRefreshable)?;

        tracing::info!("refreshing upstream credential");

        let body = serde_json::json!({
            "client_id": CLIENT_ID,
            "grant_type": "refresh_token",
            "refresh_token": refresh_token,
        });

        let response = self
            .client
            .post(TOKEN_URL)
            .json(&body)
            .send()
            .await
            .map_err(|e| AuthError::RefreshFailed(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::RefreshFailed(format!("{status}: {body}")));
        }

        let token: RefreshResponse = response
            .json()
            .await
            .map_err(|e| AuthError::RefreshFailed(format!("unparseable token response: {e}")))?;

        let now_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .ok()
            .and_then(|d| u64::try_from(d.as_millis()).ok())
            .unwrap_or(0);

        Ok(StoredCredentials {
            access_token: token.access_token,
            // Rotating grants replace the refresh token; keep the old one otherwise
            refresh_token: token
                .refresh_token
                .or_else(|| credentials.refresh_token.clone()),
            expires_at: token.expires_in.map(|secs| now_ms + secs * 1000),
        })
    }

    /// Write refreshed credentials back to disk
    ///
    /// Persistence failure is logged, not fatal: the in-memory token is
    /// still valid for this process.
    async fn persist(&self, credentials: &StoredCredentials) {
        match serde_json::to_string_pretty(credentials) {
            Ok(raw) => {
                if let Err(e) = tokio::fs::write(&self.path, raw).await {
                    tracing::warn!(
                        path = %self.path.display(),
                        error = %e,
                        "failed to persist refreshed credentials"
                    );
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to serialize refreshed credentials");
            }
        }
    }
}

impl std::fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialStore")
            .field("path", &self.path)
            .field("refresh_margin", &self.refresh_margin)
            .finish_non_exhaustive()
    }
}
