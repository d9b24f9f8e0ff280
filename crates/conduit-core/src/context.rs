use secrecy::SecretString;

/// Runtime context for one gateway call
///
/// Built by the server middleware from the incoming HTTP request and
/// threaded through the orchestrator. Never cached across calls.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// How the upstream credential for this call is obtained
    pub credential: CredentialSource,
}

impl RequestContext {
    /// Create a context that uses the managed credential store
    #[must_use]
    pub const fn managed() -> Self {
        Self {
            credential: CredentialSource::Managed,
        }
    }

    /// Create a context that forwards the caller's own bearer token
    #[must_use]
    pub const fn passthrough(token: SecretString) -> Self {
        Self {
            credential: CredentialSource::Passthrough(token),
        }
    }
}

/// Which credential path a call takes
///
/// The two paths are mutually exclusive and selected once per call by the
/// presence of an inbound bearer token, never by a runtime-checked global.
#[derive(Debug, Clone)]
pub enum CredentialSource {
    /// Forward the bearer token the caller sent
    Passthrough(SecretString),
    /// Acquire a token from the managed credential store
    Managed,
}
