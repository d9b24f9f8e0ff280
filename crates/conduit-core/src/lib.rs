//! Shared request-scoped types for Conduit
//!
//! Holds the per-call [`RequestContext`] and the [`HttpError`] trait that
//! keeps domain errors decoupled from the HTTP layer.

mod context;
mod error;

pub use context::{CredentialSource, RequestContext};
pub use error::HttpError;
