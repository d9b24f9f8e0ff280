//! Managed OAuth credential store for Conduit
//!
//! Owns the persisted token pair used when a caller does not supply their
//! own bearer token. The interactive flow that first provisions the file
//! lives outside the gateway; this crate only reads, refreshes, and
//! rewrites it.

mod error;
mod store;

pub use error::AuthError;
pub use store::{CredentialStore, StoredCredentials};
