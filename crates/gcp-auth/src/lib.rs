//! Google Cloud access tokens
//!
//! Resolves a bearer token for Google APIs using one of two strategies:
//!
//! - **Local credentials**: run an already-authenticated credential helper
//!   (`gcloud auth print-access-token` by default) and confirm the token
//!   against the OAuth2 `tokeninfo` endpoint.
//! - **Metadata server**: ask the GCE/GKE/Cloud Run instance metadata
//!   server for the default service account's token.
//!
//! Tokens are never cached; every call mints or fetches a fresh one.

pub mod error;
pub mod helper;
pub mod models;
pub mod provider;

pub use error::AuthError;
pub use helper::{CommandCredentialHelper, CredentialHelper, DEFAULT_HELPER_COMMAND};
pub use models::AccessToken;
pub use provider::{TokenEndpoints, TokenProvider, DEFAULT_METADATA_TOKEN_URL, DEFAULT_TOKENINFO_URL};
