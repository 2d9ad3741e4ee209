//! Public error type for the Casdoor SDK.

use casdoor_http::HttpError;
use thiserror::Error;

/// Errors returned by every SDK operation.
///
/// Each failure is reported once, as it happened; nothing is retried.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum SdkError {
    /// Network, TLS, timeout, URL validation or non-2xx status failure.
    #[error(transparent)]
    Http(#[from] HttpError),

    /// The response body was not the JSON shape we expected.
    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    /// The server refused the request with a `{"status":"error"}` envelope,
    /// typically for bad client credentials.
    #[error("Casdoor API error: {msg}")]
    Api { msg: String },

    /// The token failed signature, expiry or format checks.
    #[error("invalid JWT: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    /// The OAuth token endpoint answered with an error payload.
    #[error("OAuth error '{error}': {}", description.as_deref().unwrap_or("no description"))]
    OAuth {
        error: String,
        description: Option<String>,
    },

    /// Configuration could not be loaded.
    #[error("configuration error: {0}")]
    Config(String),

    /// A global operation ran before `init_config`.
    #[error("Casdoor SDK is not initialized; call init_config first")]
    NotInitialized,

    /// `init_config` ran more than once.
    #[error("Casdoor SDK is already initialized")]
    AlreadyInitialized,
}

impl SdkError {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}
