//! Process-wide client for applications that configure Casdoor once at startup.
//!
//! [`init_config`] stores a [`CasdoorClient`]; the free functions here delegate to
//! it. The first initialization wins and stays for the life of the process.
//! Calling an operation before initializing returns [`SdkError::NotInitialized`].
//!
//! ```ignore
//! casdoor_sdk::init_config(endpoint, client_id, client_secret, jwt_secret, "acme")?;
//! let users = casdoor_sdk::global::get_users().await?;
//! ```

use std::sync::OnceLock;

use crate::api::UsersApi;
use crate::client::CasdoorClient;
use crate::config::AuthConfig;
use crate::errors::SdkError;
use crate::models::{Claims, User};

static CLIENT: OnceLock<CasdoorClient> = OnceLock::new();

/// Configure the process-wide client with default transport settings.
///
/// # Errors
/// Returns `SdkError::AlreadyInitialized` on every call after the first, or
/// `SdkError::Http` if the transport cannot be built.
pub fn init_config(
    endpoint: &str,
    client_id: &str,
    client_secret: &str,
    jwt_secret: &str,
    organization_name: &str,
) -> Result<(), SdkError> {
    init_with(AuthConfig::new(
        endpoint,
        client_id,
        client_secret,
        jwt_secret,
        organization_name,
    ))
}

/// Configure the process-wide client from a prepared [`AuthConfig`].
///
/// # Errors
/// Same as [`init_config`].
pub fn init_with(config: AuthConfig) -> Result<(), SdkError> {
    if CLIENT.get().is_some() {
        return Err(SdkError::AlreadyInitialized);
    }
    install(CasdoorClient::new(config)?)
}

/// Install an already built client.
///
/// # Errors
/// Returns `SdkError::AlreadyInitialized` if a client is already installed.
pub fn install(client: CasdoorClient) -> Result<(), SdkError> {
    let organization = client.config().organization_name().to_owned();
    CLIENT
        .set(client)
        .map_err(|_| SdkError::AlreadyInitialized)?;
    tracing::info!(%organization, "Casdoor SDK initialized");
    Ok(())
}

/// The installed client.
///
/// # Errors
/// Returns `SdkError::NotInitialized` before initialization.
pub fn client() -> Result<&'static CasdoorClient, SdkError> {
    CLIENT.get().ok_or(SdkError::NotInitialized)
}

/// See [`UsersApi::get_users`].
///
/// # Errors
/// `SdkError::NotInitialized`, or whatever the request fails with.
pub async fn get_users() -> Result<Vec<User>, SdkError> {
    client()?.get_users().await
}

/// See [`UsersApi::get_user`].
///
/// # Errors
/// `SdkError::NotInitialized`, or whatever the request fails with.
pub async fn get_user(name: &str) -> Result<Option<User>, SdkError> {
    client()?.get_user(name).await
}

/// See [`UsersApi::add_user`].
///
/// # Errors
/// `SdkError::NotInitialized`, or whatever the request fails with.
pub async fn add_user(user: &User) -> Result<bool, SdkError> {
    client()?.add_user(user).await
}

/// See [`UsersApi::update_user`].
///
/// # Errors
/// `SdkError::NotInitialized`, or whatever the request fails with.
pub async fn update_user(user: &User) -> Result<bool, SdkError> {
    client()?.update_user(user).await
}

/// See [`UsersApi::delete_user`].
///
/// # Errors
/// `SdkError::NotInitialized`, or whatever the request fails with.
pub async fn delete_user(user: &User) -> Result<bool, SdkError> {
    client()?.delete_user(user).await
}

/// See [`CasdoorClient::parse_jwt_token`].
///
/// # Errors
/// `SdkError::NotInitialized`, or `SdkError::Jwt` for a rejected token.
pub fn parse_jwt_token(token: &str) -> Result<Claims, SdkError> {
    client()?.parse_jwt_token(token)
}
