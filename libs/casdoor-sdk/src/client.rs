//! [`CasdoorClient`]: user management, code exchange and token parsing against one server.

use async_trait::async_trait;
use bytes::Bytes;
use casdoor_http::{HttpClient, HttpClientBuilder, HttpError, TransportSecurity};
use http::Method;
use tracing::instrument;

use crate::api::UsersApi;
use crate::config::AuthConfig;
use crate::errors::SdkError;
use crate::jwt;
use crate::models::{Claims, ModifyResponse, OAuthToken, User};
use crate::urls;

/// Casdoor client bound to one [`AuthConfig`].
///
/// Cloning is cheap and clones share the connection pool. Several clients with
/// different configurations can live side by side.
#[derive(Clone, Debug)]
pub struct CasdoorClient {
    config: AuthConfig,
    http: HttpClient,
}

impl CasdoorClient {
    /// Build a client whose transport follows `config.http()`.
    ///
    /// # Errors
    /// Returns `SdkError::Http` if the transport cannot be built (TLS roots,
    /// malformed user agent).
    pub fn new(config: AuthConfig) -> Result<Self, SdkError> {
        let settings = config.http();
        let mut builder = HttpClientBuilder::new()
            .timeout(settings.timeout)
            .max_body_size(settings.max_body_size);
        if let Some(user_agent) = &settings.user_agent {
            builder = builder.user_agent(user_agent.clone());
        }
        if settings.allow_insecure_http {
            builder = builder.transport(TransportSecurity::AllowInsecureHttp);
        }

        let http = builder.build()?;
        Ok(Self::with_http_client(config, http))
    }

    /// Use an already built transport, e.g. one shared with other services.
    #[must_use]
    pub fn with_http_client(config: AuthConfig, http: HttpClient) -> Self {
        Self { config, http }
    }

    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Send one API request with credentials attached and return the body of a
    /// 2xx response.
    async fn call_api(
        &self,
        method: Method,
        action: &str,
        query: &[(&str, &str)],
        payload: Option<&User>,
    ) -> Result<Bytes, SdkError> {
        let url = urls::api_url(&self.config, action, query);

        let mut request = self.http.request(method.clone(), &url);
        if let Some(user) = payload {
            request = request.json(user)?;
        }

        tracing::debug!(%method, action, "sending Casdoor API request");
        let body = request.send().await?.checked_bytes().await?;
        tracing::debug!(action, bytes = body.len(), "received Casdoor API response");
        Ok(body)
    }

    async fn modify_user(&self, action: &str, user: &User) -> Result<bool, SdkError> {
        let id = urls::user_id(&user.owner, &user.name);
        let body = self
            .call_api(Method::POST, action, &[("id", id.as_str())], Some(user))
            .await?;
        let response: ModifyResponse = serde_json::from_slice(&body)?;

        if !response.is_affected() {
            tracing::debug!(
                action,
                status = %response.status,
                msg = %response.msg,
                "Casdoor reported no change"
            );
        }
        Ok(response.is_affected())
    }

    /// Exchange an authorization code for tokens.
    ///
    /// # Errors
    /// Returns `SdkError::OAuth` when the server answers with an `error` payload,
    /// `SdkError::Http` for transport failures or other non-2xx answers.
    #[instrument(skip_all, fields(organization = %self.config.organization_name()))]
    pub async fn get_oauth_token(&self, code: &str, state: &str) -> Result<OAuthToken, SdkError> {
        let url = urls::api_path(&self.config, "login/oauth/access_token");
        let response = self
            .http
            .post(&url)
            .form(&[
                ("grant_type", "authorization_code"),
                ("client_id", self.config.client_id()),
                ("client_secret", self.config.client_secret()),
                ("code", code),
                ("state", state),
            ])?
            .send()
            .await?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(http::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        let body = response.bytes().await?;

        match serde_json::from_slice::<TokenEndpointResponse>(&body) {
            Ok(TokenEndpointResponse {
                error: Some(error),
                error_description,
                ..
            }) if !error.is_empty() => {
                tracing::debug!(%error, "token exchange rejected");
                Err(SdkError::OAuth {
                    error,
                    description: error_description,
                })
            }
            _ if !status.is_success() => Err(HttpError::HttpStatus {
                status,
                body_preview: body_preview(&body),
                content_type,
            }
            .into()),
            Ok(parsed) => match parsed.token {
                Some(token) => Ok(token),
                None => Err(SdkError::OAuth {
                    error: "invalid_response".to_owned(),
                    description: Some("token endpoint returned no access_token".to_owned()),
                }),
            },
            Err(e) => Err(e.into()),
        }
    }

    /// Verify a token issued by this Casdoor server with the configured JWT secret.
    ///
    /// # Errors
    /// Returns `SdkError::Jwt` for malformed, expired or wrongly signed tokens.
    pub fn parse_jwt_token(&self, token: &str) -> Result<Claims, SdkError> {
        jwt::parse_jwt_token(token, self.config.jwt_secret())
    }

    #[must_use]
    pub fn signin_url(&self, redirect_uri: &str) -> String {
        urls::signin_url(&self.config, redirect_uri)
    }

    #[must_use]
    pub fn signup_url(&self, enable_password: bool, redirect_uri: &str) -> String {
        urls::signup_url(&self.config, enable_password, redirect_uri)
    }

    #[must_use]
    pub fn user_profile_url(&self, username: &str, access_token: Option<&str>) -> String {
        urls::user_profile_url(&self.config, username, access_token)
    }

    #[must_use]
    pub fn my_profile_url(&self, access_token: Option<&str>) -> String {
        urls::my_profile_url(&self.config, access_token)
    }
}

#[async_trait]
impl UsersApi for CasdoorClient {
    #[instrument(skip_all, fields(organization = %self.config.organization_name()))]
    async fn get_users(&self) -> Result<Vec<User>, SdkError> {
        let body = self
            .call_api(
                Method::GET,
                "get-users",
                &[("owner", self.config.organization_name())],
                None,
            )
            .await?;
        reject_error_envelope(&body)?;
        // The server answers `null` for an organization without users
        let users: Option<Vec<User>> = serde_json::from_slice(&body)?;
        Ok(users.unwrap_or_default())
    }

    #[instrument(skip_all, fields(organization = %self.config.organization_name(), name = %name))]
    async fn get_user(&self, name: &str) -> Result<Option<User>, SdkError> {
        let id = urls::user_id(self.config.organization_name(), name);
        let body = self
            .call_api(Method::GET, "get-user", &[("id", id.as_str())], None)
            .await?;

        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }
        reject_error_envelope(&body)?;
        Ok(serde_json::from_slice(&body)?)
    }

    #[instrument(skip_all, fields(owner = %user.owner, name = %user.name))]
    async fn add_user(&self, user: &User) -> Result<bool, SdkError> {
        self.modify_user("add-user", user).await
    }

    #[instrument(skip_all, fields(owner = %user.owner, name = %user.name))]
    async fn update_user(&self, user: &User) -> Result<bool, SdkError> {
        self.modify_user("update-user", user).await
    }

    #[instrument(skip_all, fields(owner = %user.owner, name = %user.name))]
    async fn delete_user(&self, user: &User) -> Result<bool, SdkError> {
        self.modify_user("delete-user", user).await
    }
}

/// Raw token endpoint answer: either a token set or an OAuth error.
#[derive(serde::Deserialize)]
struct TokenEndpointResponse {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
    #[serde(flatten)]
    token: Option<OAuthToken>,
}

/// Failure answer the read endpoints send with a 200 status.
#[derive(serde::Deserialize)]
struct ErrorEnvelope {
    status: String,
    #[serde(default)]
    msg: String,
}

/// Every `User` field is optional, so an error envelope would otherwise decode
/// as an empty record.
fn reject_error_envelope(body: &[u8]) -> Result<(), SdkError> {
    match serde_json::from_slice::<ErrorEnvelope>(body) {
        Ok(envelope) if envelope.status == "error" => {
            tracing::debug!(msg = %envelope.msg, "Casdoor rejected the request");
            Err(SdkError::Api { msg: envelope.msg })
        }
        _ => Ok(()),
    }
}

fn body_preview(body: &[u8]) -> String {
    let end = body.len().min(casdoor_http::security::ERROR_BODY_PREVIEW_LIMIT);
    String::from_utf8_lossy(&body[..end]).into_owned()
}
