//! Wire types exchanged with the Casdoor server.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::fmt;

/// A user record, keyed remotely by `(owner, name)`.
///
/// Every field falls back to its default when the server omits it. Serialization
/// always emits the full record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct User {
    pub owner: String,
    pub name: String,
    pub created_time: String,
    pub updated_time: String,

    pub id: String,
    #[serde(rename = "type")]
    pub user_type: String,
    pub password: String,
    pub display_name: String,
    pub avatar: String,
    pub email: String,
    pub phone: String,
    #[serde(deserialize_with = "null_as_default")]
    pub address: Vec<String>,
    pub affiliation: String,
    pub tag: String,
    pub language: String,
    pub score: i64,
    pub is_admin: bool,
    pub is_global_admin: bool,
    pub is_forbidden: bool,
    pub signup_application: String,
    pub hash: String,
    pub pre_hash: String,

    // Linked external provider accounts
    pub github: String,
    pub google: String,
    pub qq: String,
    pub wechat: String,
    pub facebook: String,
    pub dingtalk: String,
    pub weibo: String,
    pub gitee: String,
    pub linkedin: String,

    #[serde(deserialize_with = "null_as_default")]
    pub properties: HashMap<String, String>,
}

impl User {
    /// A record with only its key set.
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
            ..Self::default()
        }
    }
}

/// The server writes `null` for empty lists and maps.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Envelope returned by the add, update and delete endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ModifyResponse {
    pub status: String,
    pub msg: String,
    pub data: serde_json::Value,
    pub data2: serde_json::Value,
}

impl ModifyResponse {
    /// `true` only when the request was accepted and a row actually changed.
    #[must_use]
    pub fn is_affected(&self) -> bool {
        self.status == "ok" && self.data.as_str() == Some("Affected")
    }
}

/// Claims carried by a Casdoor-issued access token: the user record plus the
/// registered JWT claims.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    #[serde(flatten)]
    pub user: User,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nbf: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
}

/// Token set returned by the authorization-code exchange.
///
/// `Debug` redacts the tokens.
#[derive(Clone, Deserialize)]
pub struct OAuthToken {
    pub access_token: String,
    #[serde(default)]
    pub token_type: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub scope: Option<String>,
}

impl fmt::Debug for OAuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthToken")
            .field("access_token", &"[REDACTED]")
            .field("token_type", &self.token_type)
            .field(
                "refresh_token",
                &self.refresh_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("expires_in", &self.expires_in)
            .field("scope", &self.scope)
            .finish()
    }
}
