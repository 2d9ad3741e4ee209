//! Connection settings for a Casdoor server.
//!
//! Build an [`AuthConfig`] in code with [`AuthConfig::new`], or load one in layers
//! with [`AuthConfig::load`]:
//!
//! 1. built-in defaults
//! 2. an optional YAML file
//! 3. environment variables prefixed `CASDOOR__`, where `__` separates nested
//!    keys (`CASDOOR__HTTP__TIMEOUT=5s`)

use crate::errors::SdkError;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::path::Path;
use std::time::Duration;

/// Application used in login URLs when none is configured.
pub const DEFAULT_APPLICATION_NAME: &str = "app-built-in";

/// Environment prefix read by [`AuthConfig::load`].
pub const ENV_PREFIX: &str = "CASDOOR__";

/// Everything the SDK needs to reach one Casdoor organization.
///
/// Values are fixed once built. The endpoint is not validated here; a malformed
/// endpoint is reported by the first request. Secrets are never printed by `Debug`.
#[derive(Deserialize)]
pub struct AuthConfig {
    #[serde(deserialize_with = "lenient_string")]
    endpoint: String,
    #[serde(deserialize_with = "lenient_string")]
    client_id: String,
    #[serde(deserialize_with = "secret")]
    client_secret: SecretString,
    #[serde(deserialize_with = "secret")]
    jwt_secret: SecretString,
    #[serde(deserialize_with = "lenient_string")]
    organization_name: String,
    #[serde(
        default = "default_application_name",
        deserialize_with = "lenient_string"
    )]
    application_name: String,
    #[serde(default)]
    http: HttpSettings,
}

fn default_application_name() -> String {
    DEFAULT_APPLICATION_NAME.to_owned()
}

/// Top-level keys taken verbatim from `CASDOOR__*` variables.
const STRING_KEYS: [&str; 6] = [
    "endpoint",
    "client_id",
    "client_secret",
    "jwt_secret",
    "organization_name",
    "application_name",
];

/// Any scalar a config source may produce for a textual key.
#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Signed(i64),
    Unsigned(u64),
    Float(f64),
    Bool(bool),
}

/// Accepts numbers and booleans where a string is expected. YAML reads an
/// all-digit client id as an integer.
fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Scalar::deserialize(deserializer)? {
        Scalar::Text(s) => s,
        Scalar::Signed(n) => n.to_string(),
        Scalar::Unsigned(n) => n.to_string(),
        Scalar::Float(n) => n.to_string(),
        Scalar::Bool(b) => b.to_string(),
    })
}

fn secret<'de, D: Deserializer<'de>>(deserializer: D) -> Result<SecretString, D::Error> {
    lenient_string(deserializer).map(SecretString::from)
}

/// `CASDOOR__*` values for [`STRING_KEYS`], unparsed. Figment's `Env` provider
/// would turn `000123` into the number 123.
fn verbatim_env() -> Vec<(&'static str, String)> {
    std::env::vars_os()
        .filter_map(|(name, value)| {
            let name = name.into_string().ok()?;
            let (prefix, key) = name.split_at_checked(ENV_PREFIX.len())?;
            if !prefix.eq_ignore_ascii_case(ENV_PREFIX) {
                return None;
            }
            let key = STRING_KEYS.iter().find(|k| k.eq_ignore_ascii_case(key))?;
            Some((*key, value.into_string().ok()?))
        })
        .collect()
}

impl AuthConfig {
    pub fn new(
        endpoint: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        jwt_secret: impl Into<String>,
        organization_name: impl Into<String>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            client_id: client_id.into(),
            client_secret: SecretString::from(Into::<String>::into(client_secret)),
            jwt_secret: SecretString::from(Into::<String>::into(jwt_secret)),
            organization_name: organization_name.into(),
            application_name: default_application_name(),
            http: HttpSettings::default(),
        }
    }

    /// Load from defaults, then `path` (YAML) if given, then `CASDOOR__*` variables.
    ///
    /// # Errors
    /// Returns `SdkError::Config` if the file does not exist, cannot be parsed, or
    /// a required key is missing from every layer.
    pub fn load(path: Option<&Path>) -> Result<Self, SdkError> {
        let mut figment = Figment::new()
            .merge(Serialized::default("application_name", DEFAULT_APPLICATION_NAME))
            .merge(Serialized::default("http", HttpSettings::default()));

        if let Some(path) = path {
            if !path.is_file() {
                return Err(SdkError::config(format!(
                    "config file does not exist: {}",
                    path.display()
                )));
            }
            figment = figment.merge(Yaml::file(path));
        }

        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__").ignore(&STRING_KEYS));
        for (key, value) in verbatim_env() {
            figment = figment.merge(Serialized::default(key, value));
        }

        let config: Self = figment
            .extract()
            .map_err(|e| SdkError::config(e.to_string()))?;

        tracing::debug!(
            endpoint = %config.endpoint,
            organization = %config.organization_name,
            application = %config.application_name,
            "loaded Casdoor configuration"
        );
        Ok(config)
    }

    /// Application named in signin and signup URLs.
    #[must_use]
    pub fn with_application_name(mut self, application_name: impl Into<String>) -> Self {
        self.application_name = application_name.into();
        self
    }

    #[must_use]
    pub fn with_http(mut self, http: HttpSettings) -> Self {
        self.http = http;
        self
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    #[must_use]
    pub fn organization_name(&self) -> &str {
        &self.organization_name
    }

    #[must_use]
    pub fn application_name(&self) -> &str {
        &self.application_name
    }

    #[must_use]
    pub fn http(&self) -> &HttpSettings {
        &self.http
    }

    pub(crate) fn client_secret(&self) -> &str {
        self.client_secret.expose_secret()
    }

    pub(crate) fn jwt_secret(&self) -> &str {
        self.jwt_secret.expose_secret()
    }
}

impl Clone for AuthConfig {
    fn clone(&self) -> Self {
        Self {
            endpoint: self.endpoint.clone(),
            client_id: self.client_id.clone(),
            client_secret: SecretString::from(self.client_secret.expose_secret().to_owned()),
            jwt_secret: SecretString::from(self.jwt_secret.expose_secret().to_owned()),
            organization_name: self.organization_name.clone(),
            application_name: self.application_name.clone(),
            http: self.http.clone(),
        }
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("endpoint", &self.endpoint)
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("jwt_secret", &"[REDACTED]")
            .field("organization_name", &self.organization_name)
            .field("application_name", &self.application_name)
            .field("http", &self.http)
            .finish()
    }
}

/// Transport settings applied when the SDK builds its own HTTP client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    /// Per-request timeout, e.g. `"10s"` or `"1m 30s"`.
    #[serde(with = "humantime_duration")]
    pub timeout: Duration,
    pub user_agent: Option<String>,
    pub max_body_size: usize,
    /// Accept `http://` endpoints. Only for local servers.
    pub allow_insecure_http: bool,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: None,
            max_body_size: casdoor_http::DEFAULT_MAX_BODY_SIZE,
            allow_insecure_http: false,
        }
    }
}

mod humantime_duration {
    use serde::{Deserialize, Deserializer, Serializer, de};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&humantime::format_duration(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let raw = String::deserialize(deserializer)?;
        humantime::parse_duration(&raw)
            .map_err(|_| de::Error::invalid_value(de::Unexpected::Str(&raw), &"a duration"))
    }
}
