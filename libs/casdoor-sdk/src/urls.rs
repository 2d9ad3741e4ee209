//! URL conventions of the Casdoor REST API and login pages.
//!
//! Query values are percent-encoded one component at a time. `/` is kept literal
//! because the server addresses users as `{owner}/{name}` inside a single `id`
//! parameter.

use crate::config::AuthConfig;
use std::borrow::Cow;

fn base(config: &AuthConfig) -> &str {
    config.endpoint().trim_end_matches('/')
}

fn encode_query_value(value: &str) -> Cow<'_, str> {
    let encoded = urlencoding::encode(value);
    if encoded.contains("%2F") {
        Cow::Owned(encoded.replace("%2F", "/"))
    } else {
        encoded
    }
}

/// `{owner}/{name}`, the identifier the API expects in `id`.
pub(crate) fn user_id(owner: &str, name: &str) -> String {
    format!("{owner}/{name}")
}

/// `{endpoint}/api/{action}?{query}&clientId=..&clientSecret=..`
pub(crate) fn api_url(config: &AuthConfig, action: &str, query: &[(&str, &str)]) -> String {
    let credentials = [
        ("clientId", config.client_id()),
        ("clientSecret", config.client_secret()),
    ];

    let query = query
        .iter()
        .chain(credentials.iter())
        .map(|(key, value)| format!("{key}={}", encode_query_value(value)))
        .collect::<Vec<_>>()
        .join("&");

    format!("{}/api/{action}?{query}", base(config))
}

/// `{endpoint}/api/{action}` with no query, for endpoints that take a form body.
pub(crate) fn api_path(config: &AuthConfig, action: &str) -> String {
    format!("{}/api/{action}", base(config))
}

/// Page that starts the authorization-code flow for the configured application.
pub fn signin_url(config: &AuthConfig, redirect_uri: &str) -> String {
    format!(
        "{}/login/oauth/authorize?client_id={}&response_type=code&redirect_uri={}&scope=read&state={}",
        base(config),
        urlencoding::encode(config.client_id()),
        urlencoding::encode(redirect_uri),
        urlencoding::encode(config.application_name()),
    )
}

/// Signup page. With `enable_password` the plain signup form is used; otherwise the
/// OAuth signup flow that redirects back to `redirect_uri`.
pub fn signup_url(config: &AuthConfig, enable_password: bool, redirect_uri: &str) -> String {
    if enable_password {
        format!(
            "{}/signup/{}",
            base(config),
            urlencoding::encode(config.application_name())
        )
    } else {
        signin_url(config, redirect_uri).replacen(
            "/login/oauth/authorize",
            "/signup/oauth/authorize",
            1,
        )
    }
}

/// Public profile page of `username` in the configured organization.
pub fn user_profile_url(config: &AuthConfig, username: &str, access_token: Option<&str>) -> String {
    let url = format!(
        "{}/users/{}/{}",
        base(config),
        urlencoding::encode(config.organization_name()),
        urlencoding::encode(username)
    );
    with_access_token(url, access_token)
}

/// Account page of whoever owns `access_token`.
pub fn my_profile_url(config: &AuthConfig, access_token: Option<&str>) -> String {
    with_access_token(format!("{}/account", base(config)), access_token)
}

fn with_access_token(url: String, access_token: Option<&str>) -> String {
    match access_token {
        Some(token) if !token.is_empty() => {
            format!("{url}?access_token={}", urlencoding::encode(token))
        }
        _ => url,
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    fn config(endpoint: &str) -> AuthConfig {
        AuthConfig::new(endpoint, "cid", "csecret", "jwt", "acme")
    }

    #[test]
    fn get_user_url_is_bit_exact() {
        let url = api_url(
            &config("https://id.example.com"),
            "get-user",
            &[("id", user_id("acme", "alice").as_str())],
        );
        assert_eq!(
            url,
            "https://id.example.com/api/get-user?id=acme/alice&clientId=cid&clientSecret=csecret"
        );
    }

    #[test]
    fn get_users_url_is_bit_exact() {
        let url = api_url(&config("https://id.example.com"), "get-users", &[("owner", "acme")]);
        assert_eq!(
            url,
            "https://id.example.com/api/get-users?owner=acme&clientId=cid&clientSecret=csecret"
        );
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let url = api_url(&config("https://id.example.com/"), "get-users", &[("owner", "acme")]);
        assert!(url.starts_with("https://id.example.com/api/get-users?"));
    }

    #[test]
    fn reserved_characters_are_encoded_except_slash() {
        let url = api_url(
            &config("https://id.example.com"),
            "get-user",
            &[("id", user_id("acme", "a&b c").as_str())],
        );
        assert!(url.contains("id=acme/a%26b%20c&"), "{url}");
    }

    #[test]
    fn empty_endpoint_yields_relative_url() {
        let url = api_url(&config(""), "get-users", &[("owner", "acme")]);
        assert!(url.starts_with("/api/get-users?"));
    }

    #[test]
    fn signin_url_encodes_redirect() {
        let url = signin_url(&config("https://id.example.com"), "http://localhost:9000/callback");
        assert_eq!(
            url,
            "https://id.example.com/login/oauth/authorize?client_id=cid&response_type=code\
             &redirect_uri=http%3A%2F%2Flocalhost%3A9000%2Fcallback&scope=read&state=app-built-in"
        );
    }

    #[test]
    fn signup_url_variants() {
        let config = config("https://id.example.com").with_application_name("portal");
        assert_eq!(
            signup_url(&config, true, "https://app.example.com/cb"),
            "https://id.example.com/signup/portal"
        );

        let oauth = signup_url(&config, false, "https://app.example.com/cb");
        assert!(oauth.starts_with("https://id.example.com/signup/oauth/authorize?client_id=cid"));
        assert!(oauth.ends_with("&state=portal"));
    }

    #[test]
    fn profile_urls() {
        let config = config("https://id.example.com");
        assert_eq!(
            user_profile_url(&config, "alice", None),
            "https://id.example.com/users/acme/alice"
        );
        assert_eq!(
            user_profile_url(&config, "alice", Some("tok")),
            "https://id.example.com/users/acme/alice?access_token=tok"
        );
        assert_eq!(my_profile_url(&config, Some("")), "https://id.example.com/account");
        assert_eq!(
            my_profile_url(&config, Some("tok")),
            "https://id.example.com/account?access_token=tok"
        );
    }
}
