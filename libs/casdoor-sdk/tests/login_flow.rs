#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Token exchange and token verification.

use casdoor_sdk::{AuthConfig, CasdoorClient, Claims, HttpSettings, SdkError, User};
use httpmock::prelude::*;
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use serde_json::json;
use std::time::{SystemTime, UNIX_EPOCH};

fn client_for(endpoint: &str) -> CasdoorClient {
    let config = AuthConfig::new(endpoint, "cid", "csecret", "jwt-secret", "acme").with_http(
        HttpSettings {
            allow_insecure_http: true,
            ..HttpSettings::default()
        },
    );
    CasdoorClient::new(config).unwrap()
}

#[tokio::test]
async fn code_exchange_posts_form_and_decodes_token() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/api/login/oauth/access_token")
            .header("content-type", "application/x-www-form-urlencoded")
            .body_includes("grant_type=authorization_code")
            .body_includes("client_id=cid")
            .body_includes("client_secret=csecret")
            .body_includes("code=auth-code")
            .body_includes("state=app-built-in");
        then.status(200).json_body(json!({
            "access_token": "header.payload.sig",
            "token_type": "Bearer",
            "refresh_token": "refresh",
            "expires_in": 7200,
            "scope": "read"
        }));
    });

    let token = client_for(&server.base_url())
        .get_oauth_token("auth-code", "app-built-in")
        .await
        .unwrap();

    mock.assert();
    assert_eq!(token.access_token, "header.payload.sig");
    assert_eq!(token.token_type, "Bearer");
    assert_eq!(token.expires_in, Some(7200));
}

#[tokio::test]
async fn error_payload_maps_to_oauth_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/api/login/oauth/access_token");
        then.status(200).json_body(json!({
            "error": "invalid_grant",
            "error_description": "authorization code has been used"
        }));
    });

    let err = client_for(&server.base_url())
        .get_oauth_token("used-code", "state")
        .await
        .unwrap_err();

    match err {
        SdkError::OAuth { error, description } => {
            assert_eq!(error, "invalid_grant");
            assert_eq!(description.as_deref(), Some("authorization code has been used"));
        }
        other => panic!("expected OAuth error, got {other:?}"),
    }
}

#[tokio::test]
async fn error_payload_on_bad_request_maps_to_oauth_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/api/login/oauth/access_token");
        then.status(400).json_body(json!({"error": "invalid_client"}));
    });

    let err = client_for(&server.base_url())
        .get_oauth_token("code", "state")
        .await
        .unwrap_err();
    assert!(matches!(err, SdkError::OAuth { ref error, description: None } if error == "invalid_client"));
}

#[tokio::test]
async fn non_json_failure_is_an_http_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/api/login/oauth/access_token");
        then.status(502).body("bad gateway");
    });

    let err = client_for(&server.base_url())
        .get_oauth_token("code", "state")
        .await
        .unwrap_err();
    assert!(matches!(err, SdkError::Http(_)), "{err:?}");
}

#[test]
fn issued_token_round_trips_through_parse() {
    let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs();
    let mut user = User::new("acme", "alice");
    user.is_admin = true;
    let claims = Claims {
        user,
        sub: Some("acme/alice".to_owned()),
        exp: Some(now + 600),
        ..Claims::default()
    };
    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(b"jwt-secret"),
    )
    .unwrap();

    let parsed = client_for("https://door.example.com")
        .parse_jwt_token(&token)
        .unwrap();
    assert_eq!(parsed, claims);
}

#[test]
fn login_urls_follow_the_configured_application() {
    let client = CasdoorClient::new(
        AuthConfig::new("https://door.example.com", "cid", "csecret", "jwt", "acme")
            .with_application_name("portal"),
    )
    .unwrap();

    assert_eq!(
        client.signin_url("https://app.example.com/cb"),
        "https://door.example.com/login/oauth/authorize?client_id=cid&response_type=code\
         &redirect_uri=https%3A%2F%2Fapp.example.com%2Fcb&scope=read&state=portal"
    );
    assert_eq!(
        client.signup_url(true, "https://app.example.com/cb"),
        "https://door.example.com/signup/portal"
    );
    assert_eq!(
        client.user_profile_url("alice", Some("tok")),
        "https://door.example.com/users/acme/alice?access_token=tok"
    );
    assert_eq!(client.my_profile_url(None), "https://door.example.com/account");
}
