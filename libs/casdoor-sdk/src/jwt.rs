//! Verification of HS256 tokens issued by Casdoor.

use crate::errors::SdkError;
use crate::models::Claims;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};

/// Verify an HS256 token signed with `secret` and decode its claims.
///
/// Expiry is enforced; the audience is not.
///
/// # Errors
/// Returns `SdkError::Jwt` for malformed, expired or wrongly signed tokens.
pub fn parse_jwt_token(token: &str, secret: &str) -> Result<Claims, SdkError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_aud = false;

    let data = decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .inspect_err(|e| tracing::debug!(error = %e, "JWT rejected"))?;
    Ok(data.claims)
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::models::User;
    use jsonwebtoken::errors::ErrorKind;
    use jsonwebtoken::{EncodingKey, Header, encode};
    use std::time::{SystemTime, UNIX_EPOCH};

    fn now() -> u64 {
        SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs()
    }

    fn token(exp: u64, secret: &str) -> String {
        let claims = Claims {
            user: User::new("acme", "alice"),
            iss: Some("https://door.example.com".to_owned()),
            aud: Some(serde_json::json!(["client-1"])),
            exp: Some(exp),
            iat: Some(now()),
            ..Claims::default()
        };
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn valid_token_decodes() {
        let claims = parse_jwt_token(&token(now() + 3600, "jwt-secret"), "jwt-secret").unwrap();
        assert_eq!(claims.user.owner, "acme");
        assert_eq!(claims.user.name, "alice");
        assert_eq!(claims.iss.as_deref(), Some("https://door.example.com"));
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let err = parse_jwt_token(&token(now() + 3600, "jwt-secret"), "other").unwrap_err();
        match err {
            SdkError::Jwt(e) => assert_eq!(e.kind(), &ErrorKind::InvalidSignature),
            other => panic!("expected Jwt error, got {other:?}"),
        }
    }

    #[test]
    fn expired_token_is_rejected() {
        let err = parse_jwt_token(&token(now() - 3600, "jwt-secret"), "jwt-secret").unwrap_err();
        match err {
            SdkError::Jwt(e) => assert_eq!(e.kind(), &ErrorKind::ExpiredSignature),
            other => panic!("expected Jwt error, got {other:?}"),
        }
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(matches!(
            parse_jwt_token("not-a-token", "jwt-secret"),
            Err(SdkError::Jwt(_))
        ));
    }
}
