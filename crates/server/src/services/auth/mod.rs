//! Token authentication.
//!
//! A successful sign-in exchanges an identity payload for an HS256 token that
//! lives in the httpOnly `token` cookie for a year. There is no refresh: the
//! next sign-in simply issues a new token.

mod error;

pub use error::AuthError;

use axum_extra::extract::cookie::{Cookie, SameSite};
use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use plantnet_core::Email;

use crate::config::Environment;

/// Name of the cookie carrying the token.
pub const TOKEN_COOKIE: &str = "token";

/// Token and cookie lifetime.
pub const TOKEN_TTL_DAYS: i64 = 365;

/// Claims signed into every token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Verified identity.
    pub email: Email,
    /// Issued at (seconds since the epoch).
    pub iat: i64,
    /// Expiry (seconds since the epoch).
    pub exp: i64,
}

/// Issues and verifies tokens, and builds the cookies that carry them.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    environment: Environment,
}

impl TokenService {
    /// Create a token service keyed by `secret`.
    #[must_use]
    pub fn new(secret: &SecretString, environment: Environment) -> Self {
        let bytes = secret.expose_secret().as_bytes();
        Self {
            encoding: EncodingKey::from_secret(bytes),
            decoding: DecodingKey::from_secret(bytes),
            environment,
        }
    }

    /// Sign a token for `email`, valid for [`TOKEN_TTL_DAYS`].
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Signing` if encoding fails.
    pub fn issue(&self, email: &Email) -> Result<String, AuthError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            email: email.clone(),
            iat: now,
            exp: now + TOKEN_TTL_DAYS * 24 * 60 * 60,
        };
        self.sign(&claims)
    }

    fn sign(&self, claims: &Claims) -> Result<String, AuthError> {
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(AuthError::Signing)
    }

    /// Verify a token and return its claims.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` for a bad signature, a malformed
    /// token or an expired one.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let validation = Validation::new(Algorithm::HS256);
        jsonwebtoken::decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(AuthError::InvalidToken)
    }

    /// Cookie that stores `token` in the browser.
    #[must_use]
    pub fn token_cookie(&self, token: String) -> Cookie<'static> {
        self.cookie(token, time::Duration::days(TOKEN_TTL_DAYS))
    }

    /// Cookie that overwrites and expires the token cookie.
    #[must_use]
    pub fn removal_cookie(&self) -> Cookie<'static> {
        self.cookie(String::new(), time::Duration::ZERO)
    }

    fn cookie(&self, value: String, max_age: time::Duration) -> Cookie<'static> {
        // Production clients are served from another origin.
        let (secure, same_site) = match self.environment {
            Environment::Production => (true, SameSite::None),
            Environment::Development => (false, SameSite::Strict),
        };
        Cookie::build((TOKEN_COOKIE, value))
            .path("/")
            .http_only(true)
            .secure(secure)
            .same_site(same_site)
            .max_age(max_age)
            .build()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const SECRET: &str = "q8Vr2LxN5tZp9KwB3mYc7HdJ4sFg6TaE";

    fn service(environment: Environment) -> TokenService {
        TokenService::new(&SecretString::from(SECRET), environment)
    }

    fn email() -> Email {
        Email::parse("fern@example.com").unwrap()
    }

    #[test]
    fn test_issue_then_verify() {
        let tokens = service(Environment::Development);
        let token = tokens.issue(&email()).unwrap();
        let claims = tokens.verify(&token).unwrap();
        assert_eq!(claims.email, email());
        assert_eq!(claims.exp - claims.iat, 365 * 24 * 60 * 60);
    }

    #[test]
    fn test_other_key_is_rejected() {
        let token = service(Environment::Development).issue(&email()).unwrap();
        let other = TokenService::new(
            &SecretString::from("Zk3Jw9Qe1Rt7Yu5Io2Pa8Sd4Fg6Hj0Lx"),
            Environment::Development,
        );
        assert!(matches!(
            other.verify(&token),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_tampered_token_is_rejected() {
        let tokens = service(Environment::Development);
        let mut token = tokens.issue(&email()).unwrap();
        token.push('x');
        assert!(tokens.verify(&token).is_err());
        assert!(tokens.verify("not-a-token").is_err());
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let tokens = service(Environment::Development);
        let now = Utc::now().timestamp();
        let token = tokens
            .sign(&Claims {
                email: email(),
                iat: now - 7200,
                exp: now - 3600,
            })
            .unwrap();
        assert!(matches!(
            tokens.verify(&token),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_production_cookie_attributes() {
        let cookie = service(Environment::Production).token_cookie("abc".to_string());
        assert_eq!(cookie.name(), TOKEN_COOKIE);
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::None));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.max_age(), Some(time::Duration::days(365)));
    }

    #[test]
    fn test_development_cookie_attributes() {
        let cookie = service(Environment::Development).token_cookie("abc".to_string());
        assert_eq!(cookie.secure(), Some(false));
        assert_eq!(cookie.same_site(), Some(SameSite::Strict));
    }

    #[test]
    fn test_removal_cookie_expires_immediately() {
        let cookie = service(Environment::Production).removal_cookie();
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.max_age(), Some(time::Duration::ZERO));
        assert_eq!(cookie.secure(), Some(true));
    }
}
