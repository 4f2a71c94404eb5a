//! Authentication error types.

use thiserror::Error;

/// Errors that can occur while issuing or checking a token.
#[derive(Debug, Error)]
pub enum AuthError {
    /// No `token` cookie on the request.
    #[error("missing token")]
    MissingToken,

    /// Token failed signature, format or expiry checks.
    #[error("invalid token: {0}")]
    InvalidToken(#[source] jsonwebtoken::errors::Error),

    /// Signing a new token failed.
    #[error("token signing failed: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),
}
