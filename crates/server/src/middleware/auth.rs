//! Authentication and authorization extractors.
//!
//! `RequireAuth` is the access guard: it reads the `token` cookie, verifies
//! it and hands the handler the verified identity. `RequireRole<P>` adds a
//! stored-role check on top for endpoints limited to sellers or admins.
//! Extractors run before the handler, so a rejected request never reaches it.

use std::marker::PhantomData;

use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::CookieJar;

use plantnet_core::{AccessPolicy, Email, Role};

use crate::db::UserRepository;
use crate::error::{AppError, UNAUTHORIZED_MESSAGE, set_sentry_user};
use crate::services::auth::{AuthError, TOKEN_COOKIE};
use crate::state::AppState;

/// A verified caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub email: Email,
}

impl Identity {
    /// Whether this identity is `email`.
    #[must_use]
    pub fn is(&self, email: &Email) -> bool {
        &self.email == email
    }
}

/// Extractor that requires a valid token cookie.
///
/// Missing, malformed, tampered and expired tokens are all rejected with
/// 401 `{"message":"unauthorized access"}`.
///
/// # Example
///
/// ```rust,ignore
/// async fn my_orders(RequireAuth(identity): RequireAuth) -> impl IntoResponse {
///     format!("Orders for {}", identity.email)
/// }
/// ```
pub struct RequireAuth(pub Identity);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let token = jar
            .get(TOKEN_COOKIE)
            .map(|cookie| cookie.value())
            .filter(|value| !value.is_empty())
            .ok_or(AuthError::MissingToken)?;

        let claims = state.tokens().verify(token).inspect_err(|err| {
            tracing::debug!(error = %err, path = %parts.uri.path(), "Token rejected");
        })?;

        set_sentry_user(claims.email.as_str());
        Ok(Self(Identity {
            email: claims.email,
        }))
    }
}

/// A set of roles an endpoint accepts.
pub trait RolePolicy {
    /// Policy checked against the caller's stored role.
    const POLICY: AccessPolicy;
    /// Message sent with the 403 when the check fails.
    const DENIED: &'static str;
}

/// Admins only.
pub struct AdminOnly;

impl RolePolicy for AdminOnly {
    const POLICY: AccessPolicy = AccessPolicy::AdminOnly;
    const DENIED: &'static str = "Forbidden Access! Admin Only Actions!";
}

/// Sellers and admins.
pub struct SellerOrAdmin;

impl RolePolicy for SellerOrAdmin {
    const POLICY: AccessPolicy = AccessPolicy::SellerOrAdmin;
    const DENIED: &'static str = "Forbidden Access! Seller Only Actions!";
}

/// Extractor that requires a valid token and a stored role allowed by `P`.
///
/// A caller with a valid token but no user record gets 401; a caller whose
/// role `P` does not allow gets 403.
pub struct RequireRole<P> {
    pub identity: Identity,
    pub role: Role,
    policy: PhantomData<P>,
}

impl<P> FromRequestParts<AppState> for RequireRole<P>
where
    P: RolePolicy + Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let RequireAuth(identity) = RequireAuth::from_request_parts(parts, state).await?;

        let info = UserRepository::new(state.pool())
            .role_of(&identity.email)
            .await?
            .ok_or_else(|| AppError::Unauthorized(UNAUTHORIZED_MESSAGE.to_string()))?;

        if !P::POLICY.allows(info.role) {
            tracing::info!(
                email = %identity.email,
                role = %info.role,
                policy = ?P::POLICY,
                "Role check failed"
            );
            return Err(AppError::Forbidden(P::DENIED.to_string()));
        }

        Ok(Self {
            identity,
            role: info.role,
            policy: PhantomData,
        })
    }
}
