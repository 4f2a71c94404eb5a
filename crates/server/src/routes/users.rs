//! User and role handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use plantnet_core::models::{NewUser, RoleInfo, RoleUpdate, User};

use super::{JsonBody, parse_email};
use crate::db::{RepositoryError, UserRepository};
use crate::error::{AppError, Result};
use crate::middleware::{AdminOnly, RequireAuth, RequireRole};
use crate::state::AppState;

/// `POST /users/{email}`: create the user on first sign-in.
///
/// Returns 201 with the new record, or 200 with the existing record
/// unchanged.
///
/// # Errors
///
/// Returns 400 for a malformed email.
pub async fn create(
    State(state): State<AppState>,
    Path(email): Path<String>,
    JsonBody(profile): JsonBody<NewUser>,
) -> Result<(StatusCode, Json<User>)> {
    let email = parse_email(&email)?;
    let (user, created) = UserRepository::new(state.pool())
        .create_if_absent(&email, &profile)
        .await?;

    if created {
        tracing::info!(email = %user.email, "User created");
        Ok((StatusCode::CREATED, Json(user)))
    } else {
        Ok((StatusCode::OK, Json(user)))
    }
}

/// `PATCH /user/{email}`: ask to become a seller.
///
/// # Errors
///
/// Returns 403 when the caller is not `email`, and 400 with
/// "Already requested!Please wait for the decision." when a request is
/// already pending.
pub async fn request_seller(
    RequireAuth(identity): RequireAuth,
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<User>> {
    let email = parse_email(&email)?;
    if !identity.is(&email) {
        return Err(AppError::Forbidden("forbidden access".to_string()));
    }

    let user = UserRepository::new(state.pool())
        .request_seller(&email)
        .await
        .map_err(|e| match e {
            RepositoryError::Conflict(message) => AppError::BadRequest(message),
            other => other.into(),
        })?;

    tracing::info!(email = %user.email, "Seller status requested");
    Ok(Json(user))
}

/// `GET /user/role/{email}`: stored role and seller status.
///
/// Responds with `null` when there is no such user, which the client treats
/// as no access.
///
/// # Errors
///
/// Returns 400 for a malformed email.
pub async fn role(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<Option<RoleInfo>>> {
    let email = parse_email(&email)?;
    let info = UserRepository::new(state.pool()).role_of(&email).await?;
    Ok(Json(info))
}

/// `GET /users`: every user except the calling admin.
///
/// # Errors
///
/// Returns 401/403 unless the caller is an admin.
pub async fn list(
    RequireRole { identity, .. }: RequireRole<AdminOnly>,
    State(state): State<AppState>,
) -> Result<Json<Vec<User>>> {
    let users = UserRepository::new(state.pool())
        .list_except(&identity.email)
        .await?;
    Ok(Json(users))
}

/// `PATCH /user/role/{email}`: set a user's role, settling any pending
/// seller request.
///
/// # Errors
///
/// Returns 401/403 unless the caller is an admin, 400 when an admin targets
/// themselves, and 404 for an unknown user.
pub async fn set_role(
    RequireRole { identity, .. }: RequireRole<AdminOnly>,
    State(state): State<AppState>,
    Path(email): Path<String>,
    JsonBody(update): JsonBody<RoleUpdate>,
) -> Result<Json<User>> {
    let email = parse_email(&email)?;
    if identity.is(&email) {
        return Err(AppError::BadRequest(
            "admins can not change their own role".to_string(),
        ));
    }

    let user = UserRepository::new(state.pool())
        .set_role(&email, update.role)
        .await?;

    tracing::info!(
        admin = %identity.email,
        email = %user.email,
        role = %user.role,
        "Role updated"
    );
    Ok(Json(user))
}
