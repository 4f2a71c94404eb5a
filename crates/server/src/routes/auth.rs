//! Token cookie handlers.

use axum::{Json, extract::State};
use axum_extra::extract::CookieJar;
use serde_json::Value;

use plantnet_core::models::IdentityPayload;

use super::{JsonBody, success};
use crate::error::{Result, clear_sentry_user};
use crate::state::AppState;

/// `POST /jwt`: sign a token for the payload's email and set it as a cookie.
///
/// # Errors
///
/// Returns 400 for a body without a valid email and 500 if signing fails.
pub async fn issue_token(
    State(state): State<AppState>,
    jar: CookieJar,
    JsonBody(payload): JsonBody<IdentityPayload>,
) -> Result<(CookieJar, Json<Value>)> {
    let token = state.tokens().issue(&payload.email)?;
    tracing::info!(email = %payload.email, "Token issued");
    Ok((jar.add(state.tokens().token_cookie(token)), success()))
}

/// `GET /logout`: expire the token cookie.
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, Json<Value>) {
    clear_sentry_user();
    (jar.add(state.tokens().removal_cookie()), success())
}
