//! HTTP route handlers for the API.
//!
//! # Route Structure
//!
//! ```text
//! # Auth
//! POST   /jwt                    - Issue the token cookie
//! GET    /logout                 - Clear the token cookie
//!
//! # Users
//! POST   /users/{email}          - Create the user unless it exists
//! PATCH  /user/{email}           - Request seller status (self)
//! GET    /user/role/{email}      - Stored role and seller status
//! GET    /users                  - All other users (admin)
//! PATCH  /user/role/{email}      - Set a user's role (admin)
//!
//! # Plants
//! POST   /plant                  - Create a listing (seller/admin)
//! GET    /plants                 - Catalog page (?limit=&after=)
//! GET    /plant/{id}             - One plant
//! DELETE /plant/{id}             - Delete a listing (owner/admin)
//! GET    /seller/plants          - Caller's listings (seller/admin)
//! PATCH  /plants/quantity/{id}   - Adjust stock (owner/admin)
//!
//! # Orders
//! POST   /purchases              - Take stock and place an order
//! POST   /orders                 - Record an order without taking stock
//! GET    /orders/{email}         - Customer's orders (self/admin)
//! GET    /seller/orders          - Orders for caller's plants (seller/admin)
//! PATCH  /order/status/{id}      - Advance fulfilment (order's seller/admin)
//! DELETE /order/delete/{id}      - Cancel an undelivered order (owner/admin)
//!
//! # Statistics
//! GET    /admin-stat             - Totals (admin)
//! ```

pub mod auth;
pub mod orders;
pub mod plants;
pub mod stats;
pub mod users;

use std::str::FromStr;

use axum::{
    Json, Router,
    extract::{FromRequest, Request},
    routing::{delete, get, patch, post},
};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use plantnet_core::{AccessPolicy, Email};

use crate::db::UserRepository;
use crate::error::AppError;
use crate::middleware::Identity;
use crate::state::AppState;

/// Create the token issuance router.
///
/// Kept separate so the binary can put a stricter rate limit on it.
pub fn auth_routes() -> Router<AppState> {
    Router::new().route("/jwt", post(auth::issue_token))
}

/// Create the router for every other endpoint.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/logout", get(auth::logout))
        // Users
        .route("/users/{email}", post(users::create))
        .route("/user/{email}", patch(users::request_seller))
        .route("/user/role/{email}", get(users::role).patch(users::set_role))
        .route("/users", get(users::list))
        // Plants
        .route("/plant", post(plants::create))
        .route("/plants", get(plants::list))
        .route("/plant/{id}", get(plants::show).delete(plants::remove))
        .route("/seller/plants", get(plants::seller_plants))
        .route("/plants/quantity/{id}", patch(plants::adjust_quantity))
        // Orders
        .route("/purchases", post(orders::purchase))
        .route("/orders", post(orders::create))
        .route("/orders/{email}", get(orders::customer_orders))
        .route("/seller/orders", get(orders::seller_orders))
        .route("/order/status/{id}", patch(orders::update_status))
        .route("/order/delete/{id}", delete(orders::remove))
        // Statistics
        .route("/admin-stat", get(stats::admin_stats))
}

/// Every route, without rate limiting.
pub fn routes() -> Router<AppState> {
    auth_routes().merge(api_routes())
}

/// JSON body extractor whose rejections use the API error shape.
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        Json::<T>::from_request(req, state)
            .await
            .map(|Json(value)| Self(value))
            .map_err(|rejection| AppError::BadRequest(rejection.body_text()))
    }
}

/// `{ "success": true }`.
fn success() -> Json<Value> {
    Json(json!({ "success": true }))
}

/// Parse an email path segment.
fn parse_email(raw: &str) -> Result<Email, AppError> {
    Email::parse(raw).map_err(|e| AppError::BadRequest(e.to_string()))
}

/// Parse an id path segment; malformed ids are a client error.
fn parse_id<T>(raw: &str) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse::<T>()
        .map_err(|e| AppError::BadRequest(e.to_string()))
}

/// Allow `identity` to act on records belonging to `owner`.
///
/// The owner always may; anyone else must be an admin.
async fn ensure_self_or_admin(
    state: &AppState,
    identity: &Identity,
    owner: &Email,
) -> Result<(), AppError> {
    if identity.is(owner) {
        return Ok(());
    }
    let role = UserRepository::new(state.pool())
        .role_of(&identity.email)
        .await?
        .map(|info| info.role);
    if AccessPolicy::AdminOnly.allows_opt(role) {
        Ok(())
    } else {
        Err(AppError::Forbidden("forbidden access".to_string()))
    }
}
