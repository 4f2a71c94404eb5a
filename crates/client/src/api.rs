//! HTTP client for the `PlantNet` REST API.
//!
//! The session lives in an HTTP-only cookie, so the client keeps a cookie
//! store and never sees the token itself. `sign_in` sets the cookie and every
//! later call sends it.

use std::sync::Arc;

use plantnet_core::models::{
    AdminStats, IdentityPayload, InsertedId, NewPlant, NewUser, Order, OrderWithPlant, Plant,
    PlantPage, RoleInfo, RoleUpdate, StatusUpdate, StockUpdate, User,
};
use plantnet_core::{Email, OrderId, OrderStatus, PlantId, Role};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use crate::error::ClientError;

/// Longest slice of an unexpected response body kept in errors and logs.
const BODY_SNIPPET_LEN: usize = 500;

/// Error body shape shared by every API failure.
#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// Acknowledgement body (`{"success": true}`).
#[derive(Deserialize)]
struct Ack {
    success: bool,
}

// =============================================================================
// PlantNetClient
// =============================================================================

/// Client for the `PlantNet` API.
///
/// Cheap to clone; clones share the connection pool and the cookie store.
#[derive(Clone)]
pub struct PlantNetClient {
    inner: Arc<PlantNetClientInner>,
}

struct PlantNetClientInner {
    client: reqwest::Client,
    base: Url,
}

impl PlantNetClient {
    /// Create a client for the API rooted at `base`.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::InvalidBaseUrl` if `base` cannot take path
    /// segments and `ClientError::Http` if the TLS backend fails to start.
    pub fn new(base: Url) -> Result<Self, ClientError> {
        if base.cannot_be_a_base() {
            return Err(ClientError::InvalidBaseUrl(base.to_string()));
        }
        let client = reqwest::Client::builder().cookie_store(true).build()?;
        Ok(Self {
            inner: Arc::new(PlantNetClientInner { client, base }),
        })
    }

    /// Base URL of the API.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base
    }

    /// Build an endpoint URL from raw path segments.
    ///
    /// Segments are percent-encoded, so emails with `+` or `/` stay one segment.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.inner.base.clone();
        // cannot_be_a_base was rejected in `new`
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Send a request and decode a JSON success body.
    async fn execute<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ClientError> {
        let response = request.send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(ClientError::RateLimited(retry_after));
        }

        // Read as text first so failures can be logged with the body
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&body).map_or_else(
                |_| body.chars().take(BODY_SNIPPET_LEN).collect(),
                |error| error.message,
            );
            debug!(status = status.as_u16(), %message, "API request refused");
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %body.chars().take(BODY_SNIPPET_LEN).collect::<String>(),
                "Failed to parse API response"
            );
            ClientError::Parse(e)
        })
    }

    /// Execute a request whose reply is `{"success": ...}`.
    async fn acknowledge(&self, request: reqwest::RequestBuilder) -> Result<(), ClientError> {
        let ack: Ack = self.execute(request).await?;
        if ack.success {
            Ok(())
        } else {
            Err(ClientError::Api {
                status: reqwest::StatusCode::OK.as_u16(),
                message: "request was not acknowledged".to_string(),
            })
        }
    }

    fn get(&self, segments: &[&str]) -> reqwest::RequestBuilder {
        self.inner.client.get(self.endpoint(segments))
    }

    fn post(&self, segments: &[&str]) -> reqwest::RequestBuilder {
        self.inner.client.post(self.endpoint(segments))
    }

    fn patch(&self, segments: &[&str]) -> reqwest::RequestBuilder {
        self.inner.client.patch(self.endpoint(segments))
    }

    fn delete(&self, segments: &[&str]) -> reqwest::RequestBuilder {
        self.inner.client.delete(self.endpoint(segments))
    }

    // =========================================================================
    // Session
    // =========================================================================

    /// Exchange an identity-provider email for the session cookie.
    ///
    /// # Errors
    ///
    /// Returns `ClientError` if the request fails or the email is refused.
    #[instrument(skip(self), fields(email = %email))]
    pub async fn sign_in(&self, email: &Email) -> Result<(), ClientError> {
        let payload = IdentityPayload {
            email: email.clone(),
        };
        self.acknowledge(self.post(&["jwt"]).json(&payload)).await
    }

    /// Expire the session cookie.
    ///
    /// # Errors
    ///
    /// Returns `ClientError` if the request fails.
    pub async fn sign_out(&self) -> Result<(), ClientError> {
        self.acknowledge(self.get(&["logout"])).await
    }

    // =========================================================================
    // Users
    // =========================================================================

    /// Record a freshly signed-in user; returns the existing record if any.
    ///
    /// # Errors
    ///
    /// Returns `ClientError` if the request fails.
    pub async fn create_user(&self, email: &Email, profile: &NewUser) -> Result<User, ClientError> {
        self.execute(self.post(&["users", email.as_str()]).json(profile))
            .await
    }

    /// Ask to become a seller.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Api` with status 400 if a request is already
    /// pending.
    pub async fn request_seller(&self, email: &Email) -> Result<User, ClientError> {
        self.execute(self.patch(&["user", email.as_str()])).await
    }

    /// Stored role of `email`, or `None` if there is no user record.
    ///
    /// # Errors
    ///
    /// Returns `ClientError` if the request fails.
    pub async fn role(&self, email: &Email) -> Result<Option<RoleInfo>, ClientError> {
        self.execute(self.get(&["user", "role", email.as_str()]))
            .await
    }

    /// All users except the caller (admin only).
    ///
    /// # Errors
    ///
    /// Returns `ClientError` if the request fails or the caller is not an admin.
    pub async fn users(&self) -> Result<Vec<User>, ClientError> {
        self.execute(self.get(&["users"])).await
    }

    /// Change another user's role (admin only).
    ///
    /// # Errors
    ///
    /// Returns `ClientError` if the request fails or is refused.
    pub async fn set_role(&self, email: &Email, role: Role) -> Result<User, ClientError> {
        self.execute(
            self.patch(&["user", "role", email.as_str()])
                .json(&RoleUpdate { role }),
        )
        .await
    }

    // =========================================================================
    // Plants
    // =========================================================================

    /// One page of the catalogue, oldest listing first.
    ///
    /// # Errors
    ///
    /// Returns `ClientError` if the request fails.
    pub async fn plants(
        &self,
        limit: Option<u32>,
        after: Option<PlantId>,
    ) -> Result<PlantPage, ClientError> {
        let mut url = self.endpoint(&["plants"]);
        {
            let mut query = url.query_pairs_mut();
            if let Some(limit) = limit {
                query.append_pair("limit", &limit.to_string());
            }
            if let Some(after) = after {
                query.append_pair("after", &after.to_string());
            }
        }
        // Drop the dangling `?` when no parameters were given
        if url.query() == Some("") {
            url.set_query(None);
        }
        self.execute(self.inner.client.get(url)).await
    }

    /// One plant.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Api` with status 404 if it does not exist.
    pub async fn plant(&self, id: PlantId) -> Result<Plant, ClientError> {
        self.execute(self.get(&["plant", &id.to_string()])).await
    }

    /// List a plant for sale as the signed-in seller.
    ///
    /// # Errors
    ///
    /// Returns `ClientError` if the request fails or the listing is invalid.
    pub async fn create_plant(&self, plant: &NewPlant) -> Result<PlantId, ClientError> {
        let created: InsertedId<PlantId> = self.execute(self.post(&["plant"]).json(plant)).await?;
        Ok(created.inserted_id)
    }

    /// Remove a listing.
    ///
    /// # Errors
    ///
    /// Returns `ClientError` if the request fails or the caller does not own it.
    pub async fn delete_plant(&self, id: PlantId) -> Result<(), ClientError> {
        self.acknowledge(self.delete(&["plant", &id.to_string()])).await
    }

    /// The signed-in seller's listings.
    ///
    /// # Errors
    ///
    /// Returns `ClientError` if the request fails.
    pub async fn seller_plants(&self) -> Result<Vec<Plant>, ClientError> {
        self.execute(self.get(&["seller", "plants"])).await
    }

    /// Restock or draw down a listing.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Api` with status 409 if a decrease exceeds stock.
    pub async fn adjust_quantity(
        &self,
        id: PlantId,
        update: &StockUpdate,
    ) -> Result<Plant, ClientError> {
        self.execute(
            self.patch(&["plants", "quantity", &id.to_string()])
                .json(update),
        )
        .await
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// Orders placed by `email`, joined with plant details.
    ///
    /// # Errors
    ///
    /// Returns `ClientError` if the request fails.
    pub async fn customer_orders(&self, email: &Email) -> Result<Vec<OrderWithPlant>, ClientError> {
        self.execute(self.get(&["orders", email.as_str()])).await
    }

    /// Orders for the signed-in seller's plants.
    ///
    /// # Errors
    ///
    /// Returns `ClientError` if the request fails.
    pub async fn seller_orders(&self) -> Result<Vec<OrderWithPlant>, ClientError> {
        self.execute(self.get(&["seller", "orders"])).await
    }

    /// Move an order along its lifecycle.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Api` with status 409 for a disallowed move.
    pub async fn update_order_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Order, ClientError> {
        self.execute(
            self.patch(&["order", "status", &id.to_string()])
                .json(&StatusUpdate { status }),
        )
        .await
    }

    /// Cancel an order and restock its plant.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Api` with status 409 once the order is delivered.
    pub async fn cancel_order(&self, id: OrderId) -> Result<(), ClientError> {
        self.acknowledge(self.delete(&["order", "delete", &id.to_string()])).await
    }

    /// Totals for the admin dashboard.
    ///
    /// # Errors
    ///
    /// Returns `ClientError` if the request fails or the caller is not an admin.
    pub async fn admin_stats(&self) -> Result<AdminStats, ClientError> {
        self.execute(self.get(&["admin-stat"])).await
    }

    /// Submit a purchase body; used by [`crate::purchase`].
    pub(crate) async fn submit_purchase(
        &self,
        order: &plantnet_core::models::NewOrder,
    ) -> Result<Order, ClientError> {
        self.execute(self.post(&["purchases"]).json(order)).await
    }
}
