//! The purchase flow behind the plant details page.
//!
//! The quantity is checked against the stock the page was rendered with
//! before anything is sent; a refused quantity keeps the form open. An
//! accepted purchase is a single `POST /purchases`, which prices the order,
//! records it and decrements stock atomically on the server. The caller then
//! navigates to the customer's order list.

use plantnet_core::models::{NewOrder, Order, Plant};
use plantnet_core::{PurchaseError, PurchaseQuantity, Role};
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::api::PlantNetClient;
use crate::error::ClientError;

/// Where the dashboard sends a customer after a purchase.
pub const ORDERS_ROUTE: &str = Role::Customer.landing_route();

/// A placed order and where to go next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchaseOutcome {
    /// The order as recorded by the server, with its total price.
    pub order: Order,
    /// Route to navigate to.
    pub navigate_to: &'static str,
}

/// Why a purchase did not go through.
#[derive(Debug, Error)]
pub enum PurchaseFailure {
    /// Refused before sending: the quantity is out of range.
    #[error(transparent)]
    Invalid(#[from] PurchaseError),

    /// Refused before sending: no delivery address.
    #[error("address is required")]
    MissingAddress,

    /// The server refused the purchase (stock changed, plant gone, signed out).
    #[error("{message}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Server message, suitable for a toast.
        message: String,
    },

    /// The request did not complete.
    #[error(transparent)]
    Failed(ClientError),
}

impl PurchaseFailure {
    /// Whether submitting the same form again may succeed.
    ///
    /// Nothing was recorded by any failure, so a retry never double-orders.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Invalid(_) | Self::MissingAddress | Self::Rejected { .. } => false,
            Self::Failed(e) => e.is_retryable(),
        }
    }
}

impl From<ClientError> for PurchaseFailure {
    fn from(error: ClientError) -> Self {
        match error {
            ClientError::Api { status, message } if (400..500).contains(&status) => {
                Self::Rejected { status, message }
            }
            other => Self::Failed(other),
        }
    }
}

/// Check a purchase form without sending anything.
///
/// # Errors
///
/// Returns `PurchaseFailure::Invalid` for a quantity outside `[1, stock]` and
/// `PurchaseFailure::MissingAddress` for a blank address.
pub fn prepare(plant: &Plant, requested: i64, address: &str) -> Result<NewOrder, PurchaseFailure> {
    let quantity = PurchaseQuantity::validate(requested, plant.quantity)?;
    let address = address.trim();
    if address.is_empty() {
        return Err(PurchaseFailure::MissingAddress);
    }
    Ok(NewOrder {
        plant_id: plant.id,
        quantity: i64::from(quantity.get()),
        address: address.to_string(),
    })
}

impl PlantNetClient {
    /// Buy `requested` units of `plant` for delivery to `address`.
    ///
    /// # Errors
    ///
    /// Returns `PurchaseFailure::Invalid` or `PurchaseFailure::MissingAddress`
    /// without sending a request, `PurchaseFailure::Rejected` when the server
    /// refuses, and `PurchaseFailure::Failed` for transport or server faults.
    #[instrument(skip(self, plant, address), fields(plant_id = %plant.id))]
    pub async fn purchase(
        &self,
        plant: &Plant,
        requested: i64,
        address: &str,
    ) -> Result<PurchaseOutcome, PurchaseFailure> {
        let body = prepare(plant, requested, address)?;
        let order = self.submit_purchase(&body).await.map_err(|e| {
            warn!(error = %e, "Purchase failed");
            PurchaseFailure::from(e)
        })?;
        info!(order_id = %order.id, total = %order.price, "Purchase placed");
        Ok(PurchaseOutcome {
            order,
            navigate_to: ORDERS_ROUTE,
        })
    }
}
