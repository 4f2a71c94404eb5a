//! Orders and the bodies that create or advance them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::plant::ContactInfo;
use crate::types::{Email, OrderId, OrderStatus, PlantId, Price, PurchaseError, PurchaseQuantity};

/// A stored order.
///
/// `price` is the total paid (unit price times quantity) at the time of
/// purchase and never follows later price changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    /// `None` once the plant has been deleted.
    pub plant_id: Option<PlantId>,
    pub price: Price,
    pub quantity: i32,
    pub address: String,
    pub status: OrderStatus,
    pub customer: ContactInfo,
    pub seller: Email,
    pub created_at: DateTime<Utc>,
}

/// An order with the referenced plant's current display fields.
///
/// The plant fields are `None` when the plant no longer exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderWithPlant {
    #[serde(flatten)]
    pub order: Order,
    pub name: Option<String>,
    pub image: Option<String>,
    pub category: Option<String>,
}

/// Body of `POST /purchases` and `POST /orders`.
///
/// Carries no price: the server prices the order from the plant record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    pub plant_id: PlantId,
    pub quantity: i64,
    pub address: String,
}

impl NewOrder {
    /// Check the order shape before any stock is touched.
    ///
    /// Stock is checked by the store itself, so only the lower bound and the
    /// column range are enforced here.
    ///
    /// # Errors
    ///
    /// Returns `PurchaseError::BelowMinimum` for quantities below one.
    pub fn quantity(&self) -> Result<PurchaseQuantity, PurchaseError> {
        PurchaseQuantity::validate(self.quantity, i32::MAX)
    }

    /// Delivery address with surrounding whitespace removed, if any is left.
    #[must_use]
    pub fn address(&self) -> Option<&str> {
        Some(self.address.trim()).filter(|a| !a.is_empty())
    }
}

/// Body of `PATCH /order/status/{id}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub status: OrderStatus,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    fn order() -> Order {
        Order {
            id: OrderId::new(3),
            plant_id: None,
            price: Price::new(Decimal::new(15, 0)).unwrap(),
            quantity: 3,
            address: "12 Garden Row".to_string(),
            status: OrderStatus::Pending,
            customer: ContactInfo {
                name: Some("Fern".to_string()),
                email: Email::parse("fern@example.com").unwrap(),
                image: None,
            },
            seller: Email::parse("grower@example.com").unwrap(),
            created_at: DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
        }
    }

    #[test]
    fn test_joined_order_flattens_with_null_plant_fields() {
        let joined = OrderWithPlant {
            order: order(),
            name: None,
            image: None,
            category: None,
        };
        let json = serde_json::to_value(&joined).unwrap();
        assert_eq!(json["id"], 3);
        assert!(json["plantId"].is_null());
        assert!(json["name"].is_null());
        assert_eq!(json["status"], "pending");
        assert_eq!(json["customer"]["email"], "fern@example.com");

        let back: OrderWithPlant = serde_json::from_value(json).unwrap();
        assert_eq!(back, joined);
    }

    #[test]
    fn test_new_order_checks() {
        let body: NewOrder =
            serde_json::from_str(r#"{"plantId":4,"quantity":0,"address":"  "}"#).unwrap();
        assert_eq!(body.quantity(), Err(PurchaseError::BelowMinimum));
        assert_eq!(body.address(), None);

        let body: NewOrder =
            serde_json::from_str(r#"{"plantId":4,"quantity":2,"address":" 12 Garden Row "}"#)
                .unwrap();
        assert_eq!(body.quantity().unwrap().get(), 2);
        assert_eq!(body.address(), Some("12 Garden Row"));
    }
}
