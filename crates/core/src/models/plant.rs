//! Plant listings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::types::{Email, PlantId, Price, StockAdjustment, StockDirection, StockError};

/// Name, email and avatar of a seller or customer, copied onto a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub name: Option<String>,
    pub email: Email,
    pub image: Option<String>,
}

/// A plant listing with its current stock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plant {
    pub id: PlantId,
    pub name: String,
    pub description: String,
    pub category: String,
    pub price: Price,
    pub quantity: i32,
    pub image: String,
    pub seller: ContactInfo,
    pub created_at: DateTime<Utc>,
}

/// Why a new plant was refused.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlantValidationError {
    #[error("name is required")]
    EmptyName,
    #[error("category is required")]
    EmptyCategory,
    #[error("quantity can not be negative")]
    NegativeQuantity,
    #[error("quantity is too large")]
    QuantityTooLarge,
    #[error("image must be an http or https URL")]
    ImageScheme,
}

/// Body of `POST /plant`.
///
/// The seller is never taken from the body; the server fills it in from the
/// caller's identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPlant {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category: String,
    pub price: Price,
    pub quantity: i64,
    pub image: Url,
}

impl NewPlant {
    /// Check the listing and return its starting stock.
    ///
    /// # Errors
    ///
    /// Returns the first `PlantValidationError` found.
    pub fn validate(&self) -> Result<i32, PlantValidationError> {
        if self.name.trim().is_empty() {
            return Err(PlantValidationError::EmptyName);
        }
        if self.category.trim().is_empty() {
            return Err(PlantValidationError::EmptyCategory);
        }
        if !matches!(self.image.scheme(), "http" | "https") {
            return Err(PlantValidationError::ImageScheme);
        }
        if self.quantity < 0 {
            return Err(PlantValidationError::NegativeQuantity);
        }
        i32::try_from(self.quantity).map_err(|_| PlantValidationError::QuantityTooLarge)
    }
}

/// One page of the plant catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlantPage {
    pub plants: Vec<Plant>,
    /// Pass as `after` to fetch the next page; `None` on the last page.
    pub next_cursor: Option<PlantId>,
}

/// Body of `PATCH /plants/quantity/{id}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockUpdate {
    pub quantity_num: i64,
    #[serde(default)]
    pub status: StockDirection,
}

impl StockUpdate {
    /// The adjustment this body asks for.
    ///
    /// # Errors
    ///
    /// Returns `StockError` when the amount is below one or too large.
    pub fn adjustment(&self) -> Result<StockAdjustment, StockError> {
        StockAdjustment::new(self.quantity_num, self.status)
    }
}

/// `{ "insertedId": … }` returned by create endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertedId<T> {
    pub inserted_id: T,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn new_plant(json: &str) -> NewPlant {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_valid_plant() {
        let plant = new_plant(
            r#"{"name":"Monstera","category":"Indoor","price":12.5,"quantity":4,
                "image":"https://i.ibb.co/abc/monstera.jpg"}"#,
        );
        assert_eq!(plant.validate(), Ok(4));
        assert_eq!(plant.description, "");
    }

    #[test]
    fn test_plant_rejections() {
        let negative = new_plant(
            r#"{"name":"Fern","category":"Indoor","price":3,"quantity":-1,
                "image":"https://i.ibb.co/fern.jpg"}"#,
        );
        assert_eq!(
            negative.validate(),
            Err(PlantValidationError::NegativeQuantity)
        );

        let blank = new_plant(
            r#"{"name":"  ","category":"Indoor","price":3,"quantity":1,
                "image":"https://i.ibb.co/fern.jpg"}"#,
        );
        assert_eq!(blank.validate(), Err(PlantValidationError::EmptyName));

        let ftp = new_plant(
            r#"{"name":"Fern","category":"Indoor","price":3,"quantity":1,
                "image":"ftp://files.example.com/fern.jpg"}"#,
        );
        assert_eq!(ftp.validate(), Err(PlantValidationError::ImageScheme));
    }

    #[test]
    fn test_negative_price_is_refused_on_parse() {
        let result = serde_json::from_str::<NewPlant>(
            r#"{"name":"Fern","category":"Indoor","price":-3,"quantity":1,
                "image":"https://i.ibb.co/fern.jpg"}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_unstorable_price_is_refused_on_parse() {
        for price in ["100000000000", "12.345"] {
            let body = format!(
                r#"{{"name":"Fern","category":"Indoor","price":{price},"quantity":1,
                    "image":"https://i.ibb.co/fern.jpg"}}"#
            );
            let err = serde_json::from_str::<NewPlant>(&body).unwrap_err();
            assert!(err.to_string().contains("price"), "{price}: {err}");
        }
    }

    #[test]
    fn test_stock_update_defaults_to_decrease() {
        let body: StockUpdate = serde_json::from_str(r#"{"quantityNum":2}"#).unwrap();
        assert_eq!(body.adjustment().unwrap().delta(), -2);

        let body: StockUpdate =
            serde_json::from_str(r#"{"quantityNum":2,"status":"increase"}"#).unwrap();
        assert_eq!(body.adjustment().unwrap().delta(), 2);

        let zero: StockUpdate = serde_json::from_str(r#"{"quantityNum":0}"#).unwrap();
        assert_eq!(zero.adjustment(), Err(StockError::ZeroAmount));
    }

    #[test]
    fn test_inserted_id_shape() {
        let json = serde_json::to_string(&InsertedId {
            inserted_id: PlantId::new(7),
        })
        .unwrap();
        assert_eq!(json, r#"{"insertedId":7}"#);
    }
}
