//! Inventory handlers.

use axum::{
    Json,
    extract::{Path, Query, State, rejection::QueryRejection},
    http::StatusCode,
};
use serde::Deserialize;
use serde_json::Value;

use plantnet_core::models::{ContactInfo, InsertedId, NewPlant, Plant, PlantPage, StockUpdate};
use plantnet_core::{PlantId, Role};

use super::{JsonBody, parse_id, success};
use crate::db::{PlantRepository, UserRepository};
use crate::error::{AppError, Result};
use crate::middleware::{Identity, RequireRole, SellerOrAdmin};
use crate::state::AppState;

/// Query string of `GET /plants`.
#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub limit: Option<i64>,
    pub after: Option<PlantId>,
}

/// `POST /plant`: list a plant for sale as the caller.
///
/// # Errors
///
/// Returns 401/403 unless the caller is a seller or admin, and 400 for an
/// invalid listing.
pub async fn create(
    RequireRole { identity, .. }: RequireRole<SellerOrAdmin>,
    State(state): State<AppState>,
    JsonBody(plant): JsonBody<NewPlant>,
) -> Result<(StatusCode, Json<InsertedId<PlantId>>)> {
    let quantity = plant
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let seller = match UserRepository::new(state.pool())
        .get_by_email(&identity.email)
        .await?
    {
        Some(user) => ContactInfo {
            name: user.display_name,
            email: user.email,
            image: user.photo_url,
        },
        None => ContactInfo {
            name: None,
            email: identity.email.clone(),
            image: None,
        },
    };

    let created = PlantRepository::new(state.pool())
        .create(&plant, quantity, &seller)
        .await?;

    tracing::info!(plant_id = %created.id, seller = %seller.email, "Plant listed");
    Ok((
        StatusCode::CREATED,
        Json(InsertedId {
            inserted_id: created.id,
        }),
    ))
}

/// `GET /plants`: one page of the catalog in listing order.
///
/// # Errors
///
/// Returns 400 for a malformed query string.
pub async fn list(
    State(state): State<AppState>,
    params: std::result::Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<PlantPage>> {
    let Query(params) = params.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let page = PlantRepository::new(state.pool())
        .list(params.limit, params.after)
        .await?;
    Ok(Json(page))
}

/// `GET /plant/{id}`: one plant.
///
/// # Errors
///
/// Returns 400 for a malformed id and 404 for an unknown one.
pub async fn show(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Plant>> {
    let id: PlantId = parse_id(&id)?;
    let plant = PlantRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Plant not found".to_string()))?;
    Ok(Json(plant))
}

/// `DELETE /plant/{id}`: remove a listing. Its orders are kept.
///
/// # Errors
///
/// Returns 403 unless the caller listed the plant or is an admin.
pub async fn remove(
    RequireRole { identity, role, .. }: RequireRole<SellerOrAdmin>,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    let id: PlantId = parse_id(&id)?;
    let plants = PlantRepository::new(state.pool());
    let plant = plants
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Plant not found".to_string()))?;
    ensure_owner(&identity, role, &plant)?;

    plants.delete(id).await?;
    tracing::info!(plant_id = %id, by = %identity.email, "Plant deleted");
    Ok(success())
}

/// `GET /seller/plants`: the caller's own listings.
///
/// # Errors
///
/// Returns 401/403 unless the caller is a seller or admin.
pub async fn seller_plants(
    RequireRole { identity, .. }: RequireRole<SellerOrAdmin>,
    State(state): State<AppState>,
) -> Result<Json<Vec<Plant>>> {
    let plants = PlantRepository::new(state.pool())
        .list_by_seller(&identity.email)
        .await?;
    Ok(Json(plants))
}

/// `PATCH /plants/quantity/{id}`: add or remove stock.
///
/// Body `{ "quantityNum": n, "status": "increase" | "decrease" }`; the
/// direction defaults to decrease.
///
/// # Errors
///
/// Returns 400 for an amount below one, 403 unless the caller listed the
/// plant or is an admin, 404 for an unknown plant and 409 when a decrease
/// exceeds the stock.
pub async fn adjust_quantity(
    RequireRole { identity, role, .. }: RequireRole<SellerOrAdmin>,
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(update): JsonBody<StockUpdate>,
) -> Result<Json<Plant>> {
    let id: PlantId = parse_id(&id)?;
    let adjustment = update
        .adjustment()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let plants = PlantRepository::new(state.pool());
    let plant = plants
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Plant not found".to_string()))?;
    ensure_owner(&identity, role, &plant)?;

    let updated = plants.adjust_quantity(id, adjustment).await?;
    tracing::info!(
        plant_id = %id,
        delta = adjustment.delta(),
        quantity = updated.quantity,
        "Stock adjusted"
    );
    Ok(Json(updated))
}

/// Sellers may only manage their own listings; admins may manage any.
fn ensure_owner(identity: &Identity, role: Role, plant: &Plant) -> Result<()> {
    match role {
        Role::Admin => Ok(()),
        Role::Seller if identity.is(&plant.seller.email) => Ok(()),
        Role::Seller | Role::Customer => Err(AppError::Forbidden(
            "Forbidden Access! Not your plant.".to_string(),
        )),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::{
        body::Body,
        http::{Request, StatusCode, header},
    };
    use chrono::Utc;
    use http_body_util::BodyExt;
    use rust_decimal::Decimal;
    use tower::ServiceExt;

    use plantnet_core::{Email, Price};

    use super::*;
    use crate::test_support;

    fn plant(seller: &str) -> Plant {
        Plant {
            id: PlantId::new(1),
            name: "Monstera".to_string(),
            description: String::new(),
            category: "Indoor".to_string(),
            price: Price::new(Decimal::new(5, 0)).unwrap(),
            quantity: 10,
            image: "https://i.ibb.co/monstera.jpg".to_string(),
            seller: ContactInfo {
                name: None,
                email: Email::parse(seller).unwrap(),
                image: None,
            },
            created_at: Utc::now(),
        }
    }

    fn identity(email: &str) -> Identity {
        Identity {
            email: Email::parse(email).unwrap(),
        }
    }

    #[test]
    fn test_ownership_rules() {
        let listing = plant("grower@example.com");
        assert!(ensure_owner(&identity("grower@example.com"), Role::Seller, &listing).is_ok());
        assert!(ensure_owner(&identity("boss@example.com"), Role::Admin, &listing).is_ok());
        assert!(ensure_owner(&identity("other@example.com"), Role::Seller, &listing).is_err());
        assert!(ensure_owner(&identity("grower@example.com"), Role::Customer, &listing).is_err());
    }

    #[tokio::test]
    async fn test_malformed_plant_id_is_bad_request() {
        for uri in ["/plant/abc", "/plant/-3", "/plant/0"] {
            let response = test_support::app()
                .oneshot(Request::get(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");

            let bytes = response.into_body().collect().await.unwrap().to_bytes();
            let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
            assert!(json["message"].is_string());
        }
    }

    #[tokio::test]
    async fn test_create_plant_requires_token() {
        let response = test_support::app()
            .oneshot(
                Request::post("/plant")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from("{}"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_adjust_quantity_rejects_tampered_token() {
        let mut cookie = test_support::cookie_for("grower@example.com");
        cookie.push_str("tampered");
        let response = test_support::app()
            .oneshot(
                Request::patch("/plants/quantity/1")
                    .header(header::COOKIE, cookie)
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"quantityNum":1}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
