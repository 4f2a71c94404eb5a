//! Order and purchase handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde_json::Value;

use plantnet_core::models::{
    ContactInfo, InsertedId, NewOrder, Order, OrderWithPlant, StatusUpdate,
};
use plantnet_core::{OrderId, PurchaseQuantity, Role};

use super::{JsonBody, ensure_self_or_admin, parse_email, parse_id, success};
use crate::db::orders::OrderDraft;
use crate::db::{OrderRepository, UserRepository};
use crate::error::{AppError, Result, add_breadcrumb};
use crate::middleware::{Identity, RequireAuth, RequireRole, SellerOrAdmin};
use crate::state::AppState;

/// `POST /purchases`: take stock and place a pending order in one
/// transaction.
///
/// The total is the plant's current unit price times the quantity.
///
/// # Errors
///
/// Returns 400 for a quantity below one or a blank address, 404 for an
/// unknown plant, and 409 with "Quantity exceeds available stock" when
/// there is not enough stock. Nothing is written on failure.
pub async fn purchase(
    RequireAuth(identity): RequireAuth,
    State(state): State<AppState>,
    JsonBody(body): JsonBody<NewOrder>,
) -> Result<(StatusCode, Json<Order>)> {
    let (quantity, address) = validate(&body)?;
    let customer = customer_contact(&state, &identity).await?;

    let order = OrderRepository::new(state.pool())
        .purchase(&OrderDraft {
            plant_id: body.plant_id,
            quantity,
            address,
            customer: &customer,
        })
        .await?;

    let order_id = order.id.to_string();
    add_breadcrumb(
        "order",
        "Purchase placed",
        Some(&[("order_id", order_id.as_str())]),
    );
    tracing::info!(
        order_id = %order.id,
        plant_id = %body.plant_id,
        quantity = order.quantity,
        total = %order.price,
        "Purchase placed"
    );
    Ok((StatusCode::CREATED, Json(order)))
}

/// `POST /orders`: record a pending order without taking stock.
///
/// # Errors
///
/// Returns 400 for an invalid body and 404 for an unknown plant.
pub async fn create(
    RequireAuth(identity): RequireAuth,
    State(state): State<AppState>,
    JsonBody(body): JsonBody<NewOrder>,
) -> Result<(StatusCode, Json<InsertedId<OrderId>>)> {
    let (quantity, address) = validate(&body)?;
    let customer = customer_contact(&state, &identity).await?;

    let order = OrderRepository::new(state.pool())
        .create(&OrderDraft {
            plant_id: body.plant_id,
            quantity,
            address,
            customer: &customer,
        })
        .await?;

    tracing::info!(order_id = %order.id, "Order recorded");
    Ok((
        StatusCode::CREATED,
        Json(InsertedId {
            inserted_id: order.id,
        }),
    ))
}

/// `GET /orders/{email}`: a customer's orders with plant display fields.
///
/// # Errors
///
/// Returns 403 unless the caller is `email` or an admin.
pub async fn customer_orders(
    RequireAuth(identity): RequireAuth,
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<Vec<OrderWithPlant>>> {
    let email = parse_email(&email)?;
    ensure_self_or_admin(&state, &identity, &email).await?;

    let orders = OrderRepository::new(state.pool())
        .list_for_customer(&email)
        .await?;
    Ok(Json(orders))
}

/// `GET /seller/orders`: orders for the caller's plants.
///
/// # Errors
///
/// Returns 401/403 unless the caller is a seller or admin.
pub async fn seller_orders(
    RequireRole { identity, .. }: RequireRole<SellerOrAdmin>,
    State(state): State<AppState>,
) -> Result<Json<Vec<OrderWithPlant>>> {
    let orders = OrderRepository::new(state.pool())
        .list_for_seller(&identity.email)
        .await?;
    Ok(Json(orders))
}

/// `PATCH /order/status/{id}`: advance fulfilment.
///
/// # Errors
///
/// Returns 403 unless the caller sold the order or is an admin, 404 for an
/// unknown order and 409 for a move the lifecycle does not allow.
pub async fn update_status(
    RequireRole { identity, role, .. }: RequireRole<SellerOrAdmin>,
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(update): JsonBody<StatusUpdate>,
) -> Result<Json<Order>> {
    let id: OrderId = parse_id(&id)?;
    let orders = OrderRepository::new(state.pool());
    let order = orders
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Order not found".to_string()))?;

    match role {
        Role::Admin => {}
        Role::Seller if identity.is(&order.seller) => {}
        Role::Seller | Role::Customer => {
            return Err(AppError::Forbidden(
                "Forbidden Access! Not your order.".to_string(),
            ));
        }
    }

    let next = order
        .status
        .transition_to(update.status)
        .map_err(|e| AppError::Conflict(e.to_string()))?;
    let updated = orders.update_status(id, order.status, next).await?;

    tracing::info!(order_id = %id, from = %order.status, to = %next, "Order status changed");
    Ok(Json(updated))
}

/// `DELETE /order/delete/{id}`: cancel an order and return its stock.
///
/// # Errors
///
/// Returns 403 unless the caller placed the order or is an admin, 404 for
/// an unknown order and 409 with "Can not delete once delivered".
pub async fn remove(
    RequireAuth(identity): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    let id: OrderId = parse_id(&id)?;
    let orders = OrderRepository::new(state.pool());
    let order = orders
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Order not found".to_string()))?;
    ensure_self_or_admin(&state, &identity, &order.customer.email).await?;

    let deleted = orders.delete(id).await?;
    tracing::info!(order_id = %id, restocked = deleted.quantity, "Order cancelled");
    Ok(success())
}

/// Check an order body before anything touches the database.
fn validate(body: &NewOrder) -> Result<(PurchaseQuantity, &str)> {
    let quantity = body
        .quantity()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    let address = body
        .address()
        .ok_or_else(|| AppError::BadRequest("address is required".to_string()))?;
    Ok((quantity, address))
}

/// Customer details copied onto the order from the caller's user record.
async fn customer_contact(state: &AppState, identity: &Identity) -> Result<ContactInfo> {
    let user = UserRepository::new(state.pool())
        .get_by_email(&identity.email)
        .await?;
    Ok(match user {
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
    })
}
