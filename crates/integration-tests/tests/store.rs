//! Repository tests against a real database.
//!
//! These tests require `TEST_DATABASE_URL` pointing at a disposable
//! `PostgreSQL` database.
//!
//! Run with: cargo test -p plantnet-integration-tests -- --ignored

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use plantnet_core::models::{ContactInfo, NewUser};
use plantnet_core::{
    OrderStatus, PurchaseQuantity, Role, SellerStatus, StockAdjustment, StockDirection,
};
use plantnet_integration_tests::TestContext;
use plantnet_server::db::orders::{OrderDraft, RESTOCK_OVERFLOW};
use plantnet_server::db::{OrderRepository, PlantRepository, RepositoryError, UserRepository};
use rust_decimal::Decimal;

const ADDRESS: &str = "12 Fern Lane";

fn quantity(n: i64) -> PurchaseQuantity {
    PurchaseQuantity::validate(n, i32::MAX).expect("positive quantity")
}

fn draft<'a>(plant: &plantnet_core::models::Plant, n: i64, customer: &'a ContactInfo) -> OrderDraft<'a> {
    OrderDraft {
        plant_id: plant.id,
        quantity: quantity(n),
        address: ADDRESS,
        customer,
    }
}

// ============================================================================
// Users
// ============================================================================

#[tokio::test]
#[ignore = "Requires PostgreSQL (TEST_DATABASE_URL)"]
async fn test_create_user_is_idempotent() {
    let ctx = TestContext::new().await;
    let repo = UserRepository::new(&ctx.pool);
    let email = TestContext::unique_email("fern");
    let profile = NewUser {
        display_name: Some("Fern".to_string()),
        photo_url: None,
    };

    let (first, created) = repo.create_if_absent(&email, &profile).await.unwrap();
    assert!(created);
    assert_eq!(first.role, Role::Customer);
    assert_eq!(first.status, None);

    let renamed = NewUser {
        display_name: Some("Frond".to_string()),
        photo_url: Some("https://i.ibb.co/frond.jpg".to_string()),
    };
    let (second, created) = repo.create_if_absent(&email, &renamed).await.unwrap();
    assert!(!created);
    assert_eq!(second, first);
    assert_eq!(second.display_name.as_deref(), Some("Fern"));

    let stored = repo.get_by_email(&email).await.unwrap().unwrap();
    assert_eq!(stored.created_at, first.created_at);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (TEST_DATABASE_URL)"]
async fn test_seller_request_lifecycle() {
    let ctx = TestContext::new().await;
    let repo = UserRepository::new(&ctx.pool);
    let user = ctx.user_with_role("moss", Role::Customer).await;

    let requested = repo.request_seller(&user.email).await.unwrap();
    assert_eq!(requested.status, Some(SellerStatus::Requested));

    let again = repo.request_seller(&user.email).await.unwrap_err();
    assert!(matches!(again, RepositoryError::Conflict(_)));

    let promoted = repo.set_role(&user.email, Role::Seller).await.unwrap();
    assert_eq!(promoted.role, Role::Seller);
    assert_eq!(promoted.status, Some(SellerStatus::Accepted));

    let info = repo.role_of(&user.email).await.unwrap().unwrap();
    assert_eq!(info.role, Role::Seller);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (TEST_DATABASE_URL)"]
async fn test_declined_seller_may_ask_again() {
    let ctx = TestContext::new().await;
    let repo = UserRepository::new(&ctx.pool);
    let user = ctx.user_with_role("sage", Role::Customer).await;

    repo.request_seller(&user.email).await.unwrap();
    let declined = repo.set_role(&user.email, Role::Customer).await.unwrap();
    assert_eq!(declined.status, Some(SellerStatus::Rejected));

    let renewed = repo.request_seller(&user.email).await.unwrap();
    assert_eq!(renewed.status, Some(SellerStatus::Requested));
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (TEST_DATABASE_URL)"]
async fn test_unknown_user_has_no_role() {
    let ctx = TestContext::new().await;
    let email = TestContext::unique_email("ghost");
    let info = UserRepository::new(&ctx.pool).role_of(&email).await.unwrap();
    assert!(info.is_none());
}

// ============================================================================
// Inventory
// ============================================================================

#[tokio::test]
#[ignore = "Requires PostgreSQL (TEST_DATABASE_URL)"]
async fn test_stock_adjustment_never_goes_negative() {
    let ctx = TestContext::new().await;
    let seller = ctx.user_with_role("ivy", Role::Seller).await;
    let plant = ctx.plant(&seller, 5, 4).await;
    let repo = PlantRepository::new(&ctx.pool);

    let down = StockAdjustment::new(5, StockDirection::Decrease).unwrap();
    let err = repo.adjust_quantity(plant.id, down).await.unwrap_err();
    assert!(matches!(err, RepositoryError::Conflict(ref m) if m == "Quantity exceeds available stock"));
    assert_eq!(ctx.stock(&plant).await, 4);

    let up = StockAdjustment::new(6, StockDirection::Increase).unwrap();
    let updated = repo.adjust_quantity(plant.id, up).await.unwrap();
    assert_eq!(updated.quantity, 10);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (TEST_DATABASE_URL)"]
async fn test_seller_listing_and_delete() {
    let ctx = TestContext::new().await;
    let seller = ctx.user_with_role("ivy", Role::Seller).await;
    let repo = PlantRepository::new(&ctx.pool);
    let first = ctx.plant(&seller, 5, 4).await;
    let second = ctx.plant(&seller, 9, 2).await;

    let listed = repo.list_by_seller(&seller.email).await.unwrap();
    let ids: Vec<_> = listed.iter().map(|plant| plant.id).collect();
    assert_eq!(ids, vec![second.id, first.id]);

    repo.delete(first.id).await.unwrap();
    assert!(repo.get(first.id).await.unwrap().is_none());
    assert!(matches!(
        repo.delete(first.id).await,
        Err(RepositoryError::NotFound)
    ));
}

// ============================================================================
// Orders
// ============================================================================

#[tokio::test]
#[ignore = "Requires PostgreSQL (TEST_DATABASE_URL)"]
async fn test_purchase_prices_order_and_takes_stock() {
    let ctx = TestContext::new().await;
    let seller = ctx.user_with_role("ivy", Role::Seller).await;
    let customer = ctx.user_with_role("fern", Role::Customer).await;
    let plant = ctx.plant(&seller, 5, 10).await;

    let order = OrderRepository::new(&ctx.pool)
        .purchase(&draft(&plant, 3, &customer))
        .await
        .unwrap();

    assert_eq!(order.price.amount(), Decimal::new(15, 0));
    assert_eq!(order.quantity, 3);
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.seller, seller.email);
    assert_eq!(order.customer.email, customer.email);
    assert_eq!(ctx.stock(&plant).await, 7);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (TEST_DATABASE_URL)"]
async fn test_purchase_over_stock_changes_nothing() {
    let ctx = TestContext::new().await;
    let seller = ctx.user_with_role("ivy", Role::Seller).await;
    let customer = ctx.user_with_role("fern", Role::Customer).await;
    let plant = ctx.plant(&seller, 5, 7).await;
    let repo = OrderRepository::new(&ctx.pool);

    let err = repo.purchase(&draft(&plant, 15, &customer)).await.unwrap_err();
    assert!(matches!(err, RepositoryError::Conflict(_)));
    assert_eq!(ctx.stock(&plant).await, 7);
    assert!(repo.list_for_customer(&customer.email).await.unwrap().is_empty());
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (TEST_DATABASE_URL)"]
async fn test_purchase_total_above_max_price_is_refused() {
    let ctx = TestContext::new().await;
    let seller = ctx.user_with_role("ivy", Role::Seller).await;
    let customer = ctx.user_with_role("fern", Role::Customer).await;
    let plant = ctx.plant(&seller, 1_000_000_000, 100).await;
    let repo = OrderRepository::new(&ctx.pool);

    let err = repo.purchase(&draft(&plant, 20, &customer)).await.unwrap_err();
    assert!(matches!(err, RepositoryError::Conflict(ref m) if m == "price is too large"));
    assert_eq!(ctx.stock(&plant).await, 100);
    assert!(repo.list_for_customer(&customer.email).await.unwrap().is_empty());

    let order = repo.purchase(&draft(&plant, 9, &customer)).await.unwrap();
    assert_eq!(order.price.amount(), Decimal::new(9_000_000_000, 0));
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (TEST_DATABASE_URL)"]
async fn test_concurrent_purchases_never_oversell() {
    let ctx = TestContext::new().await;
    let seller = ctx.user_with_role("ivy", Role::Seller).await;
    let customer = ctx.user_with_role("fern", Role::Customer).await;
    let plant = ctx.plant(&seller, 5, 10).await;

    let mut handles = Vec::new();
    for _ in 0..8 {
        let pool = ctx.pool.clone();
        let customer = customer.clone();
        let plant = plant.clone();
        handles.push(tokio::spawn(async move {
            OrderRepository::new(&pool)
                .purchase(&draft(&plant, 2, &customer))
                .await
        }));
    }

    let (mut placed, mut refused) = (0, 0);
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => placed += 1,
            Err(RepositoryError::Conflict(_)) => refused += 1,
            Err(e) => panic!("unexpected error: {e}"),
        }
    }

    assert_eq!(placed, 5);
    assert_eq!(refused, 3);
    assert_eq!(ctx.stock(&plant).await, 0);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (TEST_DATABASE_URL)"]
async fn test_cancel_restocks_until_delivered() {
    let ctx = TestContext::new().await;
    let seller = ctx.user_with_role("ivy", Role::Seller).await;
    let customer = ctx.user_with_role("fern", Role::Customer).await;
    let plant = ctx.plant(&seller, 5, 10).await;
    let repo = OrderRepository::new(&ctx.pool);

    let pending = repo.purchase(&draft(&plant, 3, &customer)).await.unwrap();
    assert_eq!(ctx.stock(&plant).await, 7);
    repo.delete(pending.id).await.unwrap();
    assert_eq!(ctx.stock(&plant).await, 10);

    let delivered = repo.purchase(&draft(&plant, 2, &customer)).await.unwrap();
    repo.update_status(delivered.id, OrderStatus::Pending, OrderStatus::Shipped)
        .await
        .unwrap();
    repo.update_status(delivered.id, OrderStatus::Shipped, OrderStatus::Delivered)
        .await
        .unwrap();

    let err = repo.delete(delivered.id).await.unwrap_err();
    assert!(matches!(err, RepositoryError::Conflict(ref m) if m == "Can not delete once delivered"));
    assert_eq!(ctx.stock(&plant).await, 8);
    assert!(repo.get(delivered.id).await.unwrap().is_some());
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (TEST_DATABASE_URL)"]
async fn test_cancel_into_full_stock_is_refused() {
    let ctx = TestContext::new().await;
    let seller = ctx.user_with_role("ivy", Role::Seller).await;
    let customer = ctx.user_with_role("fern", Role::Customer).await;
    let plant = ctx.plant(&seller, 5, 10).await;
    let repo = OrderRepository::new(&ctx.pool);

    let order = repo.purchase(&draft(&plant, 3, &customer)).await.unwrap();
    let fill = StockAdjustment::new(i64::from(i32::MAX - 7), StockDirection::Increase).unwrap();
    let full = PlantRepository::new(&ctx.pool)
        .adjust_quantity(plant.id, fill)
        .await
        .unwrap();
    assert_eq!(full.quantity, i32::MAX);

    let err = repo.delete(order.id).await.unwrap_err();
    assert!(matches!(err, RepositoryError::Conflict(ref m) if m == RESTOCK_OVERFLOW));
    assert!(repo.get(order.id).await.unwrap().is_some());
    assert_eq!(ctx.stock(&plant).await, i32::MAX);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (TEST_DATABASE_URL)"]
async fn test_status_update_is_compare_and_set() {
    let ctx = TestContext::new().await;
    let seller = ctx.user_with_role("ivy", Role::Seller).await;
    let customer = ctx.user_with_role("fern", Role::Customer).await;
    let plant = ctx.plant(&seller, 5, 10).await;
    let repo = OrderRepository::new(&ctx.pool);
    let order = repo.purchase(&draft(&plant, 1, &customer)).await.unwrap();

    let err = repo
        .update_status(order.id, OrderStatus::Shipped, OrderStatus::Delivered)
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::Conflict(ref m) if m.contains("pending")));
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (TEST_DATABASE_URL)"]
async fn test_orders_outlive_their_plant() {
    let ctx = TestContext::new().await;
    let seller = ctx.user_with_role("ivy", Role::Seller).await;
    let customer = ctx.user_with_role("fern", Role::Customer).await;
    let plant = ctx.plant(&seller, 5, 10).await;
    let repo = OrderRepository::new(&ctx.pool);

    repo.purchase(&draft(&plant, 2, &customer)).await.unwrap();
    let before = repo.list_for_customer(&customer.email).await.unwrap();
    assert_eq!(before.len(), 1);
    assert_eq!(before[0].name.as_deref(), Some("Monstera"));
    assert_eq!(before[0].category.as_deref(), Some("Indoor"));

    PlantRepository::new(&ctx.pool).delete(plant.id).await.unwrap();

    let after = repo.list_for_customer(&customer.email).await.unwrap();
    assert_eq!(after.len(), 1);
    assert_eq!(after[0].order.plant_id, None);
    assert_eq!(after[0].name, None);
    assert_eq!(after[0].image, None);

    let for_seller = repo.list_for_seller(&seller.email).await.unwrap();
    assert_eq!(for_seller.len(), 1);
}
