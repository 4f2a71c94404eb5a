//! Order repository: the order store and the purchase transaction.

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};

use plantnet_core::models::{ContactInfo, Order, OrderWithPlant};
use plantnet_core::{
    Email, OrderId, OrderStatus, PlantId, Price, PriceError, PurchaseQuantity, StockError,
};

use super::{RepositoryError, out_of_range};

/// Message returned when deleting a delivered order.
pub const DELIVERED_NOT_DELETABLE: &str = "Can not delete once delivered";

/// Message returned when putting an order's units back would overflow stock.
pub const RESTOCK_OVERFLOW: &str = "Plant stock is full, lower it before cancelling";

const ORDER_COLUMNS: &str = "o.id, o.plant_id, o.price, o.quantity, o.address, o.status, \
                             o.customer_name, o.customer_email, o.customer_image, \
                             o.seller_email, o.created_at";

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: OrderId,
    plant_id: Option<PlantId>,
    price: Price,
    quantity: i32,
    address: String,
    status: OrderStatus,
    customer_name: Option<String>,
    customer_email: Email,
    customer_image: Option<String>,
    seller_email: Email,
    created_at: DateTime<Utc>,
}

impl From<OrderRow> for Order {
    fn from(row: OrderRow) -> Self {
        Self {
            id: row.id,
            plant_id: row.plant_id,
            price: row.price,
            quantity: row.quantity,
            address: row.address,
            status: row.status,
            customer: ContactInfo {
                name: row.customer_name,
                email: row.customer_email,
                image: row.customer_image,
            },
            seller: row.seller_email,
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct JoinedRow {
    #[sqlx(flatten)]
    order: OrderRow,
    plant_name: Option<String>,
    plant_image: Option<String>,
    plant_category: Option<String>,
}

impl From<JoinedRow> for OrderWithPlant {
    fn from(row: JoinedRow) -> Self {
        Self {
            order: row.order.into(),
            name: row.plant_name,
            image: row.plant_image,
            category: row.plant_category,
        }
    }
}

#[derive(sqlx::FromRow)]
struct PricedPlant {
    price: Price,
    seller_email: Email,
}

/// A validated order ready to be written.
#[derive(Debug, Clone)]
pub struct OrderDraft<'a> {
    pub plant_id: PlantId,
    pub quantity: PurchaseQuantity,
    pub address: &'a str,
    pub customer: &'a ContactInfo,
}

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Record a pending order without touching stock.
    ///
    /// The price is the plant's current unit price times the quantity and
    /// the seller is copied from the plant.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the plant does not exist.
    pub async fn create(&self, draft: &OrderDraft<'_>) -> Result<Order, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let plant = sqlx::query_as::<_, PricedPlant>(
            "SELECT price, seller_email FROM plantnet.plants WHERE id = $1 FOR SHARE",
        )
        .bind(draft.plant_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        let order = insert_order(&mut tx, draft, &plant).await?;
        tx.commit().await?;
        Ok(order)
    }

    /// Take stock and record the order in one transaction.
    ///
    /// Either both writes land or neither does.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the plant does not exist and
    /// `RepositoryError::Conflict` if there is not enough stock or the total
    /// is above `Price::MAX`.
    pub async fn purchase(&self, draft: &OrderDraft<'_>) -> Result<Order, RepositoryError> {
        let amount = quantity_i32(draft.quantity)?;
        let mut tx = self.pool.begin().await?;

        let taken = sqlx::query_as::<_, PricedPlant>(
            r"
            UPDATE plantnet.plants
            SET quantity = quantity - $2
            WHERE id = $1 AND quantity >= $2
            RETURNING price, seller_email
            ",
        )
        .bind(draft.plant_id)
        .bind(amount)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(plant) = taken else {
            let available: Option<i32> =
                sqlx::query_scalar("SELECT quantity FROM plantnet.plants WHERE id = $1")
                    .bind(draft.plant_id)
                    .fetch_optional(&mut *tx)
                    .await?;
            return Err(match available {
                Some(available) => RepositoryError::Conflict(
                    StockError::Insufficient {
                        available,
                        requested: draft.quantity.get(),
                    }
                    .to_string(),
                ),
                None => RepositoryError::NotFound,
            });
        };

        let order = insert_order(&mut tx, draft, &plant).await?;
        tx.commit().await?;
        Ok(order)
    }

    /// Get an order by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM plantnet.orders o WHERE o.id = $1");
        let row = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(row.map(Order::from))
    }

    /// Orders placed by `customer`, newest first, with plant display fields.
    ///
    /// Orders whose plant was deleted are kept with the plant fields unset.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_customer(
        &self,
        customer: &Email,
    ) -> Result<Vec<OrderWithPlant>, RepositoryError> {
        self.list_joined("o.customer_email", customer).await
    }

    /// Orders for plants sold by `seller`, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_seller(
        &self,
        seller: &Email,
    ) -> Result<Vec<OrderWithPlant>, RepositoryError> {
        self.list_joined("o.seller_email", seller).await
    }

    async fn list_joined(
        &self,
        email_column: &'static str,
        email: &Email,
    ) -> Result<Vec<OrderWithPlant>, RepositoryError> {
        let sql = format!(
            r"
            SELECT {ORDER_COLUMNS},
                   p.name AS plant_name,
                   p.image AS plant_image,
                   p.category AS plant_category
            FROM plantnet.orders o
            LEFT JOIN plantnet.plants p ON p.id = o.plant_id
            WHERE {email_column} = $1
            ORDER BY o.created_at DESC, o.id DESC
            "
        );
        let rows = sqlx::query_as::<_, JoinedRow>(&sql)
            .bind(email)
            .fetch_all(self.pool)
            .await?;

        Ok(rows.into_iter().map(OrderWithPlant::from).collect())
    }

    /// Delete an order that has not been delivered and put its units back.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` for an unknown order and
    /// `RepositoryError::Conflict` if it was delivered or the plant has no
    /// room for the units.
    pub async fn delete(&self, id: OrderId) -> Result<Order, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let sql =
            format!("SELECT {ORDER_COLUMNS} FROM plantnet.orders o WHERE o.id = $1 FOR UPDATE");
        let order: Order = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(RepositoryError::NotFound)?
            .into();

        if !order.status.is_deletable() {
            return Err(RepositoryError::Conflict(DELIVERED_NOT_DELETABLE.to_owned()));
        }

        sqlx::query("DELETE FROM plantnet.orders WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if let Some(plant_id) = order.plant_id {
            sqlx::query("UPDATE plantnet.plants SET quantity = quantity + $2 WHERE id = $1")
                .bind(plant_id)
                .bind(order.quantity)
                .execute(&mut *tx)
                .await
                .map_err(out_of_range(RESTOCK_OVERFLOW))?;
        }

        tx.commit().await?;
        Ok(order)
    }

    /// Move an order from `from` to `to`, if it is still in `from`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` for an unknown order and
    /// `RepositoryError::Conflict` if its status changed in the meantime.
    pub async fn update_status(
        &self,
        id: OrderId,
        from: OrderStatus,
        to: OrderStatus,
    ) -> Result<Order, RepositoryError> {
        let sql = format!(
            r"
            UPDATE plantnet.orders o
            SET status = $3
            WHERE o.id = $1 AND o.status = $2
            RETURNING {ORDER_COLUMNS}
            "
        );
        let row = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(id)
            .bind(from)
            .bind(to)
            .fetch_optional(self.pool)
            .await?;

        if let Some(row) = row {
            return Ok(row.into());
        }
        match self.get(id).await? {
            Some(current) => Err(RepositoryError::Conflict(format!(
                "order is now {}, reload and try again",
                current.status
            ))),
            None => Err(RepositoryError::NotFound),
        }
    }
}

fn quantity_i32(quantity: PurchaseQuantity) -> Result<i32, RepositoryError> {
    i32::try_from(quantity.get())
        .map_err(|_| RepositoryError::Conflict(StockError::TooLarge.to_string()))
}

async fn insert_order(
    tx: &mut Transaction<'_, Postgres>,
    draft: &OrderDraft<'_>,
    plant: &PricedPlant,
) -> Result<Order, RepositoryError> {
    let amount = quantity_i32(draft.quantity)?;
    let total = draft
        .quantity
        .total(plant.price)
        .map_err(|e| RepositoryError::Conflict(e.to_string()))?;

    let sql = format!(
        r"
        INSERT INTO plantnet.orders AS o
            (plant_id, price, quantity, address, status,
             customer_name, customer_email, customer_image, seller_email)
        VALUES ($1, $2, $3, $4, 'pending', $5, $6, $7, $8)
        RETURNING {ORDER_COLUMNS}
        "
    );
    let row = sqlx::query_as::<_, OrderRow>(&sql)
        .bind(draft.plant_id)
        .bind(total)
        .bind(amount)
        .bind(draft.address)
        .bind(draft.customer.name.as_deref())
        .bind(&draft.customer.email)
        .bind(draft.customer.image.as_deref())
        .bind(&plant.seller_email)
        .fetch_one(&mut **tx)
        .await
        .map_err(out_of_range(PriceError::Overflow))?;

    Ok(row.into())
}
