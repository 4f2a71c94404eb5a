//! Plant repository: the inventory store.
//!
//! Stock is only changed with single-statement conditional updates, so
//! concurrent adjustments never lose writes and never take it below zero.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use plantnet_core::models::{ContactInfo, NewPlant, Plant, PlantPage};
use plantnet_core::{Email, PlantId, Price, StockAdjustment, StockError};

use super::{RepositoryError, out_of_range};

/// Page size used when the caller does not ask for one.
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Largest page a caller may ask for.
pub const MAX_PAGE_SIZE: i64 = 100;

const PLANT_COLUMNS: &str = "id, name, description, category, price, quantity, image, \
                             seller_name, seller_email, seller_image, created_at";

#[derive(sqlx::FromRow)]
struct PlantRow {
    id: PlantId,
    name: String,
    description: String,
    category: String,
    price: Price,
    quantity: i32,
    image: String,
    seller_name: Option<String>,
    seller_email: Email,
    seller_image: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<PlantRow> for Plant {
    fn from(row: PlantRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            category: row.category,
            price: row.price,
            quantity: row.quantity,
            image: row.image,
            seller: ContactInfo {
                name: row.seller_name,
                email: row.seller_email,
                image: row.seller_image,
            },
            created_at: row.created_at,
        }
    }
}

/// Clamp a requested page size into `1..=MAX_PAGE_SIZE`.
#[must_use]
pub fn page_size(requested: Option<i64>) -> i64 {
    requested.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
}

/// Repository for plant database operations.
pub struct PlantRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PlantRepository<'a> {
    /// Create a new plant repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a plant listed by `seller` with `quantity` units in stock.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(
        &self,
        plant: &NewPlant,
        quantity: i32,
        seller: &ContactInfo,
    ) -> Result<Plant, RepositoryError> {
        let sql = format!(
            r"
            INSERT INTO plantnet.plants
                (name, description, category, price, quantity, image,
                 seller_name, seller_email, seller_image)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {PLANT_COLUMNS}
            "
        );
        let row = sqlx::query_as::<_, PlantRow>(&sql)
            .bind(plant.name.trim())
            .bind(plant.description.trim())
            .bind(plant.category.trim())
            .bind(plant.price)
            .bind(quantity)
            .bind(plant.image.as_str())
            .bind(seller.name.as_deref())
            .bind(&seller.email)
            .bind(seller.image.as_deref())
            .fetch_one(self.pool)
            .await?;

        Ok(row.into())
    }

    /// Get a plant by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: PlantId) -> Result<Option<Plant>, RepositoryError> {
        let sql = format!("SELECT {PLANT_COLUMNS} FROM plantnet.plants WHERE id = $1");
        let row = sqlx::query_as::<_, PlantRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        Ok(row.map(Plant::from))
    }

    /// One page of the catalog in id order, starting after `after`.
    ///
    /// Ids grow with creation time, so pages are stable across calls and new
    /// listings only ever appear at the end.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        limit: Option<i64>,
        after: Option<PlantId>,
    ) -> Result<PlantPage, RepositoryError> {
        let limit = page_size(limit);
        let sql = format!(
            r"
            SELECT {PLANT_COLUMNS}
            FROM plantnet.plants
            WHERE id > $1
            ORDER BY id
            LIMIT $2
            "
        );
        // One extra row tells us whether another page exists.
        let rows = sqlx::query_as::<_, PlantRow>(&sql)
            .bind(after.map_or(0, |id| id.as_i32()))
            .bind(limit + 1)
            .fetch_all(self.pool)
            .await?;

        let mut plants: Vec<Plant> = rows.into_iter().map(Plant::from).collect();
        let has_more = plants.len() > usize::try_from(limit).unwrap_or(usize::MAX);
        if has_more {
            plants.pop();
        }
        let next_cursor = if has_more {
            plants.last().map(|p| p.id)
        } else {
            None
        };

        Ok(PlantPage {
            plants,
            next_cursor,
        })
    }

    /// All plants listed by `seller`, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_by_seller(&self, seller: &Email) -> Result<Vec<Plant>, RepositoryError> {
        let sql = format!(
            "SELECT {PLANT_COLUMNS} FROM plantnet.plants WHERE seller_email = $1 ORDER BY id DESC"
        );
        let rows = sqlx::query_as::<_, PlantRow>(&sql)
            .bind(seller)
            .fetch_all(self.pool)
            .await?;

        Ok(rows.into_iter().map(Plant::from).collect())
    }

    /// Delete a plant. Its orders keep their rows with no plant reference.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no plant has this id.
    pub async fn delete(&self, id: PlantId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM plantnet.plants WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Apply a stock adjustment in one statement.
    ///
    /// A decrease that would go below zero matches no row and is refused;
    /// the stock is left unchanged.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` for an unknown plant and
    /// `RepositoryError::Conflict` when stock is insufficient.
    pub async fn adjust_quantity(
        &self,
        id: PlantId,
        adjustment: StockAdjustment,
    ) -> Result<Plant, RepositoryError> {
        let sql = format!(
            r"
            UPDATE plantnet.plants
            SET quantity = quantity + $2
            WHERE id = $1 AND quantity + $2 >= 0
            RETURNING {PLANT_COLUMNS}
            "
        );
        let row = sqlx::query_as::<_, PlantRow>(&sql)
            .bind(id)
            .bind(adjustment.delta())
            .fetch_optional(self.pool)
            .await
            .map_err(out_of_range(StockError::TooLarge))?;

        if let Some(row) = row {
            return Ok(row.into());
        }

        match self.get(id).await? {
            Some(plant) => Err(RepositoryError::Conflict(
                StockError::Insufficient {
                    available: plant.quantity,
                    requested: adjustment.amount(),
                }
                .to_string(),
            )),
            None => Err(RepositoryError::NotFound),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_size_clamped() {
        assert_eq!(page_size(None), 20);
        assert_eq!(page_size(Some(0)), 1);
        assert_eq!(page_size(Some(-5)), 1);
        assert_eq!(page_size(Some(50)), 50);
        assert_eq!(page_size(Some(10_000)), 100);
    }
}
