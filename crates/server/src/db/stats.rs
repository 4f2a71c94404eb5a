//! Aggregate counts for the admin statistics page.

use sqlx::PgPool;

use plantnet_core::Price;
use plantnet_core::models::AdminStats;

use super::RepositoryError;

#[derive(sqlx::FromRow)]
struct StatsRow {
    total_users: i64,
    total_plants: i64,
    total_orders: i64,
    total_revenue: Price,
}

/// Repository for read-only statistics.
pub struct StatsRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> StatsRepository<'a> {
    /// Create a new statistics repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Totals across users, plants and orders.
    ///
    /// Revenue excludes cancelled orders.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn admin_stats(&self) -> Result<AdminStats, RepositoryError> {
        let row = sqlx::query_as::<_, StatsRow>(
            r"
            SELECT
                (SELECT COUNT(*) FROM plantnet.users) AS total_users,
                (SELECT COUNT(*) FROM plantnet.plants) AS total_plants,
                (SELECT COUNT(*) FROM plantnet.orders) AS total_orders,
                (SELECT COALESCE(SUM(price), 0) FROM plantnet.orders
                 WHERE status <> 'cancelled') AS total_revenue
            ",
        )
        .fetch_one(self.pool)
        .await?;

        Ok(AdminStats {
            total_users: row.total_users,
            total_plants: row.total_plants,
            total_orders: row.total_orders,
            total_revenue: row.total_revenue,
        })
    }
}
