//! Admin dashboard statistics.

use serde::{Deserialize, Serialize};

use crate::types::Price;

/// Totals shown on the admin statistics page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminStats {
    pub total_users: i64,
    pub total_plants: i64,
    pub total_orders: i64,
    /// Sum of all orders that were not cancelled.
    pub total_revenue: Price,
}
