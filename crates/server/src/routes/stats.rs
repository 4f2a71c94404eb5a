//! Admin statistics handler.

use axum::{Json, extract::State};

use plantnet_core::models::AdminStats;

use crate::db::StatsRepository;
use crate::error::Result;
use crate::middleware::{AdminOnly, RequireRole};
use crate::state::AppState;

/// `GET /admin-stat`: user, plant and order totals plus revenue.
///
/// # Errors
///
/// Returns 401/403 unless the caller is an admin.
pub async fn admin_stats(
    _admin: RequireRole<AdminOnly>,
    State(state): State<AppState>,
) -> Result<Json<AdminStats>> {
    let stats = StatsRepository::new(state.pool()).admin_stats().await?;
    Ok(Json(stats))
}
