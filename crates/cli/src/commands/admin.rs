//! Role bootstrap.
//!
//! The API never lets anyone grant themselves admin, so the first admin is
//! created here.

use plantnet_core::{Email, Role};
use plantnet_server::db::UserRepository;

use super::{CommandError, connect};

/// Set `email`'s role, creating the user record if it does not exist.
///
/// # Errors
///
/// Returns `CommandError` for an invalid email or role, or if the database
/// write fails.
pub async fn promote(email: &str, role: &str) -> Result<(), CommandError> {
    let role: Role = role
        .parse()
        .map_err(|_| CommandError::InvalidRole(role.to_owned()))?;
    let email = Email::parse(email)?;

    let pool = connect().await?;
    let user = UserRepository::new(&pool).upsert_role(&email, role).await?;

    tracing::info!(id = %user.id, email = %user.email, role = %user.role, "Role set");
    pool.close().await;
    Ok(())
}
