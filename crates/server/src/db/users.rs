//! User repository for database operations.
//!
//! Users are keyed by email. Creation is idempotent and the seller-request
//! workflow is enforced with guarded updates.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use plantnet_core::models::{NewUser, RoleInfo, User};
use plantnet_core::{Email, Role, SellerStatus, UserId};

use super::RepositoryError;

/// Message returned when a seller request is already pending.
pub const ALREADY_REQUESTED: &str = "Already requested!Please wait for the decision.";

#[derive(sqlx::FromRow)]
struct UserRow {
    id: UserId,
    email: Email,
    display_name: Option<String>,
    photo_url: Option<String>,
    role: Role,
    status: Option<SellerStatus>,
    created_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            email: row.email,
            display_name: row.display_name,
            photo_url: row.photo_url,
            role: row.role,
            status: row.status,
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct RoleRow {
    role: Role,
    status: Option<SellerStatus>,
}

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a user by their email address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            SELECT id, email, display_name, photo_url, role, status, created_at
            FROM plantnet.users
            WHERE email = $1
            ",
        )
        .bind(email)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(User::from))
    }

    /// Look up the stored role and seller status for `email`.
    ///
    /// `None` means there is no user record, which callers treat as no access.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn role_of(&self, email: &Email) -> Result<Option<RoleInfo>, RepositoryError> {
        let row = sqlx::query_as::<_, RoleRow>(
            "SELECT role, status FROM plantnet.users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(|r| RoleInfo {
            role: r.role,
            status: r.status,
        }))
    }

    /// Create a customer record for `email` unless one exists.
    ///
    /// Returns the stored user and whether it was created by this call. An
    /// existing record is returned untouched, including its `created_at`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create_if_absent(
        &self,
        email: &Email,
        profile: &NewUser,
    ) -> Result<(User, bool), RepositoryError> {
        let inserted = sqlx::query_as::<_, UserRow>(
            r"
            INSERT INTO plantnet.users (email, display_name, photo_url, role)
            VALUES ($1, $2, $3, 'customer')
            ON CONFLICT (email) DO NOTHING
            RETURNING id, email, display_name, photo_url, role, status, created_at
            ",
        )
        .bind(email)
        .bind(profile.display_name.as_deref())
        .bind(profile.photo_url.as_deref())
        .fetch_optional(self.pool)
        .await?;

        if let Some(row) = inserted {
            return Ok((row.into(), true));
        }

        let existing = self
            .get_by_email(email)
            .await?
            .ok_or(RepositoryError::NotFound)?;
        Ok((existing, false))
    }

    /// Mark `email` as having requested seller status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` with [`ALREADY_REQUESTED`] if a
    /// request is pending or the user does not exist.
    pub async fn request_seller(&self, email: &Email) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            UPDATE plantnet.users
            SET status = 'requested'
            WHERE email = $1
              AND (status IS NULL OR status <> 'requested')
            RETURNING id, email, display_name, photo_url, role, status, created_at
            ",
        )
        .bind(email)
        .fetch_optional(self.pool)
        .await?;

        row.map(User::from)
            .ok_or_else(|| RepositoryError::Conflict(ALREADY_REQUESTED.to_owned()))
    }

    /// All users except `caller`, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_except(&self, caller: &Email) -> Result<Vec<User>, RepositoryError> {
        let rows = sqlx::query_as::<_, UserRow>(
            r"
            SELECT id, email, display_name, photo_url, role, status, created_at
            FROM plantnet.users
            WHERE email <> $1
            ORDER BY created_at DESC, id DESC
            ",
        )
        .bind(caller)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(User::from).collect())
    }

    /// Set the role of `email`, settling any pending seller request.
    ///
    /// A pending request becomes `accepted` when the new role is seller and
    /// `rejected` otherwise; without a pending request the status is cleared.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user does not exist.
    pub async fn set_role(&self, email: &Email, role: Role) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            UPDATE plantnet.users
            SET role = $2,
                status = CASE
                    WHEN status = 'requested' AND $2 = 'seller'::plantnet.user_role
                        THEN 'accepted'::plantnet.seller_status
                    WHEN status = 'requested'
                        THEN 'rejected'::plantnet.seller_status
                    ELSE NULL
                END
            WHERE email = $1
            RETURNING id, email, display_name, photo_url, role, status, created_at
            ",
        )
        .bind(email)
        .bind(role)
        .fetch_optional(self.pool)
        .await?;

        row.map(User::from).ok_or(RepositoryError::NotFound)
    }

    /// Promote or create `email` with `role`, for operator bootstrap.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn upsert_role(&self, email: &Email, role: Role) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            INSERT INTO plantnet.users (email, role)
            VALUES ($1, $2)
            ON CONFLICT (email) DO UPDATE SET role = EXCLUDED.role, status = NULL
            RETURNING id, email, display_name, photo_url, role, status, created_at
            ",
        )
        .bind(email)
        .bind(role)
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }
}
