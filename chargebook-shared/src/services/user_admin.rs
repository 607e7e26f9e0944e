/// User administration service
///
/// Admin-only account management: listing, granting the admin capability,
/// and deleting accounts. Deleting a user also removes their bookings and
/// releases any slots those bookings were holding, all in one transaction.

use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::models::user::User;

use super::{Caller, ServiceError};

/// Lists all registered users, newest first
pub async fn list_users(pool: &PgPool, caller: Caller) -> Result<Vec<User>, ServiceError> {
    caller.require_admin()?;

    Ok(User::list_all(pool).await?)
}

/// Grants the admin capability to a user
///
/// # Errors
///
/// - `Forbidden` if the caller is not an admin
/// - `NotFound` if the user does not exist
/// - `Validation` if the user already holds the admin capability
pub async fn promote_user(
    pool: &PgPool,
    caller: Caller,
    user_id: Uuid,
) -> Result<User, ServiceError> {
    caller.require_admin()?;

    let current = User::find_by_id(pool, user_id)
        .await?
        .ok_or(ServiceError::NotFound("User"))?;

    if current.is_admin {
        return Err(ServiceError::Validation(
            "User is already an admin".to_string(),
        ));
    }

    let user = User::grant_admin(pool, user_id)
        .await?
        .ok_or(ServiceError::NotFound("User"))?;

    info!(user_id = %user.id, "User granted admin capability");

    Ok(user)
}

/// Deletes a user account together with their bookings
///
/// Slots held by the user's upcoming bookings are released back to
/// `available` before the bookings are removed. Admins cannot delete their
/// own account; demote first, then have another admin remove it.
///
/// # Errors
///
/// - `Forbidden` if the caller is not an admin
/// - `Validation` if the caller targets their own account
/// - `NotFound` if the user does not exist
pub async fn delete_user(
    pool: &PgPool,
    caller: Caller,
    user_id: Uuid,
) -> Result<u64, ServiceError> {
    caller.require_admin()?;

    if caller.user_id == user_id {
        return Err(ServiceError::Validation(
            "Admins cannot delete their own account".to_string(),
        ));
    }

    let mut tx = pool.begin().await?;

    let exists: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM users WHERE id = $1 FOR UPDATE")
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;

    if exists.is_none() {
        return Err(ServiceError::NotFound("User"));
    }

    // Release slots held by the user's upcoming bookings
    sqlx::query(
        r#"
        UPDATE slots
        SET status = 'available', updated_at = NOW()
        WHERE id IN (
            SELECT slot_id FROM bookings
            WHERE user_id = $1 AND status = 'upcoming'
        )
        "#,
    )
    .bind(user_id)
    .execute(&mut *tx)
    .await?;

    let bookings_removed = sqlx::query("DELETE FROM bookings WHERE user_id = $1")
        .bind(user_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    info!(user_id = %user_id, bookings_removed, "User deleted");

    Ok(bookings_removed)
}
