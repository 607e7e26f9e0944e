/// User administration endpoints
///
/// All routes here sit behind the admin middleware.
///
/// # Endpoints
///
/// - `GET /api/users` - List all users
/// - `PUT /api/users/:id/make-admin` - Grant the admin capability
/// - `DELETE /api/users/:id` - Delete a user and their bookings

use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chargebook_shared::{
    auth::middleware::AuthContext,
    models::user::User,
    services::{user_admin, Caller},
};
use serde::Serialize;
use serde_json::{json, Value};
use uuid::Uuid;

/// Response for a user delete
#[derive(Debug, Serialize)]
pub struct UserDeleteResponse {
    pub message: String,
    pub bookings_removed: u64,
}

/// Lists all users, newest first
pub async fn list_users(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<User>>> {
    let users = user_admin::list_users(&state.db, Caller::from(auth)).await?;

    Ok(Json(users))
}

/// Grants the admin capability to a user
///
/// # Errors
///
/// - `404 Not Found`: No user with this ID
pub async fn make_admin(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Value>> {
    let user = user_admin::promote_user(&state.db, Caller::from(auth), id).await?;

    Ok(Json(json!({
        "message": "User granted admin access",
        "user": user,
    })))
}

/// Deletes a user together with their bookings, releasing held slots
///
/// # Errors
///
/// - `403 Forbidden`: Admins cannot delete their own account
/// - `404 Not Found`: No user with this ID
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<UserDeleteResponse>> {
    let bookings_removed = user_admin::delete_user(&state.db, Caller::from(auth), id).await?;

    Ok(Json(UserDeleteResponse {
        message: "User deleted".to_string(),
        bookings_removed,
    }))
}
