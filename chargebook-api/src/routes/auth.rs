/// Authentication endpoints
///
/// # Endpoints
///
/// - `POST /api/auth/register` - Register new user
/// - `POST /api/auth/login` - Login and get tokens
/// - `POST /api/auth/refresh` - Refresh access token

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, ValidationErrorDetail},
};
use axum::{extract::State, http::StatusCode, Json};
use chargebook_shared::{
    auth::{jwt, password},
    models::user::{CreateUser, User},
};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Display name
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password (also validated for strength)
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password
    pub password: String,
}

/// Token pair returned by register and login
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    /// User ID
    pub user_id: String,

    /// Display name
    pub name: String,

    /// Email address
    pub email: String,

    /// Whether the account holds the admin capability
    pub is_admin: bool,

    /// Access token (24h)
    pub access_token: String,

    /// Refresh token (30d)
    pub refresh_token: String,
}

/// Refresh token request
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    /// Refresh token
    pub refresh_token: String,
}

/// Refresh token response
#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    /// New access token (24h)
    pub access_token: String,
}

/// Converts validator errors into the API's validation detail list
fn validation_details(e: validator::ValidationErrors) -> ApiError {
    let errors: Vec<ValidationErrorDetail> = e
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| ValidationErrorDetail {
                field: field.to_string(),
                message: error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "Validation failed".to_string()),
            })
        })
        .collect();
    ApiError::ValidationError(errors)
}

/// Issues a token pair for a user
fn issue_tokens(state: &AppState, user: &User) -> ApiResult<TokenResponse> {
    let access_claims = jwt::Claims::new(user.id, user.is_admin, jwt::TokenType::Access);
    let refresh_claims = jwt::Claims::new(user.id, user.is_admin, jwt::TokenType::Refresh);

    Ok(TokenResponse {
        user_id: user.id.to_string(),
        name: user.name.clone(),
        email: user.email.clone(),
        is_admin: user.is_admin,
        access_token: jwt::create_token(&access_claims, state.jwt_secret())?,
        refresh_token: jwt::create_token(&refresh_claims, state.jwt_secret())?,
    })
}

/// Register a new user
///
/// # Endpoint
///
/// ```text
/// POST /api/auth/register
/// Content-Type: application/json
///
/// {
///   "name": "Jane Doe",
///   "email": "jane@example.com",
///   "password": "SecureP4ss"
/// }
/// ```
///
/// # Errors
///
/// - `422 Unprocessable Entity`: Validation failed
/// - `409 Conflict`: Email already registered
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<TokenResponse>)> {
    req.validate().map_err(validation_details)?;

    password::validate_password_strength(&req.password).map_err(|e| {
        ApiError::ValidationError(vec![ValidationErrorDetail {
            field: "password".to_string(),
            message: e,
        }])
    })?;

    let password_hash = password::hash_password(&req.password)?;

    let user = User::create(
        &state.db,
        CreateUser {
            name: req.name,
            email: req.email.to_lowercase(),
            password_hash,
            is_admin: false,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(issue_tokens(&state, &user)?)))
}

/// Login and obtain a token pair
///
/// # Endpoint
///
/// ```text
/// POST /api/auth/login
/// Content-Type: application/json
///
/// {
///   "email": "jane@example.com",
///   "password": "SecureP4ss"
/// }
/// ```
///
/// # Errors
///
/// - `401 Unauthorized`: Invalid credentials (same message for unknown
///   email and wrong password)
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<TokenResponse>> {
    req.validate().map_err(validation_details)?;

    let user = User::find_by_email(&state.db, &req.email.to_lowercase())
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid email or password".to_string()))?;

    let valid = password::verify_password(&req.password, &user.password_hash)?;
    if !valid {
        return Err(ApiError::Unauthorized(
            "Invalid email or password".to_string(),
        ));
    }

    User::update_last_login(&state.db, user.id).await?;

    Ok(Json(issue_tokens(&state, &user)?))
}

/// Exchange a refresh token for a new access token
///
/// # Errors
///
/// - `401 Unauthorized`: Invalid or expired refresh token
pub async fn refresh(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> ApiResult<Json<RefreshResponse>> {
    let access_token = jwt::refresh_access_token(&req.refresh_token, state.jwt_secret())?;

    Ok(Json(RefreshResponse { access_token }))
}
