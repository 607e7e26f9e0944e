/// Authentication middleware for Axum
///
/// This module provides middleware for JWT authentication and the admin
/// capability check. The JWT middleware extracts the bearer token from the
/// Authorization header, validates it, and adds an [`AuthContext`] to the
/// request extensions; the admin middleware runs after it and rejects
/// requests whose context lacks the admin flag.
///
/// # Example
///
/// ```no_run
/// use axum::{middleware, routing::get, Extension, Router};
/// use chargebook_shared::auth::middleware::{admin_middleware, AuthContext};
///
/// async fn protected_handler(Extension(auth): Extension<AuthContext>) -> String {
///     format!("Hello, user {}!", auth.user_id)
/// }
///
/// let admin_routes: Router = Router::new()
///     .route("/protected", get(protected_handler))
///     .layer(middleware::from_fn(admin_middleware));
/// ```

use axum::{
    body::Body,
    extract::Request,
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use super::jwt::{validate_access_token, JwtError};

/// Request-scoped authentication context
///
/// Added to the request extensions after successful authentication and
/// passed explicitly into every service call, so no handler or service
/// depends on ambient session state.
///
/// # Example
///
/// ```
/// use axum::Extension;
/// use chargebook_shared::auth::middleware::AuthContext;
///
/// async fn handler(Extension(auth): Extension<AuthContext>) -> String {
///     format!("User: {}, admin: {}", auth.user_id, auth.is_admin)
/// }
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AuthContext {
    /// Authenticated user ID
    pub user_id: Uuid,

    /// Whether the user holds the admin capability
    pub is_admin: bool,
}

impl AuthContext {
    /// Creates auth context from validated JWT claims
    pub fn from_jwt(user_id: Uuid, is_admin: bool) -> Self {
        Self { user_id, is_admin }
    }
}

/// Error type for authentication middleware
#[derive(Debug)]
pub enum AuthError {
    /// Missing authorization header
    MissingCredentials,

    /// Invalid authorization header format
    InvalidFormat(String),

    /// Token validation failed
    InvalidToken(String),

    /// Caller lacks the admin capability
    AdminRequired,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthError::MissingCredentials => {
                (StatusCode::UNAUTHORIZED, "Missing credentials".to_string())
            }
            AuthError::InvalidFormat(msg) => (StatusCode::BAD_REQUEST, msg),
            AuthError::InvalidToken(msg) => (StatusCode::UNAUTHORIZED, msg),
            AuthError::AdminRequired => {
                (StatusCode::FORBIDDEN, "Admin access required".to_string())
            }
        };

        let body = Json(json!({
            "error": status.canonical_reason().unwrap_or("error").to_lowercase().replace(' ', "_"),
            "message": message,
        }));

        (status, body).into_response()
    }
}

/// JWT authentication middleware
///
/// Validates the access token from the `Authorization: Bearer <token>`
/// header and injects an [`AuthContext`] into the request extensions.
///
/// # Errors
///
/// Returns 401 Unauthorized if the header is missing, the token is not a
/// valid access token, or it has expired; 400 if the header is not a
/// Bearer credential.
pub async fn jwt_auth_middleware(
    secret: String,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingCredentials)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AuthError::InvalidFormat("Expected Bearer token".to_string()))?;

    let claims = validate_access_token(token, &secret).map_err(|e| match e {
        JwtError::Expired => AuthError::InvalidToken("Token expired".to_string()),
        JwtError::InvalidIssuer { .. } => AuthError::InvalidToken("Invalid issuer".to_string()),
        _ => AuthError::InvalidToken(format!("Invalid token: {}", e)),
    })?;

    let auth_context = AuthContext::from_jwt(claims.sub, claims.is_admin);
    req.extensions_mut().insert(auth_context);

    Ok(next.run(req).await)
}

/// Admin capability middleware - must be layered after the JWT middleware
///
/// Performs the admin check once for the whole admin route group instead
/// of scattering per-route checks.
pub async fn admin_middleware(request: Request<Body>, next: Next) -> Response {
    match request.extensions().get::<AuthContext>() {
        Some(auth) if auth.is_admin => next.run(request).await,
        Some(_) => AuthError::AdminRequired.into_response(),
        None => AuthError::MissingCredentials.into_response(),
    }
}
