/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use chargebook_api::{app::AppState, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let state = AppState::new(pool, config);
/// let app = chargebook_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::config::Config;
use axum::{
    extract::Request,
    middleware::Next,
    response::Response,
    routing::{delete, get, post, put},
    Router,
};
use chargebook_shared::auth::middleware::{admin_middleware, jwt_auth_middleware, AuthError};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
/// Uses Arc internally for cheap cloning.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }

    /// Gets JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                          # Health check (public)
/// └── /api/
///     ├── /auth/
///     │   ├── POST /register           # Create account
///     │   ├── POST /login              # Get tokens
///     │   └── POST /refresh            # Refresh access token
///     ├── GET  /stations               # List stations + availability
///     ├── GET  /stations/search        # Search by location
///     ├── GET  /stations/:id           # Station details
///     ├── GET  /stations/:id/slots     # Station's slots
///     ├── GET  /slots/:id              # Slot details
///     ├── GET  /locations              # Distinct locations
///     ├── GET    /bookings             # Caller's bookings      (auth)
///     ├── POST   /bookings             # Reserve a slot         (auth)
///     ├── DELETE /bookings/:id         # Cancel a booking       (auth)
///     ├── POST   /stations             # Create station         (admin)
///     ├── PUT    /stations/:id         # Update station         (admin)
///     ├── DELETE /stations/:id         # Delete station cascade (admin)
///     ├── POST   /stations/:id/slots   # Add slot               (admin)
///     ├── PUT    /slots/:id            # Update slot            (admin)
///     ├── DELETE /slots/:id            # Delete slot cascade    (admin)
///     ├── GET    /bookings/all         # All bookings           (admin)
///     ├── GET    /users                # List users             (admin)
///     ├── PUT    /users/:id/make-admin # Grant admin            (admin)
///     └── DELETE /users/:id            # Delete user cascade    (admin)
/// ```
///
/// Sub-routers with the same path but disjoint methods (public `GET
/// /stations` next to admin `POST /stations`) are merged, so each group
/// keeps its own middleware stack.
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    // Health check (public, no auth)
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    // Auth routes (public, no auth required)
    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login))
        .route("/refresh", post(routes::auth::refresh));

    // Public catalogue routes
    let public_routes = Router::new()
        .route("/stations", get(routes::stations::list_stations))
        .route("/stations/search", get(routes::stations::search_stations))
        .route("/stations/:id", get(routes::stations::get_station))
        .route("/stations/:id/slots", get(routes::slots::list_station_slots))
        .route("/slots/:id", get(routes::slots::get_slot))
        .route("/locations", get(routes::stations::list_locations));

    // Booking routes (require JWT authentication)
    let booking_routes = Router::new()
        .route("/bookings", get(routes::bookings::list_my_bookings))
        .route("/bookings", post(routes::bookings::create_booking))
        .route("/bookings/:id", delete(routes::bookings::cancel_booking))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    // Admin routes (require JWT authentication + admin capability)
    let admin_routes = Router::new()
        .route("/stations", post(routes::stations::create_station))
        .route("/stations/:id", put(routes::stations::update_station))
        .route("/stations/:id", delete(routes::stations::delete_station))
        .route("/stations/:id/slots", post(routes::slots::create_slot))
        .route("/slots/:id", put(routes::slots::update_slot))
        .route("/slots/:id", delete(routes::slots::delete_slot))
        .route("/bookings/all", get(routes::bookings::list_all_bookings))
        .route("/users", get(routes::users::list_users))
        .route("/users/:id/make-admin", put(routes::users::make_admin))
        .route("/users/:id", delete(routes::users::delete_user))
        .layer(axum::middleware::from_fn(admin_middleware))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    let api_routes = Router::new()
        .nest("/auth", auth_routes)
        .merge(public_routes)
        .merge(booking_routes)
        .merge(admin_routes);

    Router::new()
        .merge(health_routes)
        .nest("/api", api_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// JWT authentication middleware layer
///
/// Thin wrapper binding the shared middleware to the application's JWT
/// secret from state.
async fn jwt_auth_layer(
    state: axum::extract::State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    jwt_auth_middleware(state.jwt_secret().to_string(), req, next).await
}
