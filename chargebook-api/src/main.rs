//! # ChargeBook API Server
//!
//! REST API for booking charging slots at EV stations.
//!
//! ## Startup sequence
//!
//! 1. Initialize tracing
//! 2. Load configuration from the environment
//! 3. Create the database (development convenience) and connection pool
//! 4. Run pending migrations
//! 5. Seed the bootstrap admin account, if configured
//! 6. Serve the Axum router
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p chargebook-api
//! ```

use chargebook_api::{
    app::{build_router, AppState},
    config::Config,
};
use chargebook_shared::{
    auth::password,
    db::{
        migrations::{ensure_database_exists, run_migrations},
        pool::{create_pool, DatabaseConfig},
    },
    models::user::{CreateUser, User},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chargebook_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "ChargeBook API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env()?;

    ensure_database_exists(&config.database.url).await?;

    let pool = create_pool(DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..Default::default()
    })
    .await?;

    run_migrations(&pool).await?;

    if let Some(admin) = &config.admin {
        seed_admin(&pool, &admin.name, &admin.email, &admin.password).await?;
    }

    let bind_address = config.bind_address();
    let state = AppState::new(pool, config);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");

    Ok(())
}

/// Creates the bootstrap admin account unless it already exists
async fn seed_admin(
    pool: &sqlx::PgPool,
    name: &str,
    email: &str,
    password: &str,
) -> anyhow::Result<()> {
    let email = email.to_lowercase();

    if User::find_by_email(pool, &email).await?.is_some() {
        tracing::debug!("Bootstrap admin account already exists");
        return Ok(());
    }

    let password_hash = password::hash_password(password)?;

    let admin = User::create(
        pool,
        CreateUser {
            name: name.to_string(),
            email,
            password_hash,
            is_admin: true,
        },
    )
    .await?;

    tracing::info!(user_id = %admin.id, "Bootstrap admin account created");

    Ok(())
}

/// Resolves on Ctrl-C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
