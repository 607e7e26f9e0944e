/// Common test utilities for integration tests
///
/// This module provides shared infrastructure for integration tests:
/// - Test database setup
/// - Test user and admin creation
/// - JWT token generation
/// - Request helpers driving the router directly via tower

use axum::body::Body;
use axum::http::{Request, StatusCode};
use chargebook_api::app::{build_router, AppState};
use chargebook_api::config::Config;
use chargebook_shared::auth::jwt::{create_token, Claims, TokenType};
use chargebook_shared::auth::password;
use chargebook_shared::models::user::{CreateUser, User};
use sqlx::PgPool;
use tower::Service as _;
use uuid::Uuid;

/// Password used for every test account
pub const TEST_PASSWORD: &str = "Testpass1";

/// Test context containing all necessary resources
pub struct TestContext {
    pub db: PgPool,
    pub app: axum::Router,
    pub config: Config,
    pub user: User,
    pub admin: User,
    pub user_token: String,
    pub admin_token: String,
}

impl TestContext {
    /// Creates a new test context with a migrated database, one regular
    /// user, and one admin
    pub async fn new() -> anyhow::Result<Self> {
        let config = Config::from_env()?;

        let db = PgPool::connect(&config.database.url).await?;

        // Path relative to this crate's Cargo.toml
        sqlx::migrate!("../migrations").run(&db).await?;

        let password_hash = password::hash_password(TEST_PASSWORD)?;

        let user = User::create(
            &db,
            CreateUser {
                name: "Test User".to_string(),
                email: format!("user-{}@example.com", Uuid::new_v4()),
                password_hash: password_hash.clone(),
                is_admin: false,
            },
        )
        .await?;

        let admin = User::create(
            &db,
            CreateUser {
                name: "Test Admin".to_string(),
                email: format!("admin-{}@example.com", Uuid::new_v4()),
                password_hash,
                is_admin: true,
            },
        )
        .await?;

        let user_token = create_token(
            &Claims::new(user.id, false, TokenType::Access),
            &config.jwt.secret,
        )?;
        let admin_token = create_token(
            &Claims::new(admin.id, true, TokenType::Access),
            &config.jwt.secret,
        )?;

        let state = AppState::new(db.clone(), config.clone());
        let app = build_router(state);

        Ok(TestContext {
            db,
            app,
            config,
            user,
            admin,
            user_token,
            admin_token,
        })
    }

    /// Sends a request and returns status plus parsed JSON body
    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<serde_json::Value>,
    ) -> (StatusCode, serde_json::Value) {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }

        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().call(request).await.unwrap();
        let status = response.status();

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
        };

        (status, json)
    }

    /// Creates a station via the admin API, returning its ID
    pub async fn create_test_station(&self, name: &str, location: &str) -> Uuid {
        let (status, body) = self
            .send(
                "POST",
                "/api/stations",
                Some(&self.admin_token),
                Some(serde_json::json!({
                    "name": name,
                    "location": location,
                    "total_slots": 4,
                    "price_per_hour": 12.5,
                    "image": null,
                    "status": "open"
                })),
            )
            .await;

        assert_eq!(status, StatusCode::CREATED, "station create failed: {}", body);
        body["station"]["id"].as_str().unwrap().parse().unwrap()
    }

    /// Adds a slot to a station via the admin API, returning its ID
    pub async fn create_test_slot(&self, station_id: Uuid, start: &str, end: &str) -> Uuid {
        let (status, body) = self
            .send(
                "POST",
                &format!("/api/stations/{}/slots", station_id),
                Some(&self.admin_token),
                Some(serde_json::json!({
                    "start_time": start,
                    "end_time": end
                })),
            )
            .await;

        assert_eq!(status, StatusCode::CREATED, "slot create failed: {}", body);
        body["slot"]["id"].as_str().unwrap().parse().unwrap()
    }

    /// Removes the test users and anything hanging off them
    pub async fn cleanup(&self) -> anyhow::Result<()> {
        for id in [self.user.id, self.admin.id] {
            sqlx::query("DELETE FROM bookings WHERE user_id = $1")
                .bind(id)
                .execute(&self.db)
                .await?;
            sqlx::query("DELETE FROM users WHERE id = $1")
                .bind(id)
                .execute(&self.db)
                .await?;
        }
        Ok(())
    }
}

/// A date safely in the future for booking tests
pub fn future_date() -> String {
    (chrono::Utc::now().date_naive() + chrono::Duration::days(7)).to_string()
}
