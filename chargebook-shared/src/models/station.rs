/// Station model and database operations
///
/// A station is a physical charging location. Each station owns a set of
/// time [`crate::models::slot::Slot`]s; deleting a station removes its
/// slots and their bookings (the service layer does this inside a single
/// transaction, with the schema's `ON DELETE CASCADE` as backstop).
///
/// # Schema
///
/// ```sql
/// CREATE TYPE station_status AS ENUM ('open', 'closed');
///
/// CREATE TABLE stations (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(255) NOT NULL,
///     location VARCHAR(255) NOT NULL,
///     total_slots INTEGER NOT NULL CHECK (total_slots > 0),
///     price_per_hour DOUBLE PRECISION NOT NULL CHECK (price_per_hour >= 0),
///     image TEXT,
///     status station_status NOT NULL DEFAULT 'open',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Station operational status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "station_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum StationStatus {
    /// Station accepts bookings
    Open,

    /// Station is closed, no new bookings
    Closed,
}

impl StationStatus {
    /// Converts status to string for database storage
    pub fn as_str(&self) -> &'static str {
        match self {
            StationStatus::Open => "open",
            StationStatus::Closed => "closed",
        }
    }
}

/// Station model representing a charging location
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Station {
    /// Unique station ID
    pub id: Uuid,

    /// Display name
    pub name: String,

    /// Human-readable location (city or area)
    pub location: String,

    /// Advertised number of charging points
    pub total_slots: i32,

    /// Price per hour of charging
    pub price_per_hour: f64,

    /// Optional image URL
    pub image: Option<String>,

    /// Operational status
    pub status: StationStatus,

    /// When the station was created
    pub created_at: DateTime<Utc>,

    /// When the station was last updated
    pub updated_at: DateTime<Utc>,
}

/// Station row joined with its live slot availability count
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct StationWithAvailability {
    pub id: Uuid,
    pub name: String,
    pub location: String,
    pub total_slots: i32,
    pub price_per_hour: f64,
    pub image: Option<String>,
    pub status: StationStatus,

    /// Count of this station's slots currently in the `available` state
    pub available_slots: i64,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new station
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateStation {
    /// Display name
    pub name: String,

    /// Location string
    pub location: String,

    /// Advertised number of charging points (must be positive)
    pub total_slots: i32,

    /// Price per hour (must be non-negative)
    pub price_per_hour: f64,

    /// Optional image URL
    pub image: Option<String>,

    /// Initial status (defaults to open)
    pub status: Option<StationStatus>,
}

/// Input for updating a station; `None` fields are left unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateStation {
    pub name: Option<String>,
    pub location: Option<String>,
    pub total_slots: Option<i32>,
    pub price_per_hour: Option<f64>,
    pub image: Option<String>,
    pub status: Option<StationStatus>,
}

impl Station {
    /// Creates a new station
    pub async fn create(pool: &PgPool, data: CreateStation) -> Result<Self, sqlx::Error> {
        let station = sqlx::query_as::<_, Station>(
            r#"
            INSERT INTO stations (name, location, total_slots, price_per_hour, image, status)
            VALUES ($1, $2, $3, $4, $5, COALESCE($6, 'open'::station_status))
            RETURNING id, name, location, total_slots, price_per_hour, image, status,
                      created_at, updated_at
            "#,
        )
        .bind(data.name)
        .bind(data.location)
        .bind(data.total_slots)
        .bind(data.price_per_hour)
        .bind(data.image)
        .bind(data.status)
        .fetch_one(pool)
        .await?;

        Ok(station)
    }

    /// Finds a station by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let station = sqlx::query_as::<_, Station>(
            r#"
            SELECT id, name, location, total_slots, price_per_hour, image, status,
                   created_at, updated_at
            FROM stations
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(station)
    }

    /// Lists all stations with their live availability counts
    ///
    /// `available_slots` counts slots in the `available` state, not the
    /// advertised `total_slots` figure.
    pub async fn list_with_availability(
        pool: &PgPool,
    ) -> Result<Vec<StationWithAvailability>, sqlx::Error> {
        let stations = sqlx::query_as::<_, StationWithAvailability>(
            r#"
            SELECT s.id, s.name, s.location, s.total_slots, s.price_per_hour,
                   s.image, s.status,
                   COUNT(sl.id) FILTER (WHERE sl.status = 'available') AS available_slots,
                   s.created_at, s.updated_at
            FROM stations s
            LEFT JOIN slots sl ON sl.station_id = s.id
            GROUP BY s.id
            ORDER BY s.name
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(stations)
    }

    /// Applies a partial update, returning the updated station
    ///
    /// Returns `None` if no such station exists.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateStation,
    ) -> Result<Option<Self>, sqlx::Error> {
        let station = sqlx::query_as::<_, Station>(
            r#"
            UPDATE stations
            SET name = COALESCE($2, name),
                location = COALESCE($3, location),
                total_slots = COALESCE($4, total_slots),
                price_per_hour = COALESCE($5, price_per_hour),
                image = COALESCE($6, image),
                status = COALESCE($7, status),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, location, total_slots, price_per_hour, image, status,
                      created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(data.name)
        .bind(data.location)
        .bind(data.total_slots)
        .bind(data.price_per_hour)
        .bind(data.image)
        .bind(data.status)
        .fetch_optional(pool)
        .await?;

        Ok(station)
    }

    /// Lists the distinct station locations, alphabetically
    pub async fn locations(pool: &PgPool) -> Result<Vec<String>, sqlx::Error> {
        let rows: Vec<(String,)> = sqlx::query_as(
            r#"
            SELECT DISTINCT location
            FROM stations
            ORDER BY location
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(rows.into_iter().map(|(location,)| location).collect())
    }

    /// Searches stations by location substring (case-insensitive)
    pub async fn search_by_location(
        pool: &PgPool,
        location: &str,
    ) -> Result<Vec<StationWithAvailability>, sqlx::Error> {
        let stations = sqlx::query_as::<_, StationWithAvailability>(
            r#"
            SELECT s.id, s.name, s.location, s.total_slots, s.price_per_hour,
                   s.image, s.status,
                   COUNT(sl.id) FILTER (WHERE sl.status = 'available') AS available_slots,
                   s.created_at, s.updated_at
            FROM stations s
            LEFT JOIN slots sl ON sl.station_id = s.id
            WHERE s.location ILIKE '%' || $1 || '%'
            GROUP BY s.id
            ORDER BY s.name
            "#,
        )
        .bind(location)
        .fetch_all(pool)
        .await?;

        Ok(stations)
    }
}
