/// Slot model and database operations
///
/// A slot is a recurring daily time window at a station, e.g. 09:00-10:00.
/// Its status reflects the current booking state; the booking service flips
/// it to `booked` when a reservation is taken and back to `available` when
/// the reservation is cancelled or the booking's user is deleted.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE slot_status AS ENUM ('available', 'booked', 'maintenance');
///
/// CREATE TABLE slots (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     station_id UUID NOT NULL REFERENCES stations(id) ON DELETE CASCADE,
///     start_time TIME NOT NULL,
///     end_time TIME NOT NULL,
///     status slot_status NOT NULL DEFAULT 'available',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     CHECK (start_time < end_time)
/// );
/// ```

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Slot booking status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "slot_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SlotStatus {
    /// Slot can be booked
    Available,

    /// Slot has an upcoming booking
    Booked,

    /// Slot is out of service
    Maintenance,
}

impl SlotStatus {
    /// Converts status to string for database storage
    pub fn as_str(&self) -> &'static str {
        match self {
            SlotStatus::Available => "available",
            SlotStatus::Booked => "booked",
            SlotStatus::Maintenance => "maintenance",
        }
    }

    /// Checks whether the slot accepts new bookings
    pub fn is_bookable(&self) -> bool {
        matches!(self, SlotStatus::Available)
    }
}

/// Slot model representing a daily time window at a station
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Slot {
    /// Unique slot ID
    pub id: Uuid,

    /// Station this slot belongs to
    pub station_id: Uuid,

    /// Window start (time of day)
    pub start_time: NaiveTime,

    /// Window end (time of day, after start)
    pub end_time: NaiveTime,

    /// Current booking status
    pub status: SlotStatus,

    /// When the slot was created
    pub created_at: DateTime<Utc>,

    /// When the slot was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new slot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSlot {
    /// Owning station
    pub station_id: Uuid,

    /// Window start
    pub start_time: NaiveTime,

    /// Window end
    pub end_time: NaiveTime,
}

/// Input for updating a slot; `None` fields are left unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateSlot {
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub status: Option<SlotStatus>,
}

impl Slot {
    /// Creates a new slot in the available state
    ///
    /// # Errors
    ///
    /// Returns a database error if the station does not exist (foreign key
    /// `slots_station_id_fkey`) or the window is inverted (check constraint)
    pub async fn create(pool: &PgPool, data: CreateSlot) -> Result<Self, sqlx::Error> {
        let slot = sqlx::query_as::<_, Slot>(
            r#"
            INSERT INTO slots (station_id, start_time, end_time)
            VALUES ($1, $2, $3)
            RETURNING id, station_id, start_time, end_time, status, created_at, updated_at
            "#,
        )
        .bind(data.station_id)
        .bind(data.start_time)
        .bind(data.end_time)
        .fetch_one(pool)
        .await?;

        Ok(slot)
    }

    /// Finds a slot by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let slot = sqlx::query_as::<_, Slot>(
            r#"
            SELECT id, station_id, start_time, end_time, status, created_at, updated_at
            FROM slots
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(slot)
    }

    /// Applies a partial update, returning the updated slot
    ///
    /// Returns `None` if no such slot exists.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateSlot,
    ) -> Result<Option<Self>, sqlx::Error> {
        let slot = sqlx::query_as::<_, Slot>(
            r#"
            UPDATE slots
            SET start_time = COALESCE($2, start_time),
                end_time = COALESCE($3, end_time),
                status = COALESCE($4, status),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, station_id, start_time, end_time, status, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(data.start_time)
        .bind(data.end_time)
        .bind(data.status)
        .fetch_optional(pool)
        .await?;

        Ok(slot)
    }

    /// Lists a station's slots ordered by start time
    pub async fn list_by_station(
        pool: &PgPool,
        station_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let slots = sqlx::query_as::<_, Slot>(
            r#"
            SELECT id, station_id, start_time, end_time, status, created_at, updated_at
            FROM slots
            WHERE station_id = $1
            ORDER BY start_time
            "#,
        )
        .bind(station_id)
        .fetch_all(pool)
        .await?;

        Ok(slots)
    }
}
