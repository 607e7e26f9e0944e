/// Booking model and database operations
///
/// A booking reserves one slot for one calendar date on behalf of a user.
/// At most one booking per (slot, date) may be in the `upcoming` state,
/// enforced by the partial unique index `uniq_upcoming_booking_per_slot_date`.
///
/// # State Machine
///
/// ```text
/// upcoming → completed
/// upcoming → cancelled
/// ```
///
/// # Schema
///
/// ```sql
/// CREATE TYPE booking_status AS ENUM ('upcoming', 'completed', 'cancelled');
///
/// CREATE TABLE bookings (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL REFERENCES users(id),
///     slot_id UUID NOT NULL REFERENCES slots(id) ON DELETE CASCADE,
///     date DATE NOT NULL,
///     vehicle_number VARCHAR(20) NOT NULL,
///     status booking_status NOT NULL DEFAULT 'upcoming',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Booking lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "booking_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    /// Reservation is active
    Upcoming,

    /// Charging session took place
    Completed,

    /// Reservation was cancelled before the date
    Cancelled,
}

impl BookingStatus {
    /// Converts status to string for database storage
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Upcoming => "upcoming",
            BookingStatus::Completed => "completed",
            BookingStatus::Cancelled => "cancelled",
        }
    }

    /// Checks if status is terminal (booking no longer holds the slot)
    pub fn is_terminal(&self) -> bool {
        matches!(self, BookingStatus::Completed | BookingStatus::Cancelled)
    }
}

/// Booking model representing a slot reservation
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Booking {
    /// Unique booking ID
    pub id: Uuid,

    /// User who made the reservation
    pub user_id: Uuid,

    /// Reserved slot
    pub slot_id: Uuid,

    /// Calendar date of the charging session
    pub date: NaiveDate,

    /// Vehicle registration number
    pub vehicle_number: String,

    /// Lifecycle status
    pub status: BookingStatus,

    /// When the booking was created
    pub created_at: DateTime<Utc>,

    /// When the booking was last updated
    pub updated_at: DateTime<Utc>,
}

/// Booking joined with slot and station details for listing views
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct BookingDetails {
    pub id: Uuid,
    pub user_id: Uuid,
    pub slot_id: Uuid,
    pub date: NaiveDate,
    pub vehicle_number: String,
    pub status: BookingStatus,

    /// Reserved window start
    pub start_time: NaiveTime,

    /// Reserved window end
    pub end_time: NaiveTime,

    /// Station the slot belongs to
    pub station_id: Uuid,

    /// Station display name
    pub station_name: String,

    /// Station location
    pub station_location: String,

    /// Booking owner's display name (admin listing)
    pub user_name: String,

    pub created_at: DateTime<Utc>,
}

impl Booking {
    /// Finds a booking by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let booking = sqlx::query_as::<_, Booking>(
            r#"
            SELECT id, user_id, slot_id, date, vehicle_number, status,
                   created_at, updated_at
            FROM bookings
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(booking)
    }

    /// Lists a user's bookings with slot and station details, newest first
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: Uuid,
    ) -> Result<Vec<BookingDetails>, sqlx::Error> {
        let bookings = sqlx::query_as::<_, BookingDetails>(
            r#"
            SELECT b.id, b.user_id, b.slot_id, b.date, b.vehicle_number, b.status,
                   sl.start_time, sl.end_time,
                   st.id AS station_id, st.name AS station_name,
                   st.location AS station_location,
                   u.name AS user_name,
                   b.created_at
            FROM bookings b
            JOIN slots sl ON sl.id = b.slot_id
            JOIN stations st ON st.id = sl.station_id
            JOIN users u ON u.id = b.user_id
            WHERE b.user_id = $1
            ORDER BY b.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(bookings)
    }

    /// Lists every booking with user, slot and station details (admin view)
    pub async fn list_all(pool: &PgPool) -> Result<Vec<BookingDetails>, sqlx::Error> {
        let bookings = sqlx::query_as::<_, BookingDetails>(
            r#"
            SELECT b.id, b.user_id, b.slot_id, b.date, b.vehicle_number, b.status,
                   sl.start_time, sl.end_time,
                   st.id AS station_id, st.name AS station_name,
                   st.location AS station_location,
                   u.name AS user_name,
                   b.created_at
            FROM bookings b
            JOIN slots sl ON sl.id = b.slot_id
            JOIN stations st ON st.id = sl.station_id
            JOIN users u ON u.id = b.user_id
            ORDER BY b.created_at DESC
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(bookings)
    }
}
