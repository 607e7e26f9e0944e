/// Booking service: slot reservation and cancellation
///
/// Both operations run inside a single database transaction and lock the
/// slot row with `SELECT ... FOR UPDATE`, so two concurrent requests for
/// the same slot serialize at the store. The partial unique index
/// `uniq_upcoming_booking_per_slot_date` backs the lock up: even if a racer
/// slips past, the second insert fails and is surfaced as a conflict.
///
/// # Example
///
/// ```no_run
/// use chargebook_shared::services::booking::{create_booking, CreateBookingInput};
/// use chargebook_shared::services::Caller;
/// use chrono::NaiveDate;
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, caller: Caller, slot_id: Uuid) -> Result<(), Box<dyn std::error::Error>> {
/// let booking = create_booking(&pool, caller, CreateBookingInput {
///     slot_id,
///     date: NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
///     vehicle_number: "KA-01-AB-1234".to_string(),
/// }).await?;
/// # Ok(())
/// # }
/// ```

use chrono::{NaiveDate, Utc};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::models::booking::{Booking, BookingStatus};
use crate::models::slot::Slot;
use crate::models::station::StationStatus;

use super::{Caller, ServiceError};

/// Maximum accepted vehicle number length (matches the column width)
const MAX_VEHICLE_NUMBER_LEN: usize = 20;

/// Input for reserving a slot
#[derive(Debug, Clone)]
pub struct CreateBookingInput {
    /// Slot to reserve
    pub slot_id: Uuid,

    /// Calendar date of the session
    pub date: NaiveDate,

    /// Vehicle registration number
    pub vehicle_number: String,
}

/// Reserves a slot for the caller on a given date
///
/// The flow inside one transaction:
/// 1. Lock the slot row (`FOR UPDATE`); missing slot is a not-found error
/// 2. Reject slots that are not available, and stations that are closed
/// 3. Reject the request if the caller already holds an upcoming booking
///    whose time window overlaps this slot's on the same date
/// 4. Insert the booking; a hit on the upcoming-booking unique index means
///    a concurrent request won the slot and is reported as a conflict
/// 5. Flip the slot to `booked`
///
/// # Errors
///
/// - `Validation` if the vehicle number is empty or too long, or the date
///   is in the past
/// - `NotFound` if the slot does not exist
/// - `Conflict` if the slot is unavailable, the station is closed, the
///   caller has an overlapping upcoming booking on that date, or the
///   (slot, date) pair already has an upcoming booking
pub async fn create_booking(
    pool: &PgPool,
    caller: Caller,
    input: CreateBookingInput,
) -> Result<Booking, ServiceError> {
    let vehicle_number = input.vehicle_number.trim();
    if vehicle_number.is_empty() {
        return Err(ServiceError::Validation(
            "Vehicle number is required".to_string(),
        ));
    }
    if vehicle_number.len() > MAX_VEHICLE_NUMBER_LEN {
        return Err(ServiceError::Validation(format!(
            "Vehicle number must be at most {} characters",
            MAX_VEHICLE_NUMBER_LEN
        )));
    }
    if input.date < Utc::now().date_naive() {
        return Err(ServiceError::Validation(
            "Booking date cannot be in the past".to_string(),
        ));
    }

    let mut tx = pool.begin().await?;

    let slot = sqlx::query_as::<_, Slot>(
        r#"
        SELECT id, station_id, start_time, end_time, status, created_at, updated_at
        FROM slots
        WHERE id = $1
        FOR UPDATE
        "#,
    )
    .bind(input.slot_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or(ServiceError::NotFound("Slot"))?;

    if !slot.status.is_bookable() {
        return Err(ServiceError::Conflict(
            "Slot is not available".to_string(),
        ));
    }

    let (station_status,): (StationStatus,) =
        sqlx::query_as("SELECT status FROM stations WHERE id = $1")
            .bind(slot.station_id)
            .fetch_one(&mut *tx)
            .await?;

    if station_status != StationStatus::Open {
        return Err(ServiceError::Conflict("Station is closed".to_string()));
    }

    // Half-open window overlap against the caller's other upcoming bookings
    let (has_overlap,): (bool,) = sqlx::query_as(
        r#"
        SELECT EXISTS (
            SELECT 1
            FROM bookings b
            JOIN slots s ON s.id = b.slot_id
            WHERE b.user_id = $1
              AND b.date = $2
              AND b.status = 'upcoming'
              AND s.start_time < $3
              AND s.end_time > $4
        )
        "#,
    )
    .bind(caller.user_id)
    .bind(input.date)
    .bind(slot.end_time)
    .bind(slot.start_time)
    .fetch_one(&mut *tx)
    .await?;

    if has_overlap {
        return Err(ServiceError::Conflict(
            "You already have a booking overlapping this time on that date".to_string(),
        ));
    }

    let booking = sqlx::query_as::<_, Booking>(
        r#"
        INSERT INTO bookings (user_id, slot_id, date, vehicle_number)
        VALUES ($1, $2, $3, $4)
        RETURNING id, user_id, slot_id, date, vehicle_number, status,
                  created_at, updated_at
        "#,
    )
    .bind(caller.user_id)
    .bind(input.slot_id)
    .bind(input.date)
    .bind(vehicle_number)
    .fetch_one(&mut *tx)
    .await
    .map_err(ServiceError::from_db)?;

    sqlx::query("UPDATE slots SET status = 'booked', updated_at = NOW() WHERE id = $1")
        .bind(input.slot_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    info!(
        booking_id = %booking.id,
        slot_id = %input.slot_id,
        user_id = %caller.user_id,
        "Booking created"
    );

    Ok(booking)
}

/// Cancels an upcoming booking and releases its slot
///
/// A booking that does not exist or is no longer upcoming is reported as
/// not found. Ownership is checked only after existence: the owner or any
/// admin may cancel, anyone else gets a forbidden error.
///
/// # Errors
///
/// - `NotFound` if the booking is absent or not in the upcoming state
/// - `Forbidden` if the caller is neither the owner nor an admin
pub async fn cancel_booking(
    pool: &PgPool,
    caller: Caller,
    booking_id: Uuid,
) -> Result<Booking, ServiceError> {
    let mut tx = pool.begin().await?;

    let booking = sqlx::query_as::<_, Booking>(
        r#"
        SELECT id, user_id, slot_id, date, vehicle_number, status,
               created_at, updated_at
        FROM bookings
        WHERE id = $1
        FOR UPDATE
        "#,
    )
    .bind(booking_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or(ServiceError::NotFound("Booking"))?;

    if booking.status != BookingStatus::Upcoming {
        return Err(ServiceError::NotFound("Booking"));
    }

    if booking.user_id != caller.user_id && !caller.is_admin {
        return Err(ServiceError::Forbidden(
            "Only the booking owner or an admin can cancel it".to_string(),
        ));
    }

    let cancelled = sqlx::query_as::<_, Booking>(
        r#"
        UPDATE bookings
        SET status = 'cancelled', updated_at = NOW()
        WHERE id = $1
        RETURNING id, user_id, slot_id, date, vehicle_number, status,
                  created_at, updated_at
        "#,
    )
    .bind(booking_id)
    .fetch_one(&mut *tx)
    .await?;

    // Release the slot unless another upcoming booking still holds it
    sqlx::query(
        r#"
        UPDATE slots
        SET status = 'available', updated_at = NOW()
        WHERE id = $1
          AND status = 'booked'
          AND NOT EXISTS (
              SELECT 1 FROM bookings
              WHERE slot_id = $1 AND status = 'upcoming'
          )
        "#,
    )
    .bind(cancelled.slot_id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    info!(
        booking_id = %booking_id,
        user_id = %caller.user_id,
        "Booking cancelled"
    );

    Ok(cancelled)
}
