/// Station administration service
///
/// Admin-only management of stations and their slots. Deletes cascade
/// explicitly inside one transaction so the caller gets back exactly how
/// many dependent rows were removed; the schema's `ON DELETE CASCADE`
/// clauses remain as a backstop for out-of-band deletes.
///
/// Every operation re-checks the admin capability even though the HTTP
/// layer already gates these routes behind the admin middleware.

use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::models::slot::{CreateSlot, Slot, UpdateSlot};
use crate::models::station::{CreateStation, Station, UpdateStation};

use super::{Caller, ServiceError};

/// Row counts removed by a station delete
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StationDeleteOutcome {
    /// Slots removed with the station
    pub slots_removed: u64,

    /// Bookings removed with those slots
    pub bookings_removed: u64,
}

/// Creates a new station
///
/// # Errors
///
/// - `Forbidden` if the caller is not an admin
/// - `Validation` if the slot count or price is out of range
pub async fn create_station(
    pool: &PgPool,
    caller: Caller,
    input: CreateStation,
) -> Result<Station, ServiceError> {
    caller.require_admin()?;

    if input.name.trim().is_empty() {
        return Err(ServiceError::Validation(
            "Station name is required".to_string(),
        ));
    }
    if input.location.trim().is_empty() {
        return Err(ServiceError::Validation(
            "Station location is required".to_string(),
        ));
    }
    if input.total_slots <= 0 {
        return Err(ServiceError::Validation(
            "Total slots must be positive".to_string(),
        ));
    }
    if input.price_per_hour < 0.0 {
        return Err(ServiceError::Validation(
            "Price per hour cannot be negative".to_string(),
        ));
    }

    let station = Station::create(pool, input).await?;

    info!(station_id = %station.id, name = %station.name, "Station created");

    Ok(station)
}

/// Applies a partial update to a station
///
/// # Errors
///
/// - `Forbidden` if the caller is not an admin
/// - `NotFound` if the station does not exist
/// - `Validation` if an updated field is out of range
pub async fn update_station(
    pool: &PgPool,
    caller: Caller,
    station_id: Uuid,
    input: UpdateStation,
) -> Result<Station, ServiceError> {
    caller.require_admin()?;

    if matches!(&input.name, Some(n) if n.trim().is_empty()) {
        return Err(ServiceError::Validation(
            "Station name cannot be empty".to_string(),
        ));
    }
    if matches!(&input.location, Some(l) if l.trim().is_empty()) {
        return Err(ServiceError::Validation(
            "Station location cannot be empty".to_string(),
        ));
    }
    if matches!(input.total_slots, Some(n) if n <= 0) {
        return Err(ServiceError::Validation(
            "Total slots must be positive".to_string(),
        ));
    }
    if matches!(input.price_per_hour, Some(p) if p < 0.0) {
        return Err(ServiceError::Validation(
            "Price per hour cannot be negative".to_string(),
        ));
    }

    Station::update(pool, station_id, input)
        .await?
        .ok_or(ServiceError::NotFound("Station"))
}

/// Deletes a station together with its slots and their bookings
///
/// Runs in one transaction; either the station and everything under it go,
/// or nothing does.
///
/// # Errors
///
/// - `Forbidden` if the caller is not an admin
/// - `NotFound` if the station does not exist
pub async fn delete_station(
    pool: &PgPool,
    caller: Caller,
    station_id: Uuid,
) -> Result<StationDeleteOutcome, ServiceError> {
    caller.require_admin()?;

    let mut tx = pool.begin().await?;

    let exists: Option<(Uuid,)> =
        sqlx::query_as("SELECT id FROM stations WHERE id = $1 FOR UPDATE")
            .bind(station_id)
            .fetch_optional(&mut *tx)
            .await?;

    if exists.is_none() {
        return Err(ServiceError::NotFound("Station"));
    }

    let bookings_removed = sqlx::query(
        r#"
        DELETE FROM bookings
        WHERE slot_id IN (SELECT id FROM slots WHERE station_id = $1)
        "#,
    )
    .bind(station_id)
    .execute(&mut *tx)
    .await?
    .rows_affected();

    let slots_removed = sqlx::query("DELETE FROM slots WHERE station_id = $1")
        .bind(station_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    sqlx::query("DELETE FROM stations WHERE id = $1")
        .bind(station_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    info!(
        station_id = %station_id,
        slots_removed,
        bookings_removed,
        "Station deleted"
    );

    Ok(StationDeleteOutcome {
        slots_removed,
        bookings_removed,
    })
}

/// Adds a slot to a station
///
/// # Errors
///
/// - `Forbidden` if the caller is not an admin
/// - `NotFound` if the station does not exist
/// - `Validation` if the time window is inverted
pub async fn create_slot(
    pool: &PgPool,
    caller: Caller,
    input: CreateSlot,
) -> Result<Slot, ServiceError> {
    caller.require_admin()?;

    if input.start_time >= input.end_time {
        return Err(ServiceError::Validation(
            "Slot start time must be before end time".to_string(),
        ));
    }

    if Station::find_by_id(pool, input.station_id).await?.is_none() {
        return Err(ServiceError::NotFound("Station"));
    }

    let slot = Slot::create(pool, input).await.map_err(ServiceError::from_db)?;

    info!(slot_id = %slot.id, station_id = %slot.station_id, "Slot created");

    Ok(slot)
}

/// Applies a partial update to a slot
///
/// The resulting window (after merging unchanged fields) must still have
/// start before end.
///
/// # Errors
///
/// - `Forbidden` if the caller is not an admin
/// - `NotFound` if the slot does not exist
/// - `Validation` if the merged time window would be inverted
pub async fn update_slot(
    pool: &PgPool,
    caller: Caller,
    slot_id: Uuid,
    input: UpdateSlot,
) -> Result<Slot, ServiceError> {
    caller.require_admin()?;

    let current = Slot::find_by_id(pool, slot_id)
        .await?
        .ok_or(ServiceError::NotFound("Slot"))?;

    let start = input.start_time.unwrap_or(current.start_time);
    let end = input.end_time.unwrap_or(current.end_time);
    if start >= end {
        return Err(ServiceError::Validation(
            "Slot start time must be before end time".to_string(),
        ));
    }

    Slot::update(pool, slot_id, input)
        .await?
        .ok_or(ServiceError::NotFound("Slot"))
}

/// Deletes a slot together with its bookings
///
/// # Errors
///
/// - `Forbidden` if the caller is not an admin
/// - `NotFound` if the slot does not exist
pub async fn delete_slot(
    pool: &PgPool,
    caller: Caller,
    slot_id: Uuid,
) -> Result<u64, ServiceError> {
    caller.require_admin()?;

    let mut tx = pool.begin().await?;

    let exists: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM slots WHERE id = $1 FOR UPDATE")
        .bind(slot_id)
        .fetch_optional(&mut *tx)
        .await?;

    if exists.is_none() {
        return Err(ServiceError::NotFound("Slot"));
    }

    let bookings_removed = sqlx::query("DELETE FROM bookings WHERE slot_id = $1")
        .bind(slot_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    sqlx::query("DELETE FROM slots WHERE id = $1")
        .bind(slot_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    info!(slot_id = %slot_id, bookings_removed, "Slot deleted");

    Ok(bookings_removed)
}
