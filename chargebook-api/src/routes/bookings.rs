/// Booking endpoints
///
/// All booking endpoints require authentication; the caller's identity
/// comes from the request's [`AuthContext`] extension.
///
/// # Endpoints
///
/// - `GET /api/bookings` - Caller's bookings, newest first
/// - `POST /api/bookings` - Reserve a slot for a date
/// - `DELETE /api/bookings/:id` - Cancel an upcoming booking
/// - `GET /api/bookings/all` - Every booking (admin)

use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chargebook_shared::{
    auth::middleware::AuthContext,
    models::booking::{Booking, BookingDetails},
    services::{
        booking::{cancel_booking as cancel, create_booking as create, CreateBookingInput},
        Caller,
    },
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

/// Booking creation request
#[derive(Debug, Deserialize)]
pub struct CreateBookingRequest {
    /// Slot to reserve
    pub slot_id: Uuid,

    /// Calendar date, e.g. "2026-09-01"
    pub date: NaiveDate,

    /// Vehicle registration number
    pub vehicle_number: String,
}

/// Lists the caller's bookings with slot and station details
pub async fn list_my_bookings(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<BookingDetails>>> {
    Ok(Json(Booking::list_for_user(&state.db, auth.user_id).await?))
}

/// Reserves a slot for the caller
///
/// # Endpoint
///
/// ```text
/// POST /api/bookings
/// Content-Type: application/json
///
/// {
///   "slot_id": "uuid",
///   "date": "2026-09-01",
///   "vehicle_number": "KA-01-AB-1234"
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Missing vehicle number or past date
/// - `404 Not Found`: No such slot
/// - `409 Conflict`: Slot unavailable, station closed, or already booked
///   for that date
pub async fn create_booking(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateBookingRequest>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let caller = Caller::from(auth);

    let booking = create(
        &state.db,
        caller,
        CreateBookingInput {
            slot_id: req.slot_id,
            date: req.date,
            vehicle_number: req.vehicle_number,
        },
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Booking confirmed",
            "booking": booking,
        })),
    ))
}

/// Cancels an upcoming booking
///
/// Only the booking owner or an admin may cancel. Cancelling releases the
/// slot if no other upcoming booking holds it.
///
/// # Errors
///
/// - `404 Not Found`: Booking absent or no longer upcoming
/// - `403 Forbidden`: Caller is neither the owner nor an admin
pub async fn cancel_booking(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Value>> {
    let caller = Caller::from(auth);

    let booking = cancel(&state.db, caller, id).await?;

    Ok(Json(json!({
        "message": "Booking cancelled",
        "booking": booking,
    })))
}

/// Lists every booking with user and station details (admin)
pub async fn list_all_bookings(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<BookingDetails>>> {
    // Route is behind the admin middleware; this is the in-depth check
    Caller::from(auth).require_admin()?;

    Ok(Json(Booking::list_all(&state.db).await?))
}
