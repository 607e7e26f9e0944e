/// Slot endpoints
///
/// # Endpoints
///
/// - `GET /api/stations/:id/slots` - List a station's slots (public)
/// - `GET /api/slots/:id` - Slot details (public)
/// - `POST /api/stations/:id/slots` - Add a slot to a station (admin)
/// - `PUT /api/slots/:id` - Update a slot's window or status (admin)
/// - `DELETE /api/slots/:id` - Delete a slot and its bookings (admin)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chargebook_shared::{
    auth::middleware::AuthContext,
    models::slot::{CreateSlot, Slot, UpdateSlot},
    services::{station_admin, Caller},
};
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

/// Slot creation request body; the station comes from the path
#[derive(Debug, Deserialize)]
pub struct CreateSlotRequest {
    /// Window start, e.g. "09:00:00"
    pub start_time: NaiveTime,

    /// Window end
    pub end_time: NaiveTime,
}

/// Response for a slot delete
#[derive(Debug, Serialize)]
pub struct SlotDeleteResponse {
    pub message: String,
    pub bookings_removed: u64,
}

/// Lists a station's slots
///
/// # Errors
///
/// - `404 Not Found`: No station with this ID
pub async fn list_station_slots(
    State(state): State<AppState>,
    Path(station_id): Path<Uuid>,
) -> ApiResult<Json<Vec<Slot>>> {
    use chargebook_shared::models::station::Station;

    if Station::find_by_id(&state.db, station_id).await?.is_none() {
        return Err(ApiError::NotFound("Station not found".to_string()));
    }

    Ok(Json(Slot::list_by_station(&state.db, station_id).await?))
}

/// Gets a single slot
pub async fn get_slot(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Slot>> {
    let slot = Slot::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Slot not found".to_string()))?;

    Ok(Json(slot))
}

/// Adds a slot to a station (admin)
///
/// # Errors
///
/// - `400 Bad Request`: Inverted time window
/// - `404 Not Found`: No station with this ID
pub async fn create_slot(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(station_id): Path<Uuid>,
    Json(req): Json<CreateSlotRequest>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let caller = Caller::from(auth);

    let slot = station_admin::create_slot(
        &state.db,
        caller,
        CreateSlot {
            station_id,
            start_time: req.start_time,
            end_time: req.end_time,
        },
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Slot created",
            "slot": slot,
        })),
    ))
}

/// Updates a slot's window or status (admin)
///
/// # Errors
///
/// - `400 Bad Request`: Merged time window would be inverted
/// - `404 Not Found`: No slot with this ID
pub async fn update_slot(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateSlot>,
) -> ApiResult<Json<Value>> {
    let caller = Caller::from(auth);

    let slot = station_admin::update_slot(&state.db, caller, id, req).await?;

    Ok(Json(json!({
        "message": "Slot updated",
        "slot": slot,
    })))
}

/// Deletes a slot and its bookings (admin)
pub async fn delete_slot(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<SlotDeleteResponse>> {
    let caller = Caller::from(auth);

    let bookings_removed = station_admin::delete_slot(&state.db, caller, id).await?;

    Ok(Json(SlotDeleteResponse {
        message: "Slot deleted".to_string(),
        bookings_removed,
    }))
}
