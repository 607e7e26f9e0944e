/// Station endpoints
///
/// Public catalogue endpoints plus admin management.
///
/// # Endpoints
///
/// - `GET /api/stations` - List stations with live availability (public)
/// - `GET /api/stations/search?location=...` - Search by location (public)
/// - `GET /api/stations/:id` - Station details (public)
/// - `GET /api/locations` - Distinct station locations (public)
/// - `POST /api/stations` - Create station (admin)
/// - `PUT /api/stations/:id` - Update station (admin)
/// - `DELETE /api/stations/:id` - Delete station and everything under it (admin)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chargebook_shared::{
    auth::middleware::AuthContext,
    models::station::{CreateStation, Station, StationWithAvailability, UpdateStation},
    services::{station_admin, Caller},
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

/// Search query parameters
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    /// Location substring to match (case-insensitive)
    pub location: String,
}

/// Response for a station delete, reporting what was removed with it
#[derive(Debug, Serialize)]
pub struct StationDeleteResponse {
    pub message: String,
    pub slots_removed: u64,
    pub bookings_removed: u64,
}

/// Lists all stations with their availability counts
pub async fn list_stations(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<StationWithAvailability>>> {
    Ok(Json(Station::list_with_availability(&state.db).await?))
}

/// Searches stations by location substring
pub async fn search_stations(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<Vec<StationWithAvailability>>> {
    Ok(Json(
        Station::search_by_location(&state.db, &query.location).await?,
    ))
}

/// Gets a single station
///
/// # Errors
///
/// - `404 Not Found`: No station with this ID
pub async fn get_station(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Station>> {
    let station = Station::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Station not found".to_string()))?;

    Ok(Json(station))
}

/// Lists the distinct station locations
pub async fn list_locations(State(state): State<AppState>) -> ApiResult<Json<Vec<String>>> {
    Ok(Json(Station::locations(&state.db).await?))
}

/// Creates a station (admin)
///
/// # Errors
///
/// - `400 Bad Request`: Name/location missing, slot count or price invalid
/// - `403 Forbidden`: Caller is not an admin
pub async fn create_station(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateStation>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let caller = Caller::from(auth);

    let station = station_admin::create_station(&state.db, caller, req).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Station created",
            "station": station,
        })),
    ))
}

/// Applies a partial update to a station (admin)
pub async fn update_station(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateStation>,
) -> ApiResult<Json<Value>> {
    let caller = Caller::from(auth);

    let station = station_admin::update_station(&state.db, caller, id, req).await?;

    Ok(Json(json!({
        "message": "Station updated",
        "station": station,
    })))
}

/// Deletes a station, its slots, and their bookings (admin)
pub async fn delete_station(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<StationDeleteResponse>> {
    let caller = Caller::from(auth);

    let outcome = station_admin::delete_station(&state.db, caller, id).await?;

    Ok(Json(StationDeleteResponse {
        message: "Station deleted".to_string(),
        slots_removed: outcome.slots_removed,
        bookings_removed: outcome.bookings_removed,
    }))
}
