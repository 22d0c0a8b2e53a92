use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    Json,
};
use log::info;
use serde::Deserialize;

use super::ApiMessage;
use crate::engine::{self, TripSelection};
use crate::middleware::get_current_user;
use crate::models::{Trip, UserRole};
use crate::state::{now_ms, AppState};
use crate::sync;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTripRequest {
    pub press: String,
    pub center: String,
    pub selections: Vec<TripSelection>,
    pub semester: String,
    pub year: String,
}

/// Create a shipment batch. Factory-only: trips start at the press. The new
/// trip becomes the active one and the batch is committed locally before the
/// background push.
pub async fn create_trip(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreateTripRequest>,
) -> Result<Json<Trip>, (StatusCode, Json<ApiMessage>)> {
    let user = get_current_user(&headers, &state)
        .ok_or((StatusCode::UNAUTHORIZED, ApiMessage::new("sign in first")))?;
    if user.role != UserRole::Factory {
        return Err((StatusCode::FORBIDDEN, ApiMessage::new("only a press can create trips")));
    }

    let new_trip = {
        let mut data = state.data.lock().unwrap();
        let outcome = engine::create_trip(
            &data.trips,
            &data.records,
            &data.pallet_types,
            &req.press,
            &req.center,
            &req.selections,
            &req.semester,
            &req.year,
            now_ms(),
        )
        .map_err(|e| (StatusCode::UNPROCESSABLE_ENTITY, ApiMessage::new(e.to_string())))?;

        data.trips = outcome.trips;
        data.records = outcome.records;
        data.active_trip_id = outcome.new_trip.id.clone();
        state.persist(&data);
        outcome.new_trip
    };

    info!(
        "trip {} created: {} -> {}",
        new_trip.trip_number, new_trip.press_code, new_trip.center_code
    );
    sync::spawn_push(&state);
    Ok(Json(new_trip))
}
