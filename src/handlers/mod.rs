pub mod auth;
pub mod scan;
pub mod settings;
pub mod trips;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::Serialize;

use crate::middleware::get_current_user;
use crate::models::{InventoryRecord, PalletType, Trip};
use crate::state::AppState;

#[derive(Serialize)]
pub struct ApiMessage {
    pub message: String,
}

impl ApiMessage {
    pub fn new(message: impl Into<String>) -> Json<Self> {
        Json(Self { message: message.into() })
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StateView {
    types: Vec<PalletType>,
    records: Vec<InventoryRecord>,
    trips: Vec<Trip>,
    active_trip_id: String,
}

/// Dashboard feed: the collections a signed-in client renders from.
pub async fn app_state(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<StateView>, StatusCode> {
    get_current_user(&headers, &state).ok_or(StatusCode::UNAUTHORIZED)?;

    let data = state.data.lock().unwrap();
    Ok(Json(StateView {
        types: data.pallet_types.clone(),
        records: data.records.clone(),
        trips: data.trips.clone(),
        active_trip_id: data.active_trip_id.clone(),
    }))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusView {
    syncing: bool,
    last_sync_time: Option<String>,
    last_sync_error: Option<String>,
}

/// Sync status for the header badge. Signed-in users only, like the rest of
/// the data surface.
pub async fn sync_status(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<StatusView>, StatusCode> {
    get_current_user(&headers, &state).ok_or(StatusCode::UNAUTHORIZED)?;

    let (last_sync_time, last_sync_error) = {
        let data = state.data.lock().unwrap();
        (data.last_sync_time.clone(), data.last_sync_error.clone())
    };
    Ok(Json(StatusView { syncing: state.is_syncing(), last_sync_time, last_sync_error }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::State;

    use crate::state::test_context;

    fn headers_for(user_id: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("x-user-id", user_id.parse().unwrap());
        headers
    }

    #[tokio::test]
    async fn data_endpoints_require_a_signed_in_user() {
        let (state, _dir) = test_context("http://127.0.0.1:9");

        let denied = sync_status(State(state.clone()), HeaderMap::new()).await;
        assert_eq!(denied.err(), Some(StatusCode::UNAUTHORIZED));
        let denied = app_state(State(state.clone()), HeaderMap::new()).await;
        assert_eq!(denied.err(), Some(StatusCode::UNAUTHORIZED));

        let status = sync_status(State(state.clone()), headers_for("4")).await.unwrap().0;
        assert!(!status.syncing);
        assert!(app_state(State(state), headers_for("4")).await.is_ok());
    }
}
