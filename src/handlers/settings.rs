//! Admin settings: pallet-type catalogue, user accounts, remote endpoint and
//! the destructive full reset. Every successful change persists locally and
//! pushes the full snapshot, the same commit-then-sync path the scan and
//! trip flows use.

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use log::{info, warn};
use serde::Deserialize;
use uuid::Uuid;

use super::ApiMessage;
use crate::middleware::require_admin;
use crate::models::{PalletType, UserCredentials};
use crate::state::AppState;
use crate::sync;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PalletTypeForm {
    pub stage_code: String,
    pub stage_name: String,
    pub cartons_per_pallet: u32,
}

pub async fn add_type(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(form): Json<PalletTypeForm>,
) -> Result<Json<PalletType>, StatusCode> {
    require_admin(&headers, &state).ok_or(StatusCode::FORBIDDEN)?;

    let new_type = PalletType {
        id: Uuid::new_v4().to_string(),
        stage_code: form.stage_code,
        stage_name: form.stage_name,
        cartons_per_pallet: form.cartons_per_pallet,
    };
    {
        let mut data = state.data.lock().unwrap();
        let mut types = data.pallet_types.clone();
        types.push(new_type.clone());
        data.pallet_types = types;
        state.persist(&data);
    }
    sync::spawn_push(&state);
    Ok(Json(new_type))
}

pub async fn update_type(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(type_id): Path<String>,
    Json(form): Json<PalletTypeForm>,
) -> Result<StatusCode, StatusCode> {
    require_admin(&headers, &state).ok_or(StatusCode::FORBIDDEN)?;

    let found = {
        let mut data = state.data.lock().unwrap();
        let mut found = false;
        let types = data
            .pallet_types
            .iter()
            .cloned()
            .map(|t| {
                if t.id == type_id {
                    found = true;
                    PalletType {
                        id: t.id,
                        stage_code: form.stage_code.clone(),
                        stage_name: form.stage_name.clone(),
                        cartons_per_pallet: form.cartons_per_pallet,
                    }
                } else {
                    t
                }
            })
            .collect();
        if found {
            data.pallet_types = types;
            state.persist(&data);
        }
        found
    };

    if !found {
        return Err(StatusCode::NOT_FOUND);
    }
    sync::spawn_push(&state);
    Ok(StatusCode::NO_CONTENT)
}

/// Delete a book-stage definition. Records referencing it keep their type id
/// and display as an unknown type from then on.
pub async fn delete_type(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(type_id): Path<String>,
) -> Result<StatusCode, StatusCode> {
    require_admin(&headers, &state).ok_or(StatusCode::FORBIDDEN)?;

    {
        let mut data = state.data.lock().unwrap();
        let types: Vec<PalletType> =
            data.pallet_types.iter().filter(|t| t.id != type_id).cloned().collect();
        data.pallet_types = types;
        state.persist(&data);
    }
    sync::spawn_push(&state);
    Ok(StatusCode::NO_CONTENT)
}

/// Replace the whole user list, the way the settings screen edits accounts.
pub async fn replace_users(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(users): Json<Vec<UserCredentials>>,
) -> Result<StatusCode, StatusCode> {
    require_admin(&headers, &state).ok_or(StatusCode::FORBIDDEN)?;

    {
        let mut data = state.data.lock().unwrap();
        data.users = users;
        state.persist(&data);
    }
    sync::spawn_push(&state);
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Deserialize)]
pub struct SheetUrlForm {
    pub url: String,
}

/// Point the client at a different sheet deployment and immediately pull
/// from it.
pub async fn set_sheet_url(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(form): Json<SheetUrlForm>,
) -> Result<StatusCode, StatusCode> {
    require_admin(&headers, &state).ok_or(StatusCode::FORBIDDEN)?;

    {
        let mut data = state.data.lock().unwrap();
        data.sheet_url = form.url;
    }
    let state = state.clone();
    tokio::spawn(async move { sync::fetch_and_merge(&state).await });
    Ok(StatusCode::NO_CONTENT)
}

/// Manual sync button.
pub async fn manual_sync(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<StatusCode, StatusCode> {
    crate::middleware::get_current_user(&headers, &state).ok_or(StatusCode::UNAUTHORIZED)?;
    sync::fetch_and_merge(&state).await;
    Ok(StatusCode::NO_CONTENT)
}

/// Destructive full reset: clear records and trips locally, then push the
/// emptied snapshot. Local clearing is irreversible, so a failed push is
/// reported as its own outcome rather than a plain failure. All other sync
/// activity is suspended while the reset runs.
pub async fn reset_all_data(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ApiMessage>, StatusCode> {
    require_admin(&headers, &state).ok_or(StatusCode::FORBIDDEN)?;

    state.begin_reset();
    let (endpoint, types, users) = {
        let mut data = state.data.lock().unwrap();
        state.store.clear_shipment_data();
        data.records = Vec::new();
        data.trips = Vec::new();
        data.active_trip_id = String::new();
        (data.sheet_url.clone(), data.pallet_types.clone(), data.users.clone())
    };

    let pushed = state.client.push_all(&endpoint, &types, &[], &[], &users).await;
    state.end_reset();

    match pushed {
        Ok(()) => {
            info!("system reset completed");
            Ok(ApiMessage::new("All records and trips were deleted"))
        }
        Err(e) => {
            warn!("reset push failed: {e}");
            Ok(ApiMessage::new("Cleared locally, cloud update failed"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::State;

    use crate::models::{InventoryRecord, PalletStatus, Trip, TripStatus, UserRole};
    use crate::state::test_context;

    fn headers_for(user_id: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("x-user-id", user_id.parse().unwrap());
        headers
    }

    fn seed_shipment(state: &crate::state::AppState) {
        let mut data = state.data.lock().unwrap();
        data.trips = vec![Trip {
            id: "t1".to_string(),
            trip_number: "0001".to_string(),
            trip_barcode: "OPKDMM0001".to_string(),
            press_code: "OPK".to_string(),
            center_code: "DMM".to_string(),
            start_date: 1,
            status: TripStatus::Active,
        }];
        data.active_trip_id = "t1".to_string();
        data.records = vec![InventoryRecord {
            id: "r1".to_string(),
            pallet_type_id: "p1".to_string(),
            pallet_barcode: "G01OPK000116".to_string(),
            trip_id: "t1".to_string(),
            truck_id: "1".to_string(),
            status: PalletStatus::Pending,
            timestamp: 1,
            factory_timestamp: None,
            center_timestamp: None,
            scanned_by: UserRole::Factory,
            destination: "DMM".to_string(),
            condition: None,
            external_damage_qty: None,
            internal_damage_qty: None,
            photos: Vec::new(),
            notes: None,
            damage_details: None,
        }];
        state.persist(&data);
    }

    #[tokio::test]
    async fn reset_reports_partial_failure_when_the_cloud_push_cannot_connect() {
        // Nothing listens on port 9, so the push fails after the local clear
        // has already happened.
        let (state, dir) = test_context("http://127.0.0.1:9");
        seed_shipment(&state);
        assert!(dir.path().join("records.json").exists());

        let msg = reset_all_data(State(state.clone()), headers_for("1")).await.unwrap().0;
        assert_eq!(msg.message, "Cleared locally, cloud update failed");

        // The local clear is irreversible and has already taken effect.
        let data = state.data.lock().unwrap();
        assert!(data.records.is_empty());
        assert!(data.trips.is_empty());
        assert!(data.active_trip_id.is_empty());
        assert!(!dir.path().join("records.json").exists());
        assert!(!dir.path().join("trips.json").exists());
        // Sync activity resumes once the reset settles.
        assert!(!state.is_resetting());
    }

    #[tokio::test]
    async fn reset_is_admin_only() {
        let (state, _dir) = test_context("http://127.0.0.1:9");
        seed_shipment(&state);

        // The STATS monitor account is not an admin.
        let denied = reset_all_data(State(state.clone()), headers_for("7")).await;
        assert_eq!(denied.err(), Some(StatusCode::FORBIDDEN));
        assert_eq!(state.data.lock().unwrap().records.len(), 1);
    }
}
