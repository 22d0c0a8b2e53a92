use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::Deserialize;

use crate::engine::{apply_scan, build_inspection, CaptureInput, ScanContext, ScanOutcome};
use crate::middleware::get_current_user;
use crate::state::{now_ms, AppState};
use crate::sync;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanRequest {
    pub barcode: String,
    #[serde(default)]
    pub truck_id: Option<String>,
    /// Dock inspection input; required in practice for center scans that
    /// found damage, absent for factory scans.
    #[serde(default)]
    pub inspection: Option<CaptureInput>,
}

/// Apply a barcode scan for the acting user. The transition commits locally
/// first and the snapshot push runs in the background; the response reflects
/// the local result only.
pub async fn scan(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<ScanRequest>,
) -> Result<Json<ScanOutcome>, StatusCode> {
    let user = get_current_user(&headers, &state).ok_or(StatusCode::UNAUTHORIZED)?;

    if state.is_resetting() {
        return Ok(Json(ScanOutcome {
            success: false,
            message: "System under maintenance".to_string(),
        }));
    }

    let inspection = match req.inspection {
        Some(input) => match build_inspection(input) {
            Ok(data) => Some(data),
            Err(e) => {
                return Ok(Json(ScanOutcome { success: false, message: e.to_string() }));
            }
        },
        None => None,
    };

    let outcome = {
        let mut data = state.data.lock().unwrap();
        let active_trip = data.active_trip_id.clone();
        let ctx = ScanContext {
            active_trip_id: &active_trip,
            truck_id: req.truck_id.as_deref().unwrap_or("1"),
        };
        let (records, outcome) =
            apply_scan(&data.records, &user, &ctx, &req.barcode, inspection, now_ms());
        if outcome.success {
            data.records = records;
            state.persist(&data);
        }
        outcome
    };

    if outcome.success {
        sync::spawn_push(&state);
    }
    Ok(Json(outcome))
}
